//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::TapConfig;
use crate::engine::{Message, StreamOutcome, SyncEngine, SyncStats};
use crate::error::{Error, Result};
use crate::http::PersonaClient;
use crate::state::StateManager;
use crate::streams::{JsonApiStream, StreamDefinition, StreamStrategy};
use serde_json::{json, Value};
use std::io::{Stdout, Write};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info};

/// CLI runner
///
/// Every message goes to the runner's writer as one JSON document per line;
/// diagnostics go through `tracing` to stderr.
pub struct Runner<W: Write = Stdout> {
    cli: Cli,
    out: Mutex<W>,
}

impl Runner<Stdout> {
    /// Create a runner writing to stdout
    pub fn new(cli: Cli) -> Self {
        Self::with_writer(cli, std::io::stdout())
    }
}

impl<W: Write + Send> Runner<W> {
    /// Create a runner writing to `out`
    pub fn with_writer(cli: Cli, out: W) -> Self {
        Self {
            cli,
            out: Mutex::new(out),
        }
    }

    /// Consume the runner, returning its writer
    pub fn into_writer(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read { streams, parallel } => self.read(streams.as_deref(), *parallel).await,
        }
    }

    /// Load configuration; inline JSON takes precedence over the file
    fn load_config(&self) -> Result<TapConfig> {
        self.load_optional_config()?
            .ok_or_else(|| Error::config("No configuration given (use --config or --config-json)"))
    }

    fn load_optional_config(&self) -> Result<Option<TapConfig>> {
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json_str(json_str).map(Some);
        }
        match &self.cli.config {
            Some(path) => TapConfig::from_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = PersonaClient::new(&config)?;
        let engine = SyncEngine::new(Arc::new(client), StateManager::in_memory(), config);

        info!(base_url = %engine.config().base_url, "Checking connection");
        self.output_message(&Message::info("Checking connection to Persona").to_json())?;

        let path = StreamDefinition::inquiries().path;
        let status = match engine.check_connection(&path).await {
            Ok(()) => json!({
                "status": "SUCCEEDED",
                "message": "Connection successful"
            }),
            Err(e) => json!({
                "status": "FAILED",
                "message": format!("Connection failed: {e}")
            }),
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": status
        }))
    }

    /// Print the stream catalog
    fn discover(&self) -> Result<()> {
        let strategies = match self.load_optional_config()? {
            Some(config) => JsonApiStream::all(&config),
            None => StreamDefinition::all()
                .into_iter()
                .map(JsonApiStream::new)
                .collect(),
        };

        let streams: Vec<Value> = strategies
            .iter()
            .map(|strategy| {
                let definition = strategy.definition();
                json!({
                    "stream": definition.name,
                    "tap_stream_id": definition.name,
                    "schema": definition.schema.to_json(),
                    "key_properties": definition.primary_keys,
                    "replication_key": definition.replication_key,
                    "replication_method": "INCREMENTAL",
                    "incomplete_statuses": definition.incomplete_statuses,
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": { "streams": streams }
        }))
    }

    /// Read streams
    async fn read(&self, streams: Option<&str>, parallel: bool) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config()?;
        let state = self.load_state()?;
        let strategies = select_streams(&config, streams)?;

        let client = PersonaClient::new(&config)?;
        let engine = SyncEngine::new(Arc::new(client), state, config);

        let mut stats = SyncStats::new();
        let mut fatal: Option<Error> = None;

        if parallel {
            let results = futures::future::join_all(
                strategies
                    .iter()
                    .map(|strategy| engine.sync_stream(strategy)),
            )
            .await;

            for (strategy, result) in strategies.iter().zip(results) {
                self.handle_result(strategy.name(), result, &mut stats, &mut fatal)?;
            }
        } else {
            for strategy in &strategies {
                let result = engine.sync_stream(strategy).await;
                self.handle_result(strategy.name(), result, &mut stats, &mut fatal)?;
                if fatal.is_some() {
                    break;
                }
            }
        }

        let state_file = match &self.cli.state {
            Some(path) => {
                engine.state().save_to_file(path).await?;
                Some(path.to_string_lossy().to_string())
            }
            None => None,
        };

        stats.set_duration(sync_start.elapsed().as_millis() as u64);
        let mut summary = stats.to_summary_json();
        summary["summary"]["state_file"] = json!(state_file);
        self.output_message(&summary)?;

        if let Some(e) = fatal {
            return Err(e);
        }
        if stats.errors > 0 {
            return Err(Error::StreamsFailed {
                failed: stats.errors,
                total: strategies.len(),
            });
        }
        Ok(())
    }

    /// Emit a stream's messages, or log its failure
    fn handle_result(
        &self,
        stream: &str,
        result: Result<StreamOutcome>,
        stats: &mut SyncStats,
        fatal: &mut Option<Error>,
    ) -> Result<()> {
        match result {
            Ok(outcome) => {
                for message in &outcome.messages {
                    self.output_message(&message.to_json())?;
                }
                stats.add_stream(outcome.stats);
            }
            Err(e) => {
                error!(%stream, error = %e, "Stream sync failed");
                self.output_message(
                    &Message::error(format!("Error syncing stream {stream}: {e}")).to_json(),
                )?;
                stats.add_error();
                if e.is_fatal() && fatal.is_none() {
                    *fatal = Some(e);
                }
            }
        }
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
        };

        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::Other("output writer poisoned".to_string()))?;
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}

/// Strategies for the requested streams, in catalog order
fn select_streams(config: &TapConfig, filter: Option<&str>) -> Result<Vec<JsonApiStream>> {
    let requested: Vec<&str> = filter
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if let Some(unknown) = requested
        .iter()
        .find(|name| StreamDefinition::by_name(name).is_none())
    {
        return Err(Error::StreamNotFound {
            stream: (*unknown).to_string(),
        });
    }

    Ok(JsonApiStream::all(config)
        .into_iter()
        .filter(|strategy| requested.is_empty() || requested.contains(&strategy.name()))
        .collect())
}
