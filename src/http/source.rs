//! Page sources
//!
//! The sync engine only needs "GET this path with these params, give me the
//! JSON body". [`PageSource`] is that seam; [`PersonaClient`] is the real
//! implementation on top of [`HttpClient`].

use super::client::{HttpClient, HttpClientConfig};
use crate::config::TapConfig;
use crate::error::Result;
use crate::types::StringMap;
use async_trait::async_trait;
use serde_json::Value;

/// Fetches one page of a collection
#[async_trait]
pub trait PageSource: Send + Sync {
    /// GET `path` relative to the API base with the given query params
    async fn fetch_page(&self, path: &str, params: &StringMap) -> Result<Value>;
}

/// Persona API client
#[derive(Debug)]
pub struct PersonaClient {
    http: HttpClient,
}

impl PersonaClient {
    /// Build a client from the tap configuration
    pub fn new(config: &TapConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::with_config(HttpClientConfig::from_tap_config(config))?,
        })
    }
}

#[async_trait]
impl PageSource for PersonaClient {
    async fn fetch_page(&self, path: &str, params: &StringMap) -> Result<Value> {
        self.http.get_json(path, params).await
    }
}
