//! Stream definitions for the two Persona collections

use crate::schema::{JsonSchema, JsonType, SchemaProperty};
use serde::{Deserialize, Serialize};

/// Name of the inquiries stream
pub const INQUIRIES: &str = "inquiries";

/// Name of the cases stream
pub const CASES: &str = "cases";

/// Field added to every record at emission time
pub const EXTRACTED_AT_FIELD: &str = "_sdc_extracted_at";

/// Static description of one resource collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDefinition {
    /// Stream name
    pub name: String,
    /// Endpoint path relative to the base URL
    pub path: String,
    /// Primary key fields
    pub primary_keys: Vec<String>,
    /// Field driving the replication cursor
    pub replication_key: String,
    /// Statuses meaning "may still change"
    pub incomplete_statuses: Vec<String>,
    /// Declared record schema
    pub schema: JsonSchema,
}

impl StreamDefinition {
    /// `GET /inquiries`
    pub fn inquiries() -> Self {
        Self {
            name: INQUIRIES.to_string(),
            path: "/inquiries".to_string(),
            primary_keys: vec!["id".to_string()],
            replication_key: "updated_at".to_string(),
            incomplete_statuses: strings(&["created", "pending", "needs_review"]),
            schema: inquiry_schema(),
        }
    }

    /// `GET /cases`
    pub fn cases() -> Self {
        Self {
            name: CASES.to_string(),
            path: "/cases".to_string(),
            primary_keys: vec!["id".to_string()],
            replication_key: "updated_at".to_string(),
            incomplete_statuses: strings(&["Open", "Pending"]),
            schema: case_schema(),
        }
    }

    /// Every supported stream, in sync order
    pub fn all() -> Vec<Self> {
        vec![Self::inquiries(), Self::cases()]
    }

    /// Look up a stream by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            INQUIRIES => Some(Self::inquiries()),
            CASES => Some(Self::cases()),
            _ => None,
        }
    }

    /// Replace the incomplete status set
    #[must_use]
    pub fn with_incomplete_statuses(mut self, statuses: &[String]) -> Self {
        self.incomplete_statuses = statuses.to_vec();
        self
    }

    /// Query filter name for the replication key, e.g. `filter[updated-at][start]`
    pub fn start_filter_param(&self) -> String {
        format!("filter[{}][start]", self.replication_key.replace('_', "-"))
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

// ============================================================================
// Schemas
// ============================================================================

fn common_schema(noun: &str) -> JsonSchema {
    JsonSchema::new()
        .required_property(
            "id",
            SchemaProperty::new(JsonType::String).with_description(&format!("{noun} ID")),
        )
        .property(
            "type",
            SchemaProperty::string().with_description("Resource type"),
        )
        .property(
            "created_at",
            SchemaProperty::date_time()
                .with_description(&format!("Timestamp when the {} was created", noun.to_lowercase())),
        )
        .property(
            "updated_at",
            SchemaProperty::date_time().with_description(&format!(
                "Timestamp when the {} was last updated",
                noun.to_lowercase()
            )),
        )
        .property(
            "status",
            SchemaProperty::string().with_description(&format!("{noun} status")),
        )
        .property(
            EXTRACTED_AT_FIELD,
            SchemaProperty::date_time().with_description("Timestamp when the record was extracted"),
        )
}

fn inquiry_schema() -> JsonSchema {
    let text = [
        ("reference_id", "Reference ID"),
        ("inquiry_template_id", "ID of the inquiry template"),
        ("inquiry_template_version_id", "Version ID of the inquiry template"),
        ("name_first", "First name"),
        ("name_middle", "Middle name"),
        ("name_last", "Last name"),
        ("email_address", "Email address"),
        ("phone_number", "Phone number"),
        ("address_street_1", "Street address line 1"),
        ("address_street_2", "Street address line 2"),
        ("address_city", "City"),
        ("address_subdivision", "State/Province"),
        ("address_postal_code", "Postal code"),
    ];

    text.into_iter().fold(
        common_schema("Inquiry")
            .property(
                "completed_at",
                SchemaProperty::date_time()
                    .with_description("Timestamp when the inquiry was completed"),
            )
            .property(
                "birthdate",
                SchemaProperty::date().with_description("Date of birth"),
            )
            .property(
                "relationships",
                SchemaProperty::open_object()
                    .with_description("Related resources (verifications, reports, etc.)"),
            ),
        |schema, (name, description)| {
            schema.property(name, SchemaProperty::string().with_description(description))
        },
    )
}

fn case_schema() -> JsonSchema {
    let text = [
        ("name", "Case name"),
        ("assignee_id", "ID of assigned user"),
        ("resolution", "Case resolution"),
        ("case_template_id", "ID of the case template"),
        ("case_template_version_id", "Version ID of the case template"),
    ];

    text.into_iter().fold(
        common_schema("Case")
            .property(
                "resolved_at",
                SchemaProperty::date_time().with_description("Timestamp when the case was resolved"),
            )
            .property(
                "relationships",
                SchemaProperty::open_object().with_description("Related resources"),
            ),
        |schema, (name, description)| {
            schema.property(name, SchemaProperty::string().with_description(description))
        },
    )
}
