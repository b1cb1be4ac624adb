//! Tests for decoder module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_normalize_field_name() {
    assert_eq!(normalize_field_name("created-at"), "created_at");
    assert_eq!(normalize_field_name("address-street-1"), "address_street_1");
    assert_eq!(normalize_field_name("status"), "status");
}

#[test]
fn test_normalize_inquiry_page() {
    let body = json!({
        "data": [
            {
                "type": "inquiry",
                "id": "inq_123456",
                "attributes": {
                    "status": "completed",
                    "reference-id": "ref_001",
                    "created-at": "2025-01-15T10:30:00Z",
                    "updated-at": "2025-01-15T11:00:00Z",
                    "name-first": "John",
                    "name-last": "Doe",
                    "email-address": "john.doe@example.com"
                },
                "relationships": {
                    "verifications": {
                        "data": [{"type": "verification", "id": "ver_123"}]
                    }
                }
            }
        ],
        "links": {"next": null}
    });

    let records = ResponseNormalizer::new().normalize(&body).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record["id"], "inq_123456");
    assert_eq!(record["type"], "inquiry");
    assert_eq!(record["status"], "completed");
    assert_eq!(record["reference_id"], "ref_001");
    assert_eq!(record["name_first"], "John");
    assert_eq!(record["email_address"], "john.doe@example.com");
    assert_eq!(record["created_at"], "2025-01-15T10:30:00Z");
    assert_eq!(
        record["relationships"],
        json!({"verifications": {"data": [{"type": "verification", "id": "ver_123"}]}})
    );
    assert!(!record.contains_key("attributes"));
    assert!(!record.contains_key("created-at"));
}

#[test]
fn test_normalize_preserves_count_and_order() {
    let body = json!({
        "data": [
            {"type": "case", "id": "case_3", "attributes": {"updated-at": "2025-01-03T00:00:00Z"}},
            {"type": "case", "id": "case_1", "attributes": {"updated-at": "2025-01-01T00:00:00Z"}},
            {"type": "case", "id": "case_2", "attributes": {}}
        ]
    });

    let records = ResponseNormalizer::new().normalize(&body).unwrap();
    let ids: Vec<_> = records.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!("case_3"), json!("case_1"), json!("case_2")]);
    assert_eq!(records[2].len(), 2);
}

#[test]
fn test_normalize_without_relationships() {
    let body = json!({"data": [{"type": "inquiry", "id": "inq_1", "attributes": {"status": "created"}}]});

    let records = ResponseNormalizer::new().normalize(&body).unwrap();
    assert!(!records[0].contains_key("relationships"));
}

#[test]
fn test_normalize_unknown_fields_pass_through() {
    let body = json!({
        "data": [{
            "type": "inquiry",
            "id": "inq_1",
            "attributes": {"brand-new-field": {"nested-key": [1, 2]}}
        }]
    });

    let records = ResponseNormalizer::new().normalize(&body).unwrap();
    // Only the top-level attribute name is canonicalized
    assert_eq!(records[0]["brand_new_field"], json!({"nested-key": [1, 2]}));
}

#[test]
fn test_normalize_empty_and_missing_data() {
    let normalizer = ResponseNormalizer::new();
    assert!(normalizer
        .normalize(&json!({"data": [], "links": {"next": null}}))
        .unwrap()
        .is_empty());
    assert!(normalizer.normalize(&json!({"links": {}})).unwrap().is_empty());
    assert!(normalizer.normalize(&json!({"data": null})).unwrap().is_empty());
}

#[test]
fn test_normalize_rejects_non_array_data() {
    let err = ResponseNormalizer::new()
        .normalize(&json!({"data": {"id": "inq_1"}}))
        .unwrap_err();
    assert!(err.to_string().contains("expected 'data' to be an array"));

    let err = ResponseNormalizer::new()
        .normalize(&json!({"data": ["inq_1"]}))
        .unwrap_err();
    assert!(err.to_string().contains("resource 0"));
}

#[test]
fn test_envelope_fields_win_over_attributes() {
    let resource = json!({
        "type": "inquiry",
        "id": "inq_real",
        "attributes": {"id": "inq_fake", "type": "fake"}
    });

    let record = flatten_resource(&resource).unwrap();
    assert_eq!(record["id"], "inq_real");
    assert_eq!(record["type"], "inquiry");
}
