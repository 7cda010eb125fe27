//! JSON envelope returned by `GET /api/session/sockpuppet/patches`.
//!
//! ```text
//! { status: { code, message?, details? },
//!   result: [ { address, uid?, fields: [ { name, displayName?, type,
//!       stringValue?, stringMeta?, floatValue?, floatMeta?, resourceValue? } ] } ] }
//! ```
//!
//! Only the containers are typed. Scalars and per-type payloads are held as
//! raw JSON and read inside the arm matching the field's `type`; a payload of
//! the wrong shape reads as null instead of failing the whole response.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::patch::{FieldValue, PatchRecord, SliderBounds};

/// A well-formed response whose status block reports failure.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("API returned error status {}: {message}", code_label(.code))]
pub struct ApiError {
    /// Raw status code; `None` when the envelope carried none.
    pub code: Option<Value>,
    pub message: String,
    pub details: Vec<Value>,
}

fn code_label(code: &Option<Value>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none".to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    result: Option<Vec<AddressEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    code: Option<Value>,
    message: Option<Value>,
    details: Option<Value>,
}

impl Status {
    /// `0` and `0.0` both count as success.
    fn is_ok(&self) -> bool {
        self.code.as_ref().and_then(Value::as_f64) == Some(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct AddressEntry {
    address: Option<Value>,
    uid: Option<Value>,
    fields: Option<Vec<WireField>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireField {
    name: Option<Value>,
    display_name: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<Value>,
    string_value: Option<Value>,
    string_meta: Option<Value>,
    float_value: Option<Value>,
    float_meta: Option<Value>,
    resource_value: Option<Value>,
}

/// Text form of a scalar: strings as-is, other non-null values as JSON.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn number(payload: Option<&Value>, key: &str) -> Option<f64> {
    payload?.get(key)?.as_f64()
}

impl Envelope {
    /// Parse an envelope from a response body.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    /// Check the status block and flatten `result` into records,
    /// address-major then field-minor, in response order.
    ///
    /// A non-zero (or missing) status code discards `result` entirely.
    pub fn into_records(self) -> Result<Vec<PatchRecord>, ApiError> {
        let status = self.status.unwrap_or_default();
        if !status.is_ok() {
            let details = match status.details {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
            };
            return Err(ApiError {
                code: status.code,
                message: text(status.message.as_ref())
                    .unwrap_or_else(|| "Unknown error".to_string()),
                details,
            });
        }

        let mut records = Vec::new();
        for entry in self.result.unwrap_or_default() {
            let address = text(entry.address.as_ref()).unwrap_or_default();
            let uid = text(entry.uid.as_ref());
            for field in entry.fields.unwrap_or_default() {
                records.push(field.into_record(&address, uid.clone()));
            }
        }
        Ok(records)
    }
}

impl WireField {
    fn into_record(self, address: &str, uid: Option<String>) -> PatchRecord {
        let kind = text(self.kind.as_ref()).unwrap_or_default();
        let field = match kind.as_str() {
            "string" => FieldValue::String {
                value: text(self.string_value.as_ref()),
                options: self
                    .string_meta
                    .as_ref()
                    .and_then(|m| m.get("options"))
                    .and_then(Value::as_array)
                    .map(|opts| opts.iter().filter_map(|o| text(Some(o))).collect())
                    .unwrap_or_default(),
            },
            "float" => {
                let meta = self.float_meta.as_ref();
                FieldValue::Float {
                    value: number(self.float_value.as_ref(), "value"),
                    bounds: SliderBounds {
                        min: number(meta, "min"),
                        max: number(meta, "max"),
                        step: number(meta, "step"),
                    },
                }
            }
            "resource" => FieldValue::Resource {
                uid: text(self.resource_value.as_ref().and_then(|r| r.get("uid"))),
            },
            _ => FieldValue::Other { type_name: kind },
        };

        let field_name = text(self.name.as_ref()).unwrap_or_default();
        debug!(address, field = %field_name, kind = field.type_name(), "decoded patch field");
        PatchRecord {
            address: address.to_string(),
            uid,
            field_name,
            display_name: text(self.display_name.as_ref()),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(json: &str) -> Result<Vec<PatchRecord>, ApiError> {
        Envelope::from_json(json).unwrap().into_records()
    }

    #[test]
    fn float_field_scenario() {
        let json = r#"{
            "status": {"code": 0},
            "result": [{"address": "a1", "fields": [{
                "name": "Gain", "type": "float",
                "floatValue": {"value": 0.5},
                "floatMeta": {"min": 0, "max": 1, "step": 0.01}
            }]}]
        }"#;
        let recs = records(json).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].address, "a1");
        assert_eq!(recs[0].field_name, "Gain");
        assert_eq!(
            recs[0].field,
            FieldValue::Float {
                value: Some(0.5),
                bounds: SliderBounds {
                    min: Some(0.0),
                    max: Some(1.0),
                    step: Some(0.01),
                },
            }
        );
    }

    #[test]
    fn string_field_scenario() {
        let json = r#"{
            "status": {"code": 0},
            "result": [{"address": "a2", "fields": [{
                "name": "Mode", "type": "string",
                "stringValue": "Lead",
                "stringMeta": {"options": ["Lead", "Pad"]}
            }]}]
        }"#;
        let recs = records(json).unwrap();
        assert_eq!(
            recs[0].field,
            FieldValue::String {
                value: Some("Lead".into()),
                options: vec!["Lead".into(), "Pad".into()],
            }
        );
    }

    #[test]
    fn string_without_meta_has_no_options() {
        let json = r#"{"status": {"code": 0}, "result": [{"address": "a", "fields": [
            {"name": "Label", "type": "string", "stringValue": "x"}
        ]}]}"#;
        let recs = records(json).unwrap();
        assert_eq!(
            recs[0].field,
            FieldValue::String {
                value: Some("x".into()),
                options: vec![],
            }
        );
    }

    #[test]
    fn float_without_value_or_meta() {
        let json = r#"{"status": {"code": 0}, "result": [{"address": "a", "fields": [
            {"name": "Depth", "type": "float", "floatValue": {}}
        ]}]}"#;
        let recs = records(json).unwrap();
        assert_eq!(
            recs[0].field,
            FieldValue::Float {
                value: None,
                bounds: SliderBounds::default(),
            }
        );
    }

    #[test]
    fn resource_field_takes_uid() {
        let json = r#"{"status": {"code": 0}, "result": [{"address": "a", "fields": [
            {"name": "Sample", "type": "resource", "resourceValue": {"uid": "res-42"}}
        ]}]}"#;
        let recs = records(json).unwrap();
        assert_eq!(
            recs[0].field,
            FieldValue::Resource {
                uid: Some("res-42".into())
            }
        );
    }

    #[test]
    fn unknown_type_is_accepted_without_metadata() {
        let json = r#"{"status": {"code": 0}, "result": [{"address": "a", "fields": [
            {"name": "Enabled", "type": "bool", "stringValue": "ignored",
             "floatMeta": {"min": 0, "max": 1, "step": 1}}
        ]}]}"#;
        let recs = records(json).unwrap();
        assert_eq!(
            recs[0].field,
            FieldValue::Other {
                type_name: "bool".into()
            }
        );
    }

    #[test]
    fn flattens_address_major_field_minor() {
        let json = r#"{"status": {"code": 0}, "result": [
            {"address": "a1", "fields": [
                {"name": "f1", "type": "string"},
                {"name": "f2", "type": "float"}
            ]},
            {"address": "a2", "fields": []},
            {"address": "a3", "fields": [
                {"name": "f3", "type": "resource"}
            ]}
        ]}"#;
        let recs = records(json).unwrap();
        let order: Vec<(&str, &str)> = recs
            .iter()
            .map(|r| (r.address.as_str(), r.field_name.as_str()))
            .collect();
        assert_eq!(order, vec![("a1", "f1"), ("a1", "f2"), ("a3", "f3")]);
    }

    #[test]
    fn nonzero_status_ignores_result() {
        let json = r#"{
            "status": {"code": 7, "message": "bad session", "details": ["expired"]},
            "result": [{"address": "a1", "fields": [{"name": "Gain", "type": "float"}]}]
        }"#;
        let err = records(json).unwrap_err();
        assert_eq!(err.code, Some(Value::from(7)));
        assert_eq!(err.message, "bad session");
        assert_eq!(err.details, vec![Value::String("expired".into())]);
        assert_eq!(err.to_string(), "API returned error status 7: bad session");
    }

    #[test]
    fn missing_status_is_an_error() {
        let err = records(r#"{"result": []}"#).unwrap_err();
        assert_eq!(err.code, None);
        assert_eq!(err.message, "Unknown error");
        assert!(err.details.is_empty());
        assert_eq!(err.to_string(), "API returned error status none: Unknown error");
    }

    #[test]
    fn empty_and_missing_result_yield_no_records() {
        assert!(records(r#"{"status": {"code": 0}, "result": []}"#)
            .unwrap()
            .is_empty());
        assert!(records(r#"{"status": {"code": 0}}"#).unwrap().is_empty());
        assert!(records(r#"{"status": {"code": 0}, "result": null}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_body_fails_to_parse() {
        assert!(Envelope::from_json("<html>not json</html>").is_err());
        assert!(Envelope::from_json(r#"{"status": {"code": 0}, "result": [{"#).is_err());
    }

    #[test]
    fn non_numeric_status_code_is_an_api_error() {
        let err = records(r#"{"status": {"code": "zero"}, "result": []}"#).unwrap_err();
        assert_eq!(err.code, Some(Value::from("zero")));
        assert_eq!(
            err.to_string(),
            r#"API returned error status "zero": Unknown error"#
        );
    }

    #[test]
    fn float_zero_status_code_is_success() {
        let json = r#"{"status": {"code": 0.0}, "result": [{"address": "a", "fields": [
            {"name": "Gain", "type": "float", "floatValue": {"value": 1}}
        ]}]}"#;
        assert_eq!(records(json).unwrap().len(), 1);
    }

    #[test]
    fn unused_payload_of_wrong_type_is_ignored() {
        let json = r#"{"status": {"code": 0}, "result": [{"address": "a", "fields": [
            {"name": "On", "type": "bool", "stringValue": true},
            {"name": "Gain", "type": "float", "floatValue": {"value": 0.25},
             "stringMeta": "not an object"}
        ]}]}"#;
        let recs = records(json).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(
            recs[0].field,
            FieldValue::Other {
                type_name: "bool".into()
            }
        );
        assert_eq!(
            recs[1].field,
            FieldValue::Float {
                value: Some(0.25),
                bounds: SliderBounds::default(),
            }
        );
    }

    #[test]
    fn null_options_are_dropped() {
        let json = r#"{"status": {"code": 0}, "result": [{"address": "a", "fields": [
            {"name": "Mode", "type": "string", "stringValue": "x",
             "stringMeta": {"options": ["x", null]}}
        ]}]}"#;
        let recs = records(json).unwrap();
        assert_eq!(
            recs[0].field,
            FieldValue::String {
                value: Some("x".into()),
                options: vec!["x".into()],
            }
        );
    }

    #[test]
    fn mistyped_payloads_read_as_null() {
        let json = r#"{"status": {"code": 0}, "result": [{"address": "a", "fields": [
            {"name": "Gain", "type": "float", "floatValue": {"value": "loud"},
             "floatMeta": {"min": "low", "max": 10}},
            {"name": "Sample", "type": "resource", "resourceValue": 5}
        ]}]}"#;
        let recs = records(json).unwrap();
        assert_eq!(
            recs[0].field,
            FieldValue::Float {
                value: None,
                bounds: SliderBounds {
                    min: None,
                    max: Some(10.0),
                    step: None,
                },
            }
        );
        assert_eq!(recs[1].field, FieldValue::Resource { uid: None });
    }

    #[test]
    fn carries_entry_uid_and_display_name() {
        let json = r#"{"status": {"code": 0}, "result": [{"address": "a1", "uid": "u-9",
            "fields": [
                {"name": "gain_db", "displayName": "Gain", "type": "float"},
                {"name": "mode", "type": "string"}
            ]}]}"#;
        let recs = records(json).unwrap();
        assert_eq!(recs[0].uid.as_deref(), Some("u-9"));
        assert_eq!(recs[1].uid.as_deref(), Some("u-9"));
        assert_eq!(recs[0].display_name.as_deref(), Some("Gain"));
        assert_eq!(recs[1].display_name, None);
        assert_eq!(recs[1].label(), "mode");
    }
}
