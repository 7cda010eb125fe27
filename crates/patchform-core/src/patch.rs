//! Patch records: one editable field exposed by the sockpuppet session API.

/// Numeric bounds for a float field's slider. Each bound is optional on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SliderBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

/// The typed payload of a patch field.
///
/// The variant decides which metadata exists: options only for strings,
/// slider bounds only for floats, nothing for resources and unknown types.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String {
        value: Option<String>,
        options: Vec<String>,
    },
    Float {
        value: Option<f64>,
        bounds: SliderBounds,
    },
    Resource {
        uid: Option<String>,
    },
    /// Any type string the client does not recognise. Accepted, never rejected.
    Other {
        type_name: String,
    },
}

impl FieldValue {
    /// The wire `type` string this value was decoded from.
    pub fn type_name(&self) -> &str {
        match self {
            FieldValue::String { .. } => "string",
            FieldValue::Float { .. } => "float",
            FieldValue::Resource { .. } => "resource",
            FieldValue::Other { type_name } => type_name,
        }
    }
}

/// A single patch field, flattened out of its address group.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchRecord {
    /// Opaque identifier of the `result` entry this field came from.
    pub address: String,
    /// `uid` of the `result` entry, when the session sends one.
    pub uid: Option<String>,
    pub field_name: String,
    /// Human-readable label; the session omits it for some fields.
    pub display_name: Option<String>,
    pub field: FieldValue,
}

impl PatchRecord {
    pub fn type_name(&self) -> &str {
        self.field.type_name()
    }

    /// The row label: `display_name` when present, otherwise `field_name`.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.field_name)
    }
}
