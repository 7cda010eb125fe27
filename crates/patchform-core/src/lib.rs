pub mod envelope;
pub mod patch;

pub use envelope::{ApiError, Envelope};
pub use patch::{FieldValue, PatchRecord, SliderBounds};
