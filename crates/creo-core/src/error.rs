use thiserror::Error;

/// Failure to decode or construct a single package record.
///
/// Store-level parsing never surfaces these as hard errors; a bad entry is
/// skipped and the rest of the store still loads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed package record '{entry}': {reason}")]
    MalformedRecord { entry: String, reason: String },

    #[error("invalid {field} '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}
