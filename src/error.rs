//! Error types for message conversion.

/// Errors raised while converting a Dialogflow message batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("Malformed {kind} message: missing `{field}`")]
    MalformedMessage {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Unreadable message: {reason}")]
    Unreadable { reason: String },

    #[error("Invalid message at index {index}: {source}")]
    InvalidElement {
        index: usize,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    pub fn malformed(kind: &'static str, field: &'static str) -> Self {
        ConvertError::MalformedMessage { kind, field }
    }

    /// Attach the batch position of the element that failed.
    pub fn at(self, index: usize) -> Self {
        ConvertError::InvalidElement {
            index,
            source: Box::new(self),
        }
    }
}
