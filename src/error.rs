//! Dispatch error taxonomy with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Everything that can abort a dispatch.
///
/// All variants are non-recoverable at the point raised: the dispatch call
/// returns the error to the invocation host and nothing is retried.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Raised at registration time, before any message is parsed.
    #[error("Cannot register event handler for event type {type_name}; no detail-type string declared")]
    InvalidRegistration { type_name: &'static str },

    #[error("Failed to read message stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse message as JSON: {details}")]
    MalformedMessage { details: String },

    #[error("Received message is not a CloudWatch event (missing \"{field}\" property)")]
    MissingHeaderField { field: &'static str },

    #[error("Received event of unknown type; detail-type field in message: {detail_type}")]
    UnregisteredEventType { detail_type: String },

    #[error("Failed to decode event {what}: {source}")]
    EventDecode {
        what: &'static str,
        source: serde_json::Error,
    },

    /// Handler failures pass through untranslated.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl FixSuggestion for DispatchError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            DispatchError::InvalidRegistration { .. } => {
                Some("Declare a non-empty DETAIL_TYPE on the event shape")
            }
            DispatchError::Io(_) => Some("Check the host delivered a readable message body"),
            DispatchError::MalformedMessage { .. } | DispatchError::MissingHeaderField { .. } => {
                Some("Check the function trigger - it may be wired to a non-CloudWatch event source")
            }
            DispatchError::UnregisteredEventType { .. } => {
                Some("Register a handler for this detail-type, or remove the rule routing it here")
            }
            DispatchError::EventDecode { .. } => {
                Some("Enable raw-message logging to inspect the offending payload")
            }
            DispatchError::Handler(_) => None,
        }
    }
}
