//! Error types for nostrcal.

use thiserror::Error;

/// Errors that can occur talking to relays or loading configuration.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Relay provider '{0}' not found in PATH")]
    RelayNotInstalled(String),

    #[error("Relay error: {0}")]
    Relay(String),

    #[error("Relay request timed out after {0}s")]
    QueryTimeout(u64),

    #[error("Relay request cancelled")]
    Cancelled,

    #[error("Relay rejected event: {0}")]
    PublishRejected(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid draft: {0}")]
    Draft(#[from] DraftError),
}

/// Why a raw event was rejected by its kind's schema.
///
/// Never surfaced by the query paths: an event failing validation is dropped
/// as if the relay had not returned it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unexpected kind {0}")]
    WrongKind(u16),

    #[error("missing '{0}' tag")]
    MissingTag(&'static str),

    #[error("malformed date '{0}'")]
    MalformedDate(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("end is not after start")]
    EndNotAfterStart,

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("unknown RSVP status '{0}'")]
    UnknownStatus(String),

    #[error("unknown free/busy value '{0}'")]
    UnknownFreeBusy(String),

    #[error("free/busy present on a declined RSVP")]
    FreeBusyOnDeclined,

    #[error("invalid event coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// Authoring preconditions that failed before a wire event was built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("date '{0}' must be formatted YYYY-MM-DD")]
    MalformedDate(String),

    #[error("timestamp {0} must be positive")]
    NonPositiveTimestamp(i64),

    #[error("end must be after start")]
    EndNotAfterStart,

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("a declined RSVP cannot carry a free/busy value")]
    FreeBusyOnDeclined,

    #[error("invalid event coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// Result type alias for nostrcal operations.
pub type CalResult<T> = Result<T, CalendarError>;
