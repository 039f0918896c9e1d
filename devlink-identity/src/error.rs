/// Errors produced while reading or writing the client identifier.
///
/// Every variant is a persistence failure: it only occurs once an identity
/// store is registered, and is never masked by falling back to an
/// ephemeral identifier.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity store: {0}")]
    Store(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

/// A platform metadata source could not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("not a string: {0}")]
    NotAString(String),
}
