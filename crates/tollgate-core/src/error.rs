use thiserror::Error;

/// Every variant is a caller input error. Generation either returns a
/// complete signed token or one of these; no partial token is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("You must provide a secret in order to generate a new token.")]
    MissingSecret,

    #[error("key must be an even-length hexadecimal string")]
    InvalidKey,

    #[error("Unknown Algorithm")]
    UnknownAlgorithm,

    #[error("You must provide a token name.")]
    MissingTokenName,

    #[error("You must provide an expiration time or a duration window ( > 0 )")]
    MissingExpiry,

    #[error("startTime must be ( > 0 )")]
    InvalidStartTime,

    #[error("endTime must be ( > 0 )")]
    InvalidEndTime,

    #[error("Token will have already expired.")]
    AlreadyExpired,

    #[error("You must provide a URL or an ACL.")]
    EmptyResource,
}
