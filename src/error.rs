use thiserror::Error;

use crate::form::FieldErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with `success: false` or a non-JSON error page.
    #[error("{0}")]
    Server(String),

    #[error("unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} not found")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("no form is open")]
    NotOpen,

    #[error("a request for this form is already in flight")]
    InFlight,

    #[error("validation failed: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}
