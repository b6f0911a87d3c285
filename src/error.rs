//! Error types

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by shell operations.
///
/// Navigation and frame-protocol problems are logged and degrade instead of
/// returning these; only hard failures reach the caller.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("no frame with id {0}")]
    UnknownFrame(String),

    #[error("no modal is open")]
    NoModal,

    #[error("unrecognized frame event {0}")]
    Protocol(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Auth/IDP failure in the `{message, name}` shape hosts expect.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct AuthError {
    pub message: String,
    pub name: String,
}

impl AuthError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { message: message.into(), name: name.into() }
    }

    pub fn provider_not_found() -> Self {
        Self::new("IdpProviderException", "IDP Provider not found")
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
