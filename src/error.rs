//! Error types
//!
//! Faults raised by asset lookups. The dispatcher catches every one of them,
//! so nothing here ever reaches the client as an unhandled failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid asset request: {message}")]
    InvalidRequest { message: String },

    #[error("Asset store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Failed to build response: {0}")]
    Http(#[from] hyper::http::Error),
}

impl AssetError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;
