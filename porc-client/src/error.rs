//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error envelope
    #[error("API error {}: {}", .0.code, .0.message)]
    Api(#[from] AppError),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Could not establish the live connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// WebSocket protocol failure on an open connection
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// Live channel is closed
    #[error("Channel closed")]
    ChannelClosed,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Api(err) => err.code,
            Self::Http(_) | Self::Connection(_) | Self::WebSocket(_) => ErrorCode::NetworkError,
            Self::ChannelClosed => ErrorCode::ChannelClosed,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCode::InvalidRequest,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
