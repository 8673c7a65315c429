//! Unified error codes for the porc workspace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Dataset errors
//! - 2xxx: Live protocol errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the map frontend and the Rust client
/// agree on a single numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Dataset ====================
    /// Static dataset could not be read
    DatasetUnavailable = 1001,
    /// Static dataset file is not valid JSON for its record type
    DatasetMalformed = 1002,
    /// Farm not found in the static dataset
    FarmNotFound = 1003,
    /// Slaughterhouse not found in the static dataset
    SlaughterhouseNotFound = 1004,

    // ==================== 2xxx: Live protocol ====================
    /// Event payload is not valid JSON
    EventMalformed = 2001,
    /// Event payload has no `type` tag
    EventMissingType = 2002,
    /// Live channel closed
    ChannelClosed = 2003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Network error
    NetworkError = 9003,
}

impl ErrorCode {
    /// Numeric value of the code
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code represents success
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",

            Self::DatasetUnavailable => "Static dataset unavailable",
            Self::DatasetMalformed => "Static dataset is malformed",
            Self::FarmNotFound => "Farm not found",
            Self::SlaughterhouseNotFound => "Slaughterhouse not found",

            Self::EventMalformed => "Event payload is malformed",
            Self::EventMissingType => "Event payload has no type",
            Self::ChannelClosed => "Live channel closed",

            Self::InternalError => "Internal server error",
            Self::NetworkError => "Network error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Returned when a u16 does not name a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            3 => Ok(Self::NotFound),
            5 => Ok(Self::InvalidRequest),

            1001 => Ok(Self::DatasetUnavailable),
            1002 => Ok(Self::DatasetMalformed),
            1003 => Ok(Self::FarmNotFound),
            1004 => Ok(Self::SlaughterhouseNotFound),

            2001 => Ok(Self::EventMalformed),
            2002 => Ok(Self::EventMissingType),
            2003 => Ok(Self::ChannelClosed),

            9001 => Ok(Self::InternalError),
            9003 => Ok(Self::NetworkError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1003), Ok(ErrorCode::FarmNotFound));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::EventMalformed).unwrap();
        assert_eq!(json, "2001");
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCode::EventMalformed);
    }

    #[test]
    fn test_deserialize_invalid() {
        assert!(serde_json::from_str::<ErrorCode>("7777").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::ChannelClosed.to_string(), "E2003");
    }
}
