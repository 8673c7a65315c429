//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::FarmNotFound | Self::SlaughterhouseNotFound => {
                StatusCode::NOT_FOUND
            }

            // 503: the dataset directory may appear later, clients can retry
            Self::DatasetUnavailable | Self::NetworkError | Self::ChannelClosed => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            Self::Unknown | Self::DatasetMalformed | Self::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            Self::InvalidRequest
            | Self::EventMalformed
            | Self::EventMissingType => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::FarmNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DatasetUnavailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::EventMalformed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
