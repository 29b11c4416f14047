//! Error taxonomy for the car spa API client.
//!
//! # Design
//! Every failure coming out of the transport or the JSON codec is converted
//! into exactly one of four kinds before it reaches the caller. `Auth` is
//! produced locally when an authenticated operation runs without a session
//! token; a server-side rejection of an attached token is an `Http` error
//! with status 401 instead.

/// Message used when an authenticated operation runs without a token.
pub const NO_TOKEN_MESSAGE: &str = "No auth token available. Please log in.";

/// Errors returned by every `ApiRepository` operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connect failure, timeout, broken body).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No session token is available for an authenticated operation.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Malformed response, serialization failure or any other fault.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ApiError {
    pub fn missing_token() -> Self {
        ApiError::Auth(NO_TOKEN_MESSAGE.to_string())
    }

    /// Status code of an `Http` error, `None` for every other kind.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short name of the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "network",
            ApiError::Http { .. } => "http",
            ApiError::Auth(_) => "auth",
            ApiError::Unknown(_) => "unknown",
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Unknown(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_follows_kind_prefixes() {
        assert_eq!(
            ApiError::Network("connection refused".into()).to_string(),
            "Network error: connection refused"
        );
        let http = ApiError::Http {
            status: 404,
            message: "Not Found - No error body".into(),
        };
        assert_eq!(http.to_string(), "HTTP 404: Not Found - No error body");
        assert_eq!(
            ApiError::missing_token().to_string(),
            "Authentication error: No auth token available. Please log in."
        );
    }

    #[test]
    fn status_only_for_http() {
        let http = ApiError::Http {
            status: 500,
            message: String::new(),
        };
        assert_eq!(http.status(), Some(500));
        assert_eq!(ApiError::missing_token().status(), None);
        assert_eq!(ApiError::Network("x".into()).status(), None);
    }

    #[test]
    fn json_errors_become_unknown() {
        let err: ApiError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), "unknown");
    }
}
