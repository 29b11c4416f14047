//! Presentation states for callers that render API results.
//!
//! # Design
//! Screens show one of idle, loading, loaded or failed. `ErrorNotice`
//! turns an `ApiError` into the messages a user sees plus the follow-up the
//! screen should offer: retry for transient failures, a trip to the login
//! flow for authentication problems.

use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(ErrorNotice),
}

impl<T> LoadState<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => LoadState::Loaded(value),
            Err(e) => LoadState::Failed(ErrorNotice::from_error(&e)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// What the screen should offer next to an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeAction {
    Retry,
    Login,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub messages: Vec<String>,
    pub action: NoticeAction,
}

impl ErrorNotice {
    fn new(message: &str, action: NoticeAction) -> Self {
        Self {
            messages: vec![message.to_string()],
            action,
        }
    }

    pub fn from_error(error: &ApiError) -> Self {
        match error {
            ApiError::Network(_) => Self::new(
                "Network error. Please check your connection.",
                NoticeAction::Retry,
            ),
            ApiError::Http { status: 400, message } => Self {
                messages: validation_messages(message),
                action: NoticeAction::None,
            },
            ApiError::Http { status: 401, .. } => {
                Self::new("Invalid credentials", NoticeAction::Login)
            }
            ApiError::Http { status: 404, .. } => {
                Self::new("The requested item was not found.", NoticeAction::None)
            }
            ApiError::Http { status, .. } if *status >= 500 => {
                Self::new("Server error. Please try again later.", NoticeAction::Retry)
            }
            ApiError::Http { .. } => Self::new(
                "An unexpected error occurred. Please try again.",
                NoticeAction::Retry,
            ),
            ApiError::Auth(message) => Self::new(message, NoticeAction::Login),
            ApiError::Unknown(_) => Self::new(
                "An unknown error occurred. Please try again.",
                NoticeAction::Retry,
            ),
        }
    }

    pub fn first(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or_default()
    }
}

/// Pull `{"errors":[{"msg":..}]}` or `{"error":..}` out of a 400 response.
/// The `Http` message is `"<reason> - <body>"`.
fn validation_messages(message: &str) -> Vec<String> {
    let body = message.split_once(" - ").map_or(message, |(_, body)| body);
    let parsed = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        if let Some(errors) = v.get("errors").and_then(Value::as_array) {
            let msgs: Vec<String> = errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            (!msgs.is_empty()).then_some(msgs)
        } else {
            v.get("error")
                .and_then(Value::as_str)
                .map(|e| vec![e.to_string()])
        }
    });
    parsed.unwrap_or_else(|| vec!["Invalid input. Please check your details.".to_string()])
}
