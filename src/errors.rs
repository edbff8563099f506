use axum::http::StatusCode;
use std::fmt;

/// Rejected store input. The store is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    EmptyName,
    MoodOutOfRange(u8),
    UnknownCategory(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::EmptyName => f.write_str("habit name must not be empty"),
            StoreError::MoodOutOfRange(value) => {
                write!(f, "mood must be between 1 and 5, got {value}")
            }
            StoreError::UnknownCategory(name) => write!(f, "unknown category '{name}'"),
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }

    /// A write to disk failed after the session had already changed.
    pub fn unsaved(err: AppError) -> Self {
        Self {
            status: err.status,
            message: format!(
                "change kept in this session but not written to disk: {}",
                err.message
            ),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        Self::bad_request(format!("date must be YYYY-MM-DD: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
