//! API error handling for the Doorlist HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::DoorlistError;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    /// Missing or malformed input (400).
    #[serde(rename = "E_INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "E_VENUE_NOT_FOUND")]
    VenueNotFound,
    #[serde(rename = "E_AREA_NOT_FOUND")]
    AreaNotFound,
    #[serde(rename = "E_SERVICE_NOT_FOUND")]
    ServiceNotFound,
    #[serde(rename = "E_TABLE_NOT_FOUND")]
    TableNotFound,
    #[serde(rename = "E_CHECK_IN_NOT_FOUND")]
    CheckInNotFound,
    #[serde(rename = "E_PATRON_NOT_FOUND")]
    PatronNotFound,
    #[serde(rename = "E_MANAGER_NOT_FOUND")]
    ManagerNotFound,
    /// Authenticated, but not for this venue or service (403).
    #[serde(rename = "E_NO_ACCESS")]
    NoAccess,
    /// RESET session on a route that needs FULL access (403).
    #[serde(rename = "E_PASSWORD_RESET_REQUIRED")]
    PasswordResetRequired,
    #[serde(rename = "E_AREA_HAS_ACTIVE_SERVICE")]
    AreaHasActiveService,
    #[serde(rename = "E_AREA_HAS_NO_ACTIVE_SERVICE")]
    AreaHasNoActiveService,
    #[serde(rename = "E_AREA_IS_CLOSED")]
    AreaIsClosed,
    #[serde(rename = "E_SERVICE_IS_NOT_ACTIVE")]
    ServiceIsNotActive,
    #[serde(rename = "E_BAD_LOGIN")]
    BadLogin,
    #[serde(rename = "E_SESSION_EXPIRED")]
    SessionExpired,
    #[serde(rename = "E_UNAUTHENTICATED")]
    Unauthenticated,
    /// Anything unanticipated (500).
    #[serde(rename = "E_UNKNOWN_INTERNAL")]
    UnknownInternal,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::VenueNotFound
            | ErrorCode::AreaNotFound
            | ErrorCode::ServiceNotFound
            | ErrorCode::TableNotFound
            | ErrorCode::CheckInNotFound
            | ErrorCode::PatronNotFound
            | ErrorCode::ManagerNotFound => StatusCode::NOT_FOUND,
            ErrorCode::NoAccess | ErrorCode::PasswordResetRequired => StatusCode::FORBIDDEN,
            ErrorCode::AreaHasActiveService
            | ErrorCode::AreaHasNoActiveService
            | ErrorCode::AreaIsClosed
            | ErrorCode::ServiceIsNotActive => StatusCode::CONFLICT,
            ErrorCode::BadLogin | ErrorCode::SessionExpired | ErrorCode::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            ErrorCode::UnknownInternal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation messages, present only for rejected request bodies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// The error's code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create the generic internal error; never carries internal detail.
    pub fn internal() -> Self {
        Self::new(ErrorCode::UnknownInternal, "An internal error occurred")
    }

    /// Create an invalid input error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut details: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            details.insert(field.to_string(), messages);
        }

        Self {
            code: ErrorCode::InvalidInput,
            message: "Validation failed".to_string(),
            details: Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<DoorlistError> for ApiError {
    fn from(err: DoorlistError) -> Self {
        let code = match &err {
            DoorlistError::InvalidInput(_) => ErrorCode::InvalidInput,
            DoorlistError::VenueNotFound => ErrorCode::VenueNotFound,
            DoorlistError::AreaNotFound => ErrorCode::AreaNotFound,
            DoorlistError::ServiceNotFound => ErrorCode::ServiceNotFound,
            DoorlistError::TableNotFound => ErrorCode::TableNotFound,
            DoorlistError::CheckInNotFound => ErrorCode::CheckInNotFound,
            DoorlistError::PatronNotFound => ErrorCode::PatronNotFound,
            DoorlistError::ManagerNotFound => ErrorCode::ManagerNotFound,
            DoorlistError::NoAccess => ErrorCode::NoAccess,
            DoorlistError::PasswordResetRequired => ErrorCode::PasswordResetRequired,
            DoorlistError::AreaHasActiveService => ErrorCode::AreaHasActiveService,
            DoorlistError::AreaHasNoActiveService => ErrorCode::AreaHasNoActiveService,
            DoorlistError::AreaIsClosed => ErrorCode::AreaIsClosed,
            DoorlistError::ServiceIsNotActive => ErrorCode::ServiceIsNotActive,
            DoorlistError::BadLogin => ErrorCode::BadLogin,
            DoorlistError::SessionExpired => ErrorCode::SessionExpired,
            DoorlistError::Unauthenticated => ErrorCode::Unauthenticated,
            DoorlistError::Database(_) | DoorlistError::Io(_) | DoorlistError::Config(_) => {
                tracing::error!(error = %err, "Internal error");
                return ApiError::internal();
            }
        };
        ApiError::new(code, err.to_string())
    }
}
