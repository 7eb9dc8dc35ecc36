//! Error types for Doorlist.

use thiserror::Error;

/// Common error type for Doorlist.
///
/// Every variant except the transport ones (`Database`, `Io`, `Config`) maps to
/// a stable, caller-visible error code. Transport failures all report
/// `E_UNKNOWN_INTERNAL`.
#[derive(Error, Debug)]
pub enum DoorlistError {
    /// A required argument was missing or empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Venue not found.
    #[error("venue not found")]
    VenueNotFound,

    /// Area not found in the venue.
    #[error("area not found")]
    AreaNotFound,

    /// Service not found.
    #[error("service not found")]
    ServiceNotFound,

    /// Table (sitting) not found in the service.
    #[error("table not found")]
    TableNotFound,

    /// Check-in not found at the table.
    #[error("check-in not found")]
    CheckInNotFound,

    /// Patron not found.
    #[error("patron not found")]
    PatronNotFound,

    /// Manager not found.
    #[error("manager not found")]
    ManagerNotFound,

    /// The manager has no relationship with the target venue or service.
    #[error("no access to this resource")]
    NoAccess,

    /// The session's access level does not allow this action.
    #[error("password must be updated before this action")]
    PasswordResetRequired,

    /// The area already has an active service.
    #[error("area already has an active service")]
    AreaHasActiveService,

    /// The area has no active service to stop.
    #[error("area has no active service")]
    AreaHasNoActiveService,

    /// The area is closed to check-ins.
    #[error("area is closed")]
    AreaIsClosed,

    /// The target service has already been closed.
    #[error("service is not active")]
    ServiceIsNotActive,

    /// Username or password did not match.
    #[error("bad login")]
    BadLogin,

    /// The session exists but has been invalidated.
    #[error("session expired")]
    SessionExpired,

    /// No session token, or the token is unknown.
    #[error("not authenticated")]
    Unauthenticated,

    /// Database error.
    ///
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DoorlistError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            DoorlistError::InvalidInput(_) => "E_INVALID_INPUT",
            DoorlistError::VenueNotFound => "E_VENUE_NOT_FOUND",
            DoorlistError::AreaNotFound => "E_AREA_NOT_FOUND",
            DoorlistError::ServiceNotFound => "E_SERVICE_NOT_FOUND",
            DoorlistError::TableNotFound => "E_TABLE_NOT_FOUND",
            DoorlistError::CheckInNotFound => "E_CHECK_IN_NOT_FOUND",
            DoorlistError::PatronNotFound => "E_PATRON_NOT_FOUND",
            DoorlistError::ManagerNotFound => "E_MANAGER_NOT_FOUND",
            DoorlistError::NoAccess => "E_NO_ACCESS",
            DoorlistError::PasswordResetRequired => "E_PASSWORD_RESET_REQUIRED",
            DoorlistError::AreaHasActiveService => "E_AREA_HAS_ACTIVE_SERVICE",
            DoorlistError::AreaHasNoActiveService => "E_AREA_HAS_NO_ACTIVE_SERVICE",
            DoorlistError::AreaIsClosed => "E_AREA_IS_CLOSED",
            DoorlistError::ServiceIsNotActive => "E_SERVICE_IS_NOT_ACTIVE",
            DoorlistError::BadLogin => "E_BAD_LOGIN",
            DoorlistError::SessionExpired => "E_SESSION_EXPIRED",
            DoorlistError::Unauthenticated => "E_UNAUTHENTICATED",
            DoorlistError::Database(_) | DoorlistError::Io(_) | DoorlistError::Config(_) => {
                "E_UNKNOWN_INTERNAL"
            }
        }
    }

    /// Shorthand for an `InvalidInput` naming the missing argument.
    pub(crate) fn missing(field: &str) -> Self {
        DoorlistError::InvalidInput(format!("{field} is required"))
    }
}

// Conversion from sqlx errors
impl From<sqlx::Error> for DoorlistError {
    fn from(e: sqlx::Error) -> Self {
        DoorlistError::Database(e.to_string())
    }
}

/// Result type alias for Doorlist operations.
pub type Result<T> = std::result::Result<T, DoorlistError>;

/// Fail with `InvalidInput` when a required string argument is empty.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DoorlistError::missing(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(DoorlistError::VenueNotFound.to_string(), "venue not found");
        assert_eq!(DoorlistError::PatronNotFound.to_string(), "patron not found");
    }

    #[test]
    fn test_invalid_input_display() {
        let err = DoorlistError::missing("username");
        assert_eq!(err.to_string(), "invalid input: username is required");
        assert_eq!(err.code(), "E_INVALID_INPUT");
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(DoorlistError::VenueNotFound.code(), "E_VENUE_NOT_FOUND");
        assert_eq!(
            DoorlistError::AreaHasActiveService.code(),
            "E_AREA_HAS_ACTIVE_SERVICE"
        );
        assert_eq!(DoorlistError::NoAccess.code(), "E_NO_ACCESS");
        assert_eq!(DoorlistError::BadLogin.code(), "E_BAD_LOGIN");
    }

    #[test]
    fn test_transport_errors_collapse_to_internal() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DoorlistError = io_err.into();
        assert!(matches!(err, DoorlistError::Io(_)));
        assert_eq!(err.code(), "E_UNKNOWN_INTERNAL");
        assert_eq!(
            DoorlistError::Database("locked".into()).code(),
            "E_UNKNOWN_INTERNAL"
        );
        assert_eq!(
            DoorlistError::Config("bad".into()).code(),
            "E_UNKNOWN_INTERNAL"
        );
    }

    #[test]
    fn test_require() {
        assert!(require("venue_id", "v1").is_ok());
        assert!(matches!(
            require("venue_id", ""),
            Err(DoorlistError::InvalidInput(_))
        ));
        assert!(matches!(
            require("venue_id", "   "),
            Err(DoorlistError::InvalidInput(_))
        ));
    }
}
