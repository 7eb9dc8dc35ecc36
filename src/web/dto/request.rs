//! Request DTOs for Web API.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::checkin::{DiningCheckIn, GamingCheckIn};
use crate::db::{DiningPatronUpdate, GamingPatronUpdate, NewDiningPatron};

/// Manager login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password, or the plaintext reset password while a reset is pending.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password update request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// The new password.
    #[validate(length(min = 1, max = 128, message = "New password must be 1-128 characters"))]
    pub new_password: String,
}

/// Gaming check-in request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GamingCheckInRequest {
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 20, message = "Phone number must be 1-20 characters"))]
    pub phone_number: String,
}

impl From<GamingCheckInRequest> for GamingCheckIn {
    fn from(req: GamingCheckInRequest) -> Self {
        GamingCheckIn {
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
        }
    }
}

/// One member of a dining group.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningPatronRequest {
    pub first_name: String,
    pub phone_number: String,
}

/// Dining check-in request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiningCheckInRequest {
    /// Table number the group is sitting at.
    #[validate(length(min = 1, max = 16, message = "Table number must be 1-16 characters"))]
    pub table_number: String,
    /// Everyone in the group.
    #[validate(length(min = 1, message = "At least one patron is required"))]
    pub people: Vec<DiningPatronRequest>,
}

impl From<DiningCheckInRequest> for DiningCheckIn {
    fn from(req: DiningCheckInRequest) -> Self {
        DiningCheckIn {
            table_number: req.table_number,
            people: req
                .people
                .into_iter()
                .map(|p| NewDiningPatron {
                    first_name: p.first_name,
                    phone_number: p.phone_number,
                })
                .collect(),
        }
    }
}

/// Move a group or a whole table to another table number.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveTableRequest {
    #[validate(length(min = 1, max = 16, message = "Table number must be 1-16 characters"))]
    pub new_table_number: String,
}

/// Partial update of a dining patron.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiningPatronRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "Phone number must be 1-20 characters"))]
    pub phone_number: Option<String>,
}

impl From<UpdateDiningPatronRequest> for DiningPatronUpdate {
    fn from(req: UpdateDiningPatronRequest) -> Self {
        DiningPatronUpdate {
            first_name: req.first_name,
            phone_number: req.phone_number,
        }
    }
}

/// Partial update of a gaming patron.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGamingPatronRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "First name must be 1-64 characters"))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Last name must be 1-64 characters"))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "Phone number must be 1-20 characters"))]
    pub phone_number: Option<String>,
}

impl From<UpdateGamingPatronRequest> for GamingPatronUpdate {
    fn from(req: UpdateGamingPatronRequest) -> Self {
        GamingPatronUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
        }
    }
}
