//! Anonymous patron check-in.

mod service;

pub use service::{
    CheckInService, DiningCheckIn, DiningCheckInReceipt, GamingCheckIn, MAX_NAME_LENGTH,
    MAX_PHONE_LENGTH, MAX_TABLE_NUMBER_LENGTH,
};
