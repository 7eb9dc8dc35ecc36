//! Doorlist - venue check-in service
//!
//! Patrons check in to dining and gaming areas of a venue; managers log in,
//! run services in those areas and manage the tables and patrons inside them.

pub mod auth;
pub mod checkin;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, rehash_password, verify_password, AccessPolicy, AuthenticationGate,
    LoginResult, ManagerAuthService, ManagerProfile, PasswordError, Principal, SessionIssuer,
};
pub use checkin::{CheckInService, DiningCheckIn, DiningCheckInReceipt, GamingCheckIn};
pub use config::Config;
pub use db::{Database, SqliteStore, Store};
pub use error::{DoorlistError, Result};
pub use lifecycle::ServiceLifecycleService;
pub use web::WebServer;
