//! Web API handlers.

pub mod checkin;
pub mod manager;
pub mod service;

pub use manager::AppState;
