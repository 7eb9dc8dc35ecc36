//! Web API module for Doorlist.
//!
//! This module provides the REST surface: manager account routes, service
//! lifecycle routes gated by bearer sessions, and anonymous check-in routes.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
