//! Request extractors and layers for the Web API.

pub mod auth;
pub mod client_ip;
pub mod cors;

pub use auth::{bearer_token, AuthManager, FullManager};
pub use client_ip::ClientIp;
pub use cors::create_cors_layer;
