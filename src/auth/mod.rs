//! Authentication module for Doorlist.
//!
//! This module provides password hashing, session issuance, the
//! authentication gate run on every manager request, and the manager
//! login/authorization service.

mod gate;
mod manager;
mod password;
mod session;

pub use gate::{AccessPolicy, AuthenticationGate, Principal};
pub use manager::{LoginResult, ManagerAuthService, ManagerProfile};
pub use password::{
    hash_password, rehash_password, verify_password, HashedPassword, PasswordError, HASH_LENGTH,
    PBKDF2_ITERATIONS, SALT_LENGTH,
};
pub use session::{generate_session_id, SessionIssuer, SESSION_TOKEN_BYTES};
