//! Session token generation and issuance.

use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;
use tracing::warn;
use uuid::Uuid;

use crate::db::{AccessLevel, Session, Store};
use crate::Result;

/// Number of random bytes in a session token.
pub const SESSION_TOKEN_BYTES: usize = 128;

/// Generate an opaque session token: 128 random bytes, hex-encoded.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

type TokenGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// Issues sessions with store-unique tokens.
///
/// Each attempt is a single insert-if-absent at the store; on a collision a
/// new token is generated and the insert retried.
pub struct SessionIssuer {
    store: Arc<dyn Store>,
    generate: TokenGenerator,
}

impl SessionIssuer {
    /// Create an issuer using [`generate_session_id`].
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            generate: Box::new(generate_session_id),
        }
    }

    #[cfg(test)]
    fn with_generator(store: Arc<dyn Store>, generate: TokenGenerator) -> Self {
        Self { store, generate }
    }

    /// Persist a new active session for a manager and return it.
    pub async fn issue(
        &self,
        manager_id: &str,
        ip_address: &str,
        access_level: AccessLevel,
    ) -> Result<Session> {
        loop {
            let session = Session {
                id: Uuid::new_v4().to_string(),
                session_id: (self.generate)(),
                manager_id: manager_id.to_string(),
                ip_address: ip_address.to_string(),
                created_at: Utc::now(),
                access_level,
                is_active: true,
            };

            if self.store.insert_session_if_absent(&session).await? {
                return Ok(session);
            }
            warn!(manager_id, "Session token collision, regenerating");
        }
    }
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer").finish()
    }
}
