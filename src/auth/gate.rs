//! Authentication gate: resolves a bearer token to a manager principal.

use std::sync::Arc;

use tracing::debug;

use crate::db::{AccessLevel, Store};
use crate::{DoorlistError, Result};

/// Route-level access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Requires a FULL session.
    Full,
    /// Accepts FULL or RESET sessions (password rotation).
    Authenticated,
}

/// An authenticated manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Manager ID.
    pub manager_id: String,
    /// Token the request was authenticated with.
    pub session_id: String,
    /// Access level of the session.
    pub access_level: AccessLevel,
}

impl Principal {
    /// Check the session's access level against a route policy.
    pub fn authorize(&self, policy: AccessPolicy) -> Result<()> {
        match (policy, self.access_level) {
            (AccessPolicy::Full, AccessLevel::Reset) => Err(DoorlistError::PasswordResetRequired),
            _ => Ok(()),
        }
    }
}

/// Resolves session tokens on every authenticated request.
#[derive(Clone)]
pub struct AuthenticationGate {
    store: Arc<dyn Store>,
}

impl AuthenticationGate {
    /// Create a gate over a store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Resolve a token to a principal.
    ///
    /// A missing or unknown token is `Unauthenticated`; a deactivated
    /// session is `SessionExpired`.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(DoorlistError::Unauthenticated),
        };

        let session = self
            .store
            .get_session(token)
            .await?
            .ok_or(DoorlistError::Unauthenticated)?;

        if !session.is_active {
            debug!(manager_id = %session.manager_id, "Rejected inactive session");
            return Err(DoorlistError::SessionExpired);
        }

        Ok(Principal {
            manager_id: session.manager_id,
            session_id: session.session_id,
            access_level: session.access_level,
        })
    }

    /// Authenticate and apply a route policy in one step.
    pub async fn require(&self, token: Option<&str>, policy: AccessPolicy) -> Result<Principal> {
        let principal = self.authenticate(token).await?;
        principal.authorize(policy)?;
        Ok(principal)
    }
}

impl std::fmt::Debug for AuthenticationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationGate").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionIssuer;
    use crate::db::{NewManager, SqliteStore};

    async fn setup() -> (Arc<SqliteStore>, String) {
        let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
        let manager = store
            .managers()
            .create(&NewManager::with_reset_password("ada", "temp"))
            .await
            .unwrap();
        (store, manager.id)
    }

    #[tokio::test]
    async fn test_missing_and_unknown_token() {
        let (store, _) = setup().await;
        let gate = AuthenticationGate::new(store);

        assert!(matches!(
            gate.authenticate(None).await,
            Err(DoorlistError::Unauthenticated)
        ));
        assert!(matches!(
            gate.authenticate(Some("")).await,
            Err(DoorlistError::Unauthenticated)
        ));
        assert!(matches!(
            gate.authenticate(Some("nope")).await,
            Err(DoorlistError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_active_and_expired_session() {
        let (store, manager_id) = setup().await;
        let issuer = SessionIssuer::new(store.clone());
        let session = issuer
            .issue(&manager_id, "127.0.0.1", AccessLevel::Full)
            .await
            .unwrap();
        let gate = AuthenticationGate::new(store.clone());

        let principal = gate.authenticate(Some(&session.session_id)).await.unwrap();
        assert_eq!(principal.manager_id, manager_id);
        assert_eq!(principal.access_level, AccessLevel::Full);

        store.deactivate_session(&session.session_id).await.unwrap();
        assert!(matches!(
            gate.authenticate(Some(&session.session_id)).await,
            Err(DoorlistError::SessionExpired)
        ));
    }

    #[tokio::test]
    async fn test_reset_session_policy() {
        let (store, manager_id) = setup().await;
        let session = SessionIssuer::new(store.clone())
            .issue(&manager_id, "127.0.0.1", AccessLevel::Reset)
            .await
            .unwrap();
        let gate = AuthenticationGate::new(store);
        let token = Some(session.session_id.as_str());

        assert!(gate.require(token, AccessPolicy::Authenticated).await.is_ok());
        assert!(matches!(
            gate.require(token, AccessPolicy::Full).await,
            Err(DoorlistError::PasswordResetRequired)
        ));
    }

    #[test]
    fn test_full_principal_passes_every_policy() {
        let principal = Principal {
            manager_id: "m".into(),
            session_id: "t".into(),
            access_level: AccessLevel::Full,
        };
        assert!(principal.authorize(AccessPolicy::Full).is_ok());
        assert!(principal.authorize(AccessPolicy::Authenticated).is_ok());
    }
}
