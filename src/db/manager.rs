//! Manager model.

/// Manager entity.
///
/// While `is_password_reset` is set, `password_hash` holds the one-time
/// plaintext reset password issued by provisioning and `salt` is empty.
#[derive(Debug, Clone)]
pub struct Manager {
    /// Manager ID.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Login username (unique).
    pub username: String,
    /// Salted PBKDF2 hash (base64), or the reset password while flagged.
    pub password_hash: String,
    /// Salt (base64).
    pub salt: String,
    /// Whether the manager must rotate their password before doing anything else.
    pub is_password_reset: bool,
    /// Venues this manager may operate.
    pub venue_ids: Vec<String>,
}

impl Manager {
    /// Display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check whether the manager is attached to a venue.
    pub fn has_venue(&self, venue_id: &str) -> bool {
        self.venue_ids.iter().any(|v| v == venue_id)
    }
}

/// New manager for provisioning.
#[derive(Debug, Clone)]
pub struct NewManager {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Login username.
    pub username: String,
    /// Password hash, or plaintext reset password when `is_password_reset`.
    pub password_hash: String,
    /// Salt (empty for reset passwords).
    pub salt: String,
    /// Force a password rotation on first login.
    pub is_password_reset: bool,
}

impl NewManager {
    /// Create a manager that logs in with a one-time reset password.
    pub fn with_reset_password(
        username: impl Into<String>,
        reset_password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            username: username.into(),
            password_hash: reset_password.into(),
            salt: String::new(),
            is_password_reset: true,
        }
    }

    /// Create a manager with an already hashed password.
    pub fn with_hash(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        salt: impl Into<String>,
    ) -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            username: username.into(),
            password_hash: password_hash.into(),
            salt: salt.into(),
            is_password_reset: false,
        }
    }

    /// Set the manager's name.
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    /// Set the manager's email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_venue() {
        let manager = Manager {
            id: "m1".into(),
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            email: "ada@example.com".into(),
            username: "ada".into(),
            password_hash: "hash".into(),
            salt: "salt".into(),
            is_password_reset: false,
            venue_ids: vec!["v1".into()],
        };
        assert!(manager.has_venue("v1"));
        assert!(!manager.has_venue("v2"));
        assert_eq!(manager.full_name(), "Ada Byron");
    }

    #[test]
    fn test_new_manager_builders() {
        let reset = NewManager::with_reset_password("ada", "temp-pass");
        assert!(reset.is_password_reset);
        assert!(reset.salt.is_empty());

        let hashed = NewManager::with_hash("bob", "h", "s").with_name("Bob", "Lee");
        assert!(!hashed.is_password_reset);
        assert_eq!(hashed.first_name, "Bob");
    }
}
