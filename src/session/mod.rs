//! Durable session state: the access token and user identity that authorize
//! every gateway call.
//!
//! The session lives under two fixed keys in a key/value store. Nothing here
//! checks expiry; a stored token is trusted until a remote call fails.

pub mod storage;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};

/// Storage key holding the raw access token
pub const TOKEN_KEY: &str = "supabase.auth.token";
/// Storage key holding the serialized user object
pub const USER_KEY: &str = "supabase.auth.user";

/// Authenticated user as returned by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Value>,
}

/// Token + user pair authorizing gateway calls
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user: SessionUser,
}

impl Session {
    /// Build a session from an auth response carrying `access_token` and `user`
    pub fn from_auth_response(body: &Value) -> Option<Self> {
        let access_token = body.get("access_token")?.as_str()?.to_string();
        let user = serde_json::from_value(body.get("user")?.clone()).ok()?;
        Some(Self { access_token, user })
    }
}

/// Reads and writes the session entries in durable storage
#[derive(Clone)]
pub struct SessionHolder {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionHolder {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Writes both entries; a failed user write removes the token again so
    /// the store never holds a token without its user.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(&session.user).map_err(StorageError::Encode)?;
        self.storage.set(TOKEN_KEY, &session.access_token)?;

        if let Err(e) = self.storage.set(USER_KEY, &user) {
            if let Err(cleanup) = self.storage.remove(TOKEN_KEY) {
                warn!(error = %cleanup, "Failed to roll back token after user write failed");
            }
            return Err(e);
        }

        debug!(user_id = %session.user.id, "Session saved");
        Ok(())
    }

    /// Returns the stored session, or `None` if either entry is missing.
    ///
    /// A user entry that no longer parses is treated as absent.
    pub fn read(&self) -> Result<Option<Session>, StorageError> {
        let token = match self.storage.get(TOKEN_KEY)? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };
        let Some(raw_user) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<SessionUser>(&raw_user) {
            Ok(user) => Ok(Some(Session {
                access_token: token,
                user,
            })),
            Err(e) => {
                warn!(error = %e, "Stored user entry is malformed");
                Ok(None)
            }
        }
    }

    /// Whether a token entry exists, regardless of the user entry
    pub fn has_token(&self) -> Result<bool, StorageError> {
        Ok(self
            .storage
            .get(TOKEN_KEY)?
            .is_some_and(|token| !token.is_empty()))
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        debug!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_session() -> Session {
        Session {
            access_token: "token-123".to_string(),
            user: SessionUser {
                id: "user-1".to_string(),
                email: Some("florist@example.com".to_string()),
                user_metadata: Some(json!({ "business_name": "Petal & Stem" })),
            },
        }
    }

    #[test]
    fn save_then_read_returns_same_session() {
        let holder = SessionHolder::new(Arc::new(MemoryStorage::new()));
        holder.save(&sample_session()).unwrap();

        assert_eq!(holder.read().unwrap(), Some(sample_session()));
        assert!(holder.has_token().unwrap());
    }

    /// Memory store that refuses writes to the user entry
    struct RejectsUserWrites(MemoryStorage);

    impl KeyValueStorage for RejectsUserWrites {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.0.remove(key)
        }
    }

    #[test]
    fn failed_user_write_leaves_no_token() {
        let holder = SessionHolder::new(Arc::new(RejectsUserWrites(MemoryStorage::new())));

        assert!(holder.save(&sample_session()).is_err());
        assert!(!holder.has_token().unwrap());
        assert_eq!(holder.read().unwrap(), None);
    }

    #[test]
    fn clear_removes_both_entries() {
        let storage = Arc::new(MemoryStorage::new());
        let holder = SessionHolder::new(storage.clone());
        holder.save(&sample_session()).unwrap();
        holder.clear().unwrap();

        assert_eq!(holder.read().unwrap(), None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn token_without_user_is_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "orphan").unwrap();
        let holder = SessionHolder::new(storage);

        assert_eq!(holder.read().unwrap(), None);
        assert!(holder.has_token().unwrap());
    }

    #[test]
    fn malformed_user_entry_is_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "token").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();

        assert_eq!(SessionHolder::new(storage).read().unwrap(), None);
    }

    #[test]
    fn session_from_sign_in_response() {
        let body = json!({
            "access_token": "abc",
            "token_type": "bearer",
            "user": { "id": "u-9", "email": "a@b.c", "aud": "authenticated" }
        });
        let session = Session::from_auth_response(&body).unwrap();
        assert_eq!(session.access_token, "abc");
        assert_eq!(session.user.id, "u-9");

        let error = json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" });
        assert!(Session::from_auth_response(&error).is_none());
    }
}
