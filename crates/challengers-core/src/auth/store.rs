use std::sync::Mutex;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Fixed storage key of the one session per installation
pub const STORAGE_KEY: &str = "challengers-account";

/// Persisted shape of the session: `{ "token"?: string }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SessionRecord {
    pub fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
        }
    }

    /// The stored token, with an empty string normalized to no session
    pub fn into_token(self) -> Option<String> {
        self.token.filter(|t| !t.is_empty())
    }

    /// Parse stored text. Malformed text is reported as `None` and logged.
    pub fn parse(contents: &str) -> Option<Self> {
        match serde_json::from_str(contents) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed session record, treating as no session");
                None
            }
        }
    }
}

/// Repository for the single persisted session token.
///
/// One instance is built at startup and shared as `Arc<dyn TokenStore>` by
/// the auth interceptor, the session verifier and the account creation flow.
/// `read` never fails: missing or unreadable data means "no session".
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Option<String>;

    /// Store `token`, replacing any previous value. An empty token clears.
    fn write(&self, token: &str) -> Result<()>;

    /// Remove the persisted entry. Clearing an absent entry is not an error.
    fn clear(&self) -> Result<()>;

    /// Clear only if the stored token is still `token`.
    /// Returns whether anything was removed.
    fn clear_if(&self, token: &str) -> Result<bool> {
        if self.read().as_deref() == Some(token) {
            self.clear()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// In-process token store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        *store.slot() = Some(token.to_string()).filter(|t| !t.is_empty());
        store
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<String> {
        self.slot().clone()
    }

    fn write(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string()).filter(|t| !t.is_empty());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }

    fn clear_if(&self, token: &str) -> Result<bool> {
        let mut slot = self.slot();
        if slot.as_deref() == Some(token) {
            *slot = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_empty_token_is_absent() {
        let record = SessionRecord::parse(r#"{"token": ""}"#).expect("valid json");
        assert_eq!(record.into_token(), None);
    }

    #[test]
    fn test_record_missing_token_is_absent() {
        let record = SessionRecord::parse("{}").expect("valid json");
        assert_eq!(record.into_token(), None);
    }

    #[test]
    fn test_record_malformed_is_none() {
        assert!(SessionRecord::parse("{\"token\": ").is_none());
        assert!(SessionRecord::parse("[1, 2]").is_none());
    }

    #[test]
    fn test_record_serializes_without_null() {
        let json = serde_json::to_string(&SessionRecord::default()).expect("serialize");
        assert_eq!(json, "{}");
        let json = serde_json::to_string(&SessionRecord::new("abc")).expect("serialize");
        assert_eq!(json, r#"{"token":"abc"}"#);
    }

    #[test]
    fn test_memory_store_write_read_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.read(), None);

        store.write("abc").unwrap();
        assert_eq!(store.read().as_deref(), Some("abc"));

        store.write("xyz").unwrap();
        assert_eq!(store.read().as_deref(), Some("xyz"));

        store.clear().unwrap();
        assert_eq!(store.read(), None);

        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_empty_write_clears() {
        let store = MemoryTokenStore::with_token("abc");
        store.write("").unwrap();
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_memory_store_clear_if() {
        let store = MemoryTokenStore::with_token("new");
        assert!(!store.clear_if("old").unwrap());
        assert_eq!(store.read().as_deref(), Some("new"));

        assert!(store.clear_if("new").unwrap());
        assert_eq!(store.read(), None);
    }
}
