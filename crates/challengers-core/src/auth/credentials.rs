use anyhow::{Context, Result};
use keyring::Entry;
use tracing::warn;

use super::store::{SessionRecord, TokenStore, STORAGE_KEY};

const SERVICE_NAME: &str = "challengers";

/// Whether this build links a platform keychain. Without one keyring falls
/// back to a mock store that keeps nothing between entries.
pub const KEYCHAIN_AVAILABLE: bool = cfg!(any(
    target_os = "macos",
    target_os = "windows",
    target_os = "linux"
));

/// Session store backed by the OS keychain.
///
/// The entry holds the same `{ "token": ... }` record as the file store.
pub struct KeyringTokenStore {
    entry: Entry,
}

impl KeyringTokenStore {
    pub fn new() -> Result<Self> {
        let entry = Entry::new(SERVICE_NAME, STORAGE_KEY).context("Failed to create keyring entry")?;
        Ok(Self::with_entry(entry))
    }

    pub fn with_entry(entry: Entry) -> Self {
        Self { entry }
    }
}

impl TokenStore for KeyringTokenStore {
    fn read(&self) -> Option<String> {
        match self.entry.get_password() {
            Ok(contents) => SessionRecord::parse(&contents).and_then(SessionRecord::into_token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read session from keychain");
                None
            }
        }
    }

    fn write(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return self.clear();
        }
        let contents = serde_json::to_string(&SessionRecord::new(token))?;
        self.entry
            .set_password(&contents)
            .context("Failed to store session in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }
}
