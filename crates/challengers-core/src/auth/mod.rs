//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `TokenStore`: the single persisted session token, with file, keychain
//!   and in-memory backends
//! - `AuthInterceptor`: attaches the token to every outbound call
//! - `SessionVerifier`: asks the account service whether the stored token is
//!   still accepted, revoking it when it is not
//! - `RouteGuard`: gates navigation on a verified session
//!
//! There is no token refresh. A token is minted by account creation and lives
//! until the account service rejects it.

pub mod credentials;
pub mod guard;
pub mod interceptor;
pub mod session;
pub mod store;
pub mod verifier;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};

pub use credentials::{KeyringTokenStore, KEYCHAIN_AVAILABLE};
pub use guard::{NavigationOutcome, RouteGuard};
pub use interceptor::AuthInterceptor;
pub use session::FileTokenStore;
pub use store::{MemoryTokenStore, SessionRecord, TokenStore, STORAGE_KEY};
pub use verifier::SessionVerifier;

use crate::config::TokenBackend;

/// Number of leading token characters kept when logging
const REDACTED_PREFIX_LEN: usize = 4;

/// Build the configured token store.
///
/// The keyring backend is refused on platforms without a linked keychain.
pub fn open_store(backend: TokenBackend, session_dir: PathBuf) -> Result<Arc<dyn TokenStore>> {
    match backend {
        TokenBackend::File => Ok(Arc::new(FileTokenStore::new(session_dir))),
        TokenBackend::Keyring if !KEYCHAIN_AVAILABLE => {
            bail!("No OS keychain on this platform; set token_backend to \"file\"")
        }
        TokenBackend::Keyring => Ok(Arc::new(KeyringTokenStore::new()?)),
    }
}

/// Shorten a token for log output
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(REDACTED_PREFIX_LEN).collect();
    if prefix.len() < token.len() {
        format!("{}…", prefix)
    } else {
        "…".to_string()
    }
}
