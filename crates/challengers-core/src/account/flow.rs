use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use super::client::{AccountService, CreateAccountRequest, CreateAccountResponse};
use crate::auth::{redact, TokenStore};

/// Mints a new session for a user without one.
///
/// `pending` is true while any `create` call is in flight, so a UI can show
/// progress. It is reset when the call finishes, fails, or is dropped.
pub struct AccountCreationFlow {
    store: Arc<dyn TokenStore>,
    service: Arc<dyn AccountService>,
    in_flight: AtomicUsize,
    pending: watch::Sender<bool>,
}

/// Decrements the in-flight count when a `create` call ends
struct PendingGuard<'a> {
    flow: &'a AccountCreationFlow,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let remaining = self.flow.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        self.flow.pending.send_replace(remaining > 0);
    }
}

impl AccountCreationFlow {
    pub fn new(store: Arc<dyn TokenStore>, service: Arc<dyn AccountService>) -> Self {
        let (pending, _) = watch::channel(false);
        Self {
            store,
            service,
            in_flight: AtomicUsize::new(0),
            pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        *self.pending.borrow()
    }

    /// Observe `pending` changes
    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.pending.subscribe()
    }

    fn begin(&self) -> PendingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.pending.send_replace(true);
        PendingGuard { flow: self }
    }

    /// Create an account named `name` and store the returned token.
    ///
    /// Failures are logged and leave the stored session unchanged.
    pub async fn create(&self, name: &str) {
        let _pending = self.begin();

        let request = CreateAccountRequest {
            name: name.to_string(),
        };
        match self.service.create_account(request).await {
            Ok(CreateAccountResponse { token: Some(token) }) if !token.is_empty() => {
                match self.store.write(&token) {
                    Ok(()) => info!(token = %redact(&token), "Account created, session established"),
                    Err(e) => error!(error = %e, "Account created but the session could not be saved"),
                }
            }
            Ok(_) => warn!(account_name = name, "Account service returned no token"),
            Err(e) => error!(error = %e, account_name = name, "Account creation failed"),
        }
    }
}
