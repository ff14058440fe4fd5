//! Remote verification of the stored session token.
//!
//! `is_authenticated` never fails: any problem reaching or convincing the
//! account service counts as "not authenticated" and revokes the token that
//! was checked. Concurrent checks of the same token share one remote call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use super::redact;
use super::store::TokenStore;
use crate::account::{AccountService, VerifyAccountRequest};
use crate::rpc::RpcError;

type Verification = Shared<BoxFuture<'static, bool>>;

struct InFlight {
    id: u64,
    token: String,
    verification: Verification,
}

pub struct SessionVerifier {
    store: Arc<dyn TokenStore>,
    service: Arc<dyn AccountService>,
    timeout: Duration,
    in_flight: Mutex<Option<InFlight>>,
    next_id: AtomicU64,
}

/// Drops the shared verification from the slot once its caller is done
struct InFlightGuard<'a> {
    verifier: &'a SessionVerifier,
    id: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.verifier.slot();
        if slot.as_ref().map(|f| f.id) == Some(self.id) {
            *slot = None;
        }
    }
}

impl SessionVerifier {
    pub fn new(store: Arc<dyn TokenStore>, service: Arc<dyn AccountService>, timeout: Duration) -> Self {
        Self {
            store,
            service,
            timeout,
            in_flight: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    /// Whether the stored token is present and accepted by the account service.
    pub async fn is_authenticated(&self) -> bool {
        let Some(token) = self.store.read() else {
            debug!("No stored session");
            return false;
        };

        let (id, verification) = self.join_or_start(token);
        let _guard = InFlightGuard { verifier: self, id };
        verification.await
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn join_or_start(&self, token: String) -> (u64, Verification) {
        let mut slot = self.slot();

        if let Some(current) = slot.as_ref() {
            // A finished verification is never reused; the next check asks again
            if current.token == token && current.verification.peek().is_none() {
                debug!(token = %redact(&token), "Joining in-flight verification");
                return (current.id, current.verification.clone());
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let verification = Self::verify(
            self.store.clone(),
            self.service.clone(),
            token.clone(),
            self.timeout,
        )
        .boxed()
        .shared();

        *slot = Some(InFlight {
            id,
            token,
            verification: verification.clone(),
        });
        (id, verification)
    }

    async fn verify(
        store: Arc<dyn TokenStore>,
        service: Arc<dyn AccountService>,
        token: String,
        timeout: Duration,
    ) -> bool {
        debug!(token = %redact(&token), "Verifying session");
        let request = VerifyAccountRequest {
            token: token.clone(),
        };

        let error = match tokio::time::timeout(timeout, service.verify_account(request)).await {
            Ok(Ok(_)) => {
                debug!(token = %redact(&token), "Session verified");
                return true;
            }
            Ok(Err(e)) => e,
            Err(_) => RpcError::Timeout(timeout),
        };

        warn!(error = %error, token = %redact(&token), "Session verification failed");
        match store.clear_if(&token) {
            Ok(true) => info!(token = %redact(&token), "Rejected session token revoked"),
            Ok(false) => debug!("Stored token changed during verification, leaving it"),
            Err(e) => warn!(error = %e, "Failed to clear rejected session token"),
        }
        false
    }
}
