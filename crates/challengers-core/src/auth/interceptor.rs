use std::sync::Arc;

use reqwest::header::HeaderValue;
use tracing::warn;

use crate::rpc::{Next, UnaryCall, UnaryFuture, UnaryInterceptor, AUTHORIZATION};

use super::store::TokenStore;

/// Attaches the stored session token to every outbound unary call.
///
/// The token goes into the `Authorization` metadata field verbatim. Without a
/// stored token, or with one that cannot be sent as a header value, the call
/// is forwarded untouched.
pub struct AuthInterceptor {
    store: Arc<dyn TokenStore>,
}

impl AuthInterceptor {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

impl UnaryInterceptor for AuthInterceptor {
    fn intercept_unary<'a>(&'a self, mut call: UnaryCall, next: Next<'a>) -> UnaryFuture<'a> {
        match self.store.read() {
            Some(token) if HeaderValue::from_str(&token).is_ok() => {
                call.metadata.insert(AUTHORIZATION, token);
            }
            Some(_) => warn!("Stored session token is not a valid header value, sending without it"),
            None => {}
        }
        next.run(call)
    }
}
