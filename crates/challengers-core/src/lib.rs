//! Challengers client core.
//!
//! Session handling for the challengers client: the persisted token, the
//! interceptor that attaches it to outbound calls, remote verification, the
//! navigation guard and account creation.
//!
//! `Client::new` wires everything from a `Config` the way the binary does.

pub mod account;
pub mod auth;
pub mod config;
pub mod routes;
pub mod rpc;

use std::sync::Arc;

use anyhow::{Context, Result};

use account::{AccountClient, AccountCreationFlow, AccountService};
use auth::{AuthInterceptor, RouteGuard, SessionVerifier, TokenStore};
use config::Config;
use routes::RouteTable;
use rpc::{Channel, HttpTransport};

/// The session subsystem, wired around one shared token store.
pub struct Client {
    pub store: Arc<dyn TokenStore>,
    pub channel: Channel,
    pub verifier: Arc<SessionVerifier>,
    pub guard: RouteGuard,
    pub accounts: AccountCreationFlow,
}

impl Client {
    /// Build from config, opening the configured token store
    pub fn new(config: &Config) -> Result<Self> {
        let store = auth::open_store(config.token_backend, config.session_dir()?)?;
        Self::with_store(config, store)
    }

    pub fn with_store(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        let transport = HttpTransport::new(&config.api_base_url, config.request_timeout())
            .context("Failed to build HTTP transport")?;
        let channel = Channel::new(Arc::new(transport))
            .with_interceptor(Arc::new(AuthInterceptor::new(store.clone())));
        let service: Arc<dyn AccountService> = Arc::new(AccountClient::new(channel.clone()));

        let verifier = Arc::new(SessionVerifier::new(
            store.clone(),
            service.clone(),
            config.verify_timeout(),
        ));
        let guard = RouteGuard::new(RouteTable::challengers(), verifier.clone());
        let accounts = AccountCreationFlow::new(store.clone(), service);

        Ok(Self {
            store,
            channel,
            verifier,
            guard,
            accounts,
        })
    }
}
