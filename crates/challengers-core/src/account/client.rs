//! Client for the remote account service.
//!
//! The service mints session tokens (`CreateAccount`) and confirms whether a
//! token is still accepted (`VerifyAccount`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::rpc::{Channel, RpcError};

/// Fully qualified name of the account service
pub const ACCOUNT_SERVICE: &str = "challengers.Account";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateAccountRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateAccountResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyAccountRequest {
    pub token: String,
}

/// A successful response means the token is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyAccountResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// The remote operations the session subsystem depends on.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn create_account(&self, request: CreateAccountRequest) -> Result<CreateAccountResponse, RpcError>;

    /// Err for any rejection, including `RpcError::Unauthenticated`
    async fn verify_account(&self, request: VerifyAccountRequest) -> Result<VerifyAccountResponse, RpcError>;
}

/// `AccountService` over an RPC channel.
/// Clone is cheap - the channel shares its transport and interceptors.
#[derive(Clone)]
pub struct AccountClient {
    channel: Channel,
}

impl AccountClient {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl AccountService for AccountClient {
    async fn create_account(&self, request: CreateAccountRequest) -> Result<CreateAccountResponse, RpcError> {
        self.channel.unary(ACCOUNT_SERVICE, "CreateAccount", &request).await
    }

    async fn verify_account(&self, request: VerifyAccountRequest) -> Result<VerifyAccountResponse, RpcError> {
        self.channel.unary(ACCOUNT_SERVICE, "VerifyAccount", &request).await
    }
}
