//! In-process account service double for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::client::{
    AccountService, CreateAccountRequest, CreateAccountResponse, VerifyAccountRequest,
    VerifyAccountResponse,
};
use crate::rpc::RpcError;

#[derive(Debug, Clone)]
pub enum Verify {
    /// Accept exactly this token
    Accept(String),
    /// Reject with `Unauthenticated`
    Reject,
    /// Fail at the transport level
    Unreachable,
    /// Never answer
    Hang,
}

#[derive(Debug, Clone)]
pub enum Create {
    Token(String),
    NoToken,
    Fail,
}

pub struct FakeAccountService {
    verify: Mutex<Verify>,
    create: Mutex<Create>,
    delay: Duration,
    verify_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl FakeAccountService {
    pub fn new(verify: Verify, create: Create) -> Self {
        Self {
            verify: Mutex::new(verify),
            create: Mutex::new(create),
            delay: Duration::ZERO,
            verify_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }

    pub fn verifying(verify: Verify) -> Self {
        Self::new(verify, Create::Fail)
    }

    pub fn creating(create: Create) -> Self {
        Self::new(Verify::Reject, create)
    }

    /// Answer every call after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_verify(&self, verify: Verify) {
        *self.verify.lock().unwrap() = verify;
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountService for FakeAccountService {
    async fn create_account(&self, request: CreateAccountRequest) -> Result<CreateAccountResponse, RpcError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let behavior = self.create.lock().unwrap().clone();
        match behavior {
            Create::Token(token) => Ok(CreateAccountResponse { token: Some(token) }),
            Create::NoToken => Ok(CreateAccountResponse { token: None }),
            Create::Fail => Err(RpcError::ServerError(format!("cannot create {}", request.name))),
        }
    }

    async fn verify_account(&self, request: VerifyAccountRequest) -> Result<VerifyAccountResponse, RpcError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let behavior = self.verify.lock().unwrap().clone();
        match behavior {
            Verify::Accept(token) if token == request.token => Ok(VerifyAccountResponse {
                token: Some(token),
                name: Some("Ada".to_string()),
            }),
            Verify::Accept(_) | Verify::Reject => Err(RpcError::Unauthenticated("invalid token".to_string())),
            Verify::Unreachable => Err(RpcError::InvalidResponse("connection refused".to_string())),
            Verify::Hang => futures::future::pending().await,
        }
    }
}
