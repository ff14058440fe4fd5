//! Account service client and the account creation flow.
//!
//! This module provides:
//! - `AccountService`: the remote operations (`CreateAccount`, `VerifyAccount`)
//! - `AccountClient`: `AccountService` over an RPC channel
//! - `AccountCreationFlow`: mints a new session and persists its token

pub mod client;
pub mod flow;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    AccountClient, AccountService, CreateAccountRequest, CreateAccountResponse,
    VerifyAccountRequest, VerifyAccountResponse, ACCOUNT_SERVICE,
};
pub use flow::AccountCreationFlow;
