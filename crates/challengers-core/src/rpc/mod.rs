//! Unary RPC plumbing for talking to the challengers services.
//!
//! A `Channel` runs every outbound call through an ordered pipeline of
//! `UnaryInterceptor` stages before handing it to a `Transport`. The auth
//! interceptor is one such stage.

pub mod call;
pub mod channel;
pub mod error;
pub mod interceptor;
pub mod transport;

pub use call::{Metadata, UnaryCall, AUTHORIZATION};
pub use channel::Channel;
pub use error::RpcError;
pub use interceptor::{Next, UnaryFuture, UnaryInterceptor};
pub use transport::{HttpTransport, Transport};
