use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use super::call::UnaryCall;
use super::error::RpcError;
use super::transport::Transport;

pub type UnaryFuture<'a> = BoxFuture<'a, Result<Value, RpcError>>;

/// One stage of the outbound unary call pipeline.
///
/// A stage may inspect or augment the call and must hand it to `next`
/// to have it dispatched.
pub trait UnaryInterceptor: Send + Sync {
    fn intercept_unary<'a>(&'a self, call: UnaryCall, next: Next<'a>) -> UnaryFuture<'a>;
}

/// The remainder of the pipeline after the current stage.
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn UnaryInterceptor>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub(crate) fn new(interceptors: &'a [Arc<dyn UnaryInterceptor>], transport: &'a dyn Transport) -> Self {
        Self {
            interceptors,
            transport,
        }
    }

    /// Forward the call to the next stage, or to the transport after the last one
    pub fn run(self, call: UnaryCall) -> UnaryFuture<'a> {
        match self.interceptors.split_first() {
            Some((stage, rest)) => stage.intercept_unary(call, Next::new(rest, self.transport)),
            None => self.transport.unary(call),
        }
    }
}
