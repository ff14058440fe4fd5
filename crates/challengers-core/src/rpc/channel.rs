use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use super::call::UnaryCall;
use super::error::RpcError;
use super::interceptor::{Next, UnaryInterceptor};
use super::transport::Transport;

/// A transport plus the ordered interceptors every call passes through.
#[derive(Clone)]
pub struct Channel {
    transport: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn UnaryInterceptor>>,
}

impl Channel {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            interceptors: Vec::new(),
        }
    }

    /// Append a stage; stages run in the order they were added
    pub fn with_interceptor(mut self, interceptor: Arc<dyn UnaryInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub async fn call(&self, call: UnaryCall) -> Result<Value, RpcError> {
        debug!(method = %call.path(), "Unary call");
        Next::new(&self.interceptors, self.transport.as_ref())
            .run(call)
            .await
    }

    /// Typed unary call
    pub async fn unary<Req, Resp>(&self, service: &str, method: &str, input: &Req) -> Result<Resp, RpcError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let input = serde_json::to_value(input).map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
        let output = self.call(UnaryCall::new(service, method, input)).await?;
        serde_json::from_value(output).map_err(|e| {
            RpcError::InvalidResponse(format!("{}/{}: {}", service, method, e))
        })
    }
}
