//! The client ties configuration, override policy and transport together.
//!
//! Every request goes through [`Client::request`], which shapes the payload
//! for its operation and returns the unsent [`Request`]. Sending is a
//! separate step, so debug output and real traffic never diverge.

use serde_json::Value;
use tracing::debug;

use crate::api::Api;
use crate::config::ClientConfig;
use crate::dsl::Dsl;
use crate::error::{FlareError, Result};
use crate::overrides::OverridePolicy;
use crate::transport::{HttpTransport, Operation, Request, Transport};

pub struct Client {
    address: String,
    dangerously_override: OverridePolicy,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Builds a client talking HTTP to the configured address.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout(), config.connect_timeout())?;
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            address: config.address(),
            dangerously_override: config.dangerously_override,
            transport: Box::new(transport),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn dangerously_override(&self) -> &OverridePolicy {
        &self.dangerously_override
    }

    pub fn api(&self) -> Api<'_> {
        Api::new(self)
    }

    pub fn dsl(&self) -> Dsl<'_> {
        Dsl::new(self)
    }

    /// Shapes `payload` for `operation` without sending anything.
    pub fn request(&self, operation: Operation, payload: Option<Value>) -> Result<Request> {
        let body = self.dangerously_override.apply(operation, payload.as_ref())?;
        Ok(Request {
            method: operation.method(),
            url: format!("{}/{}", self.address, operation.path()),
            body,
        })
    }

    pub fn send(&self, request: &Request) -> Result<Value> {
        debug!(method = %request.method, url = %request.url, "sending request");
        self.transport.send(request)
    }

    pub fn dispatch(&self, operation: Operation, payload: Option<Value>) -> Result<Value> {
        let request = self.request(operation, payload)?;
        self.send(&request)
    }

    pub fn meta_request(&self) -> Result<Request> {
        self.request(Operation::Meta, None)
    }

    pub fn meta(&self) -> Result<Value> {
        self.dispatch(Operation::Meta, None)
    }
}

/// Takes the `data` out of a Flare response.
pub fn response_data(response: Value) -> Result<Value> {
    match response {
        Value::Object(mut map) => map
            .remove("data")
            .ok_or_else(|| FlareError::Decode("response has no data".to_string())),
        other => Err(FlareError::Decode(format!("response is not a map: {}", other))),
    }
}
