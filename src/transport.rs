//! The HTTP side of the client.
//!
//! Codecs only ever produce a [`Request`]: the method, the url and the JSON
//! body Flare expects. A [`Transport`] turns it into a decoded response.
//! In debug mode the request is simply handed back unsent, so what is
//! inspected is exactly what would have gone over the wire.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::error::{FlareError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// The operations Flare exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateDatabase,
    DeleteDatabase,
    Transact,
    Entity,
    Datoms,
    GetDatabaseNames,
    ListDatabases,
    Q,
    Meta,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Self::CreateDatabase,
        Self::DeleteDatabase,
        Self::Transact,
        Self::Entity,
        Self::Datoms,
        Self::GetDatabaseNames,
        Self::ListDatabases,
        Self::Q,
        Self::Meta,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::CreateDatabase => "datomic/create-database",
            Self::DeleteDatabase => "datomic/delete-database",
            Self::Transact => "datomic/transact",
            Self::Entity => "datomic/entity",
            Self::Datoms => "datomic/datoms",
            Self::GetDatabaseNames => "datomic/get-database-names",
            Self::ListDatabases => "datomic/list-databases",
            Self::Q => "datomic/q",
            Self::Meta => "meta",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::CreateDatabase | Self::Transact => Method::Post,
            Self::DeleteDatabase => Method::Delete,
            Self::Entity
            | Self::Datoms
            | Self::GetDatabaseNames
            | Self::ListDatabases
            | Self::Q
            | Self::Meta => Method::Get,
        }
    }
}

impl FromStr for Operation {
    type Err = FlareError;
    fn from_str(path: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.path() == path)
            .ok_or_else(|| FlareError::UnrecognizedOperation(path.to_string()))
    }
}

/// A fully shaped request, also what debug mode returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn to_json(&self) -> serde_json::Value {
        // a Request only holds strings and JSON values
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

pub trait Transport: Send + Sync {
    /// Performs the request and returns the decoded JSON response.
    fn send(&self, request: &Request) -> Result<serde_json::Value>;
}

pub struct HttpTransport {
    http_client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>, connect_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| FlareError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }

    fn failure(request: &Request, message: String, payload: Option<String>) -> FlareError {
        warn!(method = %request.method, url = %request.url, %message, "request failed");
        FlareError::Request { message, request: Box::new(request.clone()), payload }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<serde_json::Value> {
        let started = Instant::now();
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .http_client
            .request(method, &request.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }
        let response = builder
            .send()
            .map_err(|e| Self::failure(request, e.to_string(), None))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Self::failure(request, e.to_string(), None))?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(method = %request.method, url = %request.url, status = status.as_u16(), ms = elapsed_ms, "request complete");
        if !status.is_success() {
            return Err(Self::failure(request, format!("{}: {}", status, text), Some(text)));
        }
        serde_json::from_str(&text).map_err(|e| Self::failure(request, e.to_string(), Some(text)))
    }
}
