//! Datomic Flare – talk to Datomic through the Flare HTTP service using plain
//! data structures instead of hand-written EDN.
//!
//! Flare accepts JSON bodies in which transaction data and queries travel as
//! EDN strings. This crate does the translation in both directions:
//! * [`datatype`] – the [`datatype::Value`] enum and its EDN literal forms
//!   (strings, longs, doubles, `M` decimals, `#inst` instants, keywords,
//!   vectors, `nil`, `{:db/id ...}` references).
//! * [`types`] – the value type, cardinality and uniqueness vocabulary and
//!   its `:db.type/*`, `:db.cardinality/*`, `:db.unique/*` idents.
//! * [`schema`] – schema specifications to `:db/ident` maps, and the
//!   introspection query rows back into specifications.
//! * [`transact`] – assertions (with temporary ids for new entities) and
//!   retractions as transaction data.
//! * [`reshape`] – flat `:namespace/attribute` entity results into nested maps.
//! * [`overrides`] – database selector fields forced onto outgoing payloads.
//!
//! Around that core sit the [`client::Client`], its raw [`api::Api`] and the
//! [`dsl::Dsl`], configured through [`config::ClientConfig`] and sending
//! through a [`transport::Transport`].
//!
//! ## Quick Start
//! ```
//! use datomic_flare::{config::ClientConfig, schema::{Attribute, Specification}, types::ValueType};
//! use datomic_flare::ordered::OrderedMap;
//!
//! let flare = datomic_flare::new(ClientConfig::new("http://localhost:3042")).unwrap();
//! let specification: Specification = OrderedMap::new()
//!     .with("post", OrderedMap::new().with("title", Attribute::new(ValueType::String)));
//! // nothing is sent, the request is only shaped
//! let request = flare.dsl().transact_schema_request(&specification, None).unwrap();
//! assert_eq!(request.url, "http://localhost:3042/datomic/transact");
//! ```
//!
//! ## Errors
//! Codec failures (unsupported values, unknown tags, malformed idents) are
//! reported before anything is sent. Transport failures carry the request
//! and the response body, see [`error::FlareError::Request`].

pub mod api;
pub mod client;
pub mod config;
pub mod datatype;
pub mod dsl;
pub mod error;
pub mod ordered;
pub mod overrides;
pub mod reshape;
pub mod schema;
pub mod transact;
pub mod transport;
pub mod types;

pub use client::Client;
pub use datatype::{EntityId, Value};
pub use error::{FlareError, Result};

/// Builds a client talking HTTP to the configured address.
pub fn new(config: config::ClientConfig) -> Result<Client> {
    Client::new(config)
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
