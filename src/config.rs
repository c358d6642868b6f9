use serde::Deserialize;

use std::time::Duration;

use crate::error::Result;
use crate::overrides::OverridePolicy;

pub const DEFAULT_ADDRESS: &str = "http://localhost:3042";

/// Everything needed to build a [`Client`](crate::client::Client).
///
/// ```toml
/// address = "http://localhost:3042"
/// timeout_ms = 5000
///
/// [dangerously_override.database]
/// name = "purple"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub dangerously_override: OverridePolicy,
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: Some(address.into()), ..Self::default() }
    }

    pub fn with_override(mut self, policy: OverridePolicy) -> Self {
        self.dangerously_override = policy;
        self
    }

    /// Layers an optional config file and `FLARE_*` environment variables
    /// (`FLARE_DANGEROUSLY_OVERRIDE__DATABASE__NAME=purple`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("FLARE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize::<Self>()?)
    }

    /// The address without a trailing slash, falling back to the default
    /// when none (or only whitespace) is configured.
    pub fn address(&self) -> String {
        match self.address.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_ADDRESS.to_string(),
            Some(address) => address.strip_suffix('/').unwrap_or(address).to_string(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}
