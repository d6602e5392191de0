//! Provider configuration
//!
//! Configuration is a map of driver name to [`DriverConfig`], typically
//! deserialized from the host application's settings. Three keys are
//! mandatory for every driver: `client_id`, `client_secret` and
//! `redirect`. Anything else lands in `extra` and is consumed by the
//! driver that understands it (e.g. GitLab's `host`).

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::SocialiteError;

/// Configuration for a single OAuth provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverConfig {
	/// OAuth client identifier.
	#[serde(default)]
	pub client_id: String,

	/// OAuth client secret.
	#[serde(default)]
	pub client_secret: String,

	/// Callback URL, absolute or app-relative (leading `/`).
	#[serde(default)]
	pub redirect: String,

	/// Scopes requested in addition to the driver's defaults.
	#[serde(default)]
	pub scopes: Vec<String>,

	/// HTTP client options for this provider.
	#[serde(default)]
	pub http: HttpOptions,

	/// Driver-specific settings (e.g. `host` for GitLab).
	#[serde(flatten)]
	pub extra: HashMap<String, Value>,
}

impl DriverConfig {
	/// Creates a configuration from the three mandatory keys.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			redirect: redirect.into(),
			..Self::default()
		}
	}

	/// Adds a driver-specific setting.
	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}

	/// Returns the names of all mandatory keys that are absent or empty.
	pub(crate) fn missing_keys(&self) -> Vec<String> {
		let mut missing = Vec::new();

		if self.client_id.is_empty() {
			missing.push("client_id".to_string());
		}
		if self.client_secret.is_empty() {
			missing.push("client_secret".to_string());
		}
		if self.redirect.is_empty() {
			missing.push("redirect".to_string());
		}

		missing
	}

	/// Reads a string-valued driver-specific setting.
	pub(crate) fn extra_str(&self, key: &str) -> Option<&str> {
		self.extra.get(key).and_then(Value::as_str)
	}
}

/// Outbound HTTP client options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
	/// Total request timeout in seconds.
	pub timeout_secs: u64,

	/// Connect timeout in seconds.
	pub connect_timeout_secs: u64,

	/// `User-Agent` header value.
	pub user_agent: Option<String>,
}

impl Default for HttpOptions {
	fn default() -> Self {
		Self {
			timeout_secs: 30,
			connect_timeout_secs: 10,
			user_agent: None,
		}
	}
}

impl HttpOptions {
	/// Builds a reqwest client from these options.
	pub(crate) fn client(&self) -> Result<reqwest::Client, SocialiteError> {
		let mut builder = reqwest::Client::builder()
			.timeout(Duration::from_secs(self.timeout_secs))
			.connect_timeout(Duration::from_secs(self.connect_timeout_secs));

		if let Some(agent) = &self.user_agent {
			builder = builder.user_agent(agent.clone());
		}

		builder
			.build()
			.map_err(|e| SocialiteError::Configuration(format!("HTTP client: {e}")))
	}
}

/// The full provider configuration map, keyed by driver name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SocialiteConfig {
	drivers: HashMap<String, DriverConfig>,
}

impl SocialiteConfig {
	/// Creates an empty configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers configuration for `driver`.
	pub fn insert(mut self, driver: impl Into<String>, config: DriverConfig) -> Self {
		self.drivers.insert(driver.into(), config);
		self
	}

	/// Returns the configuration for `driver`, if any.
	pub fn get(&self, driver: &str) -> Option<&DriverConfig> {
		self.drivers.get(driver)
	}
}
