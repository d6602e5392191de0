//! Driver registry and provider construction
//!
//! [`SocialiteManager`] turns a driver name into a ready [`Provider`]:
//! it validates the vendor's configuration, resolves the callback URL,
//! builds the HTTP client and caches the result per name. Resolution
//! order is custom creators first, then the built-in driver table.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::{DriverConfig, SocialiteConfig};
use crate::driver::Driver;
use crate::error::SocialiteError;
use crate::provider::Provider;
use crate::providers::{
	BitbucketDriver, FacebookDriver, GithubDriver, GitlabDriver, GoogleDriver, LinkedInDriver,
	LinkedInOpenIdDriver, SlackDriver, SlackOpenIdDriver, TwitchDriver, TwitterDriver,
};
use crate::session::{MemorySessionStore, SessionStore};

/// Factory signature for drivers registered with
/// [`SocialiteManager::extend`]. Receives the configuration entry for
/// the name being resolved, when one exists.
pub type ProviderFactory = Box<
	dyn Fn(Option<&DriverConfig>, Arc<dyn SessionStore>) -> Result<Provider, SocialiteError>
		+ Send
		+ Sync,
>;

/// Creates and caches configured [`Provider`] instances by name.
pub struct SocialiteManager {
	config: SocialiteConfig,
	base_url: Option<String>,
	session: Arc<dyn SessionStore>,
	custom_creators: HashMap<String, ProviderFactory>,
	drivers: HashMap<String, Provider>,
}

impl SocialiteManager {
	/// Creates a manager over `config` with an in-memory session store.
	pub fn new(config: SocialiteConfig) -> Self {
		Self::with_session(config, Arc::new(MemorySessionStore::new()))
	}

	/// Creates a manager that stores flow artifacts in `session`.
	pub fn with_session(config: SocialiteConfig, session: Arc<dyn SessionStore>) -> Self {
		Self {
			config,
			base_url: None,
			session,
			custom_creators: HashMap::new(),
			drivers: HashMap::new(),
		}
	}

	/// Sets the application base URL used to resolve relative redirect
	/// paths.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Registers a custom driver factory under `name`. Custom creators
	/// win over built-in drivers of the same name.
	pub fn extend(&mut self, name: impl Into<String>, factory: ProviderFactory) -> &mut Self {
		self.custom_creators.insert(name.into(), factory);
		self
	}

	/// Drops all cached provider instances.
	pub fn forget_drivers(&mut self) -> &mut Self {
		self.drivers.clear();
		self
	}

	/// Resolves `name` to a configured provider, building and caching
	/// it on first use. `None` is always an error: there is no default
	/// driver.
	pub fn driver(&mut self, name: Option<&str>) -> Result<&mut Provider, SocialiteError> {
		let name = name.ok_or_else(|| {
			SocialiteError::InvalidArgument(
				"Unable to resolve NULL driver for SocialiteManager".to_string(),
			)
		})?;

		if !self.drivers.contains_key(name) {
			let provider = self.create_driver(name)?;
			self.drivers.insert(name.to_string(), provider);
		}

		// The entry was just inserted if it was absent.
		self.drivers
			.get_mut(name)
			.ok_or_else(|| SocialiteError::InvalidArgument(format!("Driver [{name}] not supported")))
	}

	fn create_driver(&self, name: &str) -> Result<Provider, SocialiteError> {
		debug!(driver = name, "creating social provider");

		if let Some(factory) = self.custom_creators.get(name) {
			return factory(self.config.get(name), Arc::clone(&self.session));
		}

		match name {
			"bitbucket" => self.build(name, &[name], Box::new(BitbucketDriver::new())),
			"facebook" => self.build(name, &[name], Box::new(FacebookDriver::new())),
			"github" => self.build(name, &[name], Box::new(GithubDriver::new())),
			"gitlab" => self.create_gitlab(),
			"google" => self.build(name, &[name], Box::new(GoogleDriver::new())),
			"linkedin" => self.build(name, &[name], Box::new(LinkedInDriver::new())),
			"linkedin-openid" => {
				self.build(name, &[name], Box::new(LinkedInOpenIdDriver::new()))
			}
			"slack" => self.build(name, &[name], Box::new(SlackDriver::new())),
			"slack-openid" => self.build(name, &[name], Box::new(SlackOpenIdDriver::new())),
			"twitch" => self.build(name, &[name], Box::new(TwitchDriver::new())),
			"twitter" => self.build(
				name,
				&["twitter", "twitter-oauth-2"],
				Box::new(TwitterDriver::new()),
			),
			"x" => self.build(name, &["x", "x-oauth-2"], Box::new(TwitterDriver::x())),
			_ => Err(SocialiteError::InvalidArgument(format!(
				"Driver [{name}] not supported"
			))),
		}
	}

	fn create_gitlab(&self) -> Result<Provider, SocialiteError> {
		let driver = match self
			.config
			.get("gitlab")
			.and_then(|config| config.extra_str("host"))
		{
			Some(host) => GitlabDriver::with_host(host),
			None => GitlabDriver::new(),
		};

		self.build("gitlab", &["gitlab"], Box::new(driver))
	}

	fn build(
		&self,
		name: &str,
		config_keys: &[&str],
		driver: Box<dyn Driver>,
	) -> Result<Provider, SocialiteError> {
		// A built-in name without any configuration block is treated
		// like an unknown driver, not an incomplete one.
		let config = config_keys
			.iter()
			.find_map(|key| self.config.get(key))
			.ok_or_else(|| {
				SocialiteError::InvalidArgument(format!("Driver [{name}] not supported"))
			})?;

		let missing = config.missing_keys();
		if !missing.is_empty() {
			return Err(SocialiteError::MissingConfiguration {
				provider: name.to_string(),
				keys: missing,
			});
		}

		let redirect = self.format_redirect_url(&config.redirect)?;
		let http = config.http.client()?;

		let mut provider = Provider::new(
			driver,
			config.client_id.clone(),
			config.client_secret.clone(),
			redirect,
			Arc::clone(&self.session),
			http,
		);
		if !config.scopes.is_empty() {
			provider.scopes(config.scopes.clone());
		}

		Ok(provider)
	}

	/// Resolves an app-relative redirect path against the base URL.
	fn format_redirect_url(&self, redirect: &str) -> Result<String, SocialiteError> {
		if !redirect.starts_with('/') {
			return Ok(redirect.to_string());
		}

		let base = self.base_url.as_deref().ok_or_else(|| {
			SocialiteError::Configuration(format!(
				"relative redirect `{redirect}` requires a base URL"
			))
		})?;

		Ok(format!("{}{redirect}", base.trim_end_matches('/')))
	}
}

impl std::fmt::Debug for SocialiteManager {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SocialiteManager")
			.field("base_url", &self.base_url)
			.field("cached_drivers", &self.drivers.keys().collect::<Vec<_>>())
			.field(
				"custom_creators",
				&self.custom_creators.keys().collect::<Vec<_>>(),
			)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> SocialiteConfig {
		SocialiteConfig::new().insert(
			"github",
			DriverConfig::new("gh-id", "gh-secret", "https://app.test/auth/github/callback"),
		)
	}

	#[test]
	fn test_resolves_builtin_driver() {
		let mut manager = SocialiteManager::new(config());

		let provider = manager.driver(Some("github")).unwrap();

		assert_eq!(provider.driver_name(), "github");
	}

	#[test]
	fn test_none_driver_is_rejected() {
		let mut manager = SocialiteManager::new(config());

		let result = manager.driver(None);

		assert!(matches!(result, Err(SocialiteError::InvalidArgument(_))));
	}

	#[test]
	fn test_unknown_driver_is_rejected() {
		let mut manager = SocialiteManager::new(config());

		let result = manager.driver(Some("myspace"));

		assert!(matches!(result, Err(SocialiteError::InvalidArgument(_))));
	}

	#[test]
	fn test_relative_redirect_requires_base_url() {
		let config = SocialiteConfig::new().insert(
			"github",
			DriverConfig::new("id", "secret", "/auth/github/callback"),
		);
		let mut manager = SocialiteManager::new(config);

		let result = manager.driver(Some("github"));

		assert!(matches!(result, Err(SocialiteError::Configuration(_))));
	}

	#[test]
	fn test_relative_redirect_resolved_against_base_url() {
		let config = SocialiteConfig::new().insert(
			"github",
			DriverConfig::new("id", "secret", "/auth/github/callback"),
		);
		let mut manager = SocialiteManager::new(config).base_url("https://app.test/");

		assert!(manager.driver(Some("github")).is_ok());
	}
}
