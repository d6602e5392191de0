//! Driver resolution and configuration tests

use std::sync::Arc;

use async_trait::async_trait;
use rstest::rstest;
use serde_json::{Value, json};
use socialite::{
	Driver, DriverConfig, DriverContext, MemorySessionStore, Provider, SocialiteConfig,
	SocialiteError, SocialiteManager, User,
};

fn complete(redirect: &str) -> DriverConfig {
	DriverConfig::new("client-id", "client-secret", redirect)
}

fn manager_with(driver: &str, config: DriverConfig) -> SocialiteManager {
	SocialiteManager::new(SocialiteConfig::new().insert(driver, config))
}

struct StubDriver;

#[async_trait]
impl Driver for StubDriver {
	fn name(&self) -> &str {
		"passage"
	}

	fn authorize_endpoint(&self) -> String {
		"https://id.passage.test/authorize".to_string()
	}

	fn token_endpoint(&self) -> String {
		"https://id.passage.test/token".to_string()
	}

	async fn raw_user(
		&self,
		_http: &reqwest::Client,
		_ctx: &DriverContext<'_>,
		_token: &str,
	) -> Result<Value, SocialiteError> {
		Ok(json!({"id": "p1"}))
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		Ok(User::mapped("p1".into(), raw))
	}
}

#[rstest]
#[case::bitbucket("bitbucket")]
#[case::facebook("facebook")]
#[case::github("github")]
#[case::gitlab("gitlab")]
#[case::google("google")]
#[case::linkedin("linkedin")]
#[case::linkedin_openid("linkedin-openid")]
#[case::slack("slack")]
#[case::slack_openid("slack-openid")]
#[case::twitch("twitch")]
#[case::twitter("twitter")]
#[case::x("x")]
fn test_builtin_driver_resolves(#[case] name: &str) {
	let mut manager = manager_with(name, complete("https://app.test/cb"));

	let provider = manager.driver(Some(name)).unwrap();

	assert_eq!(provider.driver_name(), name);
}

#[test]
fn test_missing_configuration_lists_every_key() {
	let mut manager = manager_with("github", DriverConfig::new("", "", ""));

	let result = manager.driver(Some("github"));

	match result {
		Err(SocialiteError::MissingConfiguration { provider, keys }) => {
			assert_eq!(provider, "github");
			assert_eq!(keys, vec!["client_id", "client_secret", "redirect"]);
		}
		other => panic!("expected MissingConfiguration, got {other:?}"),
	}
}

#[test]
fn test_unconfigured_builtin_is_not_supported() {
	let mut manager = SocialiteManager::new(SocialiteConfig::new());

	let result = manager.driver(Some("github"));

	match result {
		Err(SocialiteError::InvalidArgument(message)) => {
			assert!(message.contains("github"));
		}
		other => panic!("expected InvalidArgument, got {other:?}"),
	}
}

#[test]
fn test_partially_missing_configuration() {
	let config = DriverConfig::new("client-id", "", "");
	let mut manager = manager_with("google", config);

	let result = manager.driver(Some("google"));

	match result {
		Err(SocialiteError::MissingConfiguration { keys, .. }) => {
			assert_eq!(keys, vec!["client_secret", "redirect"]);
		}
		other => panic!("expected MissingConfiguration, got {other:?}"),
	}
}

#[test]
fn test_driver_instances_are_cached() {
	let mut manager = manager_with("github", complete("https://app.test/cb"));

	manager
		.driver(Some("github"))
		.unwrap()
		.set_scopes(["cache-marker"]);

	let provider = manager.driver(Some("github")).unwrap();
	assert_eq!(provider.current_scopes(), ["cache-marker"]);
}

#[test]
fn test_forget_drivers_resets_instances() {
	let mut manager = manager_with("github", complete("https://app.test/cb"));

	manager
		.driver(Some("github"))
		.unwrap()
		.set_scopes(["cache-marker"]);
	manager.forget_drivers();

	let provider = manager.driver(Some("github")).unwrap();
	assert_eq!(provider.current_scopes(), ["user:email"]);
}

#[test]
fn test_configured_scopes_merge_with_defaults() {
	let mut config = complete("https://app.test/cb");
	config.scopes = vec!["repo".to_string(), "user:email".to_string()];
	let mut manager = manager_with("github", config);

	let provider = manager.driver(Some("github")).unwrap();

	assert_eq!(provider.current_scopes(), ["user:email", "repo"]);
}

#[test]
fn test_custom_creator_wins_over_builtin() {
	let mut manager = manager_with("github", complete("https://app.test/cb"));
	manager.extend(
		"github",
		Box::new(|_config: Option<&DriverConfig>, session| {
			Ok(Provider::new(
				Box::new(StubDriver),
				"custom-id",
				"custom-secret",
				"https://app.test/custom",
				session,
				reqwest::Client::new(),
			))
		}),
	);

	let provider = manager.driver(Some("github")).unwrap();

	assert_eq!(provider.driver_name(), "passage");
}

#[test]
fn test_custom_creator_receives_its_config() {
	let config = SocialiteConfig::new().insert(
		"passage",
		complete("https://app.test/cb").with_extra("region", "eu"),
	);
	let mut manager = SocialiteManager::with_session(config, Arc::new(MemorySessionStore::new()));
	manager.extend(
		"passage",
		Box::new(|config: Option<&DriverConfig>, session| {
			let config = config.ok_or_else(|| {
				SocialiteError::Configuration("passage config missing".to_string())
			})?;
			assert_eq!(config.extra.get("region"), Some(&json!("eu")));

			Ok(Provider::new(
				Box::new(StubDriver),
				config.client_id.clone(),
				config.client_secret.clone(),
				config.redirect.clone(),
				session,
				reqwest::Client::new(),
			))
		}),
	);

	assert!(manager.driver(Some("passage")).is_ok());
}

#[test]
fn test_gitlab_host_from_configuration() {
	let config = complete("https://app.test/cb").with_extra("host", "https://git.example.com");
	let mut manager = manager_with("gitlab", config);

	let redirect = manager.driver(Some("gitlab")).unwrap().redirect();

	assert!(
		redirect
			.url()
			.starts_with("https://git.example.com/oauth/authorize?")
	);
}

#[test]
fn test_twitter_falls_back_to_oauth2_config_key() {
	let config =
		SocialiteConfig::new().insert("twitter-oauth-2", complete("https://app.test/cb"));
	let mut manager = SocialiteManager::new(config);

	assert!(manager.driver(Some("twitter")).is_ok());
}

#[test]
fn test_x_falls_back_to_oauth2_config_key() {
	let config = SocialiteConfig::new().insert("x-oauth-2", complete("https://app.test/cb"));
	let mut manager = SocialiteManager::new(config);

	let provider = manager.driver(Some("x")).unwrap();

	assert_eq!(provider.driver_name(), "x");
}

#[test]
fn test_relative_redirect_resolves_against_base_url() {
	let mut manager = SocialiteManager::new(
		SocialiteConfig::new().insert("github", complete("/auth/github/callback")),
	)
	.base_url("https://app.test");

	let redirect = manager.driver(Some("github")).unwrap().redirect();

	assert!(
		redirect
			.url()
			.contains("redirect_uri=https%3A%2F%2Fapp.test%2Fauth%2Fgithub%2Fcallback")
	);
}

#[test]
fn test_relative_redirect_without_base_url_fails() {
	let mut manager = SocialiteManager::new(
		SocialiteConfig::new().insert("github", complete("/auth/github/callback")),
	);

	let result = manager.driver(Some("github"));

	assert!(matches!(result, Err(SocialiteError::Configuration(_))));
}

#[test]
fn test_unsupported_driver_name() {
	let mut manager = SocialiteManager::new(SocialiteConfig::new());

	let result = manager.driver(Some("myspace"));

	match result {
		Err(SocialiteError::InvalidArgument(message)) => {
			assert!(message.contains("myspace"));
		}
		other => panic!("expected InvalidArgument, got {other:?}"),
	}
}

#[test]
fn test_no_default_driver() {
	let mut manager = SocialiteManager::new(SocialiteConfig::new());

	assert!(matches!(
		manager.driver(None),
		Err(SocialiteError::InvalidArgument(_))
	));
}
