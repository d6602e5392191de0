//! GitLab driver
//!
//! Works against gitlab.com by default; self-hosted instances are
//! supported through [`GitlabDriver::with_host`] or the `host`
//! configuration key.

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{Driver, DriverContext, optional_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::{User, UserId};

const DEFAULT_HOST: &str = "https://gitlab.com";

/// GitLab OAuth2 driver.
#[derive(Debug)]
pub struct GitlabDriver {
	host: String,
}

impl Default for GitlabDriver {
	fn default() -> Self {
		Self {
			host: DEFAULT_HOST.to_string(),
		}
	}
}

impl GitlabDriver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Points the driver at a self-hosted instance.
	pub fn with_host(host: impl Into<String>) -> Self {
		let host = host.into();

		Self {
			host: host.trim_end_matches('/').to_string(),
		}
	}
}

#[async_trait]
impl Driver for GitlabDriver {
	fn name(&self) -> &str {
		"gitlab"
	}

	fn authorize_endpoint(&self) -> String {
		format!("{}/oauth/authorize", self.host)
	}

	fn token_endpoint(&self) -> String {
		format!("{}/oauth/token", self.host)
	}

	fn default_scopes(&self) -> Vec<String> {
		vec!["read_user".to_string()]
	}

	fn scope_separator(&self) -> &str {
		" "
	}

	async fn raw_user(
		&self,
		http: &reqwest::Client,
		_ctx: &DriverContext<'_>,
		token: &str,
	) -> Result<Value, SocialiteError> {
		let response = http
			.get(format!("{}/api/v3/user", self.host))
			.query(&[("access_token", token)])
			.send()
			.await?;

		user_info_json(response).await
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = raw
			.get("id")
			.and_then(Value::as_i64)
			.ok_or_else(|| SocialiteError::UserMapping("missing field `id`".to_string()))?;

		let mut user = User::mapped(UserId::Number(id), raw.clone());
		user.nickname = optional_str(&raw, "username");
		user.name = optional_str(&raw, "name");
		user.email = optional_str(&raw, "email");
		user.avatar = optional_str(&raw, "avatar_url");

		Ok(user)
	}
}
