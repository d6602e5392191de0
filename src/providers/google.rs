//! Google driver

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{Driver, DriverContext, optional_str, required_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::User;

const USER_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Google OAuth2 / OpenID Connect driver.
#[derive(Debug, Default)]
pub struct GoogleDriver;

impl GoogleDriver {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Driver for GoogleDriver {
	fn name(&self) -> &str {
		"google"
	}

	fn authorize_endpoint(&self) -> String {
		"https://accounts.google.com/o/oauth2/auth".to_string()
	}

	fn token_endpoint(&self) -> String {
		"https://www.googleapis.com/oauth2/v4/token".to_string()
	}

	fn default_scopes(&self) -> Vec<String> {
		vec![
			"openid".to_string(),
			"profile".to_string(),
			"email".to_string(),
		]
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
			.get(USER_URL)
			.query(&[("prettyPrint", "false")])
			.bearer_auth(token)
			.send()
			.await?;

		user_info_json(response).await
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = required_str(&raw, "sub")?;
		let avatar = optional_str(&raw, "picture");

		let mut user = User::mapped(id.into(), raw.clone());
		user.nickname = optional_str(&raw, "nickname");
		user.name = optional_str(&raw, "name");
		user.email = optional_str(&raw, "email");
		user.avatar = avatar.clone();
		if let Some(avatar) = avatar {
			user.attributes
				.insert("avatar_original".to_string(), Value::String(avatar));
		}

		Ok(user)
	}
}
