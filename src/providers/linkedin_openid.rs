//! LinkedIn OpenID Connect driver
//!
//! LinkedIn's newer sign-in product; a single `userinfo` call replaces
//! the projected lite-profile endpoints.

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{Driver, DriverContext, optional_str, required_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::User;

const USER_URL: &str = "https://api.linkedin.com/v2/userinfo";

/// LinkedIn OpenID Connect driver.
#[derive(Debug, Default)]
pub struct LinkedInOpenIdDriver;

impl LinkedInOpenIdDriver {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Driver for LinkedInOpenIdDriver {
	fn name(&self) -> &str {
		"linkedin-openid"
	}

	fn authorize_endpoint(&self) -> String {
		"https://www.linkedin.com/oauth/v2/authorization".to_string()
	}

	fn token_endpoint(&self) -> String {
		"https://www.linkedin.com/oauth/v2/accessToken".to_string()
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
			.bearer_auth(token)
			.header("X-RestLi-Protocol-Version", "2.0.0")
			.send()
			.await?;

		user_info_json(response).await
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = required_str(&raw, "sub")?;

		let mut user = User::mapped(id.into(), raw.clone());
		user.name = optional_str(&raw, "name");
		user.email = optional_str(&raw, "email");
		user.avatar = optional_str(&raw, "picture");
		for (claim, attribute) in [("given_name", "first_name"), ("family_name", "last_name")] {
			if let Some(value) = raw.get(claim) {
				user.attributes.insert(attribute.to_string(), value.clone());
			}
		}

		Ok(user)
	}
}
