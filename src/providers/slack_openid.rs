//! Slack OpenID Connect driver
//!
//! The OIDC variant of Slack sign-in. Claims are flat except the team
//! identifier, which Slack namespaces under its own URL.

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{Driver, DriverContext, optional_str, required_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::User;

const USER_URL: &str = "https://slack.com/api/openid.connect.userInfo";
const TEAM_ID_CLAIM: &str = "https://slack.com/team_id";

/// Slack OpenID Connect driver.
#[derive(Debug, Default)]
pub struct SlackOpenIdDriver;

impl SlackOpenIdDriver {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Driver for SlackOpenIdDriver {
	fn name(&self) -> &str {
		"slack-openid"
	}

	fn authorize_endpoint(&self) -> String {
		"https://slack.com/openid/connect/authorize".to_string()
	}

	fn token_endpoint(&self) -> String {
		"https://slack.com/api/openid.connect.token".to_string()
	}

	fn default_scopes(&self) -> Vec<String> {
		vec![
			"openid".to_string(),
			"email".to_string(),
			"profile".to_string(),
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
		let response = http.get(USER_URL).bearer_auth(token).send().await?;

		user_info_json(response).await
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = required_str(&raw, "sub")?;

		let organization_id = raw.get(TEAM_ID_CLAIM).cloned();

		let mut user = User::mapped(id.into(), raw.clone());
		user.name = optional_str(&raw, "name");
		user.email = optional_str(&raw, "email");
		user.avatar = optional_str(&raw, "picture");
		if let Some(organization_id) = organization_id {
			user.attributes
				.insert("organization_id".to_string(), organization_id);
		}

		Ok(user)
	}
}
