//! Bitbucket driver

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{Driver, DriverContext, optional_str, required_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::User;

const USER_URL: &str = "https://api.bitbucket.org/2.0/user";
const EMAILS_URL: &str = "https://api.bitbucket.org/2.0/user/emails";

/// Bitbucket OAuth2 driver.
#[derive(Debug, Default)]
pub struct BitbucketDriver;

impl BitbucketDriver {
	pub fn new() -> Self {
		Self
	}

	/// Best-effort lookup of the primary confirmed address; failures
	/// leave the email unset.
	async fn email_by_token(&self, http: &reqwest::Client, token: &str) -> Option<String> {
		let response = http.get(EMAILS_URL).bearer_auth(token).send().await.ok()?;
		let emails: Value = user_info_json(response).await.ok()?;

		primary_confirmed_email(&emails)
	}
}

/// Writes the lookup result into the profile, null on a miss. Leaves
/// non-object payloads alone rather than indexing into them.
fn merge_email(raw: &mut Value, email: Option<String>) {
	if let Some(object) = raw.as_object_mut() {
		object.insert(
			"email".to_string(),
			email.map(Value::String).unwrap_or(Value::Null),
		);
	}
}

fn primary_confirmed_email(emails: &Value) -> Option<String> {
	emails
		.get("values")?
		.as_array()?
		.iter()
		.find_map(|entry| {
			let is_email = entry.get("type").and_then(Value::as_str) == Some("email");
			let primary = entry.get("is_primary").and_then(Value::as_bool) == Some(true);
			let confirmed = entry.get("is_confirmed").and_then(Value::as_bool) == Some(true);

			(is_email && primary && confirmed)
				.then(|| entry.get("email").and_then(Value::as_str).map(str::to_owned))
				.flatten()
		})
}

#[async_trait]
impl Driver for BitbucketDriver {
	fn name(&self) -> &str {
		"bitbucket"
	}

	fn authorize_endpoint(&self) -> String {
		"https://bitbucket.org/site/oauth2/authorize".to_string()
	}

	fn token_endpoint(&self) -> String {
		"https://bitbucket.org/site/oauth2/access_token".to_string()
	}

	fn default_scopes(&self) -> Vec<String> {
		vec!["email".to_string()]
	}

	fn scope_separator(&self) -> &str {
		" "
	}

	async fn raw_user(
		&self,
		http: &reqwest::Client,
		ctx: &DriverContext<'_>,
		token: &str,
	) -> Result<Value, SocialiteError> {
		let response = http.get(USER_URL).bearer_auth(token).send().await?;
		let mut raw = user_info_json(response).await?;

		if ctx.scopes.iter().any(|s| s == "email") {
			let email = self.email_by_token(http, token).await;
			merge_email(&mut raw, email);
		}

		Ok(raw)
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = required_str(&raw, "uuid")?;

		let avatar = raw
			.get("links")
			.and_then(|links| links.get("avatar"))
			.and_then(|avatar| avatar.get("href"))
			.and_then(Value::as_str)
			.map(str::to_owned);

		let mut user = User::mapped(id.into(), raw.clone());
		user.nickname = optional_str(&raw, "username");
		user.name = optional_str(&raw, "display_name");
		user.email = optional_str(&raw, "email");
		user.avatar = avatar;

		Ok(user)
	}
}
