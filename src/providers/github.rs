//! GitHub driver
//!
//! The profile endpoint omits private email addresses, so when an
//! email-capable scope is present a second request to `/user/emails`
//! picks the primary verified address. That lookup is best effort:
//! any failure leaves the email unset instead of failing the flow.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::driver::{Driver, DriverContext, optional_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::{User, UserId};

const USER_URL: &str = "https://api.github.com/user";
const EMAILS_URL: &str = "https://api.github.com/user/emails";

/// GitHub OAuth2 driver.
#[derive(Debug, Default)]
pub struct GithubDriver;

impl GithubDriver {
	pub fn new() -> Self {
		Self
	}

	fn wants_email(scopes: &[String]) -> bool {
		scopes.iter().any(|s| s == "user:email")
	}

	async fn email_by_token(&self, http: &reqwest::Client, token: &str) -> Option<String> {
		let response = http
			.get(EMAILS_URL)
			.header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
			.header(reqwest::header::AUTHORIZATION, format!("token {token}"))
			.send()
			.await
			.ok()?;
		let emails: Value = user_info_json(response).await.ok()?;

		primary_verified_email(&emails)
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

/// Picks the address flagged both `primary` and `verified`.
fn primary_verified_email(emails: &Value) -> Option<String> {
	emails.as_array()?.iter().find_map(|entry| {
		let primary = entry.get("primary").and_then(Value::as_bool)?;
		let verified = entry.get("verified").and_then(Value::as_bool)?;

		(primary && verified)
			.then(|| entry.get("email").and_then(Value::as_str).map(str::to_owned))
			.flatten()
	})
}

#[async_trait]
impl Driver for GithubDriver {
	fn name(&self) -> &str {
		"github"
	}

	fn authorize_endpoint(&self) -> String {
		"https://github.com/login/oauth/authorize".to_string()
	}

	fn token_endpoint(&self) -> String {
		"https://github.com/login/oauth/access_token".to_string()
	}

	fn default_scopes(&self) -> Vec<String> {
		vec!["user:email".to_string()]
	}

	async fn raw_user(
		&self,
		http: &reqwest::Client,
		ctx: &DriverContext<'_>,
		token: &str,
	) -> Result<Value, SocialiteError> {
		let response = http
			.get(USER_URL)
			.header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
			.header(reqwest::header::AUTHORIZATION, format!("token {token}"))
			.send()
			.await?;
		let mut raw = user_info_json(response).await?;

		if Self::wants_email(ctx.scopes) {
			let email = self.email_by_token(http, token).await;
			debug!(found = email.is_some(), "looked up primary email");
			merge_email(&mut raw, email);
		}

		Ok(raw)
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = raw
			.get("id")
			.and_then(Value::as_i64)
			.ok_or_else(|| SocialiteError::UserMapping("missing field `id`".to_string()))?;

		let mut user = User::mapped(UserId::Number(id), raw.clone());
		user.nickname = optional_str(&raw, "login");
		user.name = optional_str(&raw, "name");
		user.email = optional_str(&raw, "email");
		user.avatar = optional_str(&raw, "avatar_url");

		Ok(user)
	}
}
