//! Twitch driver
//!
//! Helix wraps single resources in a `data` array; the first element
//! is the authenticated user. The token endpoint sometimes reports
//! scopes as a JSON array rather than a joined string, which the token
//! decoding already accepts.

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{Driver, DriverContext, optional_str, required_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::User;

const USER_URL: &str = "https://api.twitch.tv/helix/users";

/// Twitch OAuth2 driver.
#[derive(Debug, Default)]
pub struct TwitchDriver;

impl TwitchDriver {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Driver for TwitchDriver {
	fn name(&self) -> &str {
		"twitch"
	}

	fn authorize_endpoint(&self) -> String {
		"https://id.twitch.tv/oauth2/authorize".to_string()
	}

	fn token_endpoint(&self) -> String {
		"https://id.twitch.tv/oauth2/token".to_string()
	}

	fn default_scopes(&self) -> Vec<String> {
		vec!["user:read:email".to_string()]
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
		let response = http
			.get(USER_URL)
			.bearer_auth(token)
			.header("Client-ID", ctx.client_id)
			.send()
			.await?;
		let mut payload = user_info_json(response).await?;

		payload
			.get_mut("data")
			.and_then(|data| data.get_mut(0))
			.map(Value::take)
			.ok_or_else(|| {
				SocialiteError::InvalidResponse("helix users payload has no data".to_string())
			})
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = required_str(&raw, "id")?;

		let mut user = User::mapped(id.into(), raw.clone());
		user.nickname = optional_str(&raw, "login");
		user.name = optional_str(&raw, "display_name");
		user.email = optional_str(&raw, "email");
		user.avatar = optional_str(&raw, "profile_image_url");

		Ok(user)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::user::UserId;
	use serde_json::json;

	#[test]
	fn test_map_user() {
		let driver = TwitchDriver::new();
		let raw = json!({
			"id": "141981764",
			"login": "twitchdev",
			"display_name": "TwitchDev",
			"email": "dev@twitch.test",
			"profile_image_url": "https://static.twitch.test/photo.png"
		});

		let user = driver.map_user(raw).unwrap();

		assert_eq!(user.id, UserId::String("141981764".to_string()));
		assert_eq!(user.nickname.as_deref(), Some("twitchdev"));
		assert_eq!(user.name.as_deref(), Some("TwitchDev"));
	}

	#[test]
	fn test_scope_separator_is_space() {
		assert_eq!(TwitchDriver::new().scope_separator(), " ");
	}
}
