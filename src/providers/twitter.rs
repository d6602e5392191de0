//! Twitter / X driver (OAuth 2.0 with PKCE)
//!
//! The v2 API mandates PKCE and HTTP Basic client authentication, and
//! expects RFC 3986 percent encoding in the authorization URL. The X
//! rebrand kept the protocol and moved the endpoints; both generations
//! share this driver.

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{
	Driver, DriverContext, TokenAuth, optional_str, required_str, token_exchange_json,
	user_info_json,
};
use crate::error::SocialiteError;
use crate::query::QueryEncoding;
use crate::user::User;

/// Twitter / X OAuth2 driver.
#[derive(Debug)]
pub struct TwitterDriver {
	name: &'static str,
	authorize_url: &'static str,
	token_url: &'static str,
	user_url: &'static str,
}

impl TwitterDriver {
	/// The twitter.com generation of endpoints.
	pub fn new() -> Self {
		Self {
			name: "twitter",
			authorize_url: "https://twitter.com/i/oauth2/authorize",
			token_url: "https://api.twitter.com/2/oauth2/token",
			user_url: "https://api.twitter.com/2/users/me",
		}
	}

	/// The x.com generation of endpoints.
	pub fn x() -> Self {
		Self {
			name: "x",
			authorize_url: "https://x.com/i/oauth2/authorize",
			token_url: "https://api.x.com/2/oauth2/token",
			user_url: "https://api.x.com/2/users/me",
		}
	}
}

impl Default for TwitterDriver {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Driver for TwitterDriver {
	fn name(&self) -> &str {
		self.name
	}

	fn authorize_endpoint(&self) -> String {
		self.authorize_url.to_string()
	}

	fn token_endpoint(&self) -> String {
		self.token_url.to_string()
	}

	fn default_scopes(&self) -> Vec<String> {
		vec!["tweet.read".to_string(), "users.read".to_string()]
	}

	fn scope_separator(&self) -> &str {
		" "
	}

	fn encoding(&self) -> QueryEncoding {
		QueryEncoding::Rfc3986
	}

	fn uses_pkce(&self) -> bool {
		true
	}

	fn token_auth(&self) -> TokenAuth {
		TokenAuth::Basic
	}

	/// The endpoint rejects requests without a `state` field, so the
	/// stateless flow sends the literal placeholder `state`.
	fn extra_code_fields(&self, ctx: &DriverContext<'_>) -> Vec<(String, String)> {
		if ctx.stateless {
			vec![("state".to_string(), "state".to_string())]
		} else {
			Vec::new()
		}
	}

	async fn raw_user(
		&self,
		http: &reqwest::Client,
		_ctx: &DriverContext<'_>,
		token: &str,
	) -> Result<Value, SocialiteError> {
		let response = http
			.get(self.user_url)
			.query(&[("user.fields", "profile_image_url")])
			.bearer_auth(token)
			.send()
			.await?;
		let mut payload = user_info_json(response).await?;

		payload
			.get_mut("data")
			.map(Value::take)
			.ok_or_else(|| {
				SocialiteError::InvalidResponse("users/me payload has no data".to_string())
			})
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = required_str(&raw, "id")?;

		let mut user = User::mapped(id.into(), raw.clone());
		user.nickname = optional_str(&raw, "username");
		user.name = optional_str(&raw, "name");
		user.avatar = optional_str(&raw, "profile_image_url");

		Ok(user)
	}

	/// Refresh also authenticates with Basic credentials; the secret
	/// never appears in the body.
	async fn refresh_token_response(
		&self,
		http: &reqwest::Client,
		ctx: &DriverContext<'_>,
		refresh_token: &str,
	) -> Result<Value, SocialiteError> {
		let form = vec![
			("grant_type".to_string(), "refresh_token".to_string()),
			("client_id".to_string(), ctx.client_id.to_string()),
			("refresh_token".to_string(), refresh_token.to_string()),
		];

		let response = http
			.post(self.token_url)
			.header(reqwest::header::ACCEPT, "application/json")
			.basic_auth(ctx.client_id, Some(ctx.client_secret))
			.form(&form)
			.send()
			.await?;

		token_exchange_json(response).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::user::UserId;
	use serde_json::json;

	#[test]
	fn test_map_user() {
		let driver = TwitterDriver::new();
		let raw = json!({
			"id": "2244994945",
			"name": "X Dev",
			"username": "XDevelopers",
			"profile_image_url": "https://pbs.twimg.test/photo.jpg"
		});

		let user = driver.map_user(raw).unwrap();

		assert_eq!(user.id, UserId::String("2244994945".to_string()));
		assert_eq!(user.nickname.as_deref(), Some("XDevelopers"));
		assert!(user.email.is_none());
	}

	#[test]
	fn test_protocol_settings() {
		let driver = TwitterDriver::new();

		assert!(driver.uses_pkce());
		assert_eq!(driver.token_auth(), TokenAuth::Basic);
		assert_eq!(driver.encoding(), QueryEncoding::Rfc3986);
		assert_eq!(driver.scope_separator(), " ");
	}

	#[test]
	fn test_stateless_sends_placeholder_state() {
		let driver = TwitterDriver::new();
		let ctx = DriverContext {
			client_id: "cid",
			client_secret: "secret",
			redirect_url: "https://app.test/cb",
			scopes: &[],
			stateless: true,
		};

		assert_eq!(
			driver.extra_code_fields(&ctx),
			vec![("state".to_string(), "state".to_string())]
		);

		let stateful = DriverContext { stateless: false, ..ctx };
		assert!(driver.extra_code_fields(&stateful).is_empty());
	}

	#[test]
	fn test_x_endpoints() {
		let driver = TwitterDriver::x();

		assert_eq!(driver.name(), "x");
		assert_eq!(driver.authorize_endpoint(), "https://x.com/i/oauth2/authorize");
		assert_eq!(driver.token_endpoint(), "https://api.x.com/2/oauth2/token");
	}
}
