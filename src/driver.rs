//! Vendor driver trait
//!
//! A [`Driver`] supplies everything vendor-specific: endpoints, default
//! scopes, encoding quirks, the user-info fetch and the payload-to-user
//! mapping. The shared authorization-code protocol lives in
//! [`Provider`](crate::Provider) and calls into the driver at fixed
//! hook points.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SocialiteError;
use crate::query::QueryEncoding;
use crate::user::User;

/// How client credentials are presented to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenAuth {
	/// `client_id` and `client_secret` as form fields.
	#[default]
	Body,
	/// HTTP Basic authentication; only `client_id` appears in the body.
	Basic,
}

/// Read-only view of the provider state, passed to driver hooks.
#[derive(Debug, Clone, Copy)]
pub struct DriverContext<'a> {
	/// OAuth client identifier.
	pub client_id: &'a str,
	/// OAuth client secret.
	pub client_secret: &'a str,
	/// Resolved absolute callback URL.
	pub redirect_url: &'a str,
	/// Effective scope list.
	pub scopes: &'a [String],
	/// Whether CSRF state verification is disabled.
	pub stateless: bool,
}

/// Vendor-specific strategy for one OAuth provider.
#[async_trait]
pub trait Driver: Send + Sync {
	/// Canonical driver name (`"github"`, `"google"`, ...).
	fn name(&self) -> &str;

	/// The authorization endpoint URL.
	fn authorize_endpoint(&self) -> String;

	/// The token endpoint URL.
	fn token_endpoint(&self) -> String;

	/// Scopes requested when the host configures none.
	fn default_scopes(&self) -> Vec<String> {
		Vec::new()
	}

	/// Separator used when joining scopes into one value.
	fn scope_separator(&self) -> &str {
		","
	}

	/// Query-string encoding for the authorization URL.
	fn encoding(&self) -> QueryEncoding {
		QueryEncoding::Rfc1738
	}

	/// Whether this driver always performs the PKCE exchange.
	fn uses_pkce(&self) -> bool {
		false
	}

	/// How client credentials are sent during token exchange.
	fn token_auth(&self) -> TokenAuth {
		TokenAuth::Body
	}

	/// Extra authorization-URL fields appended after the standard set.
	fn extra_code_fields(&self, _ctx: &DriverContext<'_>) -> Vec<(String, String)> {
		Vec::new()
	}

	/// Replaces the standard `scope` field of the authorization URL.
	///
	/// Returns `None` to keep the standard single `scope` field. Slack
	/// overrides this to split scopes between `scope` and `user_scope`.
	fn scope_code_fields(&self, _ctx: &DriverContext<'_>) -> Option<Vec<(String, String)>> {
		None
	}

	/// Rewrites a token endpoint payload into the standard shape before
	/// decoding. Facebook renames `expires` and Slack unwraps the
	/// `authed_user` object here.
	fn normalize_token_response(&self, value: Value) -> Result<Value, SocialiteError> {
		Ok(value)
	}

	/// Fetches the raw user payload for `token` from the vendor.
	async fn raw_user(
		&self,
		http: &reqwest::Client,
		ctx: &DriverContext<'_>,
		token: &str,
	) -> Result<Value, SocialiteError>;

	/// Maps a raw vendor payload to the normalized [`User`].
	fn map_user(&self, raw: Value) -> Result<User, SocialiteError>;

	/// Exchanges a refresh token for a new token payload.
	///
	/// The default posts `grant_type=refresh_token` with body
	/// credentials; drivers with different refresh semantics override.
	async fn refresh_token_response(
		&self,
		http: &reqwest::Client,
		ctx: &DriverContext<'_>,
		refresh_token: &str,
	) -> Result<Value, SocialiteError> {
		let form = vec![
			("grant_type".to_string(), "refresh_token".to_string()),
			("client_id".to_string(), ctx.client_id.to_string()),
			("client_secret".to_string(), ctx.client_secret.to_string()),
			("refresh_token".to_string(), refresh_token.to_string()),
		];

		let response = http
			.post(self.token_endpoint())
			.header(reqwest::header::ACCEPT, "application/json")
			.form(&form)
			.send()
			.await?;

		token_exchange_json(response).await
	}
}

/// Decodes a token endpoint response, mapping non-success statuses to
/// [`SocialiteError::TokenExchange`].
pub(crate) async fn token_exchange_json(
	response: reqwest::Response,
) -> Result<Value, SocialiteError> {
	let status = response.status();
	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();

		return Err(SocialiteError::TokenExchange(format!(
			"status {status}: {body}"
		)));
	}

	Ok(response.json().await?)
}

/// Decodes a user-info response, mapping non-success statuses to
/// [`SocialiteError::UserInfo`].
pub(crate) async fn user_info_json(response: reqwest::Response) -> Result<Value, SocialiteError> {
	let status = response.status();
	if !status.is_success() {
		let body = response.text().await.unwrap_or_default();

		return Err(SocialiteError::UserInfo(format!("status {status}: {body}")));
	}

	Ok(response.json().await?)
}

/// Reads a required string field from a raw payload, failing with
/// [`SocialiteError::UserMapping`] when it is absent.
pub(crate) fn required_str(raw: &Value, key: &str) -> Result<String, SocialiteError> {
	raw.get(key)
		.and_then(Value::as_str)
		.map(str::to_owned)
		.ok_or_else(|| SocialiteError::UserMapping(format!("missing field `{key}`")))
}

/// Reads an optional string field from a raw payload.
pub(crate) fn optional_str(raw: &Value, key: &str) -> Option<String> {
	raw.get(key).and_then(Value::as_str).map(str::to_owned)
}
