//! Facebook driver
//!
//! Two user-info paths exist. The usual one calls the Graph API with
//! an `appsecret_proof` request signature. Limited Login instead
//! returns an OIDC ID token in place of an opaque access token; that
//! token is verified against Facebook's JWKS and its claims are
//! reshaped into the Graph payload form so one mapper covers both.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use jsonwebtoken::{DecodingKey, Validation};
use serde_json::{Value, json};
use sha2::Sha256;
use tracing::debug;

use crate::driver::{Driver, DriverContext, optional_str, required_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::User;

const GRAPH_URL: &str = "https://graph.facebook.com";
const JWKS_URL: &str = "https://limited.facebook.com/.well-known/oauth/openid/jwks/";
const OIDC_ISSUER: &str = "https://www.facebook.com";
const DEFAULT_GRAPH_VERSION: &str = "v3.3";

/// Facebook OAuth2 driver.
#[derive(Debug)]
pub struct FacebookDriver {
	graph_version: String,
	fields: Vec<String>,
	popup: bool,
	re_request: bool,
}

impl Default for FacebookDriver {
	fn default() -> Self {
		Self {
			graph_version: DEFAULT_GRAPH_VERSION.to_string(),
			fields: ["name", "email", "gender", "verified", "link"]
				.map(str::to_owned)
				.to_vec(),
			popup: false,
			re_request: false,
		}
	}
}

impl FacebookDriver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the Graph profile fields requested.
	pub fn fields<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fields = fields.into_iter().map(Into::into).collect();
		self
	}

	/// Shows the authorization dialog as a popup.
	pub fn as_popup(mut self) -> Self {
		self.popup = true;
		self
	}

	/// Re-asks for permissions the user previously declined.
	pub fn re_request(mut self) -> Self {
		self.re_request = true;
		self
	}

	/// Pins a specific Graph API version.
	pub fn using_graph_version(mut self, version: impl Into<String>) -> Self {
		self.graph_version = version.into();
		self
	}

	async fn graph_user(
		&self,
		http: &reqwest::Client,
		ctx: &DriverContext<'_>,
		token: &str,
	) -> Result<Value, SocialiteError> {
		let proof = appsecret_proof(token, ctx.client_secret)?;
		let response = http
			.get(format!("{GRAPH_URL}/{}/me", self.graph_version))
			.query(&[
				("access_token", token),
				("appsecret_proof", proof.as_str()),
				("fields", self.fields.join(",").as_str()),
			])
			.header(reqwest::header::ACCEPT, "application/json")
			.send()
			.await?;

		user_info_json(response).await
	}

	/// A Limited Login "token" is a JWT whose header names a JWKS key.
	/// Anything else, dots or not, goes through the Graph API instead.
	fn limited_login_header(token: &str) -> Option<jsonwebtoken::Header> {
		let header = jsonwebtoken::decode_header(token).ok()?;
		header.kid.as_ref()?;

		Some(header)
	}

	async fn oidc_user(
		&self,
		http: &reqwest::Client,
		ctx: &DriverContext<'_>,
		token: &str,
		header: jsonwebtoken::Header,
	) -> Result<Value, SocialiteError> {
		debug!("verifying Limited Login ID token");

		let kid = header
			.kid
			.ok_or_else(|| SocialiteError::TokenValidation("ID token has no kid".to_string()))?;

		let response = http.get(JWKS_URL).send().await?;
		let jwks = user_info_json(response).await?;
		let key = decoding_key_for(&jwks, &kid)?;

		let mut validation = Validation::new(header.alg);
		validation.set_audience(&[ctx.client_id]);
		validation.set_issuer(&[OIDC_ISSUER]);

		let decoded = jsonwebtoken::decode::<Value>(token, &key, &validation)?;

		Ok(normalize_oidc_claims(decoded.claims))
	}
}

/// Computes the Graph API `appsecret_proof`: hex HMAC-SHA256 of the
/// access token keyed by the client secret.
fn appsecret_proof(token: &str, secret: &str) -> Result<String, SocialiteError> {
	let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
		.map_err(|e| SocialiteError::Configuration(format!("appsecret_proof: {e}")))?;
	mac.update(token.as_bytes());

	Ok(mac
		.finalize()
		.into_bytes()
		.iter()
		.map(|b| format!("{b:02x}"))
		.collect())
}

fn decoding_key_for(jwks: &Value, kid: &str) -> Result<DecodingKey, SocialiteError> {
	let key = jwks
		.get("keys")
		.and_then(Value::as_array)
		.and_then(|keys| {
			keys.iter()
				.find(|key| key.get("kid").and_then(Value::as_str) == Some(kid))
		})
		.ok_or_else(|| {
			SocialiteError::TokenValidation(format!("no JWKS key with kid `{kid}`"))
		})?;

	let n = key.get("n").and_then(Value::as_str).unwrap_or_default();
	let e = key.get("e").and_then(Value::as_str).unwrap_or_default();

	Ok(DecodingKey::from_rsa_components(n, e)?)
}

/// Aligns OIDC ID-token claims with the Graph payload keys: `id`,
/// `first_name` and `last_name` are derived in place, every other
/// claim (including `sub`) stays untouched.
fn normalize_oidc_claims(mut claims: Value) -> Value {
	if let Some(object) = claims.as_object_mut() {
		if let Some(sub) = object.get("sub").cloned() {
			object.insert("id".to_string(), sub);
		}
		if let Some(given_name) = object.get("given_name").cloned() {
			object.insert("first_name".to_string(), given_name);
		}
		if let Some(family_name) = object.get("family_name").cloned() {
			object.insert("last_name".to_string(), family_name);
		}
	}

	claims
}

#[async_trait]
impl Driver for FacebookDriver {
	fn name(&self) -> &str {
		"facebook"
	}

	fn authorize_endpoint(&self) -> String {
		format!("https://www.facebook.com/{}/dialog/oauth", self.graph_version)
	}

	fn token_endpoint(&self) -> String {
		format!("{GRAPH_URL}/{}/oauth/access_token", self.graph_version)
	}

	fn default_scopes(&self) -> Vec<String> {
		vec!["email".to_string()]
	}

	fn extra_code_fields(&self, _ctx: &DriverContext<'_>) -> Vec<(String, String)> {
		let mut fields = Vec::new();

		if self.popup {
			fields.push(("display".to_string(), "popup".to_string()));
		}
		if self.re_request {
			fields.push(("auth_type".to_string(), "rerequest".to_string()));
		}

		fields
	}

	/// Older Graph versions report the lifetime as `expires`.
	fn normalize_token_response(&self, mut value: Value) -> Result<Value, SocialiteError> {
		if let Some(object) = value.as_object_mut()
			&& let Some(expires) = object.remove("expires")
		{
			object.entry("expires_in").or_insert(expires);
		}

		Ok(value)
	}

	async fn raw_user(
		&self,
		http: &reqwest::Client,
		ctx: &DriverContext<'_>,
		token: &str,
	) -> Result<Value, SocialiteError> {
		match Self::limited_login_header(token) {
			Some(header) => self.oidc_user(http, ctx, token, header).await,
			None => self.graph_user(http, ctx, token).await,
		}
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = required_str(&raw, "id")?;

		// Limited Login payloads keep their `sub` claim; Graph
		// payloads never have one.
		let (avatar, avatar_original) = if raw.get("sub").is_some() {
			let picture = optional_str(&raw, "picture");
			(picture.clone(), picture)
		} else {
			let base = format!("{GRAPH_URL}/{}/{id}/picture", self.graph_version);
			let original = format!("{base}?width=1920");
			(Some(base), Some(original))
		};

		let mut user = User::mapped(id.into(), raw.clone());
		user.name = optional_str(&raw, "name");
		user.email = optional_str(&raw, "email");
		user.avatar = avatar;
		if let Some(avatar_original) = avatar_original {
			user.attributes.insert(
				"avatar_original".to_string(),
				Value::String(avatar_original),
			);
		}
		if let Some(link) = optional_str(&raw, "link") {
			user.attributes
				.insert("profileUrl".to_string(), Value::String(link));
		}

		Ok(user)
	}
}
