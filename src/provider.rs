//! Shared authorization-code protocol
//!
//! [`Provider`] owns one boxed [`Driver`] and runs the whole OAuth2
//! authorization-code flow around it: building the redirect, verifying
//! CSRF state, exchanging the code, fetching and normalizing the user.
//! Everything vendor-specific is delegated to the driver.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::driver::{Driver, DriverContext, TokenAuth, token_exchange_json};
use crate::error::SocialiteError;
use crate::pkce;
use crate::query;
use crate::request::{CallbackRequest, Redirect};
use crate::session::{CODE_VERIFIER_KEY, STATE_KEY, SessionStore};
use crate::token::{Token, TokenResponse};
use crate::user::User;

/// An OAuth2 provider: the shared protocol wrapped around one vendor
/// driver.
pub struct Provider {
	driver: Box<dyn Driver>,
	client_id: String,
	client_secret: String,
	redirect_url: String,
	scopes: Vec<String>,
	parameters: Vec<(String, String)>,
	stateless: bool,
	use_pkce: bool,
	http: reqwest::Client,
	session: Arc<dyn SessionStore>,
	user: Option<User>,
}

impl Provider {
	/// Wraps `driver` with credentials, a session store and an HTTP
	/// client. Scopes start at the driver's defaults.
	pub fn new(
		driver: Box<dyn Driver>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_url: impl Into<String>,
		session: Arc<dyn SessionStore>,
		http: reqwest::Client,
	) -> Self {
		let scopes = driver.default_scopes();
		let use_pkce = driver.uses_pkce();

		Self {
			driver,
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			redirect_url: redirect_url.into(),
			scopes,
			parameters: Vec::new(),
			stateless: false,
			use_pkce,
			http,
			session,
			user: None,
		}
	}

	/// The driver's canonical name.
	pub fn driver_name(&self) -> &str {
		self.driver.name()
	}

	/// The current effective scope list.
	pub fn current_scopes(&self) -> &[String] {
		&self.scopes
	}

	/// Merges `scopes` into the current list, keeping first-occurrence
	/// order and dropping duplicates.
	pub fn scopes<I, S>(&mut self, scopes: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for scope in scopes {
			let scope = scope.into();
			if !self.scopes.contains(&scope) {
				self.scopes.push(scope);
			}
		}
		self
	}

	/// Replaces the scope list entirely.
	pub fn set_scopes<I, S>(&mut self, scopes: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();
		self.scopes.dedup();
		self
	}

	/// Overrides the callback URL.
	pub fn redirect_url(&mut self, url: impl Into<String>) -> &mut Self {
		self.redirect_url = url.into();
		self
	}

	/// Disables CSRF state generation and verification.
	pub fn stateless(&mut self) -> &mut Self {
		self.stateless = true;
		self
	}

	/// Opts in to the PKCE exchange.
	pub fn enable_pkce(&mut self) -> &mut Self {
		self.use_pkce = true;
		self
	}

	/// Replaces the custom parameter set wholesale. Custom parameters
	/// are merged over the computed fields, so one with a matching key
	/// overrides the computed value.
	pub fn with<I, K, V>(&mut self, parameters: I) -> &mut Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.parameters = parameters
			.into_iter()
			.map(|(key, value)| (key.into(), value.into()))
			.collect();
		self
	}

	/// Replaces the HTTP client used for vendor requests.
	pub fn set_http_client(&mut self, http: reqwest::Client) -> &mut Self {
		self.http = http;
		self
	}

	fn context(&self) -> DriverContext<'_> {
		DriverContext {
			client_id: &self.client_id,
			client_secret: &self.client_secret,
			redirect_url: &self.redirect_url,
			scopes: &self.scopes,
			stateless: self.stateless,
		}
	}

	/// Begins the flow: stores session artifacts and returns the
	/// redirect to the vendor's authorization endpoint.
	pub fn redirect(&self) -> Redirect {
		let state = if self.stateless {
			None
		} else {
			let state = pkce::generate_state();
			self.session.set(STATE_KEY, state.clone());
			Some(state)
		};

		let challenge = if self.use_pkce {
			let verifier = pkce::generate_code_verifier();
			let challenge = pkce::code_challenge(&verifier);
			self.session.set(CODE_VERIFIER_KEY, verifier);
			Some(challenge)
		} else {
			None
		};

		Redirect::to(self.authorization_url(state.as_deref(), challenge.as_deref()))
	}

	fn authorization_url(&self, state: Option<&str>, challenge: Option<&str>) -> String {
		let ctx = self.context();
		let mut fields: Vec<(String, String)> = vec![
			("client_id".to_string(), self.client_id.clone()),
			("redirect_uri".to_string(), self.redirect_url.clone()),
		];

		match self.driver.scope_code_fields(&ctx) {
			Some(scope_fields) => fields.extend(scope_fields),
			None => fields.push((
				"scope".to_string(),
				query::format_scopes(&self.scopes, self.driver.scope_separator()),
			)),
		}
		fields.push(("response_type".to_string(), "code".to_string()));

		if let Some(state) = state {
			fields.push(("state".to_string(), state.to_string()));
		}
		if let Some(challenge) = challenge {
			fields.push(("code_challenge".to_string(), challenge.to_string()));
			fields.push((
				"code_challenge_method".to_string(),
				pkce::CODE_CHALLENGE_METHOD.to_string(),
			));
		}

		for (key, value) in &self.parameters {
			query::merge_field(&mut fields, key.clone(), value.clone());
		}
		for (key, value) in self.driver.extra_code_fields(&ctx) {
			query::merge_field(&mut fields, key, value);
		}

		let encoding = self.driver.encoding();
		format!(
			"{}?{}",
			self.driver.authorize_endpoint(),
			query::build_query(&fields, encoding)
		)
	}

	fn has_invalid_state(&self, request: &dyn CallbackRequest) -> bool {
		if self.stateless {
			return false;
		}

		// Read-then-delete: state is single use even when verification
		// fails afterwards.
		let stored = self.session.remove(STATE_KEY).unwrap_or_default();

		stored.is_empty() || request.query_param("state").as_deref() != Some(stored.as_str())
	}

	/// Completes the flow: verifies state, exchanges the code and
	/// returns the normalized user. The result is cached for the
	/// lifetime of this provider instance.
	pub async fn user(&mut self, request: &dyn CallbackRequest) -> Result<User, SocialiteError> {
		if let Some(user) = &self.user {
			return Ok(user.clone());
		}

		if self.has_invalid_state(request) {
			return Err(SocialiteError::InvalidState);
		}

		let code = request
			.query_param("code")
			.ok_or(SocialiteError::MissingCode)?;

		let response = self.access_token_response(&code).await?;
		let token = response.access_token.clone();

		let raw = self
			.driver
			.raw_user(&self.http, &self.context(), &token)
			.await?;
		let mut user = self.driver.map_user(raw)?;
		user.token = token;
		user.refresh_token = response.refresh_token.clone();
		user.expires_in = response.expires_in;
		user.approved_scopes = response.approved_scopes(self.driver.scope_separator());

		debug!(driver = self.driver.name(), user_id = %user.id, "resolved social user");

		self.user = Some(user.clone());
		Ok(user)
	}

	/// Fetches the user behind an already-obtained access token. No
	/// state or code is involved; only `token` is set on the result.
	pub async fn user_from_token(&self, token: &str) -> Result<User, SocialiteError> {
		let raw = self
			.driver
			.raw_user(&self.http, &self.context(), token)
			.await?;
		let mut user = self.driver.map_user(raw)?;
		user.token = token.to_string();

		Ok(user)
	}

	/// Exchanges the authorization code for a token payload.
	pub async fn access_token_response(
		&self,
		code: &str,
	) -> Result<TokenResponse, SocialiteError> {
		let token_auth = self.driver.token_auth();
		let mut form = vec![
			(
				"grant_type".to_string(),
				"authorization_code".to_string(),
			),
			("client_id".to_string(), self.client_id.clone()),
		];
		if token_auth == TokenAuth::Body {
			form.push(("client_secret".to_string(), self.client_secret.clone()));
		}
		form.push(("code".to_string(), code.to_string()));
		form.push(("redirect_uri".to_string(), self.redirect_url.clone()));

		if self.use_pkce {
			// The verifier is single use, like the state token.
			let verifier = self
				.session
				.remove(CODE_VERIFIER_KEY)
				.ok_or_else(|| {
					SocialiteError::TokenExchange("code verifier missing from session".to_string())
				})?;
			form.push(("code_verifier".to_string(), verifier));
		}

		for (key, value) in &self.parameters {
			query::merge_field(&mut form, key.clone(), value.clone());
		}

		debug!(driver = self.driver.name(), "exchanging authorization code");

		let mut builder = self
			.http
			.post(self.driver.token_endpoint())
			.header(reqwest::header::ACCEPT, "application/json")
			.form(&form);
		if token_auth == TokenAuth::Basic {
			builder = builder.basic_auth(&self.client_id, Some(&self.client_secret));
		}

		let value = token_exchange_json(builder.send().await?).await?;
		let value = self.driver.normalize_token_response(value)?;

		TokenResponse::from_value(value)
	}

	/// Exchanges a refresh token for a fresh [`Token`] bundle.
	pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token, SocialiteError> {
		debug!(driver = self.driver.name(), "refreshing access token");

		let value = self
			.driver
			.refresh_token_response(&self.http, &self.context(), refresh_token)
			.await?;
		let value = self.driver.normalize_token_response(value)?;
		let response = TokenResponse::from_value(value)?;
		let approved_scopes = response.approved_scopes(self.driver.scope_separator());

		Ok(Token {
			access_token: response.access_token,
			refresh_token: response.refresh_token,
			expires_in: response.expires_in,
			approved_scopes,
		})
	}

	#[cfg(test)]
	pub(crate) fn authorization_url_for_test(
		&self,
		state: Option<&str>,
		challenge: Option<&str>,
	) -> String {
		self.authorization_url(state, challenge)
	}

	#[cfg(test)]
	pub(crate) fn session_handle(&self) -> Arc<dyn SessionStore> {
		Arc::clone(&self.session)
	}
}

impl std::fmt::Debug for Provider {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Provider")
			.field("driver", &self.driver.name())
			.field("redirect_url", &self.redirect_url)
			.field("scopes", &self.scopes)
			.field("stateless", &self.stateless)
			.field("use_pkce", &self.use_pkce)
			.finish_non_exhaustive()
	}
}
