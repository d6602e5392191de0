//! Token exchange response types

use serde::Deserialize;
use serde_json::Value;

use crate::error::SocialiteError;

/// Approved scopes as returned by a token endpoint.
///
/// Most vendors return a joined string; some (Twitch) return an array
/// depending on the response shape. Both normalize to a list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ScopeList {
	/// Scopes joined with the provider's separator.
	Joined(String),
	/// Scopes as a JSON array.
	List(Vec<String>),
}

impl ScopeList {
	/// Normalizes to a list, splitting joined strings on `separator`.
	pub fn into_vec(self, separator: &str) -> Vec<String> {
		match self {
			ScopeList::Joined(joined) => joined
				.split(separator)
				.filter(|s| !s.is_empty())
				.map(str::to_owned)
				.collect(),
			ScopeList::List(list) => list,
		}
	}
}

/// The intermediate result of an authorization-code or refresh-token
/// exchange. Not persisted by the core.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
	/// The access token.
	pub access_token: String,

	/// Refresh token, where the vendor supports it.
	#[serde(default)]
	pub refresh_token: Option<String>,

	/// Access token lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<u64>,

	/// Scopes approved by the user.
	#[serde(default)]
	pub scope: Option<ScopeList>,
}

impl TokenResponse {
	/// Decodes a (possibly driver-normalized) token endpoint payload.
	pub(crate) fn from_value(value: Value) -> Result<Self, SocialiteError> {
		serde_json::from_value(value)
			.map_err(|e| SocialiteError::InvalidResponse(format!("token response: {e}")))
	}

	/// The approved scopes, split on `separator` when joined. Absent
	/// scope fields yield an empty list.
	pub fn approved_scopes(&self, separator: &str) -> Vec<String> {
		self.scope
			.clone()
			.map(|s| s.into_vec(separator))
			.unwrap_or_default()
	}
}

/// A standalone token bundle returned by
/// [`Provider::refresh_token`](crate::Provider::refresh_token).
///
/// Callers needing a fresh user record must re-fetch it separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	/// The access token.
	pub access_token: String,
	/// Refresh token, where the vendor supports it.
	pub refresh_token: Option<String>,
	/// Access token lifetime in seconds.
	pub expires_in: Option<u64>,
	/// Scopes approved by the user.
	pub approved_scopes: Vec<String>,
}
