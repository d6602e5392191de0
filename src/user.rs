//! Normalized user record

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A provider-assigned user identifier.
///
/// Vendors disagree on the type: GitHub and GitLab use numbers, most
/// others use strings (Bitbucket a UUID string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
	/// Numeric identifier.
	Number(i64),
	/// String identifier.
	String(String),
}

impl std::fmt::Display for UserId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			UserId::Number(n) => write!(f, "{n}"),
			UserId::String(s) => write!(f, "{s}"),
		}
	}
}

impl From<i64> for UserId {
	fn from(id: i64) -> Self {
		UserId::Number(id)
	}
}

impl From<&str> for UserId {
	fn from(id: &str) -> Self {
		UserId::String(id.to_string())
	}
}

impl From<String> for UserId {
	fn from(id: String) -> Self {
		UserId::String(id)
	}
}

/// The normalized user returned by a completed authentication flow.
///
/// `raw` retains the entire provider payload unmodified so callers can
/// reach vendor-specific fields; `attributes` carries the extra mapped
/// fields outside the normalized set (e.g. `avatar_original`,
/// `organization_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	/// Provider-assigned identifier.
	pub id: UserId,

	/// Username / handle, where the vendor has one.
	pub nickname: Option<String>,

	/// Display name.
	pub name: Option<String>,

	/// Email address.
	pub email: Option<String>,

	/// Avatar image URL.
	pub avatar: Option<String>,

	/// The full, unmodified provider payload.
	pub raw: Map<String, Value>,

	/// Extra mapped attributes outside the normalized field set.
	pub attributes: HashMap<String, Value>,

	/// The access token used to fetch this user.
	pub token: String,

	/// Refresh token, where the vendor supports it.
	pub refresh_token: Option<String>,

	/// Access token lifetime in seconds.
	pub expires_in: Option<u64>,

	/// Scopes approved by the user.
	pub approved_scopes: Vec<String>,
}

impl User {
	/// Creates a user with `id` and the raw provider payload; every
	/// other field starts empty and is filled by the driver's mapper
	/// and the provider protocol. Custom drivers build their users
	/// through this too.
	pub fn mapped(id: UserId, raw: Value) -> Self {
		let raw = match raw {
			Value::Object(map) => map,
			_ => Map::new(),
		};

		Self {
			id,
			nickname: None,
			name: None,
			email: None,
			avatar: None,
			raw,
			attributes: HashMap::new(),
			token: String::new(),
			refresh_token: None,
			expires_in: None,
			approved_scopes: Vec::new(),
		}
	}

	/// Looks up a top-level field of the raw provider payload.
	pub fn raw_field(&self, key: &str) -> Option<&Value> {
		self.raw.get(key)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_user_id_serde() {
		let numeric: UserId = serde_json::from_value(json!(42)).unwrap();
		assert_eq!(numeric, UserId::Number(42));
		assert_eq!(numeric.to_string(), "42");

		let string: UserId = serde_json::from_value(json!("{abc-uuid}")).unwrap();
		assert_eq!(string, UserId::String("{abc-uuid}".to_string()));
	}

	#[test]
	fn test_mapped_keeps_raw_payload() {
		let user = User::mapped(42.into(), json!({"id": 42, "login": "octo"}));

		assert_eq!(user.raw.get("login"), Some(&json!("octo")));
		assert!(user.token.is_empty());
		assert!(user.approved_scopes.is_empty());
	}
}
