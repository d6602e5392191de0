//! Social authentication error types

use thiserror::Error;

/// Errors produced by the socialite core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SocialiteError {
	/// Unsupported or unresolvable driver name, or no driver name supplied.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// Required credential keys absent from a vendor's configuration.
	/// Every missing key is reported, not just the first.
	#[error("Missing configuration keys [{}] for OAuth provider [{provider}]", keys.join(", "))]
	MissingConfiguration {
		/// The vendor whose configuration is incomplete.
		provider: String,
		/// The absent keys.
		keys: Vec<String>,
	},

	/// CSRF state missing from the session or not matching the callback.
	#[error("Invalid state")]
	InvalidState,

	/// Callback request carried no `code` query parameter.
	#[error("Missing authorization code in callback request")]
	MissingCode,

	/// Network error during an HTTP request.
	#[error("Network error: {0}")]
	Network(String),

	/// Token endpoint returned a non-success status.
	#[error("Token exchange error: {0}")]
	TokenExchange(String),

	/// User-info endpoint returned a non-success status.
	#[error("UserInfo error: {0}")]
	UserInfo(String),

	/// Response body could not be decoded.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),

	/// ID-token validation failed (signature, audience or issuer).
	#[error("Token validation failed: {0}")]
	TokenValidation(String),

	/// Provider payload could not be mapped to a user.
	#[error("User mapping error: {0}")]
	UserMapping(String),

	/// Invalid or incomplete configuration outside the credential keys.
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// Operation not supported by this provider.
	#[error("Not supported: {0}")]
	NotSupported(String),
}

impl From<reqwest::Error> for SocialiteError {
	fn from(error: reqwest::Error) -> Self {
		SocialiteError::Network(error.to_string())
	}
}

impl From<serde_json::Error> for SocialiteError {
	fn from(error: serde_json::Error) -> Self {
		SocialiteError::InvalidResponse(error.to_string())
	}
}

impl From<jsonwebtoken::errors::Error> for SocialiteError {
	fn from(error: jsonwebtoken::errors::Error) -> Self {
		SocialiteError::TokenValidation(error.to_string())
	}
}
