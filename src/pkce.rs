//! PKCE and CSRF-state token generation
//!
//! Implements the RFC 7636 S256 transform: the challenge is the
//! URL-safe base64 encoding (without padding) of the SHA-256 digest of
//! the verifier.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};

/// Length of the CSRF state token.
pub const STATE_LENGTH: usize = 40;

/// Length of the PKCE code verifier.
pub const CODE_VERIFIER_LENGTH: usize = 96;

/// The only supported code challenge method.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

/// Generates a cryptographically random alphanumeric token of `length` characters.
pub fn random_token(length: usize) -> String {
	rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(length)
		.map(char::from)
		.collect()
}

/// Generates a fresh CSRF state token.
pub fn generate_state() -> String {
	random_token(STATE_LENGTH)
}

/// Generates a fresh PKCE code verifier.
pub fn generate_code_verifier() -> String {
	random_token(CODE_VERIFIER_LENGTH)
}

/// Computes the S256 code challenge for `verifier`.
pub fn code_challenge(verifier: &str) -> String {
	let digest = Sha256::digest(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(digest)
}
