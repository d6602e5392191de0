//! Session storage for CSRF state and PKCE verifiers
//!
//! The host application supplies the session; the core only reads and
//! writes the `state` and `code_verifier` keys through this trait.

use std::collections::HashMap;
use std::sync::Mutex;

/// Session key under which the CSRF state is stored.
pub const STATE_KEY: &str = "state";

/// Session key under which the PKCE code verifier is stored.
pub const CODE_VERIFIER_KEY: &str = "code_verifier";

/// Host-supplied session store.
///
/// Implementations must provide interior mutability; the core holds the
/// store behind an `Arc` and calls it from `&self` contexts.
pub trait SessionStore: Send + Sync {
	/// Returns the value stored under `key`, if any.
	fn get(&self, key: &str) -> Option<String>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set(&self, key: &str, value: String);

	/// Removes and returns the value stored under `key`.
	fn remove(&self, key: &str) -> Option<String>;
}

/// In-memory session store for development and testing.
///
/// Production hosts should adapt their own session backend instead; this
/// store lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
	values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
	/// Creates an empty in-memory session store.
	pub fn new() -> Self {
		Self::default()
	}
}

impl SessionStore for MemorySessionStore {
	fn get(&self, key: &str) -> Option<String> {
		self.values.lock().expect("session lock poisoned").get(key).cloned()
	}

	fn set(&self, key: &str, value: String) {
		self.values.lock().expect("session lock poisoned").insert(key.to_string(), value);
	}

	fn remove(&self, key: &str) -> Option<String> {
		self.values.lock().expect("session lock poisoned").remove(key)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_set_get_remove() {
		let store = MemorySessionStore::new();

		store.set("state", "abc".to_string());
		assert_eq!(store.get("state"), Some("abc".to_string()));

		assert_eq!(store.remove("state"), Some("abc".to_string()));
		assert_eq!(store.get("state"), None);
		assert_eq!(store.remove("state"), None);
	}

	#[test]
	fn test_set_overwrites() {
		let store = MemorySessionStore::new();

		store.set("state", "first".to_string());
		store.set("state", "second".to_string());

		assert_eq!(store.get("state"), Some("second".to_string()));
	}
}
