//! Host-facing request and redirect types

use std::collections::HashMap;

/// The incoming callback request, as seen by the core.
///
/// Only the `code` and `state` query parameters are ever read.
pub trait CallbackRequest {
	/// Returns the query parameter `name`, if present.
	fn query_param(&self, name: &str) -> Option<String>;
}

impl CallbackRequest for HashMap<String, String> {
	fn query_param(&self, name: &str) -> Option<String> {
		self.get(name).cloned()
	}
}

/// A callback request parsed from a raw query string.
#[derive(Debug, Clone, Default)]
pub struct QueryCallback {
	params: HashMap<String, String>,
}

impl QueryCallback {
	/// Parses a query string (`code=...&state=...`) into a callback request.
	pub fn from_query(query: &str) -> Self {
		let params = url::form_urlencoded::parse(query.as_bytes())
			.into_owned()
			.collect();

		Self { params }
	}
}

impl CallbackRequest for QueryCallback {
	fn query_param(&self, name: &str) -> Option<String> {
		self.params.get(name).cloned()
	}
}

/// Redirect instruction returned by [`Provider::redirect`](crate::Provider::redirect).
///
/// The host turns this into an HTTP redirect response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
	url: String,
}

impl Redirect {
	/// Creates a redirect instruction for `url`.
	pub fn to(url: impl Into<String>) -> Self {
		Self { url: url.into() }
	}

	/// The target URL.
	pub fn url(&self) -> &str {
		&self.url
	}
}
