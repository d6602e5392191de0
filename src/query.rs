//! Scope formatting and query-string encoding
//!
//! Authorization URLs are built from an ordered field list so that the
//! merge semantics are well defined: computed fields first, custom
//! parameters applied on top. A custom parameter with an existing key
//! overrides the computed value in place; a new key is appended.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Query-string encoding flavor for the authorization URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryEncoding {
	/// `application/x-www-form-urlencoded` style: spaces become `+`.
	#[default]
	Rfc1738,
	/// RFC 3986 percent encoding: spaces become `%20`.
	Rfc3986,
}

// Everything except RFC 3986 unreserved characters.
const RFC3986_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'~');

/// Joins scopes with the provider's separator.
pub fn format_scopes(scopes: &[String], separator: &str) -> String {
	scopes.join(separator)
}

/// Encodes an ordered field list as a query string.
pub fn build_query(fields: &[(String, String)], encoding: QueryEncoding) -> String {
	match encoding {
		QueryEncoding::Rfc1738 => url::form_urlencoded::Serializer::new(String::new())
			.extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
			.finish(),
		QueryEncoding::Rfc3986 => fields
			.iter()
			.map(|(k, v)| {
				format!(
					"{}={}",
					utf8_percent_encode(k, RFC3986_SET),
					utf8_percent_encode(v, RFC3986_SET)
				)
			})
			.collect::<Vec<_>>()
			.join("&"),
	}
}

/// Merges `(key, value)` into `fields`, overriding an existing key in place.
pub fn merge_field(fields: &mut Vec<(String, String)>, key: String, value: String) {
	match fields.iter_mut().find(|(k, _)| *k == key) {
		Some(existing) => existing.1 = value,
		None => fields.push((key, value)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn test_rfc1738_encodes_space_as_plus() {
		let query = build_query(&fields(&[("scope", "users.read tweet.read")]), QueryEncoding::Rfc1738);

		assert_eq!(query, "scope=users.read+tweet.read");
	}

	#[test]
	fn test_rfc3986_encodes_space_as_percent20() {
		let query = build_query(&fields(&[("scope", "users.read tweet.read")]), QueryEncoding::Rfc3986);

		assert_eq!(query, "scope=users.read%20tweet.read");
	}

	#[test]
	fn test_reserved_characters() {
		let query = build_query(
			&fields(&[("redirect_uri", "https://app.test/cb")]),
			QueryEncoding::Rfc1738,
		);

		assert_eq!(query, "redirect_uri=https%3A%2F%2Fapp.test%2Fcb");
	}

	#[test]
	fn test_merge_overrides_in_place() {
		let mut query = fields(&[("a", "1"), ("b", "2")]);

		merge_field(&mut query, "a".to_string(), "override".to_string());
		merge_field(&mut query, "c".to_string(), "3".to_string());

		assert_eq!(
			query,
			fields(&[("a", "override"), ("b", "2"), ("c", "3")])
		);
	}

	#[test]
	fn test_format_scopes() {
		let scopes = vec!["openid".to_string(), "email".to_string()];

		assert_eq!(format_scopes(&scopes, " "), "openid email");
		assert_eq!(format_scopes(&scopes, ","), "openid,email");
	}
}
