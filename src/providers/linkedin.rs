//! LinkedIn driver (lite-profile API)
//!
//! The v2 lite-profile API splits identity across two endpoints and
//! localizes names: the display name is assembled from the member's
//! preferred locale, and avatars are picked out of the projected
//! still-image artifacts by pixel width (100 for `avatar`, 800 for
//! `avatar_original`).

use async_trait::async_trait;
use serde_json::Value;

use crate::driver::{Driver, DriverContext, optional_str, required_str, user_info_json};
use crate::error::SocialiteError;
use crate::user::User;

const PROFILE_URL: &str = "https://api.linkedin.com/v2/me";
const EMAIL_URL: &str = "https://api.linkedin.com/v2/emailAddress";
const PROFILE_PROJECTION: &str =
	"(id,firstName,lastName,profilePicture(displayImage~:playableStreams))";
const EMAIL_PROJECTION: &str = "(elements*(handle~))";
const STILL_IMAGE_KEY: &str = "com.linkedin.digitalmedia.mediaartifact.StillImage";

/// LinkedIn OAuth2 driver.
#[derive(Debug, Default)]
pub struct LinkedInDriver;

impl LinkedInDriver {
	pub fn new() -> Self {
		Self
	}

	async fn basic_profile(
		&self,
		http: &reqwest::Client,
		token: &str,
	) -> Result<Value, SocialiteError> {
		let response = http
			.get(PROFILE_URL)
			.query(&[("projection", PROFILE_PROJECTION)])
			.bearer_auth(token)
			.header("X-RestLi-Protocol-Version", "2.0.0")
			.send()
			.await?;

		user_info_json(response).await
	}

	async fn email_address(
		&self,
		http: &reqwest::Client,
		token: &str,
	) -> Result<Option<String>, SocialiteError> {
		let response = http
			.get(EMAIL_URL)
			.query(&[("q", "members"), ("projection", EMAIL_PROJECTION)])
			.bearer_auth(token)
			.header("X-RestLi-Protocol-Version", "2.0.0")
			.send()
			.await?;
		let payload = user_info_json(response).await?;

		Ok(payload
			.get("elements")
			.and_then(|elements| elements.get(0))
			.and_then(|element| element.get("handle~"))
			.and_then(|handle| handle.get("emailAddress"))
			.and_then(Value::as_str)
			.map(str::to_owned))
	}
}

/// Folds the email-endpoint result into the profile. Only indexes
/// into object payloads; anything else is left for the mapper to
/// reject.
fn merge_email_address(raw: &mut Value, email: Option<String>) {
	if let Some(email) = email
		&& let Some(object) = raw.as_object_mut()
	{
		object.insert("emailAddress".to_string(), Value::String(email));
	}
}

/// Resolves `firstName` / `lastName` through the member's preferred
/// locale.
fn localized_name(raw: &Value, field: &str) -> Option<String> {
	let name = raw.get(field)?;
	let locale = name.get("preferredLocale")?;
	let language = locale.get("language")?.as_str()?;
	let country = locale.get("country")?.as_str()?;

	name.get("localized")?
		.get(format!("{language}_{country}"))?
		.as_str()
		.map(str::to_owned)
}

/// Picks the projected avatar artifact of exactly `width` pixels.
fn avatar_by_width(raw: &Value, width: u64) -> Option<String> {
	let elements = raw
		.get("profilePicture")?
		.get("displayImage~")?
		.get("elements")?
		.as_array()?;

	elements
		.iter()
		.find(|element| {
			element
				.get("data")
				.and_then(|data| data.get(STILL_IMAGE_KEY))
				.and_then(|image| image.get("storageSize"))
				.and_then(|size| size.get("width"))
				.and_then(Value::as_u64)
				== Some(width)
		})
		.and_then(|element| element.get("identifiers"))
		.and_then(|identifiers| identifiers.get(0))
		.and_then(|identifier| identifier.get("identifier"))
		.and_then(Value::as_str)
		.map(str::to_owned)
}

#[async_trait]
impl Driver for LinkedInDriver {
	fn name(&self) -> &str {
		"linkedin"
	}

	fn authorize_endpoint(&self) -> String {
		"https://www.linkedin.com/oauth/v2/authorization".to_string()
	}

	fn token_endpoint(&self) -> String {
		"https://www.linkedin.com/oauth/v2/accessToken".to_string()
	}

	fn default_scopes(&self) -> Vec<String> {
		vec!["r_liteprofile".to_string(), "r_emailaddress".to_string()]
	}

	fn scope_separator(&self) -> &str {
		" "
	}

	async fn raw_user(
		&self,
		http: &reqwest::Client,
		_ctx: &DriverContext<'_>,
		token: &str,
	) -> Result<Value, SocialiteError> {
		let mut raw = self.basic_profile(http, token).await?;
		let email = self.email_address(http, token).await?;
		merge_email_address(&mut raw, email);

		Ok(raw)
	}

	fn map_user(&self, raw: Value) -> Result<User, SocialiteError> {
		let id = required_str(&raw, "id")?;

		let first_name = localized_name(&raw, "firstName");
		let last_name = localized_name(&raw, "lastName");
		let name = match (&first_name, &last_name) {
			(Some(first), Some(last)) => Some(format!("{first} {last}")),
			(Some(first), None) => Some(first.clone()),
			(None, Some(last)) => Some(last.clone()),
			(None, None) => None,
		};
		let avatar = avatar_by_width(&raw, 100);
		let avatar_original = avatar_by_width(&raw, 800);

		let mut user = User::mapped(id.into(), raw.clone());
		user.name = name;
		user.email = optional_str(&raw, "emailAddress");
		user.avatar = avatar;
		if let Some(first_name) = first_name {
			user.attributes
				.insert("first_name".to_string(), Value::String(first_name));
		}
		if let Some(last_name) = last_name {
			user.attributes
				.insert("last_name".to_string(), Value::String(last_name));
		}
		if let Some(avatar_original) = avatar_original {
			user.attributes
				.insert("avatar_original".to_string(), Value::String(avatar_original));
		}

		Ok(user)
	}
}
