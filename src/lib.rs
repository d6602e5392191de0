//! OAuth2 social authentication
//!
//! A framework-agnostic OAuth2 client for "log in with ..." flows. One
//! shared authorization-code protocol ([`Provider`]) is composed with a
//! per-vendor strategy ([`Driver`]); the [`SocialiteManager`] resolves
//! configured driver names to ready provider instances.
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use socialite::{DriverConfig, SocialiteConfig, SocialiteManager};
//!
//! # async fn flow() -> Result<(), socialite::SocialiteError> {
//! let config = SocialiteConfig::new().insert(
//! 	"github",
//! 	DriverConfig::new("client-id", "client-secret", "https://app.test/auth/callback"),
//! );
//! let mut manager = SocialiteManager::new(config);
//!
//! // Send the user to the vendor.
//! let redirect = manager.driver(Some("github"))?.redirect();
//!
//! // Back on the callback route, resolve the user.
//! let mut callback = HashMap::new();
//! callback.insert("code".to_string(), "received-code".to_string());
//! callback.insert("state".to_string(), "received-state".to_string());
//! let user = manager.driver(Some("github"))?.user(&callback).await?;
//! println!("hello {}", user.name.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod manager;
pub mod pkce;
pub mod provider;
pub mod providers;
pub mod query;
pub mod request;
pub mod session;
pub mod token;
pub mod user;

pub use config::{DriverConfig, HttpOptions, SocialiteConfig};
pub use driver::{Driver, DriverContext, TokenAuth};
pub use error::SocialiteError;
pub use manager::{ProviderFactory, SocialiteManager};
pub use provider::Provider;
pub use query::QueryEncoding;
pub use request::{CallbackRequest, QueryCallback, Redirect};
pub use session::{MemorySessionStore, SessionStore};
pub use token::{ScopeList, Token, TokenResponse};
pub use user::{User, UserId};
