//! Client configuration: where the API lives and which paths carry auth semantics.
//!
//! [`ClientConfig`] is assembled through [`ClientConfigBuilder`], which validates the base URL
//! and the special paths. Configs deserialized from a file should go through
//! [`ClientConfig::validate`] before use.

/// Builder API for assembling client configs.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Immutable client configuration shared by the transport and the request client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Root of the REST API; request paths are appended to its path.
	pub base_url: Url,
	/// Path of the token refresh endpoint. A 401 from this path never triggers a refresh.
	#[serde(default = "default_refresh_path")]
	pub refresh_path: String,
	/// Path handed to the login redirect collaborator on unrecoverable auth failure.
	#[serde(default = "default_login_path")]
	pub login_path: String,
	/// Optional per-request timeout enforced by the transport.
	#[serde(default)]
	pub timeout: Option<Duration>,
	/// `User-Agent` sent with every request.
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
}
impl ClientConfig {
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/v1/auth/refresh";
	/// Default login view path.
	pub const DEFAULT_LOGIN_PATH: &'static str = "/login";

	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Checks whether `path` addresses the refresh endpoint.
	///
	/// Leading slashes are ignored so `v1/auth/refresh` and `/v1/auth/refresh` match alike.
	pub fn is_refresh_path(&self, path: &str) -> bool {
		normalize(path) == normalize(&self.refresh_path)
	}

	/// Resolves a request path plus query pairs against the base URL.
	pub fn endpoint(&self, path: &str, query: &[(String, String)]) -> Result<Url, ConfigError> {
		if path.contains(['?', '#']) {
			return Err(ConfigError::InvalidPath { path: path.to_owned() });
		}

		let mut url = self.base_url.clone();
		let joined = format!("{}/{}", self.base_url.path().trim_end_matches('/'), normalize(path));

		url.set_path(&joined);

		if !query.is_empty() {
			url.query_pairs_mut()
				.extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
		}

		Ok(url)
	}
}

fn normalize(path: &str) -> &str {
	path.trim_start_matches('/')
}

fn default_refresh_path() -> String {
	ClientConfig::DEFAULT_REFRESH_PATH.into()
}

fn default_login_path() -> String {
	ClientConfig::DEFAULT_LOGIN_PATH.into()
}

fn default_user_agent() -> String {
	concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into()
}
