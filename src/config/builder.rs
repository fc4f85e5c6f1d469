// self
use crate::{_prelude::*, config::ClientConfig};

/// Errors raised while constructing or validating client configs.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ClientConfigError {
	/// Base URL must use HTTP or HTTPS.
	#[error("The base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry a query string or fragment.
	#[error("The base URL must not carry a query or fragment: {url}.")]
	BaseUrlHasQuery {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot be a `cannot-be-a-base` URL such as `mailto:`.
	#[error("The base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// Special paths must be absolute.
	#[error("The {field} must start with '/': {path}.")]
	RelativePath {
		/// Which field failed validation.
		field: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Timeout must be positive.
	#[error("The request timeout must be greater than zero.")]
	ZeroTimeout,
	/// User agent must be a visible ASCII header value.
	#[error("The user agent is not a valid header value.")]
	InvalidUserAgent,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Root of the REST API.
	pub base_url: Url,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Login view path.
	pub login_path: String,
	/// Optional per-request timeout.
	pub timeout: Option<Duration>,
	/// Optional user agent override.
	pub user_agent: Option<String>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided base URL and default paths.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: ClientConfig::DEFAULT_REFRESH_PATH.into(),
			login_path: ClientConfig::DEFAULT_LOGIN_PATH.into(),
			timeout: None,
			user_agent: None,
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the login view path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Sets the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the user agent.
	pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = Some(agent.into());

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			refresh_path: self.refresh_path,
			login_path: self.login_path,
			timeout: self.timeout,
			user_agent: self.user_agent.unwrap_or_else(super::default_user_agent),
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the config.
	pub fn validate(&self) -> Result<(), ClientConfigError> {
		let url = &self.base_url;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ClientConfigError::UnsupportedScheme { url: url.to_string() });
		}
		if url.cannot_be_a_base() {
			return Err(ClientConfigError::CannotBeABase { url: url.to_string() });
		}
		if url.query().is_some() || url.fragment().is_some() {
			return Err(ClientConfigError::BaseUrlHasQuery { url: url.to_string() });
		}

		validate_path("refresh path", &self.refresh_path)?;
		validate_path("login path", &self.login_path)?;

		if self.timeout.is_some_and(|t| t.is_zero()) {
			return Err(ClientConfigError::ZeroTimeout);
		}
		if self.user_agent.is_empty()
			|| !self.user_agent.chars().all(|c| c.is_ascii_graphic() || c == ' ')
		{
			return Err(ClientConfigError::InvalidUserAgent);
		}

		Ok(())
	}
}

fn validate_path(field: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ClientConfigError::RelativePath { field, path: path.to_owned() })
	}
}
