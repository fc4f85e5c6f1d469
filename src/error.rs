//! Client-level error types shared by the request path, the refresh coordinator, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The request itself failed and was not recovered.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// A refresh was needed but no refresh credential is stored.
	#[error("No refresh credential is available; the session has to be re-established.")]
	NoRefreshCredential {
		/// The 401 that triggered the refresh attempt.
		#[source]
		original: RequestError,
	},
	/// The refresh endpoint did not produce a new credential pair.
	///
	/// Every caller that waited on the same refresh cycle receives the same shared error.
	#[error("Access token refresh failed.")]
	RefreshFailed(#[source] Arc<RefreshError>),
	/// Request payload could not be serialized.
	#[error("Request payload could not be serialized.")]
	Encode(#[source] serde_json::Error),
	/// Response body did not match the expected JSON shape.
	#[error("Response body does not match the expected shape.")]
	Decode(#[source] serde_path_to_error::Error<serde_json::Error>),
}
impl Error {
	/// HTTP status of the failed response, if the failure came from one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Request(e) | Self::NoRefreshCredential { original: e } => e.status(),
			Self::RefreshFailed(e) => e.status(),
			_ => None,
		}
	}

	/// Whether the caller's session is gone and stored credentials were discarded.
	pub fn is_session_lost(&self) -> bool {
		matches!(self, Self::NoRefreshCredential { .. } | Self::RefreshFailed(_))
	}

	pub(crate) fn from_refresh_failure(err: Arc<RefreshError>, original: RequestError) -> Self {
		if matches!(*err, RefreshError::MissingCredential) {
			Self::NoRefreshCredential { original }
		} else {
			Self::RefreshFailed(err)
		}
	}
}

/// Failure of the caller's own request (non-2xx response or transport failure).
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// The API answered with a non-success status.
	#[error("API responded with HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, decoded lossily as UTF-8.
		body: String,
	},
	/// The request never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl RequestError {
	/// HTTP status code, when the failure carries one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Transport(_) => None,
		}
	}

	/// Whether this is an HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(401)
	}
}

/// Reasons a refresh cycle ended without a new credential pair.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// No refresh credential was stored when the cycle started.
	#[error("No refresh credential is stored.")]
	MissingCredential,
	/// The refresh endpoint rejected the credential (expired, revoked, or malformed alike).
	#[error("Refresh endpoint rejected the refresh credential with HTTP {status}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Response body, decoded lossily as UTF-8.
		body: String,
	},
	/// The refresh call never produced a response.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The refresh endpoint answered 2xx with an unusable payload.
	#[error("Refresh endpoint returned a malformed credential pair.")]
	Decode(#[source] serde_path_to_error::Error<serde_json::Error>),
	/// Reading or persisting credentials failed mid-cycle.
	#[error("Credential store failed during the refresh cycle: {0}")]
	Storage(#[from] crate::store::StoreError),
	/// The refresh endpoint URL could not be built.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The refreshing flow was dropped before the cycle settled.
	#[error("Refresh cycle was abandoned before it settled.")]
	Abandoned,
	/// The cycle failed and the stale credentials could not be discarded afterwards.
	#[error("{cause} Stored credentials could not be cleared.")]
	Uncleared {
		/// Why the cycle failed.
		cause: Box<RefreshError>,
		/// Why the credentials are still stored.
		source: crate::store::StoreError,
	},
}
impl RefreshError {
	/// HTTP status code returned by the refresh endpoint, when available.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Rejected { status, .. } => Some(*status),
			Self::Uncleared { cause, .. } => cause.status(),
			_ => None,
		}
	}

	/// The failure that ended the cycle, looking through [`RefreshError::Uncleared`].
	pub fn cause(&self) -> &RefreshError {
		match self {
			Self::Uncleared { cause, .. } => RefreshError::cause(cause),
			other => other,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client configuration failed validation.
	#[error(transparent)]
	InvalidConfig(#[from] crate::config::ClientConfigError),
	/// Request path cannot be turned into a URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending path.
		path: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, request construction).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure (including timeouts).
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The transport could not encode the request.
	#[error("Request could not be built: {reason}.")]
	Build {
		/// Human-readable reason.
		reason: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_builder() {
			Self::Build { reason: e.to_string() }
		} else {
			Self::network(e)
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn missing_credential_maps_to_dedicated_variant() {
		let original = RequestError::Status { status: 401, body: String::new() };
		let err = Error::from_refresh_failure(Arc::new(RefreshError::MissingCredential), original);

		assert!(matches!(err, Error::NoRefreshCredential { .. }));
		assert_eq!(err.status(), Some(401));
		assert!(err.is_session_lost());
	}

	#[test]
	fn uncleared_failure_keeps_cause_and_storage_error() {
		let err = RefreshError::Uncleared {
			cause: Box::new(RefreshError::Rejected { status: 401, body: String::new() }),
			source: crate::store::StoreError::Backend { message: "disk full".into() },
		};

		assert_eq!(err.status(), Some(401));
		assert!(matches!(err.cause(), RefreshError::Rejected { .. }));
		assert!(StdError::source(&err).is_some_and(|e| e.to_string().contains("disk full")));
	}

	#[test]
	fn refresh_failure_keeps_shared_source() {
		let shared = Arc::new(RefreshError::Rejected { status: 403, body: "expired".into() });
		let original = RequestError::Status { status: 401, body: String::new() };
		let err = Error::from_refresh_failure(shared.clone(), original);

		match &err {
			Error::RefreshFailed(inner) => assert!(Arc::ptr_eq(inner, &shared)),
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert_eq!(err.status(), Some(403));

		let source = StdError::source(&err).expect("Refresh failure should expose its source.");

		assert!(source.to_string().contains("HTTP 403"));
	}
}
