//! Authenticated REST client for the course platform's admin API: bearer injection, a single
//! in-flight token refresh shared by every caller, and transparent replays of requests that hit
//! an expired access token.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod navigation;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	pub use crate::navigation::RecordingRedirect;
	use crate::{
		auth::CredentialPair,
		config::ClientConfig,
		store::{CredentialStore, MemoryStore},
	};
	#[cfg(feature = "reqwest")] use crate::{client::ApiClient, http::ReqwestTransport};

	/// Builds a client config pointing at `base_url` with default paths.
	pub fn test_config(base_url: &str) -> ClientConfig {
		let url = Url::parse(base_url).expect("Test base URL should parse.");

		ClientConfig::builder(url).build().expect("Test client config should be valid.")
	}

	/// Creates an in-memory store seeded with the provided credential pair.
	pub fn seeded_store(access: &str, refresh: Option<&str>) -> Arc<MemoryStore> {
		match refresh {
			Some(refresh) => Arc::new(MemoryStore::from_pair(&CredentialPair::new(access, refresh))),
			None => {
				let store = Arc::new(MemoryStore::default());

				store.seed_access_only(access);

				store
			},
		}
	}

	/// Constructs a reqwest-backed [`ApiClient`] against `base_url`, returning the store and
	/// redirect recorder so tests can inspect side effects.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(
		base_url: &str,
		store_backend: Arc<MemoryStore>,
	) -> (ApiClient<ReqwestTransport>, Arc<RecordingRedirect>) {
		let config = test_config(base_url);
		let transport = ReqwestTransport::from_config(&config)
			.expect("Failed to build reqwest transport for tests.");
		let redirect = Arc::new(RecordingRedirect::default());
		let store: Arc<dyn CredentialStore> = store_backend;
		let client = ApiClient::with_transport(config, store, transport)
			.with_login_redirect(redirect.clone());

		(client, redirect)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
