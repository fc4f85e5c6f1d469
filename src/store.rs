//! Persisted key-value contract for the credential pair, plus built-in backends.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, CredentialPair, TokenSecret},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend holding the current access and refresh credentials.
///
/// The store is shared by every request flow of a client; it is the only place the current
/// access token is read from before a request goes out.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Reads the secret stored under `key`, if any.
	fn get(&self, key: CredentialKey) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Writes (or overwrites) the secret stored under `key`.
	fn set(&self, key: CredentialKey, value: TokenSecret) -> StoreFuture<'_, ()>;

	/// Removes the secret stored under `key`. Removing an absent key is not an error.
	fn delete(&self, key: CredentialKey) -> StoreFuture<'_, ()>;
}
impl dyn CredentialStore {
	/// Persists both halves of a freshly issued pair.
	pub async fn save_pair(&self, pair: &CredentialPair) -> Result<(), StoreError> {
		for key in CredentialKey::ALL {
			self.set(key, pair.get(key).clone()).await?;
		}

		Ok(())
	}

	/// Deletes both credentials, attempting every key even if one delete fails.
	pub async fn clear(&self) -> Result<(), StoreError> {
		let mut first_err = None;

		for key in CredentialKey::ALL {
			if let Err(e) = self.delete(key).await {
				first_err.get_or_insert(e);
			}
		}

		first_err.map_or(Ok(()), Err)
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	struct FailingStore;
	impl CredentialStore for FailingStore {
		fn get(&self, _key: CredentialKey) -> StoreFuture<'_, Option<TokenSecret>> {
			Box::pin(async { Ok(None) })
		}

		fn set(&self, _key: CredentialKey, _value: TokenSecret) -> StoreFuture<'_, ()> {
			Box::pin(async { Ok(()) })
		}

		fn delete(&self, key: CredentialKey) -> StoreFuture<'_, ()> {
			Box::pin(async move {
				Err(StoreError::Backend { message: format!("cannot delete {key}") })
			})
		}
	}

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[tokio::test]
	async fn clear_reports_first_failure_after_trying_every_key() {
		let store: Arc<dyn CredentialStore> = Arc::new(FailingStore);
		let err = store.clear().await.expect_err("Failing deletes should surface.");

		assert_eq!(err, StoreError::Backend { message: "cannot delete access_token".into() });
	}

	#[tokio::test]
	async fn save_pair_then_clear_round_trip() {
		let backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = backend.clone();

		store
			.save_pair(&CredentialPair::new("access-1", "refresh-1"))
			.await
			.expect("Saving a pair into memory should succeed.");

		assert_eq!(
			store
				.get(CredentialKey::RefreshToken)
				.await
				.expect("Memory store reads should succeed.")
				.map(|secret| secret.expose().to_owned()),
			Some("refresh-1".into())
		);

		store.clear().await.expect("Clearing memory store should succeed.");

		assert!(backend.is_empty());
	}
}
