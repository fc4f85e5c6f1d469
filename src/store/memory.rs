//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, CredentialPair, TokenSecret},
	store::{CredentialStore, StoreFuture},
};

type StoreMap = Arc<RwLock<BTreeMap<CredentialKey, TokenSecret>>>;

/// Process-local credential storage; contents vanish with the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Creates a store already holding `pair`.
	pub fn from_pair(pair: &CredentialPair) -> Self {
		let store = Self::default();

		store.seed(pair);

		store
	}

	/// Writes both credentials synchronously.
	pub fn seed(&self, pair: &CredentialPair) {
		let mut guard = self.0.write();

		for key in CredentialKey::ALL {
			guard.insert(key, pair.get(key).clone());
		}
	}

	/// Writes only an access token, leaving the refresh slot untouched.
	pub fn seed_access_only(&self, access: impl Into<TokenSecret>) {
		self.0.write().insert(CredentialKey::AccessToken, access.into());
	}

	/// Reads a credential synchronously.
	pub fn peek(&self, key: CredentialKey) -> Option<TokenSecret> {
		self.0.read().get(&key).cloned()
	}

	/// Whether neither credential is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CredentialStore for MemoryStore {
	fn get(&self, key: CredentialKey) -> StoreFuture<'_, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(&key).cloned()) })
	}

	fn set(&self, key: CredentialKey, value: TokenSecret) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key, value);

			Ok(())
		})
	}

	fn delete(&self, key: CredentialKey) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(&key);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn overwrite_replaces_previous_secret() {
		let store = MemoryStore::default();

		store.seed(&CredentialPair::new("access-old", "refresh-old"));
		store
			.set(CredentialKey::AccessToken, TokenSecret::new("access-new"))
			.await
			.expect("Overwriting the access token should succeed.");

		assert_eq!(
			store.peek(CredentialKey::AccessToken).map(|s| s.expose().to_owned()),
			Some("access-new".into())
		);
		assert_eq!(
			store.peek(CredentialKey::RefreshToken).map(|s| s.expose().to_owned()),
			Some("refresh-old".into())
		);
	}

	#[tokio::test]
	async fn deleting_absent_key_is_not_an_error() {
		let store = MemoryStore::default();

		store
			.delete(CredentialKey::RefreshToken)
			.await
			.expect("Deleting a missing key should succeed.");

		assert!(store.is_empty());
	}
}
