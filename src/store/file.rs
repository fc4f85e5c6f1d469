//! File-backed [`CredentialStore`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, TokenSecret},
	store::{CredentialStore, StoreError, StoreFuture},
};

type Snapshot = BTreeMap<CredentialKey, TokenSecret>;

/// Persists credentials to a JSON object after each mutation.
///
/// The file holds at most the `access_token` and `refresh_token` keys. Writes go to a sibling
/// `.tmp` file which is then renamed over the target. The in-memory view only changes once the
/// write succeeded.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		if !path.exists() {
			return Ok(Snapshot::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Snapshot::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn get(&self, key: CredentialKey) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.inner.read().get(&key).cloned()) })
	}

	fn set(&self, key: CredentialKey, value: TokenSecret) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut next = guard.clone();

			next.insert(key, value);
			self.persist_locked(&next)?;

			*guard = next;

			Ok(())
		})
	}

	fn delete(&self, key: CredentialKey) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if !guard.contains_key(&key) {
				return Ok(());
			}

			let mut next = guard.clone();

			next.remove(&key);
			self.persist_locked(&next)?;

			*guard = next;

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		env, process,
		time::{SystemTime, UNIX_EPOCH},
	};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let nanos = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.expect("System clock should be after the Unix epoch.")
			.as_nanos();

		env::temp_dir().join(format!("lms_admin_client_{label}_{}_{nanos}.json", process::id()))
	}

	#[test]
	fn credentials_survive_reopen() {
		let path = temp_path("reopen");
		let store = FileStore::open(&path).expect("Failed to open file store.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set(CredentialKey::AccessToken, TokenSecret::new("access-disk")))
			.expect("Failed to persist access token.");
		rt.block_on(store.set(CredentialKey::RefreshToken, TokenSecret::new("refresh-disk")))
			.expect("Failed to persist refresh token.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store.");
		let access = rt
			.block_on(reopened.get(CredentialKey::AccessToken))
			.expect("Failed to read access token from reopened store.")
			.expect("File store lost the access token after reopen.");

		assert_eq!(access.expose(), "access-disk");

		let raw = fs::read_to_string(&path).expect("Backing file should be readable.");

		assert!(raw.contains("\"refresh_token\""));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn delete_is_persisted() {
		let path = temp_path("delete");
		let store = FileStore::open(&path).expect("Failed to open file store.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set(CredentialKey::RefreshToken, TokenSecret::new("refresh-doomed")))
			.expect("Failed to persist refresh token.");
		rt.block_on(store.delete(CredentialKey::RefreshToken))
			.expect("Failed to delete refresh token.");

		let reopened = FileStore::open(&path).expect("Failed to reopen file store.");

		assert!(
			rt.block_on(reopened.get(CredentialKey::RefreshToken))
				.expect("Reading a deleted key should succeed.")
				.is_none()
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn failed_write_leaves_memory_untouched() {
		let path = temp_path("unwritable");
		let store = FileStore::open(&path).expect("Failed to open file store.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.set(CredentialKey::AccessToken, TokenSecret::new("access-kept")))
			.expect("Failed to persist access token.");
		fs::remove_file(&path).expect("Failed to remove snapshot before blocking the path.");
		// A directory at the target path makes the final rename fail.
		fs::create_dir(&path).expect("Failed to block the snapshot path with a directory.");

		let err = rt
			.block_on(store.set(CredentialKey::AccessToken, TokenSecret::new("access-lost")))
			.expect_err("Rename onto a directory should fail.");

		assert!(matches!(err, StoreError::Backend { .. }));
		assert!(rt.block_on(store.delete(CredentialKey::AccessToken)).is_err());

		let access = rt
			.block_on(store.get(CredentialKey::AccessToken))
			.expect("Reading from memory should succeed.")
			.expect("Access token should survive failed writes.");

		assert_eq!(access.expose(), "access-kept");

		let mut tmp_path = path.clone();

		tmp_path.set_extension("tmp");

		let _ = fs::remove_file(&tmp_path);

		fs::remove_dir(&path).unwrap_or_else(|e| {
			panic!("Failed to remove blocking directory {}: {e}", path.display())
		});
	}

	#[test]
	fn corrupt_file_is_a_serialization_error() {
		let path = temp_path("corrupt");

		fs::write(&path, b"{not json").expect("Failed to write corrupt fixture.");

		let err = FileStore::open(&path).expect_err("Corrupt snapshot should be rejected.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove corrupt fixture {}: {e}", path.display())
		});
	}
}
