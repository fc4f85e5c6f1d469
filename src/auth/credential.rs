//! The access/refresh credential pair and the storage keys it lives under.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Storage slot for one half of the credential pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKey {
	/// Short-lived bearer credential attached to API calls.
	AccessToken,
	/// Longer-lived credential used solely to obtain a new access token.
	RefreshToken,
}
impl CredentialKey {
	/// Both keys, in the order they are written.
	pub const ALL: [Self; 2] = [Self::AccessToken, Self::RefreshToken];

	/// Returns the persisted key name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::AccessToken => "access_token",
			Self::RefreshToken => "refresh_token",
		}
	}
}
impl Display for CredentialKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Access and refresh credentials issued together by login or refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Bearer credential for API calls.
	pub access_token: TokenSecret,
	/// Credential exchanged at the refresh endpoint.
	pub refresh_token: TokenSecret,
}
impl CredentialPair {
	/// Builds a pair from raw token strings.
	pub fn new(access: impl Into<TokenSecret>, refresh: impl Into<TokenSecret>) -> Self {
		Self { access_token: access.into(), refresh_token: refresh.into() }
	}

	/// Returns the secret stored under `key`.
	pub fn get(&self, key: CredentialKey) -> &TokenSecret {
		match key {
			CredentialKey::AccessToken => &self.access_token,
			CredentialKey::RefreshToken => &self.refresh_token,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn pair_deserializes_from_endpoint_payload() {
		let pair: CredentialPair =
			serde_json::from_str(r#"{"access_token":"a-1","refresh_token":"r-1","extra":true}"#)
				.expect("Credential pair payload should deserialize.");

		assert_eq!(pair.get(CredentialKey::AccessToken).expose(), "a-1");
		assert_eq!(pair.get(CredentialKey::RefreshToken).expose(), "r-1");
	}

	#[test]
	fn key_names_match_persisted_slots() {
		assert_eq!(CredentialKey::AccessToken.to_string(), "access_token");
		assert_eq!(
			serde_json::to_string(&CredentialKey::RefreshToken)
				.expect("CredentialKey should serialize."),
			"\"refresh_token\""
		);
	}
}
