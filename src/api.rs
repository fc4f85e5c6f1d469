//! Typed wrappers for the admin API's endpoints.
//!
//! Every wrapper goes through [`ApiClient::send`](crate::client::ApiClient::send), so bearer
//! injection and refresh recovery apply uniformly. Resource payloads are loose JSON
//! ([`serde_json::Value`]); callers shape them with their own serde types.

pub mod achievements;
pub mod auth;
pub mod courses;
pub mod exercises;
pub mod files;
pub mod lessons;
pub mod questions;
pub mod users;

// self
use crate::{_prelude::*, http::RequestBody};

/// Serializes a resource payload into a JSON body.
pub(crate) fn payload(data: &impl Serialize) -> Result<RequestBody> {
	RequestBody::json(data)
}
