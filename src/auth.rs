//! Credential primitives: redacted secrets, the persisted access/refresh pair, and storage keys.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
