//! The "redirect to login" collaborator invoked when a session cannot be recovered.

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// self
use crate::_prelude::*;

/// Receives the signal that stored credentials were discarded and the user must log in again.
///
/// The client calls this at most once per failed refresh cycle, after the credential store has
/// been cleared. Implementations should return quickly; they run inline on the request flow
/// that owned the refresh.
pub trait LoginRedirect
where
	Self: Send + Sync,
{
	/// Navigates the host to its login view.
	fn redirect_to_login(&self, login_path: &str);
}

/// Redirect collaborator that does nothing; the default for headless hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRedirect;
impl LoginRedirect for NoopRedirect {
	fn redirect_to_login(&self, _login_path: &str) {}
}

/// Redirect collaborator that records requests instead of navigating.
///
/// Suited to headless hosts that poll for a lost session rather than react to it.
#[derive(Debug, Default)]
pub struct RecordingRedirect {
	count: AtomicUsize,
	last_path: Mutex<Option<String>>,
}
impl RecordingRedirect {
	/// Number of redirects requested so far.
	pub fn count(&self) -> usize {
		self.count.load(Ordering::SeqCst)
	}

	/// Login path handed to the most recent redirect.
	pub fn last_path(&self) -> Option<String> {
		self.last_path.lock().clone()
	}
}
impl LoginRedirect for RecordingRedirect {
	fn redirect_to_login(&self, login_path: &str) {
		self.count.fetch_add(1, Ordering::SeqCst);

		*self.last_path.lock() = Some(login_path.to_owned());
	}
}

/// Adapts a closure into a [`LoginRedirect`].
#[derive(Clone)]
pub struct RedirectFn<F>(F);
impl<F> RedirectFn<F>
where
	F: Fn(&str) + Send + Sync,
{
	/// Wraps `f`.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F> LoginRedirect for RedirectFn<F>
where
	F: Fn(&str) + Send + Sync,
{
	fn redirect_to_login(&self, login_path: &str) {
		(self.0)(login_path)
	}
}
impl<F> Debug for RedirectFn<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RedirectFn(..)")
	}
}
