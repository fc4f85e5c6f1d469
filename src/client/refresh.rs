//! Single-flight token refresh with a FIFO queue of waiting request flows.
//!
//! [`RefreshCoordinator`] is the per-client state object behind the refresh path. It is either
//! idle or refreshing; the flow that moves it from idle to refreshing (the leader) performs the
//! refresh call, and every flow that hits a 401 while it is refreshing enqueues a one-shot
//! continuation instead of starting a second refresh. Settling the cycle drains the queue in
//! enqueue order, hands every waiter the same outcome, and returns the coordinator to idle in a
//! single step, so the queue never outlives the cycle that created it.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::mem;
// crates.io
use futures::channel::oneshot;
use serde_json::json;
// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, CredentialPair, TokenSecret},
	client::ApiClient,
	error::{RefreshError, RequestError},
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::StoreError,
};

type Settlement = Result<TokenSecret, Arc<RefreshError>>;

/// Refresh state shared by every clone of a client.
#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator(Mutex<RefreshState>);
impl RefreshCoordinator {
	/// Atomically either claims the refresh (idle -> refreshing) or joins the queue.
	pub(crate) fn begin(&self) -> Ticket<'_> {
		let mut state = self.0.lock();

		if let RefreshState::Refreshing(queue) = &mut *state {
			let (tx, rx) = oneshot::channel();

			queue.push_back(tx);

			return Ticket::Follower(Waiter(rx));
		}

		*state = RefreshState::Refreshing(VecDeque::new());

		Ticket::Leader(RefreshCycle { coordinator: self, settled: false })
	}

	pub(crate) fn is_refreshing(&self) -> bool {
		matches!(*self.0.lock(), RefreshState::Refreshing(_))
	}

	pub(crate) fn pending(&self) -> usize {
		match &*self.0.lock() {
			RefreshState::Refreshing(queue) => queue.len(),
			RefreshState::Idle => 0,
		}
	}

	fn settle(&self, outcome: Settlement) {
		let queue = match mem::take(&mut *self.0.lock()) {
			RefreshState::Refreshing(queue) => queue,
			RefreshState::Idle => VecDeque::new(),
		};

		for waiter in queue {
			// A closed receiver means the waiting flow was dropped; nothing to deliver.
			let _ = waiter.send(outcome.clone());
		}
	}
}

#[derive(Debug, Default)]
enum RefreshState {
	#[default]
	Idle,
	Refreshing(VecDeque<oneshot::Sender<Settlement>>),
}

/// Result of [`RefreshCoordinator::begin`].
pub(crate) enum Ticket<'a> {
	/// This flow owns the refresh cycle.
	Leader(RefreshCycle<'a>),
	/// Another flow owns it; wait for its outcome.
	Follower(Waiter),
}

/// Ownership of an outstanding refresh cycle. Must be settled exactly once.
///
/// Dropping an unsettled cycle rejects every waiter with [`RefreshError::Abandoned`] and
/// returns the coordinator to idle.
pub(crate) struct RefreshCycle<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl RefreshCycle<'_> {
	pub(crate) fn resolve(mut self, token: TokenSecret) {
		self.settle(Ok(token));
	}

	pub(crate) fn reject(mut self, err: Arc<RefreshError>) {
		self.settle(Err(err));
	}

	fn settle(&mut self, outcome: Settlement) {
		self.settled = true;
		self.coordinator.settle(outcome);
	}
}
impl Drop for RefreshCycle<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.settle(Err(Arc::new(RefreshError::Abandoned)));
		}
	}
}

/// Continuation of a flow queued behind an outstanding refresh.
pub(crate) struct Waiter(oneshot::Receiver<Settlement>);
impl Waiter {
	pub(crate) async fn wait(self) -> Settlement {
		self.0.await.unwrap_or_else(|_| Err(Arc::new(RefreshError::Abandoned)))
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Recovers a request whose first attempt failed with a 401.
	///
	/// `sent_with` is the access token the failed attempt carried.
	pub(super) async fn recover(
		&self,
		request: ApiRequest,
		sent_with: Option<TokenSecret>,
		original: RequestError,
	) -> Result<ApiResponse> {
		let newer = if self.coordinator.is_refreshing() {
			None
		} else {
			self.newer_access_token(sent_with.as_ref()).await?
		};

		if let Some(current) = newer {
			self.refresh_metrics.record_stale_resend();

			return self.resend(request, current).await;
		}

		match self.coordinator.begin() {
			Ticket::Leader(cycle) => self.lead_refresh(cycle, request, original).await,
			Ticket::Follower(waiter) => {
				self.refresh_metrics.record_queued();

				match waiter.wait().await {
					Ok(token) => self.resend(request, token).await,
					Err(err) => Err(Error::from_refresh_failure(err, original)),
				}
			},
		}
	}

	/// Performs the refresh for the cycle this flow owns, then settles it.
	async fn lead_refresh(
		&self,
		cycle: RefreshCycle<'_>,
		request: ApiRequest,
		original: RequestError,
	) -> Result<ApiResponse> {
		match self.refresh_credentials().await {
			Ok(pair) => {
				let token = pair.access_token;

				cycle.resolve(token.clone());

				self.resend(request, token).await
			},
			Err(err) => {
				// Credentials are gone before the coordinator goes idle, so no new cycle can
				// start from the rejected pair.
				let err = match self.end_session().await {
					Ok(()) => err,
					Err(source) => RefreshError::Uncleared { cause: Box::new(err), source },
				};
				let err = Arc::new(err);

				cycle.reject(err.clone());

				Err(Error::from_refresh_failure(err, original))
			},
		}
	}

	/// Reads the refresh credential, exchanges it, and persists the new pair.
	async fn refresh_credentials(&self) -> Result<CredentialPair, RefreshError> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_credentials");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span.instrument(self.refresh_credentials_inner()).await;

		match &result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		obs::record_result(KIND, &result);

		result
	}

	async fn refresh_credentials_inner(&self) -> Result<CredentialPair, RefreshError> {
		let refresh = self
			.store
			.get(CredentialKey::RefreshToken)
			.await?
			.filter(|secret| !secret.is_empty())
			.ok_or(RefreshError::MissingCredential)?;
		let pair = self.exchange_refresh_token(&refresh).await?;

		self.store.save_pair(&pair).await?;

		Ok(pair)
	}

	/// Calls the refresh endpoint once. Does not touch storage beyond reading the bearer.
	async fn exchange_refresh_token(
		&self,
		refresh: &TokenSecret,
	) -> Result<CredentialPair, RefreshError> {
		let request = ApiRequest::post(self.config.refresh_path.as_str())
			.with_json(json!({ "refresh_token": refresh.expose() }));
		let bearer =
			self.store.get(CredentialKey::AccessToken).await?.filter(|token| !token.is_empty());
		let response = self.transport.send(self.outbound(&request, bearer)?).await?;

		if !response.is_success() {
			let (status, body) = (response.status, response.text());

			return Err(RefreshError::Rejected { status, body });
		}

		response.decode().map_err(RefreshError::Decode)
	}

	/// Discards stored credentials and sends the host to its login view.
	///
	/// The redirect happens even when clearing fails; the storage error is returned so the
	/// caller can attach it to the cycle's outcome.
	async fn end_session(&self) -> Result<(), StoreError> {
		let cleared = self.store.clear().await;

		self.redirect.redirect_to_login(&self.config.login_path);

		cleared
	}

	async fn newer_access_token(
		&self,
		sent_with: Option<&TokenSecret>,
	) -> Result<Option<TokenSecret>> {
		let current = self.store.get(CredentialKey::AccessToken).await?;

		Ok(current.filter(|token| !token.is_empty() && Some(token) != sent_with))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn leader(ticket: Ticket<'_>) -> RefreshCycle<'_> {
		match ticket {
			Ticket::Leader(cycle) => cycle,
			Ticket::Follower(_) => panic!("Expected to own the refresh cycle."),
		}
	}

	fn follower(ticket: Ticket<'_>) -> Waiter {
		match ticket {
			Ticket::Follower(waiter) => waiter,
			Ticket::Leader(_) => panic!("Expected to queue behind the refresh cycle."),
		}
	}

	#[tokio::test]
	async fn only_first_flow_leads_and_waiters_share_the_token() {
		let coordinator = RefreshCoordinator::default();
		let cycle = leader(coordinator.begin());
		let first = follower(coordinator.begin());
		let second = follower(coordinator.begin());

		assert!(coordinator.is_refreshing());
		assert_eq!(coordinator.pending(), 2);

		cycle.resolve(TokenSecret::new("access-new"));

		assert!(!coordinator.is_refreshing());
		assert_eq!(coordinator.pending(), 0);

		for waiter in [first, second] {
			let token = waiter.wait().await.expect("Waiter should receive the new token.");

			assert_eq!(token.expose(), "access-new");
		}
	}

	#[tokio::test]
	async fn rejection_reaches_every_waiter() {
		let coordinator = RefreshCoordinator::default();
		let cycle = leader(coordinator.begin());
		let waiter = follower(coordinator.begin());
		let err = Arc::new(RefreshError::Rejected { status: 401, body: String::new() });

		cycle.reject(err.clone());

		let received = waiter.wait().await.expect_err("Waiter should receive the rejection.");

		assert!(Arc::ptr_eq(&received, &err));
		assert!(matches!(coordinator.begin(), Ticket::Leader(_)));
	}

	#[tokio::test]
	async fn dropped_cycle_abandons_waiters_and_goes_idle() {
		let coordinator = RefreshCoordinator::default();
		let waiter = {
			let _cycle = leader(coordinator.begin());

			follower(coordinator.begin())
		};
		let received = waiter.wait().await.expect_err("Abandoned cycle should reject waiters.");

		assert!(matches!(*received, RefreshError::Abandoned));
		assert!(!coordinator.is_refreshing());
	}
}
