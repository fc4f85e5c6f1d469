//! The authenticated request client.
//!
//! Every request reads the current access token from the credential store and attaches it as a
//! bearer credential. A 401 on a request that has not been replayed yet (and does not target the
//! refresh endpoint) enters the refresh path in [`refresh`]: one flow performs the refresh while
//! every other flow that hits a 401 in the meantime waits in a FIFO queue, then all of them are
//! replayed with the new access token.

pub mod refresh;

pub use refresh::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CredentialKey, TokenSecret},
	client::refresh::RefreshCoordinator,
	config::ClientConfig,
	error::{ConfigError, RequestError},
	http::{
		ApiRequest, ApiResponse, ApiTransport, Method, OutboundRequest, RequestBody,
		RequestOptions,
	},
	navigation::{LoginRedirect, NoopRedirect},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Issues API requests with bearer injection and transparent token refresh.
///
/// Clones share the transport, the credential store, and the refresh state, so a refresh
/// started through one clone is observed by all of them.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound call, including the refresh call.
	pub transport: Arc<T>,
	/// Persisted credential storage shared by every request flow.
	pub store: Arc<dyn CredentialStore>,
	/// Collaborator notified when the session cannot be recovered.
	pub redirect: Arc<dyn LoginRedirect>,
	/// Base URL and auth-related paths.
	pub config: Arc<ClientConfig>,
	/// Shared counters for refresh cycles.
	pub refresh_metrics: Arc<RefreshMetrics>,
	coordinator: Arc<RefreshCoordinator>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	///
	/// The login redirect defaults to [`NoopRedirect`]; see [`ApiClient::with_login_redirect`].
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			redirect: Arc::new(NoopRedirect),
			config: Arc::new(config),
			refresh_metrics: Default::default(),
			coordinator: Default::default(),
		}
	}

	/// Sets the collaborator invoked when stored credentials are discarded.
	pub fn with_login_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
		self.redirect = redirect;

		self
	}

	/// Whether a refresh cycle is currently outstanding.
	pub fn is_refreshing(&self) -> bool {
		self.coordinator.is_refreshing()
	}

	/// Number of request flows queued behind the outstanding refresh.
	pub fn pending_refresh_waiters(&self) -> usize {
		self.coordinator.pending()
	}

	/// Issues a request built from its parts.
	pub async fn request(
		&self,
		method: Method,
		path: impl Into<String>,
		body: RequestBody,
		options: RequestOptions,
	) -> Result<ApiResponse> {
		self.send(ApiRequest::new(method, path).with_body(body).with_options(options)).await
	}

	/// Issues a request, recovering from an expired access token when possible.
	///
	/// Any 2xx response is returned as-is. Other statuses surface as
	/// [`Error::Request`](crate::error::Error::Request) unless they are a recoverable 401, in
	/// which case the caller either gets the replayed request's result or one of
	/// [`Error::NoRefreshCredential`](crate::error::Error::NoRefreshCredential) /
	/// [`Error::RefreshFailed`](crate::error::Error::RefreshFailed).
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.send_inner(request)).await;

		obs::record_result(KIND, &result);

		result
	}

	/// Issues a request and deserializes the response body.
	pub async fn send_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(request).await?.json()
	}

	/// Issues a request and returns the body as loose JSON (`null` for an empty body).
	pub async fn send_value(&self, request: ApiRequest) -> Result<Value> {
		self.send(request).await?.json_value()
	}

	async fn send_inner(&self, mut request: ApiRequest) -> Result<ApiResponse> {
		let bearer = self
			.store
			.get(CredentialKey::AccessToken)
			.await?
			.filter(|token| !token.is_empty());
		let response = self.dispatch(&request, bearer.clone()).await?;

		if response.is_success() {
			return Ok(response);
		}
		if !self.is_recoverable(&request, &response) {
			return Err(rejection(response).into());
		}

		request.mark_retried();

		self.recover(request, bearer, rejection(response)).await
	}

	fn is_recoverable(&self, request: &ApiRequest, response: &ApiResponse) -> bool {
		response.is_unauthorized()
			&& !request.is_retried()
			&& !self.config.is_refresh_path(&request.path)
	}

	/// Replays a request with `token`. A second failure, 401 included, is final.
	async fn resend(&self, request: ApiRequest, token: TokenSecret) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Resend;

		let span = FlowSpan::new(KIND, "resend");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.resend_inner(request, token)).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn resend_inner(&self, request: ApiRequest, token: TokenSecret) -> Result<ApiResponse> {
		let response = self.dispatch(&request, Some(token)).await?;

		if response.is_success() { Ok(response) } else { Err(rejection(response).into()) }
	}

	async fn dispatch(
		&self,
		request: &ApiRequest,
		bearer: Option<TokenSecret>,
	) -> Result<ApiResponse> {
		let outbound = self.outbound(request, bearer)?;

		self.transport.send(outbound).await.map_err(|e| RequestError::from(e).into())
	}

	fn outbound(
		&self,
		request: &ApiRequest,
		bearer: Option<TokenSecret>,
	) -> Result<OutboundRequest, ConfigError> {
		Ok(OutboundRequest {
			method: request.method,
			url: self.config.endpoint(&request.path, &request.options.query)?,
			headers: request.options.headers.clone(),
			body: request.body.clone(),
			bearer,
		})
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client backed by a reqwest transport built from `config`.
	pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
		let transport = ReqwestTransport::from_config(&config)?;

		Ok(Self::with_transport(config, store, transport))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			redirect: self.redirect.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("refreshing", &self.is_refreshing())
			.finish()
	}
}

fn rejection(response: ApiResponse) -> RequestError {
	RequestError::Status { status: response.status, body: response.text() }
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn outbound_carries_query_and_bearer() {
		let store = seeded_store("access-1", Some("refresh-1"));
		let (client, redirect) = build_reqwest_test_client("https://lms.example.test/api/", store);
		let request = ApiRequest::delete("/v1/admin/file/delete").with_query("file_name", "a b.pdf");
		let outbound = client
			.outbound(&request, Some(TokenSecret::new("access-1")))
			.expect("Outbound request should resolve.");

		assert_eq!(outbound.method, Method::Delete);
		assert_eq!(
			outbound.url.as_str(),
			"https://lms.example.test/api/v1/admin/file/delete?file_name=a+b.pdf"
		);
		assert_eq!(outbound.bearer.as_ref().map(TokenSecret::expose), Some("access-1"));
		assert_eq!(redirect.count(), 0);
	}

	#[test]
	fn refresh_path_401_is_not_recoverable() {
		let (client, _) =
			build_reqwest_test_client("https://lms.example.test", seeded_store("a", None));
		let denied = ApiResponse { status: 401, headers: Vec::new(), body: Vec::new() };
		let mut replayed = ApiRequest::get("/v1/admin/course/list");

		assert!(client.is_recoverable(&ApiRequest::get("/v1/admin/course/list"), &denied));
		assert!(!client.is_recoverable(&ApiRequest::post("/v1/auth/refresh"), &denied));

		replayed.mark_retried();

		assert!(!client.is_recoverable(&replayed, &denied));
	}
}
