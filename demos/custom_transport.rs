//! Demonstrates plugging an in-process [`ApiTransport`] into the client and watching a token
//! refresh replay a request that hit an expired access token.
//!
//! 1. Implement [`ApiTransport`] for a type that turns an [`OutboundRequest`] into an
//!    [`ApiResponse`]. Non-2xx statuses are ordinary responses, not errors.
//! 2. Hand it to [`ApiClient::with_transport`] together with a credential store.
//! 3. Register a `LoginRedirect` (here a closure) to learn when the session is gone.

// std
use std::sync::{
	Arc,
	atomic::{AtomicU32, Ordering},
};
// crates.io
use color_eyre::Result;
use serde::Serialize;
use serde_json::json;
// self
use lms_admin_client::{
	auth::{CredentialKey, CredentialPair},
	client::ApiClient,
	config::ClientConfig,
	error::TransportError,
	http::{ApiResponse, ApiTransport, Method, OutboundRequest, RequestBody, TransportFuture},
	navigation::RedirectFn,
	store::{CredentialStore, MemoryStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let backend = Arc::new(MockAdminApi::default());
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let config = ClientConfig::builder(Url::parse("https://lms.example.com")?).build()?;
	let client = <ApiClient<MockAdminApi>>::with_transport(config, store, backend.clone())
		.with_login_redirect(Arc::new(RedirectFn::new(|path: &str| {
			println!("Session lost, redirecting to {path}.")
		})));

	client.login("admin@example.com", "demo-password").await?;

	println!("Courses: {}.", client.list_courses().await?);

	// Expire every issued token; the next call is answered with 401 and recovered by a refresh.
	backend.rotate();

	println!("Courses after refresh: {}.", client.list_courses().await?);
	println!(
		"Stored access token: {}.",
		store_backend
			.peek(CredentialKey::AccessToken)
			.map(|secret| secret.expose().to_owned())
			.unwrap_or_default()
	);
	println!("Refresh cycles so far: {}.", client.refresh_metrics.attempts());

	backend.fail_refresh.store(1, Ordering::SeqCst);
	backend.rotate();

	match client.list_courses().await {
		Ok(_) => println!("Mock API unexpectedly accepted an expired token."),
		Err(e) => println!("Request failed after the refresh was rejected: {e}."),
	}

	Ok(())
}

/// Issues `access-<generation>` tokens and only accepts the current generation.
#[derive(Debug, Default)]
struct MockAdminApi {
	generation: AtomicU32,
	fail_refresh: AtomicU32,
}
impl MockAdminApi {
	fn rotate(&self) {
		self.generation.fetch_add(1, Ordering::SeqCst);
	}

	fn pair(&self) -> CredentialPair {
		let generation = self.generation.load(Ordering::SeqCst);

		CredentialPair::new(format!("access-{generation}"), format!("refresh-{generation}"))
	}

	fn respond(&self, request: &OutboundRequest) -> Result<ApiResponse, TransportError> {
		let current = self.pair();

		match (request.method, request.url.path()) {
			(Method::Post, "/v1/auth/login") => json_response(200, &current),
			(Method::Post, "/v1/auth/refresh") => {
				if self.fail_refresh.load(Ordering::SeqCst) > 0 {
					return Ok(status_only(401));
				}
				if !matches!(request.body, RequestBody::Json(_)) {
					let reason = "refresh body must be JSON".into();

					return Err(TransportError::Build { reason });
				}

				json_response(200, &current)
			},
			(_, path) => {
				let authorized = request
					.bearer
					.as_ref()
					.is_some_and(|token| token.expose() == current.access_token.expose());

				if authorized {
					json_response(200, &json!([{ "uuid": "course-1", "path": path }]))
				} else {
					Ok(status_only(401))
				}
			},
		}
	}
}
impl ApiTransport for MockAdminApi {
	fn send(&self, request: OutboundRequest) -> TransportFuture<'_> {
		Box::pin(async move { self.respond(&request) })
	}
}

fn json_response(status: u16, payload: &impl Serialize) -> Result<ApiResponse, TransportError> {
	let body =
		serde_json::to_vec(payload).map_err(|e| TransportError::Build { reason: e.to_string() })?;

	Ok(ApiResponse {
		status,
		headers: vec![("content-type".into(), "application/json".into())],
		body,
	})
}

fn status_only(status: u16) -> ApiResponse {
	ApiResponse { status, headers: Vec::new(), body: Vec::new() }
}
