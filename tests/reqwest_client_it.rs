#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use lms_admin_client::{
	api::files::FileAttachment,
	auth::{CredentialKey, CredentialPair},
	client::ReqwestApiClient,
	config::ClientConfig,
	error::{Error, RequestError},
	navigation::RecordingRedirect,
	store::{CredentialStore, MemoryStore},
	url::Url,
};

fn build_client(
	server: &MockServer,
	store: Arc<MemoryStore>,
) -> (ReqwestApiClient, Arc<RecordingRedirect>) {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");
	let config = ClientConfig::builder(base).build().expect("Config should be valid.");
	let store: Arc<dyn CredentialStore> = store;
	let redirects = Arc::new(RecordingRedirect::default());
	let client = ReqwestApiClient::new(config, store)
		.expect("Reqwest client should build.")
		.with_login_redirect(redirects.clone());

	(client, redirects)
}

fn stored(store: &MemoryStore, key: CredentialKey) -> Option<String> {
	store.peek(key).map(|secret| secret.expose().to_owned())
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_replayed() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());

	store.seed(&CredentialPair::new("access-old", "refresh-old"));

	let (client, redirects) = build_client(&server, store.clone());
	let expired = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/admin/course/list")
				.header("authorization", "Bearer access-old");
			then.status(401).body("token expired");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/auth/refresh")
				.json_body(json!({ "refresh_token": "refresh-old" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\"}");
		})
		.await;
	let replay = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1/admin/course/list")
				.header("authorization", "Bearer access-new");
			then.status(200)
				.header("content-type", "application/json")
				.body("[{\"uuid\":\"course-1\"}]");
		})
		.await;
	let courses = client.list_courses().await.expect("Request should recover after refresh.");

	expired.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	replay.assert_calls_async(1).await;

	assert_eq!(courses[0]["uuid"], "course-1");
	assert_eq!(stored(&store, CredentialKey::AccessToken).as_deref(), Some("access-new"));
	assert_eq!(stored(&store, CredentialKey::RefreshToken).as_deref(), Some("refresh-new"));
	assert_eq!(redirects.count(), 0);
}

#[tokio::test]
async fn rejected_refresh_clears_credentials_and_redirects() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());

	store.seed(&CredentialPair::new("access-old", "refresh-old"));

	let (client, redirects) = build_client(&server, store.clone());
	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/auth/me");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/auth/refresh");
			then.status(401).body("refresh expired");
		})
		.await;
	let err = client.me().await.expect_err("Request should fail when refresh is rejected.");

	expired.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;

	assert!(matches!(err, Error::RefreshFailed(_)));
	assert!(store.is_empty());
	assert_eq!(redirects.count(), 1);
}

#[tokio::test]
async fn login_persists_the_issued_pair() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());
	let (client, _) = build_client(&server, store.clone());
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/auth/login")
				.json_body(json!({ "email": "admin@example.com", "password": "hunter2" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-1\",\"refresh_token\":\"refresh-1\"}");
		})
		.await;
	let pair =
		client.login("admin@example.com", "hunter2").await.expect("Login should succeed.");

	login.assert_calls_async(1).await;

	assert_eq!(pair.access_token.expose(), "access-1");
	assert_eq!(stored(&store, CredentialKey::AccessToken).as_deref(), Some("access-1"));
	assert_eq!(stored(&store, CredentialKey::RefreshToken).as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn uploaded_file_can_be_attached() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());

	store.seed(&CredentialPair::new("access-1", "refresh-1"));

	let (client, _) = build_client(&server, store);
	let upload = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/admin/file/upload")
				.header("authorization", "Bearer access-1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"file_url\":\"https://cdn.example.com/syllabus.pdf\"}");
		})
		.await;
	let attach = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/admin/file/add")
				.query_param("entity", "course")
				.query_param("uuid", "course-1")
				.json_body(json!({
					"title": "Syllabus",
					"file_url": "https://cdn.example.com/syllabus.pdf",
				}));
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let uploaded = client
		.upload_file("syllabus.pdf", "application/pdf", b"%PDF-1.7".to_vec())
		.await
		.expect("Upload should succeed.");
	let attachment =
		FileAttachment { title: "Syllabus".into(), file_url: uploaded.file_url.clone() };

	client.attach_file("course", "course-1", &attachment).await.expect("Attach should succeed.");

	upload.assert_calls_async(1).await;
	attach.assert_calls_async(1).await;

	assert_eq!(uploaded.file_url, "https://cdn.example.com/syllabus.pdf");
}

#[tokio::test]
async fn logout_clears_credentials_even_when_the_call_fails() {
	let server = MockServer::start_async().await;
	let store = Arc::new(MemoryStore::default());

	store.seed(&CredentialPair::new("access-1", "refresh-1"));

	let (client, redirects) = build_client(&server, store.clone());
	let logout = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/auth/logout");
			then.status(500).body("unavailable");
		})
		.await;
	let err = client.logout().await.expect_err("Server failure should surface.");

	logout.assert_calls_async(1).await;

	assert!(matches!(err, Error::Request(RequestError::Status { status: 500, .. })));
	assert!(store.is_empty());
	assert_eq!(redirects.count(), 0);
}
