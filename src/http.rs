//! Transport primitives for API calls.
//!
//! The module exposes [`ApiTransport`] alongside the request/response value types it trades in
//! so hosts can plug in a custom HTTP stack without touching the refresh logic. The request
//! client resolves an [`ApiRequest`] into an [`OutboundRequest`] (absolute URL plus the bearer
//! credential read from storage) and hands it to the transport; the transport returns whatever
//! status the server produced. Classifying statuses is the client's job, not the transport's.

// self
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};
#[cfg(feature = "reqwest")]
use crate::{config::ClientConfig, error::ConfigError};

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute API calls.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// every clone of a client, and the futures they return must be `Send` so request flows can
/// hop executor threads.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and returns the raw response, whatever its status.
	///
	/// Only failures that prevent a response from being produced (DNS, TCP, TLS, timeouts,
	/// unencodable bodies) are errors.
	fn send(&self, request: OutboundRequest) -> TransportFuture<'_>;
}

/// HTTP methods used by the admin API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Put => "PUT",
			Self::Patch => "PATCH",
			Self::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One field of a `multipart/form-data` body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartPart {
	/// Form field name.
	pub name: String,
	/// File name reported to the server, if the part is a file.
	pub file_name: Option<String>,
	/// MIME type of the part.
	pub content_type: Option<String>,
	/// Raw part contents.
	pub data: Vec<u8>,
}
impl MultipartPart {
	/// Creates a file part.
	pub fn file(
		name: impl Into<String>,
		file_name: impl Into<String>,
		content_type: impl Into<String>,
		data: impl Into<Vec<u8>>,
	) -> Self {
		Self {
			name: name.into(),
			file_name: Some(file_name.into()),
			content_type: Some(content_type.into()),
			data: data.into(),
		}
	}

	/// Creates a plain text part.
	pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			file_name: None,
			content_type: None,
			data: value.into().into_bytes(),
		}
	}
}

/// Request payload. Bodies are owned and cloneable so a request can be replayed after refresh.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// `application/json` body.
	Json(Value),
	/// `multipart/form-data` body.
	Multipart(Vec<MultipartPart>),
}
impl RequestBody {
	/// Serializes `payload` into a JSON body.
	pub fn json(payload: &impl Serialize) -> Result<Self> {
		serde_json::to_value(payload).map(Self::Json).map_err(Error::Encode)
	}
}

/// Per-request options: query parameters and extra headers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
	/// Query pairs appended to the URL, in order.
	pub query: Vec<(String, String)>,
	/// Extra headers. An `Authorization` header here is replaced by the stored bearer.
	pub headers: Vec<(String, String)>,
}
impl RequestOptions {
	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Appends a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}
}

/// A caller's request, relative to the configured base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the base URL, without query string.
	pub path: String,
	/// Payload.
	pub body: RequestBody,
	/// Query parameters and headers.
	pub options: RequestOptions,
	retried: bool,
}
impl ApiRequest {
	/// Creates a request without body or options.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			body: RequestBody::Empty,
			options: RequestOptions::default(),
			retried: false,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Replaces the body.
	pub fn with_body(mut self, body: RequestBody) -> Self {
		self.body = body;

		self
	}

	/// Replaces the body with an already-built JSON value.
	pub fn with_json(self, value: Value) -> Self {
		self.with_body(RequestBody::Json(value))
	}

	/// Replaces the options.
	pub fn with_options(mut self, options: RequestOptions) -> Self {
		self.options = options;

		self
	}

	/// Appends a query pair.
	pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.options = self.options.query(key, value);

		self
	}

	/// Whether the request was already replayed once after a 401.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}
}

/// Fully resolved request handed to an [`ApiTransport`].
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL including query string.
	pub url: Url,
	/// Extra headers from the caller's options.
	pub headers: Vec<(String, String)>,
	/// Payload.
	pub body: RequestBody,
	/// Bearer credential to attach, if one is stored.
	pub bearer: Option<TokenSecret>,
}

/// Raw API response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers whose values are valid UTF-8.
	pub headers: Vec<(String, String)>,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Any 2xx status.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Body decoded lossily as UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// First header value matching `name`, case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
	}

	/// Deserializes the body, reporting the JSON path of any mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.decode().map_err(Error::Decode)
	}

	/// Deserializes the body as loose JSON; an empty body yields [`Value::Null`].
	pub fn json_value(&self) -> Result<Value> {
		if self.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Null);
		}

		self.json()
	}

	pub(crate) fn decode<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a reqwest client honoring the config's timeout and user agent.
	pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		let mut builder = ReqwestClient::builder().user_agent(config.user_agent.as_str());

		if let Some(timeout) = config.timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn send(&self, request: OutboundRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Patch => reqwest::Method::PATCH,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in &request.headers {
				if !name.eq_ignore_ascii_case("authorization") {
					builder = builder.header(name.as_str(), value.as_str());
				}
			}
			if let Some(bearer) = &request.bearer {
				builder = builder.bearer_auth(bearer.expose());
			}

			builder = match request.body {
				RequestBody::Empty => builder,
				RequestBody::Json(value) => builder.json(&value),
				RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
			};

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn build_form(parts: Vec<MultipartPart>) -> Result<reqwest::multipart::Form, TransportError> {
	let mut form = reqwest::multipart::Form::new();

	for MultipartPart { name, file_name, content_type, data } in parts {
		let mut part = reqwest::multipart::Part::bytes(data);

		if let Some(file_name) = file_name {
			part = part.file_name(file_name);
		}
		if let Some(content_type) = content_type {
			part = part.mime_str(&content_type)?;
		}

		form = form.part(name, part);
	}

	Ok(form)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn response_helpers_classify_status() {
		let ok = ApiResponse { status: 204, headers: Vec::new(), body: Vec::new() };
		let denied = ApiResponse { status: 401, headers: Vec::new(), body: b"nope".to_vec() };

		assert!(ok.is_success());
		assert!(!ok.is_unauthorized());
		assert!(denied.is_unauthorized());
		assert!(!denied.is_success());
		assert_eq!(denied.text(), "nope");
		assert_eq!(ok.json_value().expect("Empty body should decode to null."), Value::Null);
	}

	#[test]
	fn json_errors_report_the_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Pair {
			#[allow(dead_code)]
			access_token: String,
		}

		let response =
			ApiResponse { status: 200, headers: Vec::new(), body: br#"{"access_token":7}"#.to_vec() };
		let err = response.decode::<Pair>().expect_err("Wrong field type should fail.");

		assert_eq!(err.path().to_string(), "access_token");
	}

	#[test]
	fn request_builders_compose_options() {
		let request = ApiRequest::delete("/v1/admin/file/delete").with_query("file_name", "a.png");

		assert_eq!(request.method, Method::Delete);
		assert_eq!(request.options.query, vec![("file_name".to_owned(), "a.png".to_owned())]);
		assert!(!request.is_retried());
	}

	#[test]
	fn header_lookup_is_case_insensitive() {
		let response = ApiResponse {
			status: 200,
			headers: vec![("Content-Type".into(), "application/json".into())],
			body: Vec::new(),
		};

		assert_eq!(response.header("content-type"), Some("application/json"));
	}
}
