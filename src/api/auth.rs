//! Session endpoints: login, refresh, logout, and account recovery.

// self
use crate::{
	_prelude::*,
	api,
	auth::{CredentialPair, TokenSecret},
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

const LOGIN: &str = "/v1/auth/login";
const TOKEN_STATUS: &str = "/v1/auth/token/status";
const LOGOUT: &str = "/v1/auth/logout";
const VERIFICATION_CODE: &str = "/v1/auth/verification/code";
const PASSWORD_RESET: &str = "/v1/auth/password/reset";
const ME: &str = "/v1/auth/me";

#[derive(Serialize)]
struct LoginRequest<'a> {
	email: &'a str,
	password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
	refresh_token: &'a str,
}

#[derive(Serialize)]
struct PasswordResetRequest<'a> {
	code: &'a str,
	email: &'a str,
	new_password: &'a str,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Logs in and persists the issued credential pair.
	pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair> {
		let request =
			ApiRequest::post(LOGIN).with_body(api::payload(&LoginRequest { email, password })?);
		let pair: CredentialPair = self.send_json(request).await?;

		self.store.save_pair(&pair).await?;

		Ok(pair)
	}

	/// Exchanges a refresh credential at the refresh endpoint.
	///
	/// The returned pair is not persisted; the automatic refresh path does that on its own.
	pub async fn refresh_token(&self, refresh: &TokenSecret) -> Result<CredentialPair> {
		let body = api::payload(&RefreshRequest { refresh_token: refresh.expose() })?;

		self.send_json(ApiRequest::post(self.config.refresh_path.as_str()).with_body(body)).await
	}

	/// Reports whether the current access token is still accepted.
	pub async fn check_token(&self) -> Result<Value> {
		self.send_value(ApiRequest::get(TOKEN_STATUS)).await
	}

	/// Ends the session server-side and discards stored credentials.
	///
	/// Credentials are cleared even if the logout call fails; the call's error wins over a
	/// storage error.
	pub async fn logout(&self) -> Result<Value> {
		let result = self.send_value(ApiRequest::post(LOGOUT)).await;
		let cleared = self.store.clear().await;

		match (result, cleared) {
			(Err(e), _) => Err(e),
			(Ok(_), Err(e)) => Err(e.into()),
			(Ok(value), Ok(())) => Ok(value),
		}
	}

	/// Asks the server to mail a password-reset verification code.
	pub async fn request_verification_code(&self, email: &str) -> Result<Value> {
		self.send_value(ApiRequest::post(VERIFICATION_CODE).with_query("email", email)).await
	}

	/// Resets a password with a mailed verification code.
	pub async fn reset_password(&self, code: &str, email: &str, new_password: &str) -> Result<Value> {
		let body = api::payload(&PasswordResetRequest { code, email, new_password })?;

		self.send_value(ApiRequest::post(PASSWORD_RESET).with_body(body)).await
	}

	/// Profile of the authenticated user.
	pub async fn me(&self) -> Result<Value> {
		self.send_value(ApiRequest::get(ME)).await
	}
}
