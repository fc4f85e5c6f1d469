//! Achievement endpoints.

// self
use crate::{
	_prelude::*,
	api,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists every achievement.
	pub async fn list_achievements(&self) -> Result<Value> {
		self.send_value(ApiRequest::get("/v1/admin/achievements/list")).await
	}

	/// Creates an achievement.
	pub async fn create_achievement(&self, data: &impl Serialize) -> Result<Value> {
		let request =
			ApiRequest::post("/v1/admin/achievements/create").with_body(api::payload(data)?);

		self.send_value(request).await
	}

	/// Partially updates an achievement.
	pub async fn update_achievement(&self, id: &str, data: &impl Serialize) -> Result<Value> {
		let request = ApiRequest::patch(format!("/v1/admin/achievements/{id}"))
			.with_body(api::payload(data)?);

		self.send_value(request).await
	}

	/// Fetches one achievement.
	pub async fn achievement(&self, uuid: &str) -> Result<Value> {
		self.send_value(ApiRequest::get(format!("/v1/admin/achievements/{uuid}"))).await
	}

	/// Deletes an achievement.
	pub async fn delete_achievement(&self, id: &str) -> Result<Value> {
		self.send_value(ApiRequest::delete(format!("/v1/admin/achievements/{id}"))).await
	}
}
