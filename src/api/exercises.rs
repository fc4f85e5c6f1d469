//! Exercise endpoints.

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
	/// Lists the questions of an exercise.
	pub async fn exercise_questions(&self, exercise_uuid: &str) -> Result<Value> {
		let path = format!("/v1/admin/exercise/{exercise_uuid}/question");

		self.send_value(ApiRequest::get(path)).await
	}

	/// Public metadata of an exercise.
	pub async fn exercise_info(&self, exercise_uuid: &str) -> Result<Value> {
		self.send_value(ApiRequest::get(format!("/v1/exercise/{exercise_uuid}/info"))).await
	}

	/// Creates an exercise.
	pub async fn create_exercise(&self, data: &impl Serialize) -> Result<Value> {
		self.send_value(ApiRequest::post("/v1/admin/exercise").with_body(api::payload(data)?))
			.await
	}

	/// Partially updates an exercise.
	pub async fn update_exercise(&self, id: &str, data: &impl Serialize) -> Result<Value> {
		let request =
			ApiRequest::patch(format!("/v1/admin/exercise/{id}")).with_body(api::payload(data)?);

		self.send_value(request).await
	}

	/// Deletes an exercise.
	pub async fn delete_exercise(&self, id: &str) -> Result<Value> {
		self.send_value(ApiRequest::delete(format!("/v1/admin/exercise/{id}"))).await
	}
}
