//! Lesson endpoints.

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
	/// Lists the exercises of a lesson.
	pub async fn lesson_exercises(&self, lesson_uuid: &str) -> Result<Value> {
		self.send_value(ApiRequest::get(format!("/v1/admin/lesson/{lesson_uuid}/exercise"))).await
	}

	/// Public metadata of a lesson.
	pub async fn lesson_info(&self, lesson_uuid: &str) -> Result<Value> {
		self.send_value(ApiRequest::get(format!("/v1/lesson/{lesson_uuid}/info"))).await
	}

	/// Creates a lesson.
	pub async fn create_lesson(&self, data: &impl Serialize) -> Result<Value> {
		self.send_value(ApiRequest::post("/v1/admin/lesson").with_body(api::payload(data)?)).await
	}

	/// Partially updates a lesson.
	pub async fn update_lesson(&self, id: &str, data: &impl Serialize) -> Result<Value> {
		let request =
			ApiRequest::patch(format!("/v1/admin/lesson/{id}")).with_body(api::payload(data)?);

		self.send_value(request).await
	}

	/// Deletes a lesson.
	pub async fn delete_lesson(&self, id: &str) -> Result<Value> {
		self.send_value(ApiRequest::delete(format!("/v1/admin/lesson/{id}"))).await
	}
}
