//! Question endpoints, including answer options and matching pairs.

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
	/// Lists the answer options of a question.
	pub async fn question_options(&self, question_uuid: &str) -> Result<Value> {
		let path = format!("/v1/admin/question/{question_uuid}/question-option");

		self.send_value(ApiRequest::get(path)).await
	}

	/// Public metadata of a question.
	pub async fn question_info(&self, question_uuid: &str) -> Result<Value> {
		self.send_value(ApiRequest::get(format!("/v1/question/{question_uuid}/info"))).await
	}

	/// Lists the matching pairs of a matching question.
	pub async fn matching_pairs(&self, question_uuid: &str) -> Result<Value> {
		let path = format!("/v1/admin/question/{question_uuid}/matching-pair");

		self.send_value(ApiRequest::get(path)).await
	}

	/// Creates a question.
	pub async fn create_question(&self, data: &impl Serialize) -> Result<Value> {
		self.send_value(ApiRequest::post("/v1/admin/question").with_body(api::payload(data)?))
			.await
	}

	/// Partially updates a question.
	pub async fn update_question(&self, id: &str, data: &impl Serialize) -> Result<Value> {
		let request =
			ApiRequest::patch(format!("/v1/admin/question/{id}")).with_body(api::payload(data)?);

		self.send_value(request).await
	}

	/// Deletes a question.
	pub async fn delete_question(&self, id: &str) -> Result<Value> {
		self.send_value(ApiRequest::delete(format!("/v1/admin/question/{id}"))).await
	}

	/// Adds an answer option to a question.
	pub async fn create_question_option(&self, data: &impl Serialize) -> Result<Value> {
		let request = ApiRequest::post("/v1/admin/question-option").with_body(api::payload(data)?);

		self.send_value(request).await
	}

	/// Removes an answer option.
	pub async fn delete_question_option(&self, id: &str) -> Result<Value> {
		self.send_value(ApiRequest::delete(format!("/v1/admin/question-option/{id}"))).await
	}

	/// Adds a matching pair to a question.
	pub async fn create_matching_pair(&self, data: &impl Serialize) -> Result<Value> {
		let request = ApiRequest::post("/v1/admin/matching-pair").with_body(api::payload(data)?);

		self.send_value(request).await
	}

	/// Removes a matching pair.
	pub async fn delete_matching_pair(&self, id: &str) -> Result<Value> {
		self.send_value(ApiRequest::delete(format!("/v1/admin/matching-pair/{id}"))).await
	}
}
