//! Course endpoints.

// self
use crate::{
	_prelude::*,
	api,
	client::ApiClient,
	http::{ApiRequest, ApiTransport, MultipartPart, RequestBody},
};

/// MIME type used for spreadsheet imports.
pub const XLSX_CONTENT_TYPE: &str =
	"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists every course.
	pub async fn list_courses(&self) -> Result<Value> {
		self.send_value(ApiRequest::get("/v1/admin/course/list")).await
	}

	/// Lists the lessons of a course.
	pub async fn course_lessons(&self, course_uuid: &str) -> Result<Value> {
		self.send_value(ApiRequest::get(format!("/v1/admin/course/{course_uuid}/lesson"))).await
	}

	/// Creates a course.
	pub async fn create_course(&self, data: &impl Serialize) -> Result<Value> {
		self.send_value(ApiRequest::post("/v1/admin/course").with_body(api::payload(data)?)).await
	}

	/// Partially updates a course.
	pub async fn update_course(&self, id: &str, data: &impl Serialize) -> Result<Value> {
		let request =
			ApiRequest::patch(format!("/v1/admin/course/{id}")).with_body(api::payload(data)?);

		self.send_value(request).await
	}

	/// Deletes a course.
	pub async fn delete_course(&self, id: &str) -> Result<Value> {
		self.send_value(ApiRequest::delete(format!("/v1/admin/course/{id}"))).await
	}

	/// Imports courses from an `.xlsx` workbook.
	pub async fn import_courses_excel(
		&self,
		file_name: &str,
		workbook: impl Into<Vec<u8>>,
	) -> Result<Value> {
		let part = MultipartPart::file("file", file_name, XLSX_CONTENT_TYPE, workbook);
		let request = ApiRequest::post("/v1/admin/course/import-excel")
			.with_body(RequestBody::Multipart(vec![part]));

		self.send_value(request).await
	}
}
