//! File storage endpoints: uploads and attachments to courses, lessons, and so on.

// self
use crate::{
	_prelude::*,
	api,
	client::ApiClient,
	http::{ApiRequest, ApiTransport, MultipartPart, RequestBody},
};

/// Metadata linking an uploaded file to an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
	/// Display title.
	pub title: String,
	/// URL returned by [`ApiClient::upload_file`].
	pub file_url: String,
}

/// Response of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
	/// Where the stored file can be fetched from.
	pub file_url: String,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists stored files.
	pub async fn list_files(&self) -> Result<Value> {
		self.send_value(ApiRequest::get("/v1/admin/file/list")).await
	}

	/// Uploads a file as `multipart/form-data` under the `file` field.
	pub async fn upload_file(
		&self,
		file_name: &str,
		content_type: &str,
		data: impl Into<Vec<u8>>,
	) -> Result<UploadedFile> {
		let part = MultipartPart::file("file", file_name, content_type, data);
		let request = ApiRequest::post("/v1/admin/file/upload")
			.with_body(RequestBody::Multipart(vec![part]));

		self.send_json(request).await
	}

	/// Attaches an uploaded file to an entity (e.g. `course`, `lesson`).
	pub async fn attach_file(
		&self,
		entity: &str,
		uuid: &str,
		attachment: &FileAttachment,
	) -> Result<Value> {
		let request = ApiRequest::post("/v1/admin/file/add")
			.with_query("entity", entity)
			.with_query("uuid", uuid)
			.with_body(api::payload(attachment)?);

		self.send_value(request).await
	}

	/// Detaches the file pinned to an entity.
	pub async fn unpin_file(&self, entity: &str, uuid: &str) -> Result<Value> {
		let request = ApiRequest::post("/v1/admin/file/unpin")
			.with_query("entity", entity)
			.with_query("uuid", uuid)
			.with_json(Value::Object(Default::default()));

		self.send_value(request).await
	}

	/// Deletes a stored file by name.
	pub async fn delete_file(&self, file_name: &str) -> Result<Value> {
		let request = ApiRequest::delete("/v1/admin/file/delete").with_query("file_name", file_name);

		self.send_value(request).await
	}
}
