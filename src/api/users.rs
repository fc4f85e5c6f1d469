//! User endpoints.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ApiRequest, ApiTransport},
};

/// Offset pagination for user listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
	/// Number of users to skip.
	pub offset: u32,
	/// Maximum number of users to return.
	pub limit: u32,
}
impl Page {
	/// Server-side default page size.
	pub const DEFAULT_LIMIT: u32 = 50;

	/// Page following this one.
	pub fn next(self) -> Self {
		Self { offset: self.offset.saturating_add(self.limit), ..self }
	}
}
impl Default for Page {
	fn default() -> Self {
		Self { offset: 0, limit: Self::DEFAULT_LIMIT }
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Lists users one page at a time.
	pub async fn list_users(&self, page: Page) -> Result<Value> {
		let request = ApiRequest::get("/v1/admin/users")
			.with_query("offset", page.offset)
			.with_query("limit", page.limit);

		self.send_value(request).await
	}

	/// Profile of a single user.
	pub async fn user(&self, uuid: &str) -> Result<Value> {
		self.send_value(ApiRequest::get(format!("/v1/users/{uuid}"))).await
	}

	/// Achievements earned by a user.
	pub async fn user_achievements(&self, uuid: &str) -> Result<Value> {
		self.send_value(ApiRequest::get(format!("/v1/users/achievements/{uuid}"))).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn page_defaults_and_advances() {
		let page = Page::default();

		assert_eq!(page, Page { offset: 0, limit: 50 });
		assert_eq!(page.next(), Page { offset: 50, limit: 50 });
	}
}
