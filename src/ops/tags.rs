use reqwest::Method;

use crate::client::GraceDb;
use crate::error::Result;
use crate::ops::{id_pair, Fields};
use crate::resource::{ObjectHandle, ObjectKind};
use crate::transport::{ApiResponse, Body};

impl GraceDb {
	/// Tags on log entry `n`.
	pub async fn tags(&self, handle: &ObjectHandle, n: u32) -> Result<ApiResponse> {
		let n = n.to_string();
		let template = match handle.kind() {
			ObjectKind::Superevent => "superevent-log-tag-list-template",
			ObjectKind::Event => "taglist-template",
		};
		let url = self.fill(template, &[id_pair(handle), ("N", n.as_str())]).await?;
		self.get(&url).await
	}

	/// Tag log entry `n`. `display_name` only matters when the tag does not
	/// exist on the server yet.
	pub async fn add_tag(
		&self,
		handle: &ObjectHandle,
		n: u32,
		tag_name: &str,
		display_name: Option<&str>,
	) -> Result<ApiResponse> {
		let n = n.to_string();
		let mut fields = Fields::default();
		match handle.kind() {
			ObjectKind::Superevent => {
				let url = self
					.fill("superevent-log-tag-list-template", &[id_pair(handle), ("N", n.as_str())])
					.await?;
				fields.push("name", tag_name).push_opt("displayName", display_name);
				self.request(Method::POST, &url, Body::Form(fields.into_vec())).await
			}
			ObjectKind::Event => {
				let url = self
					.fill("tag-template", &[id_pair(handle), ("N", n.as_str()), ("tag_name", tag_name)])
					.await?;
				fields.push_opt("displayName", display_name);
				self.request(Method::PUT, &url, Body::Form(fields.into_vec())).await
			}
		}
	}

	pub async fn remove_tag(&self, handle: &ObjectHandle, n: u32, tag_name: &str) -> Result<ApiResponse> {
		let n = n.to_string();
		let template = match handle.kind() {
			ObjectKind::Superevent => "superevent-log-tag-detail-template",
			ObjectKind::Event => "tag-template",
		};
		let url = self
			.fill(template, &[id_pair(handle), ("N", n.as_str()), ("tag_name", tag_name)])
			.await?;
		self.delete(&url).await
	}
}
