use std::fmt;

use reqwest::Method;

use crate::client::GraceDb;
use crate::error::{Error, Result};
use crate::ops::{id_pair, Fields};
use crate::resource::ObjectHandle;
use crate::transport::{ApiResponse, Body};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionAction {
	/// Make the superevent visible to the public.
	Expose,
	/// Restrict it to internal users again.
	Hide,
}

impl PermissionAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Expose => "expose",
			Self::Hide => "hide",
		}
	}
}

impl fmt::Display for PermissionAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl GraceDb {
	/// Superevents only.
	pub async fn permissions(&self, handle: &ObjectHandle) -> Result<ApiResponse> {
		if !handle.is_superevent() {
			return Err(Error::NotImplementedForEvents("permissions"));
		}
		let url = self
			.fill("superevent-permission-list-template", &[id_pair(handle)])
			.await?;
		self.get(&url).await
	}

	/// Superevents only.
	pub async fn modify_permissions(&self, handle: &ObjectHandle, action: PermissionAction) -> Result<ApiResponse> {
		if !handle.is_superevent() {
			return Err(Error::NotImplementedForEvents("permissions"));
		}
		let url = self
			.fill("superevent-permission-modify-template", &[id_pair(handle)])
			.await?;
		let mut fields = Fields::default();
		fields.push("action", action);
		self.request(Method::POST, &url, Body::Form(fields.into_vec())).await
	}
}
