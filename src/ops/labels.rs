use reqwest::Method;

use crate::client::GraceDb;
use crate::error::Result;
use crate::ops::{id_pair, Fields};
use crate::resource::{ObjectHandle, ObjectKind};
use crate::transport::{ApiResponse, Body};

impl GraceDb {
	/// Labels applied to an object, or a single label if `label` is given.
	pub async fn labels(&self, handle: &ObjectHandle, label: Option<&str>) -> Result<ApiResponse> {
		let label = label.filter(|l| !l.is_empty());
		if let Some(label) = label {
			self.root().await?.labels.require("label", label)?;
		}
		let url = match (handle.kind(), label) {
			(ObjectKind::Superevent, Some(label)) => {
				self.fill("superevent-label-detail-template", &[id_pair(handle), ("label_name", label)])
					.await?
			}
			(ObjectKind::Superevent, None) => self.fill("superevent-label-list-template", &[id_pair(handle)]).await?,
			(ObjectKind::Event, label) => {
				self.fill("event-label-template", &[id_pair(handle), ("label", label.unwrap_or(""))])
					.await?
			}
		};
		self.get(&url).await
	}

	/// Apply a label. Events take a bodiless PUT on the label URL;
	/// superevents take a POST naming the label.
	pub async fn write_label(&self, handle: &ObjectHandle, label: &str) -> Result<ApiResponse> {
		self.root().await?.labels.require("label", label)?;
		match handle.kind() {
			ObjectKind::Superevent => {
				let url = self.fill("superevent-label-list-template", &[id_pair(handle)]).await?;
				let mut fields = Fields::default();
				fields.push("name", label);
				self.request(Method::POST, &url, Body::Form(fields.into_vec())).await
			}
			ObjectKind::Event => {
				let url = self
					.fill("event-label-template", &[id_pair(handle), ("label", label)])
					.await?;
				self.request(Method::PUT, &url, Body::Empty).await
			}
		}
	}

	/// Remove a label. The server reports labels that are not applied.
	pub async fn remove_label(&self, handle: &ObjectHandle, label: &str) -> Result<ApiResponse> {
		let url = match handle.kind() {
			ObjectKind::Superevent => {
				self.fill("superevent-label-detail-template", &[id_pair(handle), ("label_name", label)])
					.await?
			}
			ObjectKind::Event => {
				self.fill("event-label-template", &[id_pair(handle), ("label", label)])
					.await?
			}
		};
		self.delete(&url).await
	}
}
