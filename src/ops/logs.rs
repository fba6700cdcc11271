use reqwest::Method;

use crate::client::GraceDb;
use crate::error::{Error, Result};
use crate::ops::{id_pair, read_upload, Fields};
use crate::resource::{ObjectHandle, ObjectKind};
use crate::transport::{ApiResponse, Body, FilePart};

/// A log message to append to an event or superevent.
#[derive(Debug, Clone, Default)]
pub struct NewLog {
	pub message: String,
	/// File to attach, or `-` for stdin.
	pub file: Option<String>,
	pub tags: Vec<String>,
	/// Either empty or one display name per tag.
	pub display_names: Vec<String>,
}

impl NewLog {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			..Default::default()
		}
	}

	pub fn with_file(mut self, file: impl Into<String>) -> Self {
		self.file = Some(file.into());
		self
	}

	pub fn with_tag(mut self, tag: impl Into<String>, display_name: Option<&str>) -> Self {
		self.tags.push(tag.into());
		if let Some(d) = display_name {
			self.display_names.push(d.to_owned());
		}
		self
	}
}

impl GraceDb {
	/// All log entries, or entry `n` only.
	pub async fn logs(&self, handle: &ObjectHandle, n: Option<u32>) -> Result<ApiResponse> {
		let n = n.map(|n| n.to_string());
		let url = match (handle.kind(), n.as_deref()) {
			(ObjectKind::Superevent, None) => self.fill("superevent-log-list-template", &[id_pair(handle)]).await?,
			(ObjectKind::Superevent, Some(n)) => {
				self.fill("superevent-log-detail-template", &[id_pair(handle), ("N", n)])
					.await?
			}
			(ObjectKind::Event, None) => self.fill("event-log-template", &[id_pair(handle)]).await?,
			(ObjectKind::Event, Some(n)) => {
				self.fill("event-log-detail-template", &[id_pair(handle), ("N", n)])
					.await?
			}
		};
		self.get(&url).await
	}

	pub async fn write_log(&self, handle: &ObjectHandle, log: &NewLog) -> Result<ApiResponse> {
		if !log.display_names.is_empty() && log.display_names.len() != log.tags.len() {
			return Err(Error::MismatchedTagNames {
				tags: log.tags.len(),
				display_names: log.display_names.len(),
			});
		}

		let template = match handle.kind() {
			ObjectKind::Superevent => "superevent-log-list-template",
			ObjectKind::Event => "event-log-template",
		};
		let url = self.fill(template, &[id_pair(handle)]).await?;

		let mut fields = Fields::default();
		fields
			.push("comment", &log.message)
			.push_all("tagname", &log.tags)
			.push_all("displayName", &log.display_names);
		let fields = fields.into_vec();

		let body = match &log.file {
			Some(path) => {
				let (filename, contents) = read_upload(path, "stdin").await?;
				Body::Multipart {
					fields,
					files: vec![FilePart::new("upload", &filename, contents)],
				}
			}
			None => Body::Form(fields),
		};
		self.request(Method::POST, &url, body).await
	}
}
