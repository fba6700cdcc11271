//! Domain operations, grouped by resource. Each file adds an `impl GraceDb`
//! block.
//!
//! Operations that work on both events and superevents take an
//! [`ObjectHandle`](crate::resource::ObjectHandle) and branch on its kind
//! once to pick the URI template and body shape.

pub mod emobservations;
pub mod events;
pub mod files;
pub mod labels;
pub mod logs;
pub mod permissions;
pub mod signoffs;
pub mod superevents;
pub mod tags;
pub mod voevents;

use std::fmt;
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::error::Result;
use crate::resource::ObjectHandle;

pub use emobservations::{EmObservation, OneOrMany};
pub use events::{GrbUpdate, NewEvent, SearchOptions};
pub use logs::NewLog;
pub use permissions::PermissionAction;
pub use signoffs::{NewSignoff, SignoffKey};
pub use superevents::{NewSuperevent, SupereventUpdate};
pub use voevents::NewVoevent;

/// Path that means "read standard input".
pub const STDIN_SENTINEL: &str = "-";

/// Ordered form fields; lists are sent as repeated keys.
#[derive(Debug, Default)]
pub(crate) struct Fields(Vec<(String, String)>);

impl Fields {
	pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
		self.0.push((key.to_owned(), value.to_string()));
		self
	}

	pub fn push_opt<T: ToString>(&mut self, key: &str, value: Option<T>) -> &mut Self {
		if let Some(v) = value {
			self.push(key, v);
		}
		self
	}

	pub fn push_all<T: fmt::Display>(&mut self, key: &str, values: &[T]) -> &mut Self {
		for v in values {
			self.push(key, v);
		}
		self
	}

	pub fn into_vec(self) -> Vec<(String, String)> {
		self.0
	}
}

/// Booleans as the server's form parser expects them.
pub(crate) fn form_bool(b: bool) -> &'static str {
	if b {
		"True"
	} else {
		"False"
	}
}

/// Read an upload from `path`, or from stdin when `path` is `-`. Returns
/// the filename to send along with the contents.
pub(crate) async fn read_upload(path: &str, stdin_name: &str) -> Result<(String, Vec<u8>)> {
	if path == STDIN_SENTINEL {
		let mut contents = Vec::new();
		tokio::io::stdin().read_to_end(&mut contents).await?;
		return Ok((stdin_name.to_owned(), contents));
	}
	let contents = tokio::fs::read(path).await?;
	let name = Path::new(path)
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| path.to_owned());
	Ok((name, contents))
}

/// `(id_param, id)` for filling an object-scoped template.
pub(crate) fn id_pair(handle: &ObjectHandle) -> (&'static str, &str) {
	(handle.id_param(), handle.id())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fields_keep_order_and_repeat_lists() {
		let mut f = Fields::default();
		f.push("comment", "hello")
			.push_all("tagname", &["a", "b"])
			.push_opt("displayName", None::<&str>)
			.push("offline", form_bool(false));
		assert_eq!(
			f.into_vec(),
			[
				("comment".to_owned(), "hello".to_owned()),
				("tagname".to_owned(), "a".to_owned()),
				("tagname".to_owned(), "b".to_owned()),
				("offline".to_owned(), "False".to_owned()),
			]
		);
	}

	#[tokio::test]
	async fn upload_uses_basename() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("coinc.xml");
		std::fs::write(&path, b"<xml/>").unwrap();
		let (name, contents) = read_upload(path.to_str().unwrap(), "stdin").await.unwrap();
		assert_eq!(name, "coinc.xml");
		assert_eq!(contents, b"<xml/>");
	}

	#[tokio::test]
	async fn missing_upload_is_io_error() {
		let err = read_upload("/nonexistent/file.xml", "stdin").await.unwrap_err();
		assert!(matches!(err, crate::Error::Io(_)));
	}
}
