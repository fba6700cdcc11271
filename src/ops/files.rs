use std::collections::BTreeMap;

use tokio::io::AsyncWrite;

use crate::client::GraceDb;
use crate::error::Result;
use crate::ops::id_pair;
use crate::resource::{ObjectHandle, ObjectKind};
use crate::transport::ApiResponse;

impl GraceDb {
	/// Without a filename, the file listing (basename to URL, as JSON).
	/// With one, that file's raw contents in the response body.
	pub async fn files(&self, handle: &ObjectHandle, filename: Option<&str>) -> Result<ApiResponse> {
		let url = self.file_url(handle, filename).await?;
		self.get(&url).await
	}

	/// Stream one file's contents into `sink` without holding the whole body
	/// in memory. Returns the number of bytes written.
	pub async fn download_file(
		&self,
		handle: &ObjectHandle,
		filename: &str,
		sink: &mut (dyn AsyncWrite + Unpin + Send),
	) -> Result<u64> {
		let url = self.file_url(handle, Some(filename)).await?;
		self.download(&url, sink).await
	}

	async fn file_url(&self, handle: &ObjectHandle, filename: Option<&str>) -> Result<String> {
		let filename = filename.filter(|f| !f.is_empty());
		match (handle.kind(), filename) {
			(ObjectKind::Superevent, Some(name)) => {
				self.fill("superevent-file-detail-template", &[id_pair(handle), ("file_name", name)])
					.await
			}
			(ObjectKind::Superevent, None) => self.fill("superevent-file-list-template", &[id_pair(handle)]).await,
			(ObjectKind::Event, name) => {
				self.fill("files-template", &[id_pair(handle), ("filename", name.unwrap_or(""))])
					.await
			}
		}
	}

	/// The file listing decoded into a name to URL map.
	pub async fn file_list(&self, handle: &ObjectHandle) -> Result<BTreeMap<String, String>> {
		let listing = self.files(handle, None).await?.json()?;
		Ok(serde_json::from_value(listing)?)
	}

	/// Raw contents of one file.
	pub async fn file_contents(&self, handle: &ObjectHandle, filename: &str) -> Result<Vec<u8>> {
		Ok(self.files(handle, Some(filename)).await?.body)
	}
}
