use reqwest::Method;
use serde_json::Value;

use crate::client::GraceDb;
use crate::error::{Error, Result};
use crate::ops::{form_bool, read_upload, Fields};
use crate::transport::{ApiRequest, ApiResponse, Body, FilePart};

/// Filename sent when event data is read from stdin.
pub const STDIN_EVENT_FILENAME: &str = "initial.data";

/// Parameters for [`GraceDb::create_event`].
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
	pub group: String,
	pub pipeline: String,
	/// Path of the event file, or `-` for stdin.
	pub file: String,
	pub search: Option<String>,
	pub labels: Vec<String>,
	pub offline: bool,
	/// Upload these bytes instead of reading `file`; `file` then only names
	/// the upload.
	pub contents: Option<Vec<u8>>,
}

impl NewEvent {
	pub fn new(group: impl Into<String>, pipeline: impl Into<String>, file: impl Into<String>) -> Self {
		Self {
			group: group.into(),
			pipeline: pipeline.into(),
			file: file.into(),
			..Default::default()
		}
	}
}

/// Fields of a GRB event that can be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrbUpdate {
	pub ra: Option<f64>,
	pub dec: Option<f64>,
	pub error_radius: Option<f64>,
	pub t90: Option<f64>,
	pub redshift: Option<f64>,
	pub designation: Option<String>,
}

impl GrbUpdate {
	pub const FIELDS: &'static [&'static str] = &["ra", "dec", "error_radius", "t90", "redshift", "designation"];

	fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

/// Query parameters shared by event and superevent searches.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
	pub query: Option<String>,
	/// Sort key(s), comma separated; prefix with `-` for descending.
	pub orderby: Option<String>,
	/// Page size requested from the server.
	pub count: Option<u32>,
	pub columns: Vec<String>,
	pub max_results: Option<usize>,
}

impl GraceDb {
	pub async fn create_event(&self, event: &NewEvent) -> Result<ApiResponse> {
		let root = self.root().await?;
		root.groups.require("group", &event.group)?;
		root.pipelines.require("pipeline", &event.pipeline)?;
		if let Some(search) = &event.search {
			root.searches.require("search", search)?;
		}
		for label in &event.labels {
			root.labels.require("label", label)?;
		}
		let url = root.link("events")?.to_owned();

		let (filename, contents) = match &event.contents {
			Some(contents) => (event.file.clone(), contents.clone()),
			None => read_upload(&event.file, STDIN_EVENT_FILENAME).await?,
		};

		let mut fields = Fields::default();
		fields
			.push("group", &event.group)
			.push("pipeline", &event.pipeline)
			.push("offline", form_bool(event.offline))
			.push_opt("search", event.search.as_ref())
			.push_all("labels", &event.labels);

		let body = Body::Multipart {
			fields: fields.into_vec(),
			files: vec![FilePart::new("eventFile", &filename, contents)],
		};
		self.request(Method::POST, &url, body).await
	}

	/// Replace an event's data file. Only the original submitter may do this.
	pub async fn replace_event(&self, graceid: &str, path: &str) -> Result<ApiResponse> {
		let url = self.fill("event-detail-template", &[("graceid", graceid)]).await?;
		let contents = tokio::fs::read(path).await?;
		let filename = std::path::Path::new(path)
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_else(|| path.to_owned());
		let body = Body::Multipart {
			fields: Vec::new(),
			files: vec![FilePart::new("eventFile", &filename, contents)],
		};
		self.request(Method::PUT, &url, body).await
	}

	pub async fn update_grb_event(&self, graceid: &str, update: &GrbUpdate) -> Result<ApiResponse> {
		if update.is_empty() {
			return Err(Error::NoUpdateFields(GrbUpdate::FIELDS));
		}
		let url = self.fill("update-grbevent-template", &[("graceid", graceid)]).await?;
		let mut fields = Fields::default();
		fields
			.push_opt("ra", update.ra)
			.push_opt("dec", update.dec)
			.push_opt("error_radius", update.error_radius)
			.push_opt("t90", update.t90)
			.push_opt("redshift", update.redshift)
			.push_opt("designation", update.designation.as_ref());
		self.request(Method::PATCH, &url, Body::Form(fields.into_vec())).await
	}

	pub async fn event(&self, graceid: &str) -> Result<ApiResponse> {
		let url = self.fill("event-detail-template", &[("graceid", graceid)]).await?;
		self.get(&url).await
	}

	/// Search events, following result pages until exhausted or
	/// `max_results` is reached. Column selection happens server-side.
	pub async fn events(&self, opts: &SearchOptions) -> Result<Vec<Value>> {
		let url = self.link("events").await?;
		let mut query = search_query(opts);
		if !opts.columns.is_empty() {
			query.push(("columns".into(), opts.columns.join(",")));
		}
		self.paginate(url, query, "events", opts.max_results).await
	}

	/// Number of events matching `query`.
	pub async fn num_events(&self, query: Option<&str>) -> Result<u64> {
		let url = self.link("events").await?;
		let params = query
			.map(|q| vec![("query".to_owned(), q.to_owned())])
			.unwrap_or_default();
		let resp = self.send(ApiRequest::new(Method::GET, url).with_query(params)).await?;
		let count = resp.json()?.get("numRows").cloned().unwrap_or(Value::Null);
		Ok(serde_json::from_value(count)?)
	}

	/// Walk a paginated listing. The first request carries `query`; later
	/// pages come from `links.next`, which already encodes it.
	pub(crate) async fn paginate(
		&self,
		url: String,
		query: Vec<(String, String)>,
		key: &str,
		max_results: Option<usize>,
	) -> Result<Vec<Value>> {
		let mut results = Vec::new();
		let mut request = Some(ApiRequest::new(Method::GET, url).with_query(query));

		while let Some(req) = request.take() {
			let page = self.send(req).await?.json()?;
			if let Some(items) = page.get(key).and_then(Value::as_array) {
				for item in items {
					if max_results.is_some_and(|max| results.len() >= max) {
						return Ok(results);
					}
					results.push(item.clone());
				}
			}
			request = page
				.pointer("/links/next")
				.and_then(Value::as_str)
				.map(|next| ApiRequest::new(Method::GET, next));
		}
		Ok(results)
	}
}

pub(crate) fn search_query(opts: &SearchOptions) -> Vec<(String, String)> {
	let mut query = Vec::new();
	if let Some(q) = opts.query.as_deref().filter(|q| !q.is_empty()) {
		query.push(("query".into(), q.to_owned()));
	}
	if let Some(count) = opts.count {
		query.push(("count".into(), count.to_string()));
	}
	if let Some(sort) = opts.orderby.as_deref().filter(|s| !s.is_empty()) {
		query.push(("sort".into(), sort.to_owned()));
	}
	query
}
