//! The HTTP seam between the client and the network.
//!
//! Operations build an [`ApiRequest`] and hand it to a [`Transport`]. The
//! production implementation is [`HttpTransport`] on top of reqwest; tests
//! swap in a recording fake.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::auth::{Credentials, X509Credential};
use crate::cert;
use crate::error::{Error, Result};

pub const USER_AGENT: &str = concat!("gracedb-client/", env!("CARGO_PKG_VERSION"));

/// A file attached to a multipart request.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
	pub field: String,
	pub filename: String,
	pub contents: Vec<u8>,
	pub mime: String,
}

impl FilePart {
	/// Build a part whose content type is guessed from `filename`.
	pub fn new(field: &str, filename: &str, contents: Vec<u8>) -> Self {
		Self {
			field: field.to_owned(),
			filename: filename.to_owned(),
			mime: mime_guess::from_path(filename)
				.first_or_octet_stream()
				.essence_str()
				.to_owned(),
			contents,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
	#[default]
	Empty,
	/// `application/x-www-form-urlencoded`; repeated keys encode lists.
	Form(Vec<(String, String)>),
	Json(Value),
	Multipart {
		fields: Vec<(String, String)>,
		files: Vec<FilePart>,
	},
}

impl Body {
	/// Form fields of a `Form` or `Multipart` body, in order.
	pub fn fields(&self) -> &[(String, String)] {
		match self {
			Self::Form(fields) | Self::Multipart { fields, .. } => fields,
			_ => &[],
		}
	}

	/// All values sent for `key`.
	pub fn field_values(&self, key: &str) -> Vec<&str> {
		self.fields()
			.iter()
			.filter(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
			.collect()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
	pub method: Method,
	pub url: String,
	pub query: Vec<(String, String)>,
	pub body: Body,
}

impl ApiRequest {
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			query: Vec::new(),
			body: Body::Empty,
		}
	}

	pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
		self.query = query;
		self
	}

	pub fn with_body(mut self, body: Body) -> Self {
		self.body = body;
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
	pub status: u16,
	pub reason: String,
	pub body: Vec<u8>,
}

impl ApiResponse {
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			reason: reason_phrase(status),
			body: body.into(),
		}
	}

	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decode the body as JSON. "No content" decodes to `{}`, and bodies
	/// that are JSON-encoded strings of JSON are unwrapped.
	pub fn json(&self) -> Result<Value> {
		if self.status == 204 || self.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Value::Object(Default::default()));
		}
		let mut value: Value = serde_json::from_slice(&self.body)?;
		for _ in 1..3 {
			let Value::String(inner) = &value else { break };
			match serde_json::from_str(inner) {
				Ok(decoded) => value = decoded,
				Err(_) => break,
			}
		}
		Ok(value)
	}
}

pub(crate) fn reason_phrase(status: u16) -> String {
	reqwest::StatusCode::from_u16(status)
		.ok()
		.and_then(|s| s.canonical_reason())
		.unwrap_or("")
		.to_owned()
}

/// Sends a request and returns the response. Non-2xx statuses are
/// returned as [`Error::Request`]; connection failures as
/// [`Error::Transport`] or [`Error::Timeout`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
	async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;

	/// Like [`Transport::send`], but copies the response body into `sink`
	/// and returns the number of bytes written. The default buffers the
	/// whole body first.
	async fn download(&self, request: ApiRequest, sink: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64> {
		let resp = self.send(request).await?;
		sink.write_all(&resp.body).await?;
		sink.flush().await?;
		Ok(resp.body.len() as u64)
	}
}

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpSettings {
	pub credentials: Credentials,
	pub proxy: Option<String>,
	pub timeout: Option<Duration>,
	pub reload_certificate: bool,
	pub reload_buffer: Duration,
}

/// reqwest-backed transport. When certificate reloading is on, the
/// certificate's expiry is checked before every request and the TLS
/// identity is reloaded from disk once it falls inside the reload buffer.
pub struct HttpTransport {
	settings: HttpSettings,
	state: Mutex<ClientState>,
}

struct ClientState {
	client: reqwest::Client,
	cert_expiry: Option<DateTime<Utc>>,
}

impl HttpTransport {
	pub fn new(settings: HttpSettings) -> Result<Self> {
		let state = build_state(&settings)?;
		Ok(Self {
			settings,
			state: Mutex::new(state),
		})
	}

	fn current_client(&self) -> Result<reqwest::Client> {
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		if self.settings.reload_certificate && self.needs_reload(state.cert_expiry) {
			if let Credentials::X509(x509) = &self.settings.credentials {
				tracing::info!(cert = %x509.cert_file.display(), "certificate expiring, reloading");
			}
			*state = build_state(&self.settings)?;
		}
		Ok(state.client.clone())
	}

	fn needs_reload(&self, expiry: Option<DateTime<Utc>>) -> bool {
		let Some(expiry) = expiry else { return false };
		let buffer = chrono::Duration::from_std(self.settings.reload_buffer).unwrap_or_default();
		expiry - Utc::now() <= buffer
	}
}

fn build_state(settings: &HttpSettings) -> Result<ClientState> {
	let mut builder = reqwest::Client::builder().user_agent(USER_AGENT).gzip(true);

	if let Some(proxy) = &settings.proxy {
		builder = builder.proxy(reqwest::Proxy::all(proxy)?);
	}
	if let Some(timeout) = settings.timeout {
		builder = builder.timeout(timeout);
	}

	let mut cert_expiry = None;
	if let Credentials::X509(x509) = &settings.credentials {
		builder = builder.identity(load_identity(x509)?);
		cert_expiry = Some(cert::load_certificate(&x509.cert_file)?.not_after);
	}

	Ok(ClientState {
		client: builder.build()?,
		cert_expiry,
	})
}

fn load_identity(x509: &X509Credential) -> Result<reqwest::Identity> {
	let pem = x509.identity_pem()?;
	reqwest::Identity::from_pem(&pem).map_err(|e| Error::InvalidCredential {
		path: x509.cert_file.clone(),
		reason: format!("unusable TLS identity: {e}"),
	})
}

impl HttpTransport {
	fn prepare(&self, request: ApiRequest) -> Result<reqwest::RequestBuilder> {
		let client = self.current_client()?;
		tracing::debug!(method = %request.method, url = %request.url, "sending request");

		let mut builder = client.request(request.method, &request.url);
		if !request.query.is_empty() {
			builder = builder.query(&request.query);
		}
		if let Credentials::Basic { username, password } = &self.settings.credentials {
			builder = builder.basic_auth(username, Some(password));
		}
		Ok(match request.body {
			Body::Empty => builder,
			Body::Form(fields) => builder.form(&fields),
			Body::Json(value) => builder.json(&value),
			Body::Multipart { fields, files } => {
				let mut form = Form::new();
				for (key, value) in fields {
					form = form.text(key, value);
				}
				for file in files {
					let part = Part::bytes(file.contents)
						.file_name(file.filename)
						.mime_str(&file.mime)?;
					form = form.part(file.field, part);
				}
				builder.multipart(form)
			}
		})
	}
}

/// Turn a non-2xx response into [`Error::Request`], keeping the full body.
async fn request_error(resp: reqwest::Response) -> Error {
	let status = resp.status();
	let body = match resp.bytes().await {
		Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
		Err(e) => return e.into(),
	};
	Error::Request {
		status: status.as_u16(),
		reason: status.canonical_reason().unwrap_or("").to_owned(),
		body,
	}
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
	async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		let resp = self.prepare(request)?.send().await?;
		let status = resp.status();
		if !status.is_success() {
			return Err(request_error(resp).await);
		}
		let body = resp.bytes().await?.to_vec();
		tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

		Ok(ApiResponse {
			status: status.as_u16(),
			reason: status.canonical_reason().unwrap_or("").to_owned(),
			body,
		})
	}

	async fn download(&self, request: ApiRequest, sink: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64> {
		let mut resp = self.prepare(request)?.send().await?;
		if !resp.status().is_success() {
			return Err(request_error(resp).await);
		}
		let mut written = 0u64;
		while let Some(chunk) = resp.chunk().await? {
			sink.write_all(&chunk).await?;
			written += chunk.len() as u64;
		}
		sink.flush().await?;
		tracing::debug!(bytes = written, "download finished");
		Ok(written)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn no_content_decodes_to_empty_object() {
		assert_eq!(ApiResponse::new(204, "").json().unwrap(), json!({}));
		assert_eq!(ApiResponse::new(200, "  \n").json().unwrap(), json!({}));
	}

	#[test]
	fn string_wrapped_json_is_unwrapped() {
		let inner = json!({"graceid": "G1"}).to_string();
		let once = serde_json::to_string(&inner).unwrap();
		assert_eq!(ApiResponse::new(200, once).json().unwrap(), json!({"graceid": "G1"}));
	}

	#[test]
	fn invalid_json_is_an_error() {
		assert!(matches!(ApiResponse::new(200, "<html>").json(), Err(Error::Json(_))));
	}

	#[test]
	fn reason_phrases() {
		assert_eq!(ApiResponse::new(404, "").reason, "Not Found");
		assert_eq!(ApiResponse::new(599, "").reason, "");
	}

	#[test]
	fn file_part_guesses_mime() {
		assert_eq!(FilePart::new("upload", "plot.png", vec![]).mime, "image/png");
		assert_eq!(FilePart::new("eventFile", "initial.data", vec![]).mime, "application/octet-stream");
	}

	#[test]
	fn body_field_lookup() {
		let body = Body::Form(vec![
			("tagname".into(), "a".into()),
			("comment".into(), "hi".into()),
			("tagname".into(), "b".into()),
		]);
		assert_eq!(body.field_values("tagname"), ["a", "b"]);
		assert!(Body::Empty.fields().is_empty());
	}

	#[test]
	fn plain_transport_builds() {
		assert!(HttpTransport::new(HttpSettings::default()).is_ok());
	}
}
