use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tokio::io::AsyncWrite;
use tokio::sync::OnceCell;

use crate::auth::{self, AuthOptions, Credentials};
use crate::error::{Error, Result};
use crate::service::{AllowedSet, ServiceRoot};
use crate::template::UriTemplate;
use crate::transport::{ApiRequest, ApiResponse, Body, HttpSettings, HttpTransport, Transport};

pub const DEFAULT_SERVICE_URL: &str = "https://gracedb.ligo.org/api/";

/// Everything needed to construct a [`GraceDb`] client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
	pub service_url: String,
	/// API version such as `v1`. `None` or `"default"` uses the
	/// unversioned root.
	pub api_version: Option<String>,
	pub auth: AuthOptions,
	pub reload_certificate: bool,
	pub reload_buffer: Duration,
	pub timeout: Option<Duration>,
	pub proxy: Option<String>,
}

impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			service_url: DEFAULT_SERVICE_URL.into(),
			api_version: None,
			auth: AuthOptions::default(),
			reload_certificate: false,
			reload_buffer: Duration::from_secs(300),
			timeout: None,
			proxy: None,
		}
	}
}

/// A GraceDB REST client.
///
/// The server root document is fetched on first use and kept for the
/// lifetime of the client; build a new client to pick up server-side
/// vocabulary changes.
pub struct GraceDb {
	transport: Box<dyn Transport>,
	credentials: Credentials,
	service_url: String,
	versioned_url: String,
	api_version: Option<String>,
	root: OnceCell<ServiceRoot>,
}

impl GraceDb {
	/// Resolve credentials and connect with the reqwest transport.
	pub fn new(options: ClientOptions) -> Result<Self> {
		let (service_url, host) = normalize_service_url(&options.service_url)?;
		let credentials = auth::resolve(&options.auth, &host)?;
		let transport = HttpTransport::new(HttpSettings {
			credentials: credentials.clone(),
			proxy: options.proxy.clone(),
			timeout: options.timeout,
			reload_certificate: options.reload_certificate,
			reload_buffer: options.reload_buffer,
		})?;
		Self::assemble(service_url, options.api_version.as_deref(), credentials, Box::new(transport))
	}

	/// Build a client over an arbitrary transport. Credentials are taken as
	/// given; no resolution happens.
	pub fn with_transport(
		service_url: &str,
		api_version: Option<&str>,
		credentials: Credentials,
		transport: impl Transport + 'static,
	) -> Result<Self> {
		let (service_url, _) = normalize_service_url(service_url)?;
		Self::assemble(service_url, api_version, credentials, Box::new(transport))
	}

	fn assemble(
		service_url: String,
		api_version: Option<&str>,
		credentials: Credentials,
		transport: Box<dyn Transport>,
	) -> Result<Self> {
		let api_version = api_version
			.filter(|v| !v.is_empty() && *v != "default")
			.map(str::to_owned);
		let versioned_url = match &api_version {
			Some(v) => format!("{service_url}{v}/"),
			None => service_url.clone(),
		};
		Ok(Self {
			transport,
			credentials,
			service_url,
			versioned_url,
			api_version,
			root: OnceCell::new(),
		})
	}

	pub fn service_url(&self) -> &str {
		&self.service_url
	}

	/// The service URL including the API version segment, if any.
	pub fn versioned_url(&self) -> &str {
		&self.versioned_url
	}

	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Client-side view of the credentials in use, password masked.
	pub fn show_credentials(&self) -> Value {
		self.credentials.describe()
	}

	// -- Service root --

	/// The server root document, fetched once.
	pub async fn root(&self) -> Result<&ServiceRoot> {
		self.root.get_or_try_init(|| self.fetch_root()).await
	}

	async fn fetch_root(&self) -> Result<ServiceRoot> {
		tracing::debug!(url = %self.versioned_url, "fetching service root");
		let resp = match self.get(&self.versioned_url).await {
			Ok(resp) => resp,
			Err(Error::Request { status: 404, .. }) if self.api_version.is_some() => {
				return Err(self.unsupported_version().await);
			}
			Err(e) => return Err(e),
		};
		let root: ServiceRoot = serde_json::from_value(resp.json()?)?;

		if let (Some(requested), Some(available)) = (&self.api_version, &root.api_versions) {
			if !available.contains(requested) {
				return Err(Error::UnsupportedApiVersion {
					requested: requested.clone(),
					available: available.clone(),
				});
			}
		}
		Ok(root)
	}

	/// The versioned root was not found: ask the unversioned root which
	/// versions exist.
	async fn unsupported_version(&self) -> Error {
		let available = match self.get(&self.service_url).await {
			Ok(resp) => resp
				.json()
				.ok()
				.and_then(|v| v.get("API_VERSIONS").cloned())
				.and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
				.unwrap_or_default(),
			Err(e) => return e,
		};
		Error::UnsupportedApiVersion {
			requested: self.api_version.clone().unwrap_or_default(),
			available,
		}
	}

	pub async fn template(&self, name: &str) -> Result<UriTemplate> {
		self.root().await?.template(name)
	}

	/// Fill the named server template.
	pub async fn fill(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
		self.template(name).await?.fill(params)
	}

	pub async fn link(&self, rel: &str) -> Result<String> {
		Ok(self.root().await?.link(rel)?.to_owned())
	}

	pub async fn api_versions(&self) -> Result<Vec<String>> {
		Ok(self.root().await?.api_versions.clone().unwrap_or_default())
	}

	pub async fn server_version(&self) -> Result<Option<String>> {
		Ok(self.root().await?.server_version.clone())
	}

	pub async fn links(&self) -> Result<&BTreeMap<String, String>> {
		Ok(&self.root().await?.links)
	}

	pub async fn templates(&self) -> Result<&BTreeMap<String, String>> {
		Ok(&self.root().await?.templates)
	}

	pub async fn groups(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.groups)
	}

	pub async fn pipelines(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.pipelines)
	}

	pub async fn searches(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.searches)
	}

	pub async fn allowed_labels(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.labels)
	}

	pub async fn em_groups(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.em_groups)
	}

	pub async fn voevent_types(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.voevent_types)
	}

	pub async fn superevent_categories(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.superevent_categories)
	}

	pub async fn instruments(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.instruments)
	}

	pub async fn signoff_types(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.signoff_types)
	}

	pub async fn signoff_statuses(&self) -> Result<&AllowedSet> {
		Ok(&self.root().await?.signoff_statuses)
	}

	// -- Account --

	/// Check the server is reachable.
	pub async fn ping(&self) -> Result<ApiResponse> {
		let url = self.link("self").await?;
		self.get(&url).await
	}

	/// What the server knows about the authenticated user.
	pub async fn user_info(&self) -> Result<ApiResponse> {
		let url = self.link("user-info").await?;
		self.get(&url).await
	}

	// -- Request plumbing --

	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		self.transport.send(request).await
	}

	pub(crate) async fn get(&self, url: &str) -> Result<ApiResponse> {
		self.send(ApiRequest::new(Method::GET, url)).await
	}

	pub(crate) async fn download(&self, url: &str, sink: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64> {
		self.transport.download(ApiRequest::new(Method::GET, url), sink).await
	}

	pub(crate) async fn delete(&self, url: &str) -> Result<ApiResponse> {
		self.send(ApiRequest::new(Method::DELETE, url)).await
	}

	pub(crate) async fn request(&self, method: Method, url: &str, body: Body) -> Result<ApiResponse> {
		self.send(ApiRequest::new(method, url).with_body(body)).await
	}
}

/// Validate the service URL and make sure it ends with `/`. Returns the
/// normalized URL and its host.
pub fn normalize_service_url(raw: &str) -> Result<(String, String)> {
	let invalid = |reason: &str| Error::InvalidServiceUrl {
		url: raw.to_owned(),
		reason: reason.to_owned(),
	};
	let parsed = url::Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
	if !matches!(parsed.scheme(), "http" | "https") {
		return Err(invalid("scheme must be http or https"));
	}
	let host = parsed.host_str().ok_or_else(|| invalid("missing host"))?.to_owned();

	let mut url = raw.to_owned();
	if !url.ends_with('/') {
		url.push('/');
	}
	Ok((url, host))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn service_url_gets_trailing_slash() {
		let (url, host) = normalize_service_url("https://gracedb.ligo.org/api").unwrap();
		assert_eq!(url, "https://gracedb.ligo.org/api/");
		assert_eq!(host, "gracedb.ligo.org");

		let (url, _) = normalize_service_url("https://gracedb.ligo.org/api/").unwrap();
		assert_eq!(url, "https://gracedb.ligo.org/api/");
	}

	#[test]
	fn bad_service_urls() {
		assert!(matches!(normalize_service_url("gracedb.ligo.org/api"), Err(Error::InvalidServiceUrl { .. })));
		assert!(matches!(normalize_service_url("ftp://h/api/"), Err(Error::InvalidServiceUrl { .. })));
	}

	#[test]
	fn default_options() {
		let o = ClientOptions::default();
		assert_eq!(o.service_url, DEFAULT_SERVICE_URL);
		assert_eq!(o.reload_buffer, Duration::from_secs(300));
		assert!(!o.reload_certificate);
	}
}
