use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_SERVICE_URL;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: ServiceConfig,
	pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
	pub url: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub api_version: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
	/// Reload an X.509 certificate from disk when it is about to expire.
	pub reload_certificate: bool,
	/// Seconds before expiry at which a reload happens.
	pub reload_buffer: u64,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_SERVICE_URL.into(),
			api_version: None,
			timeout_secs: None,
		}
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			reload_certificate: false,
			reload_buffer: 300,
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.gracedb/).
	pub fn dir() -> Option<PathBuf> {
		dirs::home_dir().map(|home| home.join(".gracedb"))
	}

	/// Path to the config file.
	pub fn path() -> Option<PathBuf> {
		Self::dir().map(|dir| dir.join("config.toml"))
	}

	/// Load config from disk, falling back to defaults if no file exists.
	pub fn load() -> anyhow::Result<Self> {
		match Self::path() {
			Some(path) => Self::load_from(&path),
			None => Ok(Self::default()),
		}
	}

	pub fn load_from(path: &Path) -> anyhow::Result<Self> {
		if path.exists() {
			let content = std::fs::read_to_string(path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.service.timeout_secs.map(Duration::from_secs)
	}

	pub fn reload_buffer(&self) -> Duration {
		Duration::from_secs(self.auth.reload_buffer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_sensible() {
		let c = Config::default();
		assert_eq!(c.service.url, "https://gracedb.ligo.org/api/");
		assert!(c.service.api_version.is_none());
		assert!(c.timeout().is_none());
		assert!(!c.auth.reload_certificate);
		assert_eq!(c.reload_buffer(), Duration::from_secs(300));
	}

	#[test]
	fn partial_file_keeps_defaults() {
		let c: Config = toml::from_str("[service]\nurl = \"https://gracedb-playground.ligo.org/api/\"\n").unwrap();
		assert_eq!(c.service.url, "https://gracedb-playground.ligo.org/api/");
		assert_eq!(c.auth.reload_buffer, 300);
	}

	#[test]
	fn load_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");

		let mut c = Config::default();
		c.service.api_version = Some("v1".into());
		c.service.timeout_secs = Some(30);
		c.auth.reload_certificate = true;
		std::fs::write(&path, toml::to_string_pretty(&c).unwrap()).unwrap();

		let loaded = Config::load_from(&path).unwrap();
		assert_eq!(loaded.service.api_version.as_deref(), Some("v1"));
		assert_eq!(loaded.timeout(), Some(Duration::from_secs(30)));
		assert!(loaded.auth.reload_certificate);
	}

	#[test]
	fn missing_file_gives_defaults() {
		let c = Config::load_from(Path::new("/nonexistent/config.toml")).unwrap();
		assert_eq!(c.service.url, DEFAULT_SERVICE_URL);
	}
}
