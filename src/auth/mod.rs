//! Credential resolution.
//!
//! Lookup order, first match wins:
//!
//! 1. explicit X.509 material (cert/key pair or combined proxy file), then an
//!    explicit username/password pair;
//! 2. `X509_USER_CERT` + `X509_USER_KEY`, else `X509_USER_PROXY`;
//! 3. the grid proxy at `/tmp/x509up_u<uid>`;
//! 4. `~/.globus/usercert.pem` + `~/.globus/userkey.pem`;
//! 5. a `.netrc` entry for the service host (`$NETRC` or `~/.netrc`).
//!
//! X.509 material that is found but unusable (unreadable, unparseable or
//! expired) fails resolution instead of falling through.

pub mod netrc;

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::cert;
use crate::error::{Error, Result};

/// Where an X.509 identity lives on disk. A combined proxy file holds both
/// certificate and key, so `cert_file == key_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X509Credential {
	pub cert_file: PathBuf,
	pub key_file: PathBuf,
}

impl X509Credential {
	pub fn pair(cert_file: impl Into<PathBuf>, key_file: impl Into<PathBuf>) -> Self {
		Self {
			cert_file: cert_file.into(),
			key_file: key_file.into(),
		}
	}

	pub fn proxy(path: impl Into<PathBuf>) -> Self {
		let path = path.into();
		Self {
			cert_file: path.clone(),
			key_file: path,
		}
	}

	pub fn is_combined(&self) -> bool {
		self.cert_file == self.key_file
	}

	/// Parse the `--creds` form: `CERT,KEY` or a single `PROXY` path.
	pub fn parse(creds: &str) -> Result<Self> {
		let parts: Vec<&str> = creds.split(',').map(str::trim).collect();
		match parts.as_slice() {
			[proxy] if !proxy.is_empty() => Ok(Self::proxy(proxy)),
			[cert, key] if !cert.is_empty() && !key.is_empty() => Ok(Self::pair(cert, key)),
			_ => Err(Error::MalformedCredentials(format!(
				"expected CERT,KEY or PROXY, got '{creds}'"
			))),
		}
	}

	/// PEM bytes holding certificate and private key, ready for a TLS
	/// client identity.
	pub fn identity_pem(&self) -> Result<Vec<u8>> {
		let read = |path: &Path| {
			std::fs::read(path).map_err(|e| Error::InvalidCredential {
				path: path.to_owned(),
				reason: format!("cannot read file: {e}"),
			})
		};
		let mut pem = read(&self.cert_file)?;
		if !self.is_combined() {
			if !pem.ends_with(b"\n") {
				pem.push(b'\n');
			}
			pem.extend(read(&self.key_file)?);
		}
		Ok(pem)
	}

	fn validated(self) -> Result<Self> {
		cert::validate_certificate(&self.cert_file)?;
		if !self.is_combined() && !self.key_file.is_file() {
			return Err(Error::InvalidCredential {
				path: self.key_file,
				reason: "key file not found".into(),
			});
		}
		Ok(self)
	}
}

/// The resolved authentication mode of a client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Credentials {
	X509(X509Credential),
	Basic { username: String, password: String },
	#[default]
	None,
}

impl Credentials {
	pub fn auth_type(&self) -> Option<&'static str> {
		match self {
			Self::X509(_) => Some("x509"),
			Self::Basic { .. } => Some("basic"),
			Self::None => None,
		}
	}

	/// Summary for display. Passwords are masked.
	pub fn describe(&self) -> Value {
		match self {
			Self::X509(x) => json!({
				"auth_type": "x509",
				"cert_file": x.cert_file,
				"key_file": x.key_file,
			}),
			Self::Basic { username, .. } => json!({
				"auth_type": "basic",
				"username": username,
				"password": "********",
			}),
			Self::None => json!({ "auth_type": null }),
		}
	}
}

/// What the caller supplied about authentication.
#[derive(Debug, Clone, Default)]
pub struct AuthOptions {
	pub x509: Option<X509Credential>,
	pub username: Option<String>,
	pub password: Option<String>,
	pub force_noauth: bool,
	pub fail_if_noauth: bool,
}

/// Process facts the resolver consults. Swappable so resolution can be
/// exercised without touching the real environment.
pub trait Environment {
	fn var(&self, key: &str) -> Option<String>;
	fn uid(&self) -> Option<u32>;
	fn home_dir(&self) -> Option<PathBuf>;
}

/// The real process environment.
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
	fn var(&self, key: &str) -> Option<String> {
		std::env::var(key).ok().filter(|v| !v.is_empty())
	}

	#[cfg(unix)]
	fn uid(&self) -> Option<u32> {
		// SAFETY: getuid has no preconditions and cannot fail.
		Some(unsafe { libc::getuid() })
	}

	#[cfg(not(unix))]
	fn uid(&self) -> Option<u32> {
		None
	}

	fn home_dir(&self) -> Option<PathBuf> {
		dirs::home_dir()
	}
}

pub fn resolve(options: &AuthOptions, host: &str) -> Result<Credentials> {
	resolve_with(options, host, &SystemEnvironment)
}

pub fn resolve_with(options: &AuthOptions, host: &str, env: &dyn Environment) -> Result<Credentials> {
	if options.force_noauth {
		if options.fail_if_noauth {
			return Err(Error::ConflictingAuthFlags);
		}
		return Ok(Credentials::None);
	}

	if let Some(x509) = &options.x509 {
		return Ok(Credentials::X509(x509.clone().validated()?));
	}

	match (&options.username, &options.password) {
		(Some(username), Some(password)) => {
			return Ok(Credentials::Basic {
				username: username.clone(),
				password: password.clone(),
			});
		}
		(Some(_), None) | (None, Some(_)) => {
			return Err(Error::MalformedCredentials(
				"provide both a username and a password for basic authentication".into(),
			));
		}
		(None, None) => {}
	}

	if let Some(x509) = find_x509(env) {
		return Ok(Credentials::X509(x509.validated()?));
	}

	if let Some(path) = netrc_path(env) {
		if let Some(entry) = netrc::lookup(&path, host)? {
			tracing::debug!(netrc = %path.display(), host, "using basic auth from netrc");
			return Ok(Credentials::Basic {
				username: entry.login,
				password: entry.password,
			});
		}
	}

	if options.fail_if_noauth {
		return Err(Error::NoCredentials);
	}
	tracing::warn!("authentication credentials not found, proceeding with unauthenticated session");
	Ok(Credentials::None)
}

fn find_x509(env: &dyn Environment) -> Option<X509Credential> {
	let cert = env.var("X509_USER_CERT");
	let key = env.var("X509_USER_KEY");
	match (cert, key, env.var("X509_USER_PROXY")) {
		(Some(cert), Some(key), _) => return Some(X509Credential::pair(cert, key)),
		(_, _, Some(proxy)) => return Some(X509Credential::proxy(proxy)),
		(Some(_), None, None) | (None, Some(_), None) => {
			tracing::warn!(
				"must supply X509_USER_PROXY or both X509_USER_CERT and X509_USER_KEY; \
				 ignoring X.509 environment"
			);
		}
		(None, None, None) => {}
	}

	if let Some(uid) = env.uid() {
		let proxy = PathBuf::from(format!("/tmp/x509up_u{uid}"));
		if proxy.exists() {
			return Some(X509Credential::proxy(proxy));
		}
	}

	let globus = env.home_dir()?.join(".globus");
	let (cert, key) = (globus.join("usercert.pem"), globus.join("userkey.pem"));
	(cert.exists() && key.exists()).then(|| X509Credential::pair(cert, key))
}

fn netrc_path(env: &dyn Environment) -> Option<PathBuf> {
	env.var("NETRC")
		.map(PathBuf::from)
		.or_else(|| env.home_dir().map(|h| h.join(".netrc")))
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	#[derive(Default)]
	struct FakeEnv {
		vars: HashMap<&'static str, String>,
		home: Option<PathBuf>,
	}

	impl Environment for FakeEnv {
		fn var(&self, key: &str) -> Option<String> {
			self.vars.get(key).cloned()
		}
		fn uid(&self) -> Option<u32> {
			// Nobody has a proxy for this uid.
			Some(4_000_000_000)
		}
		fn home_dir(&self) -> Option<PathBuf> {
			self.home.clone()
		}
	}

	#[test]
	fn parses_creds_argument() {
		assert_eq!(X509Credential::parse("/a/cert.pem,/a/key.pem").unwrap(), X509Credential::pair("/a/cert.pem", "/a/key.pem"));
		assert!(X509Credential::parse("/tmp/proxy").unwrap().is_combined());
		assert!(matches!(X509Credential::parse("a,b,c"), Err(Error::MalformedCredentials(_))));
		assert!(matches!(X509Credential::parse("a,"), Err(Error::MalformedCredentials(_))));
	}

	#[test]
	fn conflicting_flags_fail_first() {
		let opts = AuthOptions {
			force_noauth: true,
			fail_if_noauth: true,
			username: Some("u".into()),
			..Default::default()
		};
		assert!(matches!(resolve_with(&opts, "h", &FakeEnv::default()), Err(Error::ConflictingAuthFlags)));
	}

	#[test]
	fn force_noauth_skips_lookup() {
		let opts = AuthOptions {
			force_noauth: true,
			username: Some("u".into()),
			password: Some("p".into()),
			..Default::default()
		};
		assert_eq!(resolve_with(&opts, "h", &FakeEnv::default()).unwrap(), Credentials::None);
	}

	#[test]
	fn explicit_basic_auth() {
		let opts = AuthOptions {
			username: Some("albert".into()),
			password: Some("e=mc2".into()),
			..Default::default()
		};
		let creds = resolve_with(&opts, "h", &FakeEnv::default()).unwrap();
		assert_eq!(creds.auth_type(), Some("basic"));
		assert_eq!(creds.describe()["password"], "********");
	}

	#[test]
	fn half_basic_auth_is_an_input_error() {
		let opts = AuthOptions {
			username: Some("albert".into()),
			..Default::default()
		};
		assert!(matches!(resolve_with(&opts, "h", &FakeEnv::default()), Err(Error::MalformedCredentials(_))));
	}

	#[test]
	fn nothing_found() {
		let env = FakeEnv::default();
		assert_eq!(resolve_with(&AuthOptions::default(), "h", &env).unwrap(), Credentials::None);

		let strict = AuthOptions {
			fail_if_noauth: true,
			..Default::default()
		};
		assert!(matches!(resolve_with(&strict, "h", &env), Err(Error::NoCredentials)));
	}

	#[test]
	fn explicit_missing_cert_is_hard_failure() {
		let opts = AuthOptions {
			x509: Some(X509Credential::proxy("/nonexistent/proxy")),
			username: Some("u".into()),
			password: Some("p".into()),
			..Default::default()
		};
		assert!(matches!(resolve_with(&opts, "h", &FakeEnv::default()), Err(Error::InvalidCredential { .. })));
	}

	#[test]
	fn env_proxy_that_is_invalid_does_not_fall_through() {
		let mut env = FakeEnv::default();
		env.vars.insert("X509_USER_PROXY", "/nonexistent/x509up".into());
		assert!(matches!(resolve_with(&AuthOptions::default(), "h", &env), Err(Error::InvalidCredential { .. })));
	}

	#[test]
	fn half_set_env_falls_through_to_netrc() {
		let dir = tempfile::tempdir().unwrap();
		let netrc = dir.path().join("netrc");
		std::fs::write(&netrc, "machine gracedb.test login bob password pw\n").unwrap();
		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			std::fs::set_permissions(&netrc, std::fs::Permissions::from_mode(0o600)).unwrap();
		}

		let mut env = FakeEnv::default();
		env.vars.insert("X509_USER_CERT", "/nonexistent/cert.pem".into());
		env.vars.insert("NETRC", netrc.display().to_string());

		let creds = resolve_with(&AuthOptions::default(), "gracedb.test", &env).unwrap();
		assert_eq!(
			creds,
			Credentials::Basic {
				username: "bob".into(),
				password: "pw".into()
			}
		);
	}

	#[test]
	fn half_set_env_falls_through_to_globus() {
		let home = tempfile::tempdir().unwrap();
		let globus = home.path().join(".globus");
		std::fs::create_dir(&globus).unwrap();

		let mut params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
		params.not_before = rcgen::date_time_ymd(2020, 1, 1);
		params.not_after = rcgen::date_time_ymd(4000, 1, 1);
		let key = rcgen::KeyPair::generate().unwrap();
		let cert = params.self_signed(&key).unwrap();
		std::fs::write(globus.join("usercert.pem"), cert.pem()).unwrap();
		std::fs::write(globus.join("userkey.pem"), key.serialize_pem()).unwrap();

		let mut env = FakeEnv {
			home: Some(home.path().to_owned()),
			..Default::default()
		};
		env.vars.insert("X509_USER_CERT", "/stale/cert.pem".into());
		env.vars.insert("NETRC", home.path().join("no-netrc").display().to_string());

		let creds = resolve_with(&AuthOptions::default(), "gracedb.test", &env).unwrap();
		assert_eq!(
			creds,
			Credentials::X509(X509Credential::pair(globus.join("usercert.pem"), globus.join("userkey.pem")))
		);
	}

	#[test]
	fn describe_x509() {
		let creds = Credentials::X509(X509Credential::proxy("/tmp/x509up_u1"));
		let d = creds.describe();
		assert_eq!(d["auth_type"], "x509");
		assert_eq!(d["cert_file"], d["key_file"]);
		assert_eq!(Credentials::None.describe()["auth_type"], Value::Null);
	}
}
