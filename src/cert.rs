use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use x509_parser::pem::Pem;

use crate::error::{Error, Result};

/// The parts of an X.509 certificate the client cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
	pub path: PathBuf,
	pub subject: String,
	pub not_after: DateTime<Utc>,
}

impl CertificateInfo {
	pub fn is_expired(&self) -> bool {
		self.expires_within(Duration::zero())
	}

	/// True if the certificate expires less than `buffer` from now.
	pub fn expires_within(&self, buffer: Duration) -> bool {
		self.not_after - Utc::now() <= buffer
	}
}

/// Read and parse the first certificate in `path`. PEM files (including
/// combined proxy files holding the key as well) and raw DER are accepted.
pub fn load_certificate(path: &Path) -> Result<CertificateInfo> {
	let invalid = |reason: String| Error::InvalidCredential {
		path: path.to_owned(),
		reason,
	};

	let data = std::fs::read(path).map_err(|e| invalid(format!("cannot read file: {e}")))?;

	for pem in Pem::iter_from_buffer(&data) {
		let pem = match pem {
			Ok(p) => p,
			Err(_) => break,
		};
		if pem.label != "CERTIFICATE" {
			continue;
		}
		let cert = pem
			.parse_x509()
			.map_err(|e| invalid(format!("unparseable certificate: {e}")))?;
		return info_from(path, &cert).ok_or_else(|| invalid("bad expiration date".into()));
	}

	let (_, cert) = x509_parser::parse_x509_certificate(&data)
		.map_err(|_| invalid("not a PEM or DER encoded certificate".into()))?;
	info_from(path, &cert).ok_or_else(|| invalid("bad expiration date".into()))
}

/// Load a certificate and reject it if it has already expired.
pub fn validate_certificate(path: &Path) -> Result<CertificateInfo> {
	let info = load_certificate(path)?;
	if info.is_expired() {
		return Err(Error::InvalidCredential {
			path: path.to_owned(),
			reason: format!("certificate expired at {}", info.not_after),
		});
	}
	Ok(info)
}

fn info_from(path: &Path, cert: &x509_parser::certificate::X509Certificate<'_>) -> Option<CertificateInfo> {
	let not_after = DateTime::from_timestamp(cert.validity().not_after.timestamp(), 0)?;
	Some(CertificateInfo {
		path: path.to_owned(),
		subject: cert.subject().to_string(),
		not_after,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn info(not_after: DateTime<Utc>) -> CertificateInfo {
		CertificateInfo {
			path: PathBuf::from("/tmp/cert.pem"),
			subject: "CN=test".into(),
			not_after,
		}
	}

	#[test]
	fn expiry_checks_respect_buffer() {
		let soon = info(Utc::now() + Duration::seconds(120));
		assert!(!soon.is_expired());
		assert!(soon.expires_within(Duration::seconds(300)));
		assert!(!soon.expires_within(Duration::seconds(60)));

		let past = info(Utc::now() - Duration::seconds(1));
		assert!(past.is_expired());
	}

	#[test]
	fn missing_file_is_invalid_credential() {
		let err = load_certificate(Path::new("/nonexistent/cert.pem")).unwrap_err();
		assert!(matches!(err, Error::InvalidCredential { .. }));
	}

	#[test]
	fn garbage_is_invalid_credential() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("junk.pem");
		std::fs::write(&path, b"not a certificate").unwrap();
		let err = load_certificate(&path).unwrap_err();
		assert!(matches!(err, Error::InvalidCredential { reason, .. } if reason.contains("PEM or DER")));
	}
}
