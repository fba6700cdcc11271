//! Minimal `.netrc` reader for basic-auth lookup.
//!
//! A file that supplies an entry for the host must belong to the current
//! user and must not be readable by group or others, matching the checks
//! `ftp` applies. Files with no usable entry are never rejected.

use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetrcEntry {
	pub login: String,
	pub password: String,
}

/// Find the login/password for `host`, falling back to a `default` entry.
/// A missing file is not an error.
pub fn lookup(path: &Path, host: &str) -> Result<Option<NetrcEntry>> {
	let content = match std::fs::read_to_string(path) {
		Ok(c) => c,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(e.into()),
	};
	let Some(entry) = find(&content, host) else {
		return Ok(None);
	};
	check_permissions(path)?;
	Ok(Some(entry))
}

pub(crate) fn find(content: &str, host: &str) -> Option<NetrcEntry> {
	let mut machines: Vec<(Option<String>, Option<String>, Option<String>)> = Vec::new();
	let mut lines = content.lines();

	while let Some(line) = lines.next() {
		if line.trim_start().starts_with('#') {
			continue;
		}
		let mut tokens = line.split_whitespace();
		while let Some(token) = tokens.next() {
			match token {
				"machine" => machines.push((tokens.next().map(str::to_owned), None, None)),
				"default" => machines.push((None, None, None)),
				"login" => {
					if let Some(m) = machines.last_mut() {
						m.1 = tokens.next().map(str::to_owned);
					}
				}
				"password" => {
					if let Some(m) = machines.last_mut() {
						m.2 = tokens.next().map(str::to_owned);
					}
				}
				"account" => {
					tokens.next();
				}
				"macdef" => {
					// Macro body runs until the next blank line.
					for body in lines.by_ref() {
						if body.trim().is_empty() {
							break;
						}
					}
					break;
				}
				_ => {}
			}
		}
	}

	let pick = |want: Option<&str>| {
		machines
			.iter()
			.find(|(name, _, _)| name.as_deref() == want)
			.and_then(|(_, login, password)| {
				Some(NetrcEntry {
					login: login.clone()?,
					password: password.clone()?,
				})
			})
	};
	pick(Some(host)).or_else(|| pick(None))
}

#[cfg(unix)]
fn check_permissions(path: &Path) -> Result<()> {
	use std::os::unix::fs::MetadataExt;

	let meta = std::fs::metadata(path)?;
	// SAFETY: getuid has no preconditions and cannot fail.
	let uid = unsafe { libc::getuid() };
	if meta.uid() != uid {
		return Err(Error::InvalidCredential {
			path: path.to_owned(),
			reason: format!("netrc file owner (uid {}) does not match current user (uid {uid})", meta.uid()),
		});
	}
	if meta.mode() & 0o077 != 0 {
		return Err(Error::InvalidCredential {
			path: path.to_owned(),
			reason: "netrc access too permissive: permissions must restrict access to only the owner".into(),
		});
	}
	Ok(())
}

#[cfg(not(unix))]
fn check_permissions(_path: &Path) -> Result<()> {
	Ok(())
}
