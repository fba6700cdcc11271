//! Operator and advocate signoffs on superevents.
//!
//! Nothing is held client-side: a signoff is created with a POST to the
//! list URL, then addressed by `type + instrument` (e.g. `OPH1`, `ADV`) for
//! PATCH, GET and DELETE. Every call rejects events before validating or
//! touching the network.

use reqwest::Method;

use crate::client::GraceDb;
use crate::error::{Error, Result};
use crate::ops::{id_pair, Fields};
use crate::resource::ObjectHandle;
use crate::transport::{ApiResponse, Body};

pub const OPERATOR: &str = "OP";
pub const ADVOCATE: &str = "ADV";

/// Which signoff: a type (code or display name) plus, for operator
/// signoffs, the instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignoffKey {
	pub signoff_type: String,
	pub instrument: String,
}

impl SignoffKey {
	pub fn new(signoff_type: impl Into<String>, instrument: impl Into<String>) -> Self {
		Self {
			signoff_type: signoff_type.into(),
			instrument: instrument.into(),
		}
	}

	pub fn operator(instrument: impl Into<String>) -> Self {
		Self::new(OPERATOR, instrument)
	}

	pub fn advocate() -> Self {
		Self::new(ADVOCATE, "")
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignoff {
	pub key: SignoffKey,
	pub status: String,
	pub comment: String,
}

/// Codes after alias resolution.
#[derive(Debug)]
struct Resolved {
	signoff_type: String,
	instrument: String,
	status: Option<String>,
}

impl Resolved {
	fn typeinst(&self) -> String {
		format!("{}{}", self.signoff_type, self.instrument)
	}
}

impl GraceDb {
	/// One signoff if `key` is given, otherwise all of them.
	pub async fn signoffs(&self, handle: &ObjectHandle, key: Option<&SignoffKey>) -> Result<ApiResponse> {
		require_superevent(handle)?;
		let url = match key {
			Some(key) => {
				let resolved = self.resolve_signoff(key, None).await?;
				self.signoff_detail_url(handle, &resolved).await?
			}
			None => self.fill("superevent-signoff-list-template", &[id_pair(handle)]).await?,
		};
		self.get(&url).await
	}

	pub async fn create_signoff(&self, handle: &ObjectHandle, signoff: &NewSignoff) -> Result<ApiResponse> {
		require_superevent(handle)?;
		let resolved = self.resolve_signoff(&signoff.key, Some(&signoff.status)).await?;
		let url = self.fill("superevent-signoff-list-template", &[id_pair(handle)]).await?;

		let mut fields = Fields::default();
		fields
			.push("signoff_type", &resolved.signoff_type)
			.push("instrument", &resolved.instrument)
			.push("comment", &signoff.comment)
			.push_opt("status", resolved.status.as_ref());
		self.request(Method::POST, &url, Body::Form(fields.into_vec())).await
	}

	/// Change the status and/or comment of an existing signoff.
	pub async fn update_signoff(
		&self,
		handle: &ObjectHandle,
		key: &SignoffKey,
		status: Option<&str>,
		comment: Option<&str>,
	) -> Result<ApiResponse> {
		require_superevent(handle)?;
		if status.is_none() && comment.is_none() {
			return Err(Error::NoUpdateFields(&["status", "comment"]));
		}
		let resolved = self.resolve_signoff(key, status).await?;
		let url = self.signoff_detail_url(handle, &resolved).await?;

		let mut fields = Fields::default();
		fields
			.push_opt("comment", comment)
			.push_opt("status", resolved.status.as_ref());
		self.request(Method::PATCH, &url, Body::Form(fields.into_vec())).await
	}

	pub async fn delete_signoff(&self, handle: &ObjectHandle, key: &SignoffKey) -> Result<ApiResponse> {
		require_superevent(handle)?;
		let resolved = self.resolve_signoff(key, None).await?;
		let url = self.signoff_detail_url(handle, &resolved).await?;
		self.delete(&url).await
	}

	async fn signoff_detail_url(&self, handle: &ObjectHandle, resolved: &Resolved) -> Result<String> {
		let typeinst = resolved.typeinst();
		self.fill(
			"superevent-signoff-detail-template",
			&[id_pair(handle), ("typeinst", typeinst.as_str())],
		)
		.await
	}

	/// Resolve type, instrument and status aliases to their codes and check
	/// the type/instrument pairing.
	async fn resolve_signoff(&self, key: &SignoffKey, status: Option<&str>) -> Result<Resolved> {
		let root = self.root().await?;

		let types = &root.signoff_types;
		let signoff_type = types
			.resolve(&key.signoff_type)
			.ok_or_else(|| Error::InvalidSignoffType {
				value: key.signoff_type.clone(),
				valid: types.display_names(),
			})?
			.to_owned();

		let instrument = if key.instrument.is_empty() {
			String::new()
		} else {
			let instruments = &root.instruments;
			instruments
				.resolve(&key.instrument)
				.ok_or_else(|| Error::InvalidInstrument {
					value: key.instrument.clone(),
					valid: instruments.display_names(),
				})?
				.to_owned()
		};

		let status = match status {
			Some(s) => {
				let statuses = &root.signoff_statuses;
				let code = statuses.resolve(s).ok_or_else(|| Error::InvalidSignoffStatus {
					value: s.to_owned(),
					valid: statuses.display_names(),
				})?;
				Some(code.to_owned())
			}
			None => None,
		};

		if signoff_type == OPERATOR && instrument.is_empty() {
			return Err(Error::OperatorRequiresInstrument);
		}
		if signoff_type == ADVOCATE && !instrument.is_empty() {
			return Err(Error::AdvocateWithInstrument);
		}

		Ok(Resolved {
			signoff_type,
			instrument,
			status,
		})
	}
}

fn require_superevent(handle: &ObjectHandle) -> Result<()> {
	if handle.is_superevent() {
		Ok(())
	} else {
		Err(Error::NotImplementedForEvents("signoffs"))
	}
}
