use reqwest::Method;

use crate::client::GraceDb;
use crate::error::{Error, Result};
use crate::ops::{form_bool, id_pair, Fields};
use crate::resource::{ObjectHandle, ObjectKind};
use crate::transport::{ApiResponse, Body};

/// Short code of the 'initial' VOEvent type.
pub const INITIAL: &str = "IN";

/// Parameters for [`GraceDb::create_voevent`]. The server assigns the
/// sequence number and supersession citations.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVoevent {
	/// Short code or display name (`preliminary`, `initial`, `update`,
	/// `retraction`).
	pub voevent_type: String,
	pub skymap_type: Option<String>,
	/// A file already uploaded to the object. Required for 'initial'.
	pub skymap_filename: Option<String>,
	pub combined_skymap_filename: Option<String>,
	pub internal: bool,
	pub open_alert: bool,
	pub hardware_inj: bool,
	pub coinc_comment: bool,
	pub raven_coinc: bool,
	pub prob_has_ns: Option<f64>,
	pub prob_has_remnant: Option<f64>,
	pub bns: Option<f64>,
	pub nsbh: Option<f64>,
	pub bbh: Option<f64>,
	pub terrestrial: Option<f64>,
	pub mass_gap: Option<f64>,
}

impl NewVoevent {
	pub fn new(voevent_type: impl Into<String>) -> Self {
		Self {
			voevent_type: voevent_type.into(),
			skymap_type: None,
			skymap_filename: None,
			combined_skymap_filename: None,
			internal: true,
			open_alert: false,
			hardware_inj: false,
			coinc_comment: false,
			raven_coinc: false,
			prob_has_ns: None,
			prob_has_remnant: None,
			bns: None,
			nsbh: None,
			bbh: None,
			terrestrial: None,
			mass_gap: None,
		}
	}
}

impl GraceDb {
	pub async fn voevents(&self, handle: &ObjectHandle, n: Option<u32>) -> Result<ApiResponse> {
		let n = n.map(|n| n.to_string());
		let url = match (handle.kind(), n.as_deref()) {
			(ObjectKind::Superevent, Some(n)) => {
				self.fill("superevent-voevent-detail-template", &[id_pair(handle), ("N", n)])
					.await?
			}
			(ObjectKind::Superevent, None) => self.fill("superevent-voevent-list-template", &[id_pair(handle)]).await?,
			(ObjectKind::Event, Some(n)) => {
				self.fill("voevent-detail-template", &[id_pair(handle), ("N", n)])
					.await?
			}
			(ObjectKind::Event, None) => self.fill("voevent-list-template", &[id_pair(handle)]).await?,
		};
		self.get(&url).await
	}

	pub async fn create_voevent(&self, handle: &ObjectHandle, voevent: &NewVoevent) -> Result<ApiResponse> {
		let types = self.voevent_types().await?;
		let code = types
			.resolve(&voevent.voevent_type)
			.ok_or_else(|| Error::InvalidVoeventType {
				value: voevent.voevent_type.clone(),
				valid: types.display_names(),
			})?
			.to_owned();
		if code == INITIAL && voevent.skymap_filename.as_deref().map_or(true, str::is_empty) {
			return Err(Error::MissingSkymap);
		}

		let template = match handle.kind() {
			ObjectKind::Superevent => "superevent-voevent-list-template",
			ObjectKind::Event => "voevent-list-template",
		};
		let url = self.fill(template, &[id_pair(handle)]).await?;

		let mut fields = Fields::default();
		fields
			.push("voevent_type", &code)
			.push("internal", form_bool(voevent.internal))
			.push("open_alert", form_bool(voevent.open_alert))
			.push("hardware_inj", form_bool(voevent.hardware_inj))
			.push("CoincComment", form_bool(voevent.coinc_comment))
			.push("raven_coinc", form_bool(voevent.raven_coinc))
			.push_opt("skymap_type", voevent.skymap_type.as_ref())
			.push_opt("skymap_filename", voevent.skymap_filename.as_ref())
			.push_opt("combined_skymap_filename", voevent.combined_skymap_filename.as_ref())
			.push_opt("ProbHasNS", voevent.prob_has_ns)
			.push_opt("ProbHasRemnant", voevent.prob_has_remnant)
			.push_opt("BNS", voevent.bns)
			.push_opt("NSBH", voevent.nsbh)
			.push_opt("BBH", voevent.bbh)
			.push_opt("Terrestrial", voevent.terrestrial)
			.push_opt("MassGap", voevent.mass_gap);
		self.request(Method::POST, &url, Body::Form(fields.into_vec())).await
	}
}
