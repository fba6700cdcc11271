use reqwest::Method;
use serde_json::json;

use crate::client::GraceDb;
use crate::error::{Error, Result};
use crate::ops::id_pair;
use crate::resource::{ObjectHandle, ObjectKind};
use crate::transport::{ApiResponse, Body};

/// A per-measurement list, or one value shared by every measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany {
	One(f64),
	Many(Vec<f64>),
}

impl OneOrMany {
	/// Expand to `n` entries. Lists are returned unchanged.
	pub fn broadcast(&self, n: usize) -> Vec<f64> {
		match self {
			Self::One(v) => vec![*v; n],
			Self::Many(vs) => vs.clone(),
		}
	}
}

impl From<f64> for OneOrMany {
	fn from(v: f64) -> Self {
		Self::One(v)
	}
}

impl From<Vec<f64>> for OneOrMany {
	fn from(vs: Vec<f64>) -> Self {
		Self::Many(vs)
	}
}

/// An EM follow-up footprint: one entry per pointing.
#[derive(Debug, Clone, PartialEq)]
pub struct EmObservation {
	pub group: String,
	/// Right ascension of each pointing (degrees).
	pub ra: Vec<f64>,
	pub ra_width: OneOrMany,
	/// Declination of each pointing (degrees).
	pub dec: Vec<f64>,
	pub dec_width: OneOrMany,
	/// ISO 8601 UTC start time of each pointing.
	pub start_time: Vec<String>,
	/// Exposure of each pointing (seconds).
	pub duration: OneOrMany,
	pub comment: String,
}

impl GraceDb {
	pub async fn emobservations(&self, handle: &ObjectHandle, n: Option<u32>) -> Result<ApiResponse> {
		let n = n.map(|n| n.to_string());
		let url = match (handle.kind(), n.as_deref()) {
			(ObjectKind::Superevent, Some(n)) => {
				self.fill("superevent-emobservation-detail-template", &[id_pair(handle), ("N", n)])
					.await?
			}
			(ObjectKind::Superevent, None) => {
				self.fill("superevent-emobservation-list-template", &[id_pair(handle)])
					.await?
			}
			(ObjectKind::Event, Some(n)) => {
				self.fill("emobservation-detail-template", &[id_pair(handle), ("N", n)])
					.await?
			}
			(ObjectKind::Event, None) => self.fill("emobservation-list-template", &[id_pair(handle)]).await?,
		};
		self.get(&url).await
	}

	pub async fn write_em_observation(&self, handle: &ObjectHandle, obs: &EmObservation) -> Result<ApiResponse> {
		let n = obs.ra.len();
		let ra_width = obs.ra_width.broadcast(n);
		let dec_width = obs.dec_width.broadcast(n);
		let duration = obs.duration.broadcast(n);

		let lengths = [
			("dec_list", obs.dec.len()),
			("start_time_list", obs.start_time.len()),
			("ra_width_list", ra_width.len()),
			("dec_width_list", dec_width.len()),
			("duration_list", duration.len()),
		];
		if let Some(&(field, actual)) = lengths.iter().find(|(_, len)| *len != n) {
			return Err(Error::ListLengthMismatch {
				field,
				expected: n,
				actual,
			});
		}

		self.root().await?.em_groups.require("EM group", &obs.group)?;

		let template = match handle.kind() {
			ObjectKind::Superevent => "superevent-emobservation-list-template",
			ObjectKind::Event => "emobservation-list-template",
		};
		let url = self.fill(template, &[id_pair(handle)]).await?;

		let body = json!({
			"group": obs.group,
			"ra_list": obs.ra,
			"ra_width_list": ra_width,
			"dec_list": obs.dec,
			"dec_width_list": dec_width,
			"start_time_list": obs.start_time,
			"duration_list": duration,
			"comment": obs.comment,
		});
		self.request(Method::POST, &url, Body::Json(body)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scalar_broadcasts_to_list_length() {
		assert_eq!(OneOrMany::from(0.5).broadcast(4), [0.5, 0.5, 0.5, 0.5]);
		assert_eq!(OneOrMany::from(vec![1.0, 2.0]).broadcast(4), [1.0, 2.0]);
		assert!(OneOrMany::One(3.0).broadcast(0).is_empty());
	}
}
