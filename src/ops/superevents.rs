use reqwest::Method;
use serde_json::{json, Map, Value};

use crate::client::GraceDb;
use crate::error::{Error, Result};
use crate::ops::events::search_query;
use crate::ops::{Fields, SearchOptions};
use crate::resource::ObjectKind;
use crate::transport::{ApiResponse, Body};

/// Parameters for [`GraceDb::create_superevent`].
#[derive(Debug, Clone)]
pub struct NewSuperevent {
	pub t_start: f64,
	pub t_0: f64,
	pub t_end: f64,
	pub preferred_event: String,
	/// Short code or display name, matched case-insensitively.
	pub category: String,
	pub events: Vec<String>,
	pub labels: Vec<String>,
}

impl NewSuperevent {
	pub fn new(t_start: f64, t_0: f64, t_end: f64, preferred_event: impl Into<String>) -> Self {
		Self {
			t_start,
			t_0,
			t_end,
			preferred_event: preferred_event.into(),
			category: "production".into(),
			events: Vec::new(),
			labels: Vec::new(),
		}
	}
}

/// Partial update of a superevent; at least one field must be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupereventUpdate {
	pub t_start: Option<f64>,
	pub t_0: Option<f64>,
	pub t_end: Option<f64>,
	pub preferred_event: Option<String>,
	pub em_type: Option<String>,
	pub time_coinc_far: Option<f64>,
	pub space_coinc_far: Option<f64>,
}

impl SupereventUpdate {
	pub const FIELDS: &'static [&'static str] = &[
		"t_start",
		"t_0",
		"t_end",
		"preferred_event",
		"em_type",
		"time_coinc_far",
		"space_coinc_far",
	];

	fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

impl GraceDb {
	pub async fn create_superevent(&self, new: &NewSuperevent) -> Result<ApiResponse> {
		require_event("preferred_event", &new.preferred_event)?;
		for graceid in &new.events {
			require_event("events", graceid)?;
		}
		let root = self.root().await?;
		let categories = &root.superevent_categories;
		let category = categories
			.resolve(&new.category)
			.ok_or_else(|| Error::InvalidCategory {
				value: new.category.clone(),
				valid: categories.display_names(),
			})?
			.to_owned();
		for label in &new.labels {
			root.labels.require("label", label)?;
		}
		let url = root.link("superevents")?.to_owned();

		let mut body = json!({
			"t_start": new.t_start,
			"t_0": new.t_0,
			"t_end": new.t_end,
			"preferred_event": new.preferred_event,
			"category": category,
		});
		if !new.events.is_empty() {
			body["events"] = json!(new.events);
		}
		if !new.labels.is_empty() {
			body["labels"] = json!(new.labels);
		}
		self.request(Method::POST, &url, Body::Json(body)).await
	}

	pub async fn update_superevent(&self, superevent_id: &str, update: &SupereventUpdate) -> Result<ApiResponse> {
		if update.is_empty() {
			return Err(Error::NoUpdateFields(SupereventUpdate::FIELDS));
		}
		let url = self
			.fill("superevent-detail-template", &[("superevent_id", superevent_id)])
			.await?;
		let mut fields = Fields::default();
		fields
			.push_opt("t_start", update.t_start)
			.push_opt("t_0", update.t_0)
			.push_opt("t_end", update.t_end)
			.push_opt("preferred_event", update.preferred_event.as_ref())
			.push_opt("em_type", update.em_type.as_ref())
			.push_opt("time_coinc_far", update.time_coinc_far)
			.push_opt("space_coinc_far", update.space_coinc_far);
		self.request(Method::PATCH, &url, Body::Form(fields.into_vec())).await
	}

	pub async fn superevent(&self, superevent_id: &str) -> Result<ApiResponse> {
		let url = self
			.fill("superevent-detail-template", &[("superevent_id", superevent_id)])
			.await?;
		self.get(&url).await
	}

	/// Search superevents. `columns`, if given, trims each record to those
	/// keys client-side.
	pub async fn superevents(&self, opts: &SearchOptions) -> Result<Vec<Value>> {
		let url = self.link("superevents").await?;
		let records = self
			.paginate(url, search_query(opts), "superevents", opts.max_results)
			.await?;
		if opts.columns.is_empty() {
			return Ok(records);
		}
		Ok(records
			.into_iter()
			.map(|record| select_columns(&record, &opts.columns))
			.collect())
	}

	pub async fn add_event_to_superevent(&self, superevent_id: &str, graceid: &str) -> Result<ApiResponse> {
		let url = self
			.fill("superevent-event-list-template", &[("superevent_id", superevent_id)])
			.await?;
		let mut fields = Fields::default();
		fields.push("event", graceid);
		self.request(Method::POST, &url, Body::Form(fields.into_vec())).await
	}

	pub async fn remove_event_from_superevent(&self, superevent_id: &str, graceid: &str) -> Result<ApiResponse> {
		let url = self
			.fill(
				"superevent-event-detail-template",
				&[("superevent_id", superevent_id), ("graceid", graceid)],
			)
			.await?;
		self.delete(&url).await
	}

	/// Promote a superevent to a confirmed GW. Cannot be undone.
	pub async fn confirm_superevent_as_gw(&self, superevent_id: &str) -> Result<ApiResponse> {
		let url = self
			.fill("superevent-confirm-as-gw-template", &[("superevent_id", superevent_id)])
			.await?;
		self.request(Method::POST, &url, Body::Empty).await
	}
}

fn require_event(field: &'static str, id: &str) -> Result<()> {
	match ObjectKind::classify(id) {
		ObjectKind::Event => Ok(()),
		ObjectKind::Superevent => Err(Error::NotAnEvent {
			field,
			value: id.to_owned(),
		}),
	}
}

fn select_columns(record: &Value, columns: &[String]) -> Value {
	let picked: Map<String, Value> = columns
		.iter()
		.map(|c| (c.clone(), record.get(c).cloned().unwrap_or(Value::Null)))
		.collect();
	Value::Object(picked)
}
