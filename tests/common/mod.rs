//! Shared fixtures: a canned server root and a transport that records
//! requests and replays queued responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gracedb_client::auth::Credentials;
use gracedb_client::transport::{ApiRequest, ApiResponse, Transport};
use gracedb_client::{Error, GraceDb, Result};
use serde_json::{json, Value};

pub const SERVICE_URL: &str = "https://gracedb.test/api/";

pub fn root_document() -> Value {
	let api = SERVICE_URL;
	let ev = format!("{api}events/{{graceid}}");
	let se = format!("{api}superevents/{{superevent_id}}");
	json!({
		"api-versions": ["v1"],
		"server-version": "2.20.0",
		"links": {
			"self": api,
			"events": format!("{api}events/"),
			"superevents": format!("{api}superevents/"),
			"user-info": format!("{api}user-info/"),
		},
		"templates": {
			"event-detail-template": format!("{ev}"),
			"update-grbevent-template": format!("{ev}/grbevent/"),
			"event-log-template": format!("{ev}/log/"),
			"event-log-detail-template": format!("{ev}/log/{{N}}"),
			"files-template": format!("{ev}/files/{{filename}}"),
			"event-label-template": format!("{ev}/labels/{{label}}"),
			"taglist-template": format!("{ev}/log/{{N}}/tag/"),
			"tag-template": format!("{ev}/log/{{N}}/tag/{{tag_name}}"),
			"emobservation-list-template": format!("{ev}/emobservation/"),
			"emobservation-detail-template": format!("{ev}/emobservation/{{N}}"),
			"voevent-list-template": format!("{ev}/voevent/"),
			"voevent-detail-template": format!("{ev}/voevent/{{N}}"),
			"superevent-detail-template": format!("{se}/"),
			"superevent-event-list-template": format!("{se}/events/"),
			"superevent-event-detail-template": format!("{se}/events/{{graceid}}/"),
			"superevent-confirm-as-gw-template": format!("{se}/confirm-as-gw/"),
			"superevent-file-list-template": format!("{se}/files/"),
			"superevent-file-detail-template": format!("{se}/files/{{file_name}}"),
			"superevent-log-list-template": format!("{se}/logs/"),
			"superevent-log-detail-template": format!("{se}/logs/{{N}}/"),
			"superevent-log-tag-list-template": format!("{se}/logs/{{N}}/tags/"),
			"superevent-log-tag-detail-template": format!("{se}/logs/{{N}}/tags/{{tag_name}}/"),
			"superevent-label-list-template": format!("{se}/labels/"),
			"superevent-label-detail-template": format!("{se}/labels/{{label_name}}/"),
			"superevent-emobservation-list-template": format!("{se}/emobservations/"),
			"superevent-emobservation-detail-template": format!("{se}/emobservations/{{N}}/"),
			"superevent-voevent-list-template": format!("{se}/voevents/"),
			"superevent-voevent-detail-template": format!("{se}/voevents/{{N}}/"),
			"superevent-signoff-list-template": format!("{se}/signoffs/"),
			"superevent-signoff-detail-template": format!("{se}/signoffs/{{typeinst}}/"),
			"superevent-permission-list-template": format!("{se}/permissions/"),
			"superevent-permission-modify-template": format!("{se}/permissions/modify/"),
		},
		"groups": ["CBC", "Burst", "External", "Test"],
		"pipelines": ["gstlal", "pycbc", "MBTA", "CWB", "Fermi"],
		"searches": ["AllSky", "LowMass", "MDC", "GRB"],
		"labels": ["INJ", "DQV", "EM_READY", "ADVREQ", "H1OK"],
		"em-groups": ["ZTF", "Swift", "GRANDMA"],
		"voevent-types": {"PR": "preliminary", "IN": "initial", "UP": "update", "RE": "retraction"},
		"superevent-categories": {"P": "Production", "T": "Test", "M": "MDC"},
		"instruments": {"H1": "LHO", "L1": "LLO", "V1": "Virgo"},
		"signoff-types": {"OP": "operator", "ADV": "advocate"},
		"signoff-statuses": {"OK": "OKAY", "NO": "NOT OKAY"},
	})
}

/// Serves the root document for GET of the service URL; every other
/// request pops the next queued response (default `200 {}`).
#[derive(Clone, Default)]
pub struct MockTransport {
	pub requests: Arc<Mutex<Vec<ApiRequest>>>,
	responses: Arc<Mutex<VecDeque<Result<ApiResponse>>>>,
}

impl MockTransport {
	pub fn respond(&self, status: u16, body: Value) {
		self.responses
			.lock()
			.unwrap()
			.push_back(Ok(ApiResponse::new(status, body.to_string())));
	}

	pub fn respond_raw(&self, status: u16, body: &[u8]) {
		self.responses
			.lock()
			.unwrap()
			.push_back(Ok(ApiResponse::new(status, body.to_vec())));
	}

	pub fn fail(&self, status: u16, body: &str) {
		self.responses.lock().unwrap().push_back(Err(Error::Request {
			status,
			reason: String::new(),
			body: body.to_owned(),
		}));
	}

	/// Requests other than the root fetch.
	pub fn calls(&self) -> Vec<ApiRequest> {
		self.requests
			.lock()
			.unwrap()
			.iter()
			.filter(|r| r.url != SERVICE_URL)
			.cloned()
			.collect()
	}

	pub fn last(&self) -> ApiRequest {
		self.calls().pop().expect("no request was sent")
	}

	/// Every request, including root fetches.
	pub fn all(&self) -> Vec<ApiRequest> {
		self.requests.lock().unwrap().clone()
	}
}

#[async_trait]
impl Transport for MockTransport {
	async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		let is_root = request.method == reqwest::Method::GET && request.url == SERVICE_URL;
		self.requests.lock().unwrap().push(request);
		if is_root {
			return Ok(ApiResponse::new(200, root_document().to_string()));
		}
		self.responses
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| Ok(ApiResponse::new(200, "{}")))
	}
}

pub fn client() -> (GraceDb, MockTransport) {
	let transport = MockTransport::default();
	let client = GraceDb::with_transport(SERVICE_URL, None, Credentials::None, transport.clone()).unwrap();
	(client, transport)
}
