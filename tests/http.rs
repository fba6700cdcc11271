//! The reqwest transport against a local mock server.

use gracedb_client::auth::AuthOptions;
use gracedb_client::ops::NewEvent;
use gracedb_client::resource::ObjectHandle;
use gracedb_client::transport::USER_AGENT;
use gracedb_client::{ClientOptions, Error, GraceDb};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with_root() -> MockServer {
	let server = MockServer::start().await;
	let api = format!("{}/api/", server.uri());
	Mock::given(method("GET"))
		.and(path("/api/"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"api-versions": ["v1"],
			"server-version": "2.20.0",
			"links": {
				"self": api,
				"events": format!("{api}events/"),
				"user-info": format!("{api}user-info/"),
			},
			"templates": {
				"event-detail-template": format!("{api}events/{{graceid}}"),
				"files-template": format!("{api}events/{{graceid}}/files/{{filename}}"),
			},
			"groups": ["CBC", "Test"],
			"pipelines": ["gstlal"],
			"searches": ["AllSky"],
			"labels": ["INJ"],
		})))
		.mount(&server)
		.await;
	server
}

fn options(server: &MockServer) -> ClientOptions {
	ClientOptions {
		service_url: format!("{}/api", server.uri()),
		auth: AuthOptions {
			force_noauth: true,
			..Default::default()
		},
		..Default::default()
	}
}

#[tokio::test]
async fn sends_user_agent_and_decodes_json() {
	let server = server_with_root().await;
	Mock::given(method("GET"))
		.and(path("/api/events/G1"))
		.and(header("user-agent", USER_AGENT))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"graceid": "G1", "far": 1e-8})))
		.expect(1)
		.mount(&server)
		.await;

	let client = GraceDb::new(options(&server)).unwrap();
	let resp = client.event("G1").await.unwrap();
	assert_eq!(resp.status, 200);
	assert_eq!(resp.json().unwrap()["graceid"], "G1");
}

#[tokio::test]
async fn basic_auth_header_is_sent() {
	let server = server_with_root().await;
	Mock::given(method("GET"))
		.and(path("/api/user-info/"))
		.and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "alice"})))
		.expect(1)
		.mount(&server)
		.await;

	let client = GraceDb::new(ClientOptions {
		auth: AuthOptions {
			username: Some("alice".into()),
			password: Some("secret".into()),
			..Default::default()
		},
		..options(&server)
	})
	.unwrap();
	assert_eq!(client.show_credentials()["auth_type"], "basic");
	let resp = client.user_info().await.unwrap();
	assert_eq!(resp.json().unwrap()["username"], "alice");
}

#[tokio::test]
async fn error_status_carries_body() {
	let server = server_with_root().await;
	Mock::given(method("GET"))
		.and(path("/api/events/G404"))
		.respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\": \"Not found.\"}"))
		.mount(&server)
		.await;

	let client = GraceDb::new(options(&server)).unwrap();
	match client.event("G404").await.unwrap_err() {
		Error::Request { status, reason, body } => {
			assert_eq!(status, 404);
			assert_eq!(reason, "Not Found");
			assert_eq!(body, "{\"detail\": \"Not found.\"}");
		}
		other => panic!("unexpected error {other:?}"),
	}
}

#[tokio::test]
async fn missing_api_version_reports_available() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/v9/"))
		.respond_with(ResponseTemplate::new(404))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/api/"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"API_VERSIONS": ["v1"]})))
		.mount(&server)
		.await;

	let client = GraceDb::new(ClientOptions {
		api_version: Some("v9".into()),
		..options(&server)
	})
	.unwrap();
	match client.ping().await.unwrap_err() {
		Error::UnsupportedApiVersion { requested, available } => {
			assert_eq!(requested, "v9");
			assert_eq!(available, ["v1"]);
		}
		other => panic!("unexpected error {other:?}"),
	}
}

#[tokio::test]
async fn query_parameters_reach_the_server() {
	let server = server_with_root().await;
	Mock::given(method("GET"))
		.and(path("/api/events/"))
		.and(query_param("query", "gstlal"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({"numRows": 7})))
		.expect(1)
		.mount(&server)
		.await;

	let client = GraceDb::new(options(&server)).unwrap();
	assert_eq!(client.num_events(Some("gstlal")).await.unwrap(), 7);
}

#[tokio::test]
async fn event_upload_is_multipart() {
	let server = server_with_root().await;
	Mock::given(method("POST"))
		.and(path("/api/events/"))
		.respond_with(ResponseTemplate::new(201).set_body_json(json!({"graceid": "T0001"})))
		.mount(&server)
		.await;

	let client = GraceDb::new(options(&server)).unwrap();
	let event = NewEvent {
		contents: Some(b"<LIGO_LW/>".to_vec()),
		..NewEvent::new("Test", "gstlal", "coinc.xml")
	};
	let resp = client.create_event(&event).await.unwrap();
	assert_eq!(resp.status, 201);

	let received = server.received_requests().await.unwrap();
	let upload = received
		.iter()
		.find(|r| r.method.as_str() == "POST")
		.expect("upload was not received");
	let content_type = upload.headers.get("content-type").unwrap().to_str().unwrap();
	assert!(content_type.starts_with("multipart/form-data"));
	let body = String::from_utf8_lossy(&upload.body);
	assert!(body.contains("name=\"eventFile\"; filename=\"coinc.xml\""));
	assert!(body.contains("<LIGO_LW/>"));
	assert!(body.contains("name=\"offline\""));
}

#[tokio::test]
async fn no_content_decodes_to_empty_object() {
	let server = server_with_root().await;
	Mock::given(method("GET"))
		.and(path("/api/events/G2"))
		.respond_with(ResponseTemplate::new(204))
		.mount(&server)
		.await;

	let client = GraceDb::new(options(&server)).unwrap();
	let resp = client.event("G2").await.unwrap();
	assert_eq!(resp.json().unwrap(), json!({}));
}

#[tokio::test]
async fn file_download_streams_into_sink() {
	let server = server_with_root().await;
	let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
	Mock::given(method("GET"))
		.and(path("/api/events/G1/files/skymap.fits"))
		.respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
		.expect(1)
		.mount(&server)
		.await;

	let client = GraceDb::new(options(&server)).unwrap();
	let mut sink = Vec::new();
	let written = client
		.download_file(&ObjectHandle::new("G1"), "skymap.fits", &mut sink)
		.await
		.unwrap();
	assert_eq!(written, payload.len() as u64);
	assert_eq!(sink, payload);
}

#[tokio::test]
async fn failed_download_writes_nothing() {
	let server = server_with_root().await;
	Mock::given(method("GET"))
		.and(path("/api/events/G1/files/missing.fits"))
		.respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\": \"Not found.\"}"))
		.mount(&server)
		.await;

	let client = GraceDb::new(options(&server)).unwrap();
	let mut sink = Vec::new();
	let err = client
		.download_file(&ObjectHandle::new("G1"), "missing.fits", &mut sink)
		.await
		.unwrap_err();
	assert!(matches!(err, Error::Request { status: 404, ref body, .. } if body.contains("Not found")));
	assert!(sink.is_empty());
}
