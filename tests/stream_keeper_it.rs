// std
use std::{env, fs, path::PathBuf, process};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use credential_keeper::{
	auth::SecretSource,
	client::LeaseClient,
	error::{Error, ProtocolError},
	http::HttpSession,
	keeper::StreamKeeper,
	publish::ArtifactSink,
};

const COMMAND_PATH: &str = "/v1/enterprises/project-it/devices/device-it:executeCommand";
const GENERATE_COMMAND: &str = "sdm.devices.commands.CameraLiveStream.GenerateRtspStream";
const EXTEND_COMMAND: &str = "sdm.devices.commands.CameraLiveStream.ExtendRtspStream";

fn temp_path(tag: &str) -> PathBuf {
	let unique = format!(
		"credential_keeper_stream_it_{tag}_{}_{}.txt",
		process::id(),
		time::OffsetDateTime::now_utc().unix_timestamp_nanos(),
	);

	env::temp_dir().join(unique)
}

fn build_keeper(server: &MockServer, bearer_path: &PathBuf, sink_path: &PathBuf) -> StreamKeeper {
	let session = HttpSession::new().expect("HTTP session should build.");
	let client = LeaseClient::new(&server.base_url(), "project-it", "device-it")
		.expect("Lease client should build against the mock endpoint.");

	StreamKeeper::new(
		session,
		client,
		SecretSource::file(bearer_path),
		ArtifactSink::new(sink_path),
	)
}

#[tokio::test]
async fn lease_extension_rewrites_auth_and_rotates_extension_token() {
	let server = MockServer::start_async().await;
	let generate_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(COMMAND_PATH)
				.json_body(json!({ "command": GENERATE_COMMAND, "params": {} }));
			then.status(200).header("content-type", "application/json").body(
				r#"{
					"results": {
						"expiresAt": "2024-01-01T00:10:00Z",
						"streamExtensionToken": "E1",
						"streamToken": "S1",
						"streamUrls": {
							"rtspUrl": "rtsp://host.example/live?a=1&auth=S1&b=2"
						}
					}
				}"#,
			);
		})
		.await;
	let first_extend_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMMAND_PATH).json_body(json!({
				"command": EXTEND_COMMAND,
				"params": { "streamExtensionToken": "E1" }
			}));
			then.status(200).header("content-type", "application/json").body(
				r#"{
					"results": {
						"expiresAt": "2024-01-01T00:20:00Z",
						"streamExtensionToken": "E2",
						"streamToken": "S2"
					}
				}"#,
			);
		})
		.await;
	let second_extend_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMMAND_PATH).json_body(json!({
				"command": EXTEND_COMMAND,
				"params": { "streamExtensionToken": "E2" }
			}));
			then.status(200).header("content-type", "application/json").body(
				r#"{
					"results": {
						"expiresAt": "2024-01-01T00:30:00Z",
						"streamExtensionToken": "E3",
						"streamToken": "S3"
					}
				}"#,
			);
		})
		.await;
	let bearer_path = temp_path("bearer");
	let sink_path = temp_path("url");

	fs::write(&bearer_path, "bearer-token\n").expect("Failed to write bearer fixture.");

	let keeper = build_keeper(&server, &bearer_path, &sink_path);
	let mut lease = keeper.start().await.expect("Initial generate should succeed.");

	generate_mock.assert_async().await;
	assert_eq!(
		fs::read_to_string(&sink_path).expect("Sink should be readable."),
		"rtsp://host.example/live?a=1&auth=S1&b=2"
	);

	keeper.extend_once(&mut lease).await.expect("First extension should succeed.");

	first_extend_mock.assert_async().await;
	assert_eq!(
		fs::read_to_string(&sink_path).expect("Sink should be readable."),
		"rtsp://host.example/live?a=1&auth=S2&b=2"
	);

	// The next extend must spend E2, not E1.
	keeper.extend_once(&mut lease).await.expect("Second extension should succeed.");

	second_extend_mock.assert_async().await;
	assert_eq!(
		fs::read_to_string(&sink_path).expect("Sink should be readable."),
		"rtsp://host.example/live?a=1&auth=S3&b=2"
	);
	assert_eq!(keeper.metrics().successes(), 3);

	fs::remove_file(&bearer_path).expect("Failed to remove bearer fixture.");
	fs::remove_file(&sink_path).expect("Failed to remove sink fixture.");
}

#[tokio::test]
async fn lease_without_stream_urls_fails_before_any_publish() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMMAND_PATH);
			then.status(200).header("content-type", "application/json").body(
				r#"{
					"results": {
						"expiresAt": "2024-01-01T00:10:00Z",
						"streamExtensionToken": "E1",
						"streamToken": "S1",
						"streamUrls": {}
					}
				}"#,
			);
		})
		.await;
	let bearer_path = temp_path("bearer_empty");
	let sink_path = temp_path("url_empty");

	fs::write(&bearer_path, "bearer-token\n").expect("Failed to write bearer fixture.");

	let keeper = build_keeper(&server, &bearer_path, &sink_path);
	let error = keeper.start().await.expect_err("An endpoint-less lease must fail.");

	assert!(matches!(error, Error::NoStreamUrls));
	assert!(!sink_path.exists());

	fs::remove_file(&bearer_path).expect("Failed to remove bearer fixture.");
}

#[tokio::test]
async fn failed_extension_is_fatal_and_leaves_last_published_url() {
	let server = MockServer::start_async().await;
	let _generate_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(COMMAND_PATH)
				.json_body(json!({ "command": GENERATE_COMMAND, "params": {} }));
			then.status(200).header("content-type", "application/json").body(
				r#"{
					"results": {
						"expiresAt": "2024-01-01T00:10:00Z",
						"streamExtensionToken": "E1",
						"streamToken": "S1",
						"streamUrls": {
							"rtspUrl": "rtsp://host.example/live?auth=S1"
						}
					}
				}"#,
			);
		})
		.await;
	let extend_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMMAND_PATH).json_body(json!({
				"command": EXTEND_COMMAND,
				"params": { "streamExtensionToken": "E1" }
			}));
			then.status(503).body("service unavailable");
		})
		.await;
	let bearer_path = temp_path("bearer_fail");
	let sink_path = temp_path("url_fail");

	fs::write(&bearer_path, "bearer-token\n").expect("Failed to write bearer fixture.");

	let keeper = build_keeper(&server, &bearer_path, &sink_path);
	let mut lease = keeper.start().await.expect("Initial generate should succeed.");
	let error = keeper
		.extend_once(&mut lease)
		.await
		.expect_err("A 503 extension must fail the cycle.");

	extend_mock.assert_async().await;
	assert!(matches!(error, Error::Protocol(ProtocolError::Status { status: 503, .. })));
	assert_eq!(
		fs::read_to_string(&sink_path).expect("Sink should be readable."),
		"rtsp://host.example/live?auth=S1"
	);

	fs::remove_file(&bearer_path).expect("Failed to remove bearer fixture.");
	fs::remove_file(&sink_path).expect("Failed to remove sink fixture.");
}
