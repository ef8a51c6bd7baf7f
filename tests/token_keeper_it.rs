// std
use std::{env, fs, path::PathBuf, process, time::Duration};
// crates.io
use httpmock::prelude::*;
// self
use credential_keeper::{
	auth::SecretSource,
	client::TokenClient,
	error::{Error, ProtocolError},
	http::HttpSession,
	keeper::TokenKeeper,
	publish::ArtifactSink,
};

fn temp_sink_path(tag: &str) -> PathBuf {
	let unique = format!(
		"credential_keeper_token_it_{tag}_{}_{}.txt",
		process::id(),
		time::OffsetDateTime::now_utc().unix_timestamp_nanos(),
	);

	env::temp_dir().join(unique)
}

fn build_keeper(server: &MockServer, sink_path: &PathBuf) -> TokenKeeper {
	let session = HttpSession::new().expect("HTTP session should build.");
	let client = TokenClient::new(&server.url("/token"), "client-id", "client-secret")
		.expect("Token client should build against the mock endpoint.");

	TokenKeeper::new(
		session,
		client,
		SecretSource::literal("refresh-secret"),
		ArtifactSink::new(sink_path),
	)
}

#[tokio::test]
async fn refresh_cycle_publishes_token_and_schedules_before_expiry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"T1\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let sink_path = temp_sink_path("cycle");
	let keeper = build_keeper(&server, &sink_path);
	let wait = keeper.refresh_once().await.expect("Refresh cycle should succeed.");

	mock.assert_async().await;

	// A 3600 s grant with the default 10 s margin schedules the next refresh 3590 s after the
	// request was dispatched.
	assert_eq!(wait, Duration::from_secs(3590));
	assert_eq!(
		fs::read_to_string(&sink_path).expect("Sink should be readable."),
		"T1"
	);
	assert_eq!(keeper.metrics().successes(), 1);

	fs::remove_file(&sink_path).expect("Failed to remove sink fixture.");
}

#[tokio::test]
async fn rejected_exchange_is_fatal_and_leaves_sink_untouched() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"invalid_client\",\"error_description\":\"Bad client.\"}",
			);
		})
		.await;
	let sink_path = temp_sink_path("rejected");
	let keeper = build_keeper(&server, &sink_path);

	// Seed the sink as if a prior cycle had succeeded.
	ArtifactSink::new(&sink_path).publish("T0").expect("Seeding the sink should succeed.");

	let error = keeper.refresh_once().await.expect_err("A 401 exchange must fail the cycle.");

	mock.assert_async().await;
	assert!(matches!(error, Error::Protocol(ProtocolError::OAuth { .. })));
	assert_eq!(
		fs::read_to_string(&sink_path).expect("Sink should be readable."),
		"T0"
	);
	assert_eq!(keeper.metrics().failures(), 1);

	fs::remove_file(&sink_path).expect("Failed to remove sink fixture.");
}

#[tokio::test]
async fn missing_expires_in_is_a_protocol_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T1\",\"token_type\":\"Bearer\"}");
		})
		.await;
	let sink_path = temp_sink_path("no_expiry");
	let keeper = build_keeper(&server, &sink_path);
	let error = keeper
		.refresh_once()
		.await
		.expect_err("A response without expires_in must fail the cycle.");

	assert!(matches!(error, Error::Protocol(ProtocolError::MissingExpiresIn)));
	assert!(!sink_path.exists());
}
