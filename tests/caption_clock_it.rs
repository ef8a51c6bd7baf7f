// crates.io
use httpmock::prelude::*;
// self
use credential_keeper::{
	error::{Error, ProtocolError},
	http::HttpSession,
	keeper::CaptionPusher,
};

fn build_pusher(server: &MockServer) -> CaptionPusher {
	let session = HttpSession::new().expect("HTTP session should build.");

	CaptionPusher::new(
		session,
		&server.url("/closedcaption"),
		"clock-cid",
		"[hour]:[minute]:[second]",
	)
	.expect("Caption pusher should build.")
}

#[tokio::test]
async fn caption_delivery_carries_cid_and_sequence() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/closedcaption")
				.query_param("cid", "clock-cid")
				.query_param("seq", "1");
			then.status(200);
		})
		.await;
	let pusher = build_pusher(&server);

	pusher.push_once(1).await.expect("Caption delivery should succeed.");
	mock.assert_async().await;
}

#[tokio::test]
async fn rejected_delivery_surfaces_status_and_body() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/closedcaption");
			then.status(500).body("ingestion offline");
		})
		.await;
	let pusher = build_pusher(&server);
	let error = pusher.push_once(7).await.expect_err("A 500 delivery must fail.");

	match error {
		Error::Protocol(ProtocolError::Status { status, body }) => {
			assert_eq!(status, 500);
			assert_eq!(body, "ingestion offline");
		},
		other => panic!("Unexpected error variant: {other:?}"),
	}
}
