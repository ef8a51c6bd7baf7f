//! Daemon that keeps a signed RTSP stream URL continuously valid on disk.

// std
use std::{convert::Infallible, path::PathBuf, process::ExitCode};
// crates.io
use clap::Parser;
use credential_keeper::{
	auth::SecretSource,
	client::LeaseClient,
	http::HttpSession,
	keeper::StreamKeeper,
	obs,
	publish::ArtifactSink,
	schedule::RefreshSchedule,
};
use time::Duration;
use tracing_subscriber::EnvFilter;

/// Generates an RTSP stream lease once, then extends it forever.
#[derive(Debug, Parser)]
#[command(name = "stream-keeper", version)]
struct Args {
	/// Path of the file holding the current access token; re-read before every call.
	#[arg(long, env = "STREAM_KEEPER_ACCESS_TOKEN_FILE")]
	access_token_file: PathBuf,
	/// Device Access project identifier.
	#[arg(long, env = "STREAM_KEEPER_PROJECT_ID")]
	project_id: String,
	/// Device identifier.
	#[arg(long, env = "STREAM_KEEPER_DEVICE_ID")]
	device_id: String,
	/// Path the signed stream URL is published to.
	#[arg(long, env = "STREAM_KEEPER_STREAM_URL_FILE")]
	stream_url_file: PathBuf,
	/// Device Access API root.
	#[arg(
		long,
		env = "STREAM_KEEPER_API_ROOT",
		default_value = "https://smartdevicemanagement.googleapis.com"
	)]
	api_root: String,
	/// Safety margin subtracted from every computed wait, in seconds.
	#[arg(long, env = "STREAM_KEEPER_MARGIN_SECS", default_value_t = 10)]
	margin_secs: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	init_tracing();

	match run(Args::parse()).await {
		Ok(never) => match never {},
		Err(error) => {
			obs::report_fatal("stream-keeper", &error);

			ExitCode::FAILURE
		},
	}
}

async fn run(args: Args) -> credential_keeper::error::Result<Infallible> {
	let session = HttpSession::new()?;
	let client = LeaseClient::new(&args.api_root, &args.project_id, &args.device_id)?;
	let keeper = StreamKeeper::new(
		session,
		client,
		SecretSource::file(args.access_token_file),
		ArtifactSink::new(args.stream_url_file),
	)
	.with_schedule(RefreshSchedule::with_margin(Duration::seconds(args.margin_secs.into())));

	keeper.run().await
}

fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();
}
