//! Daemon that streams the current date and time into closed captions.

// std
use std::{convert::Infallible, process::ExitCode};
// crates.io
use clap::Parser;
use credential_keeper::{http::HttpSession, keeper::CaptionPusher, obs};
use tracing_subscriber::EnvFilter;

/// Sends the current date and time to a caption ingestion endpoint once a second.
#[derive(Debug, Parser)]
#[command(name = "caption-clock", version)]
struct Args {
	/// Closed caption ingestion identifier.
	#[arg(short, long, env = "CAPTION_CLOCK_CID")]
	cid: String,
	/// Format description for the local-time caption line.
	#[arg(
		short = 'f',
		long,
		env = "CAPTION_CLOCK_TIME_FORMAT",
		default_value = "[hour]:[minute]:[second]"
	)]
	time_format: String,
	/// Caption ingestion endpoint.
	#[arg(
		long,
		env = "CAPTION_CLOCK_INGEST_URL",
		default_value = "https://upload.youtube.com/closedcaption"
	)]
	ingest_url: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	init_tracing();

	match run(Args::parse()).await {
		Ok(never) => match never {},
		Err(error) => {
			obs::report_fatal("caption-clock", &error);

			ExitCode::FAILURE
		},
	}
}

async fn run(args: Args) -> credential_keeper::error::Result<Infallible> {
	let session = HttpSession::new()?;
	let pusher = CaptionPusher::new(session, &args.ingest_url, args.cid, &args.time_format)?;

	pusher.run().await
}

fn init_tracing() {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();
}
