//! Daemon that keeps an OAuth access token continuously valid on disk.

// std
use std::{convert::Infallible, path::PathBuf, process::ExitCode};
// crates.io
use clap::Parser;
use credential_keeper::{
	auth::SecretSource,
	client::TokenClient,
	error::ConfigError,
	http::HttpSession,
	keeper::TokenKeeper,
	obs,
	publish::ArtifactSink,
	schedule::RefreshSchedule,
};
use time::Duration;
use tracing_subscriber::EnvFilter;

/// Exchanges a long-lived refresh token for fresh access tokens, forever.
#[derive(Debug, Parser)]
#[command(name = "token-keeper", version)]
struct Args {
	/// OAuth client identifier.
	#[arg(long, env = "TOKEN_KEEPER_CLIENT_ID")]
	client_id: String,
	/// OAuth client secret.
	#[arg(long, env = "TOKEN_KEEPER_CLIENT_SECRET", hide_env_values = true)]
	client_secret: String,
	/// Long-lived refresh token value.
	#[arg(long, env = "TOKEN_KEEPER_REFRESH_TOKEN", hide_env_values = true)]
	refresh_token: Option<String>,
	/// Path to a file holding the refresh token; re-read before every cycle.
	#[arg(long, env = "TOKEN_KEEPER_REFRESH_TOKEN_FILE", conflicts_with = "refresh_token")]
	refresh_token_file: Option<PathBuf>,
	/// Path the refreshed access token is published to.
	#[arg(long, env = "TOKEN_KEEPER_ACCESS_TOKEN_FILE")]
	access_token_file: PathBuf,
	/// OAuth token endpoint.
	#[arg(
		long,
		env = "TOKEN_KEEPER_TOKEN_ENDPOINT",
		default_value = "https://oauth2.googleapis.com/token"
	)]
	token_endpoint: String,
	/// Safety margin subtracted from every computed wait, in seconds.
	#[arg(long, env = "TOKEN_KEEPER_MARGIN_SECS", default_value_t = 10)]
	margin_secs: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	init_tracing();

	match run(Args::parse()).await {
		Ok(never) => match never {},
		Err(error) => {
			obs::report_fatal("token-keeper", &error);

			ExitCode::FAILURE
		},
	}
}

async fn run(args: Args) -> credential_keeper::error::Result<Infallible> {
	let refresh_secret = if let Some(value) = args.refresh_token {
		SecretSource::literal(value)
	} else if let Some(path) = args.refresh_token_file {
		SecretSource::file(path)
	} else {
		return Err(ConfigError::MissingRefreshSecret.into());
	};
	let session = HttpSession::new()?;
	let client = TokenClient::new(&args.token_endpoint, &args.client_id, &args.client_secret)?;
	let keeper =
		TokenKeeper::new(session, client, refresh_secret, ArtifactSink::new(args.access_token_file))
			.with_schedule(RefreshSchedule::with_margin(Duration::seconds(
				args.margin_secs.into(),
			)));

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
