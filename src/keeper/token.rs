//! Access token refresh loop.

// self
use crate::{
	_prelude::*,
	auth::SecretSource,
	client::TokenClient,
	http::HttpSession,
	keeper::CycleMetrics,
	obs::{self, CycleOutcome, LoopKind},
	publish::ArtifactSink,
	schedule::RefreshSchedule,
};

/// Keeps a short-lived access token continuously published.
///
/// Every cycle re-reads the refresh secret from its source (so file-based rotation takes effect
/// without restart), performs one refresh exchange, republishes the token value, and sleeps
/// until shortly before the granted expiry. The refresh secret itself is reused unchanged from
/// cycle to cycle.
#[derive(Debug)]
pub struct TokenKeeper {
	session: HttpSession,
	client: TokenClient,
	refresh_secret: SecretSource,
	sink: ArtifactSink,
	schedule: RefreshSchedule,
	metrics: Arc<CycleMetrics>,
}
impl TokenKeeper {
	/// Creates a keeper with the default refresh schedule.
	pub fn new(
		session: HttpSession,
		client: TokenClient,
		refresh_secret: SecretSource,
		sink: ArtifactSink,
	) -> Self {
		Self {
			session,
			client,
			refresh_secret,
			sink,
			schedule: RefreshSchedule::default(),
			metrics: Default::default(),
		}
	}

	/// Overrides the refresh schedule.
	pub fn with_schedule(mut self, schedule: RefreshSchedule) -> Self {
		self.schedule = schedule;

		self
	}

	/// Returns a handle to the keeper's cycle counters.
	pub fn metrics(&self) -> Arc<CycleMetrics> {
		self.metrics.clone()
	}

	/// Performs one REFRESH→PUBLISH step and returns the wait until the next one.
	///
	/// The wait is measured from the exchange dispatch instant, so a response granting
	/// `expires_in` seconds schedules the next refresh `expires_in - margin` seconds after the
	/// request went out.
	pub async fn refresh_once(&self) -> Result<std::time::Duration> {
		self.metrics.record_attempt();
		obs::record_cycle_outcome(LoopKind::TokenRefresh, CycleOutcome::Attempt);

		let result = self.cycle().await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_cycle_outcome(LoopKind::TokenRefresh, CycleOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_cycle_outcome(LoopKind::TokenRefresh, CycleOutcome::Failure);
			},
		}

		result
	}

	async fn cycle(&self) -> Result<std::time::Duration> {
		let secret = self.refresh_secret.read()?;

		tracing::info!("Obtaining a new access token.");

		let token = self.client.fetch(&self.session, &secret).await?;

		self.sink.publish(token.value.expose())?;
		tracing::info!(expires_at = %token.expires_at, "Access token published.");

		Ok(self.schedule.next_wait(token.expires_at, token.issued_at))
	}

	/// Runs the loop forever; returns only by propagating a fatal cycle error.
	pub async fn run(self) -> Result<Infallible> {
		loop {
			let wait = self.refresh_once().await?;

			tracing::debug!(wait_secs = wait.as_secs(), "Sleeping until the next refresh.");
			tokio::time::sleep(wait).await;
		}
	}
}
