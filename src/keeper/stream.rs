//! Stream lease loop: one generate, then endless extension.

// self
use crate::{
	_prelude::*,
	auth::{ActiveLease, SecretSource},
	client::LeaseClient,
	http::HttpSession,
	keeper::CycleMetrics,
	obs::{self, CycleOutcome, LoopKind},
	publish::ArtifactSink,
	schedule::RefreshSchedule,
};

/// Keeps a signed RTSP stream URL continuously published.
///
/// The lease is generated exactly once; afterwards every cycle spends the previous extend
/// response's extension token to obtain the next one, rewrites the published URL's `auth`
/// parameter in place, and republishes. The bearer access token is re-read from its source on
/// every call, so the token keeper's rotating output is picked up without restart.
#[derive(Debug)]
pub struct StreamKeeper {
	session: HttpSession,
	client: LeaseClient,
	access_token: SecretSource,
	sink: ArtifactSink,
	schedule: RefreshSchedule,
	metrics: Arc<CycleMetrics>,
}
impl StreamKeeper {
	/// Creates a keeper with the default refresh schedule.
	pub fn new(
		session: HttpSession,
		client: LeaseClient,
		access_token: SecretSource,
		sink: ArtifactSink,
	) -> Self {
		Self {
			session,
			client,
			access_token,
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

	/// Performs the one-time generate call, publishes the derived URL, and returns the lease
	/// state the loop carries forward.
	///
	/// Endpoint derivation happens before any publish, so a lease without stream URLs fails
	/// this step with the sink untouched. A failure here is immediately fatal, since no credential
	/// ever existed to fall back on.
	pub async fn start(&self) -> Result<ActiveLease> {
		self.metrics.record_attempt();
		obs::record_cycle_outcome(LoopKind::LeaseExtend, CycleOutcome::Attempt);

		let result = self.generate_cycle().await;

		self.record_outcome(result.is_ok());

		result
	}

	/// Performs one extend cycle: spend the renewal handle, rotate it, republish the URL.
	pub async fn extend_once(&self, lease: &mut ActiveLease) -> Result<()> {
		self.metrics.record_attempt();
		obs::record_cycle_outcome(LoopKind::LeaseExtend, CycleOutcome::Attempt);

		let result = self.extend_cycle(lease).await;

		self.record_outcome(result.is_ok());

		result
	}

	async fn generate_cycle(&self) -> Result<ActiveLease> {
		let bearer = self.access_token.read()?;

		tracing::info!("Generating the initial stream URL.");

		let lease = self.client.generate(&self.session, &bearer).await?;
		let url = lease.primary_url()?;

		self.sink.publish(url.as_str())?;
		tracing::info!(expires_at = %lease.expires_at, "Stream URL published.");

		Ok(ActiveLease::new(url, &lease))
	}

	async fn extend_cycle(&self, lease: &mut ActiveLease) -> Result<()> {
		let bearer = self.access_token.read()?;

		tracing::info!("Extending the stream.");

		let extension = self.client.extend(&self.session, &bearer, lease.extension_token()).await?;

		lease.apply(extension);
		self.sink.publish(lease.published_url().as_str())?;
		tracing::info!(expires_at = %lease.expires_at(), "Stream URL updated.");

		Ok(())
	}

	fn record_outcome(&self, succeeded: bool) {
		if succeeded {
			self.metrics.record_success();
			obs::record_cycle_outcome(LoopKind::LeaseExtend, CycleOutcome::Success);
		} else {
			self.metrics.record_failure();
			obs::record_cycle_outcome(LoopKind::LeaseExtend, CycleOutcome::Failure);
		}
	}

	/// Runs the loop forever; returns only by propagating a fatal cycle error.
	pub async fn run(self) -> Result<Infallible> {
		let mut lease = self.start().await?;

		loop {
			let wait = self.schedule.next_wait(lease.expires_at(), OffsetDateTime::now_utc());

			tracing::debug!(wait_secs = wait.as_secs(), "Sleeping until the next extension.");
			tokio::time::sleep(wait).await;
			self.extend_once(&mut lease).await?;
		}
	}
}
