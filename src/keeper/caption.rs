//! Peripheral caption delivery loop.
//!
//! Unlike the credential loops, a failed delivery here only costs one caption, so the loop logs
//! the failure and moves on to the next tick instead of escalating. Fatality is a per-loop
//! policy choice, not a crate-wide one.

// crates.io
use reqwest::header::CONTENT_TYPE;
use time::{format_description, format_description::OwnedFormatItem, macros};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ProtocolError, TransportError},
	http::HttpSession,
	keeper::CycleMetrics,
	obs::{self, CycleOutcome, LoopKind},
};

/// Pushes the current wall-clock time to a closed caption ingestion endpoint once a second.
pub struct CaptionPusher {
	session: HttpSession,
	ingest_url: Url,
	cid: String,
	local_format: OwnedFormatItem,
	metrics: Arc<CycleMetrics>,
}
impl CaptionPusher {
	/// Delay between caption deliveries.
	pub const CADENCE: std::time::Duration = std::time::Duration::from_secs(1);

	/// Creates a pusher, validating the ingest URL and the local time format up front.
	pub fn new(
		session: HttpSession,
		ingest_url: &str,
		cid: impl Into<String>,
		time_format: &str,
	) -> Result<Self, ConfigError> {
		let ingest_url =
			Url::parse(ingest_url).map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let local_format = format_description::parse_owned::<2>(time_format)
			.map_err(|source| ConfigError::InvalidTimeFormat { source })?;

		Ok(Self {
			session,
			ingest_url,
			cid: cid.into(),
			local_format,
			metrics: Default::default(),
		})
	}

	/// Returns a handle to the pusher's cycle counters.
	pub fn metrics(&self) -> Arc<CycleMetrics> {
		self.metrics.clone()
	}

	/// Delivers one caption carrying the sequence number `seq`.
	pub async fn push_once(&self, seq: u64) -> Result<()> {
		let caption = self.caption()?;
		let response = self
			.session
			.post(self.ingest_url.clone())
			.query(&[("cid", self.cid.as_str()), ("seq", &seq.to_string())])
			.header(CONTENT_TYPE, "text/plain")
			.body(caption)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();

			return Err(ProtocolError::Status { status: status.as_u16(), body }.into());
		}

		Ok(())
	}

	fn caption(&self) -> Result<String> {
		let utc = OffsetDateTime::now_utc();
		// Local offset lookup can be indeterminate inside containers; fall back to UTC.
		let local = OffsetDateTime::now_local().unwrap_or(utc);
		let stamp = utc
			.format(macros::format_description!(
				"[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
			))
			.map_err(|source| ConfigError::TimestampFormat { source })?;
		let clock = local
			.format(&self.local_format)
			.map_err(|source| ConfigError::TimestampFormat { source })?;

		Ok(format!("{stamp}\n{clock}\n"))
	}

	/// Runs the delivery loop forever, swallowing individual delivery failures.
	pub async fn run(self) -> Result<Infallible> {
		tracing::info!("Starting caption delivery.");

		let mut seq = 1_u64;

		loop {
			self.metrics.record_attempt();
			obs::record_cycle_outcome(LoopKind::CaptionPush, CycleOutcome::Attempt);

			match self.push_once(seq).await {
				Ok(()) => {
					self.metrics.record_success();
					obs::record_cycle_outcome(LoopKind::CaptionPush, CycleOutcome::Success);
				},
				Err(error) => {
					self.metrics.record_failure();
					obs::record_cycle_outcome(LoopKind::CaptionPush, CycleOutcome::Failure);
					tracing::warn!(seq, "Caption delivery failed, continuing: {error}");
				},
			}

			seq += 1;

			tokio::time::sleep(Self::CADENCE).await;
		}
	}
}
impl Debug for CaptionPusher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CaptionPusher")
			.field("ingest_url", &self.ingest_url.as_str())
			.field("cid", &self.cid)
			.finish()
	}
}
