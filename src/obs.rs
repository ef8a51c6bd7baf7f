//! Observability helpers for keeper loops.
//!
//! Cycle attempts, successes, and failures are always visible through `tracing`; enable the
//! `metrics` feature to additionally increment the `credential_keeper_cycle_total` counter,
//! labeled by `loop` + `outcome`.

// self
use crate::_prelude::*;

/// Keeper loop kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopKind {
	/// Access token refresh loop.
	TokenRefresh,
	/// Stream lease generate/extend loop.
	LeaseExtend,
	/// Peripheral caption delivery loop.
	CaptionPush,
}
impl LoopKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			LoopKind::TokenRefresh => "token_refresh",
			LoopKind::LeaseExtend => "lease_extend",
			LoopKind::CaptionPush => "caption_push",
		}
	}
}
impl Display for LoopKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CycleOutcome {
	/// Entry to a keeper cycle.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the loop.
	Failure,
}
impl CycleOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CycleOutcome::Attempt => "attempt",
			CycleOutcome::Success => "success",
			CycleOutcome::Failure => "failure",
		}
	}
}
impl Display for CycleOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a cycle outcome via the global metrics recorder (when enabled).
pub fn record_cycle_outcome(kind: LoopKind, outcome: CycleOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"credential_keeper_cycle_total",
			"loop" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Logs a terminal keeper error together with its full source chain.
///
/// Daemon binaries call this once before exiting non-zero so supervisors capture the attempted
/// operation and the upstream cause without any retry happening in-process.
pub fn report_fatal(daemon: &str, error: &Error) {
	tracing::error!("{daemon} terminated: {error}");

	let mut source = std::error::Error::source(error);

	while let Some(cause) = source {
		tracing::error!("  caused by: {cause}");

		source = cause.source();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_cycle_outcome_noop_without_metrics() {
		record_cycle_outcome(LoopKind::TokenRefresh, CycleOutcome::Failure);
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(LoopKind::LeaseExtend.as_str(), "lease_extend");
		assert_eq!(CycleOutcome::Attempt.as_str(), "attempt");
	}
}
