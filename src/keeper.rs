//! Loop orchestrators: INIT, repeated REFRESH→PUBLISH→WAIT cycles, terminal failure.
//!
//! Each keeper runs a single logical thread of control; the only suspension point is the timed
//! wait between cycles. There is no shutdown path besides process termination or an unrecovered
//! cycle error; the refresh loops escalate every failure, while the caption loop swallows
//! per-delivery failures by policy.

pub mod caption;
pub mod stream;
pub mod token;

pub use caption::*;
pub use stream::*;
pub use token::*;

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for keeper cycles.
#[derive(Debug, Default)]
pub struct CycleMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl CycleMetrics {
	/// Returns the total number of cycles attempted.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of cycles that refreshed and published successfully.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed cycles.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}
