//! Expiry-driven wait computation for refresh loops.

// self
use crate::_prelude::*;

/// Computes how long a loop sleeps before renewing a credential.
///
/// The margin front-loads renewal: waiting until the exact expiry instant would leave the
/// published artifact stale for the duration of the refresh round-trip, so the wait is
/// `expires_at - now - margin`, clamped at zero when the granted validity is already shorter
/// than the margin or the clocks disagree. A loop must never sleep backward in time.
///
/// Comparisons use wall-clock instants throughout; remote-issued expiry timestamps are
/// wall-clock-based, so a single [`OffsetDateTime`] source per process is sufficient.
#[derive(Clone, Copy, Debug)]
pub struct RefreshSchedule {
	margin: Duration,
}
impl RefreshSchedule {
	/// Default safety margin subtracted from every computed wait.
	pub const DEFAULT_MARGIN: Duration = Duration::seconds(10);

	/// Creates a schedule with the provided safety margin.
	pub fn with_margin(margin: Duration) -> Self {
		Self { margin: if margin.is_negative() { Duration::ZERO } else { margin } }
	}

	/// Returns the configured safety margin.
	pub fn margin(&self) -> Duration {
		self.margin
	}

	/// Computes the wait until the next renewal, never negative.
	pub fn next_wait(
		&self,
		expires_at: OffsetDateTime,
		now: OffsetDateTime,
	) -> std::time::Duration {
		let wait = expires_at - now - self.margin;

		std::time::Duration::try_from(wait).unwrap_or(std::time::Duration::ZERO)
	}
}
impl Default for RefreshSchedule {
	fn default() -> Self {
		Self { margin: Self::DEFAULT_MARGIN }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn wait_subtracts_margin_exactly() {
		let schedule = RefreshSchedule::default();
		let now = datetime!(2024-01-01 00:00:00 UTC);

		assert_eq!(
			schedule.next_wait(now + Duration::seconds(3600), now),
			std::time::Duration::from_secs(3590)
		);
	}

	#[test]
	fn short_validity_clamps_to_zero() {
		let schedule = RefreshSchedule::default();
		let now = datetime!(2024-01-01 00:00:00 UTC);

		// Validity equal to the margin, shorter than the margin, and already lapsed.
		assert_eq!(
			schedule.next_wait(now + Duration::seconds(10), now),
			std::time::Duration::ZERO
		);
		assert_eq!(
			schedule.next_wait(now + Duration::seconds(3), now),
			std::time::Duration::ZERO
		);
		assert_eq!(
			schedule.next_wait(now - Duration::seconds(30), now),
			std::time::Duration::ZERO
		);
	}

	#[test]
	fn custom_margin_is_clamped_non_negative() {
		let schedule = RefreshSchedule::with_margin(Duration::seconds(-5));
		let now = datetime!(2024-01-01 00:00:00 UTC);

		assert_eq!(schedule.margin(), Duration::ZERO);
		assert_eq!(
			schedule.next_wait(now + Duration::seconds(60), now),
			std::time::Duration::from_secs(60)
		);
	}
}
