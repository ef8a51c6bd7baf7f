//! Access token records issued by a refresh exchange.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ProtocolError};

/// Short-lived access token together with its validity window.
///
/// The window is strictly derived from the exchange response: `issued_at` is the instant the
/// request was dispatched, `expires_at` is `issued_at` plus the duration the endpoint granted.
#[derive(Clone)]
pub struct AccessToken {
	/// Access token value; callers must avoid logging it.
	pub value: TokenSecret,
	/// Instant the exchange request was dispatched.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `issued_at` plus the granted validity.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Builds a token from the exchange dispatch instant and the granted validity duration.
	///
	/// Rejects non-positive durations so `expires_at > issued_at` always holds.
	pub fn issued(
		value: impl Into<String>,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Result<Self, ProtocolError> {
		if !expires_in.is_positive() {
			return Err(ProtocolError::NonPositiveExpiresIn);
		}

		Ok(Self {
			value: TokenSecret::new(value),
			issued_at,
			expires_at: issued_at + expires_in,
		})
	}

	/// Returns `true` if the token has lapsed at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn issued_derives_expiry_from_dispatch_instant() {
		let issued_at = datetime!(2024-01-01 00:00:00 UTC);
		let token = AccessToken::issued("token-value", issued_at, Duration::seconds(3600))
			.expect("Positive validity should build a token.");

		assert_eq!(token.expires_at, datetime!(2024-01-01 01:00:00 UTC));
		assert!(!token.is_expired_at(datetime!(2024-01-01 00:59:59 UTC)));
		assert!(token.is_expired_at(datetime!(2024-01-01 01:00:00 UTC)));
	}

	#[test]
	fn non_positive_validity_is_rejected() {
		let issued_at = datetime!(2024-01-01 00:00:00 UTC);

		assert!(matches!(
			AccessToken::issued("token-value", issued_at, Duration::ZERO),
			Err(ProtocolError::NonPositiveExpiresIn)
		));
		assert!(matches!(
			AccessToken::issued("token-value", issued_at, Duration::seconds(-1)),
			Err(ProtocolError::NonPositiveExpiresIn)
		));
	}
}
