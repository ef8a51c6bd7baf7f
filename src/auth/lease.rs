//! Stream lease records and the loop-held lease state.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ProtocolError, publish};

/// Streaming session granted by a one-time generate call.
#[derive(Clone, Debug)]
pub struct StreamLease {
	/// Absolute expiry instant reported by the vendor.
	pub expires_at: OffsetDateTime,
	/// Opaque renewal handle; single-use, rotates on every extend call.
	pub extension_token: TokenSecret,
	/// Session token embedded in the published URL's `auth` query parameter.
	pub session_token: TokenSecret,
	/// Endpoint URL per transport name. Ordered so selection is deterministic.
	pub endpoints: BTreeMap<String, String>,
}
impl StreamLease {
	/// Selects the lease's endpoint: the lexicographically smallest transport name.
	///
	/// The wire format does not guarantee a stable encoding order, so the tie-break is the sorted
	/// map's first entry rather than whatever the server emitted first. Selection happens once at
	/// lease creation; extend responses carry no endpoints and never re-derive it.
	pub fn primary_url(&self) -> Result<Url> {
		let (_, raw) = self.endpoints.iter().next().ok_or(Error::NoStreamUrls)?;
		let url = Url::parse(raw).map_err(|source| ProtocolError::InvalidStreamUrl { source })?;

		Ok(url)
	}
}

/// Rotated material returned by an extend call: new expiry and fresh tokens, no endpoints.
#[derive(Clone, Debug)]
pub struct LeaseExtension {
	/// New absolute expiry instant.
	pub expires_at: OffsetDateTime,
	/// Next extension token; the previous one is spent.
	pub extension_token: TokenSecret,
	/// New session token to splice into the published URL.
	pub session_token: TokenSecret,
}

/// Lease state carried across loop cycles.
///
/// Holds the URL derived once at generate time; every extension only rewrites its `auth` query
/// parameter in place, leaving scheme, host, path, and the remaining parameters untouched.
#[derive(Clone, Debug)]
pub struct ActiveLease {
	url: Url,
	expires_at: OffsetDateTime,
	extension_token: TokenSecret,
}
impl ActiveLease {
	/// Creates the loop state from a freshly generated lease and its derived URL.
	pub fn new(url: Url, lease: &StreamLease) -> Self {
		Self {
			url,
			expires_at: lease.expires_at,
			extension_token: lease.extension_token.clone(),
		}
	}

	/// Returns the currently published URL.
	pub fn published_url(&self) -> &Url {
		&self.url
	}

	/// Returns the lease's current expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Returns the renewal handle for the next extend call.
	pub fn extension_token(&self) -> &TokenSecret {
		&self.extension_token
	}

	/// Absorbs an extend response: rotates the renewal handle and rewrites the URL's `auth`
	/// parameter to the new session token.
	pub fn apply(&mut self, extension: LeaseExtension) {
		self.url = publish::with_auth_token(&self.url, extension.session_token.expose());
		self.expires_at = extension.expires_at;
		self.extension_token = extension.extension_token;
	}
}
