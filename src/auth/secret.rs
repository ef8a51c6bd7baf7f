//! Secret wrappers and secret sources shared by every keeper.

// std
use std::fs;
// self
use crate::{_prelude::*, error::ConfigError};

/// Redacted secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner secret value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Where a keeper obtains its long-lived secret.
///
/// A [`File`](SecretSource::File) source is read again on every cycle, so rotating the file's
/// contents takes effect without restarting the daemon.
#[derive(Clone, Debug)]
pub enum SecretSource {
	/// Secret supplied directly as a configuration value.
	Literal(TokenSecret),
	/// Secret stored in a file, re-read before every use.
	File(PathBuf),
}
impl SecretSource {
	/// Creates a literal source from the provided value.
	pub fn literal(value: impl Into<String>) -> Self {
		Self::Literal(TokenSecret::new(value))
	}

	/// Creates a file-backed source for the provided path.
	pub fn file(path: impl Into<PathBuf>) -> Self {
		Self::File(path.into())
	}

	/// Resolves the current secret, trimming surrounding whitespace.
	///
	/// Empty secrets are rejected up front so a blank file never reaches a vendor endpoint.
	pub fn read(&self) -> Result<TokenSecret, ConfigError> {
		let raw = match self {
			Self::Literal(secret) => secret.expose().to_owned(),
			Self::File(path) => fs::read_to_string(path)
				.map_err(|source| ConfigError::SecretRead { path: path.clone(), source })?,
		};
		let trimmed = raw.trim();

		if trimmed.is_empty() {
			return Err(ConfigError::EmptySecret);
		}

		Ok(TokenSecret::new(trimmed))
	}
}
