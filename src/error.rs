//! Keeper-level error types shared across clients, publishers, and loops.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical keeper error exposed by public APIs.
///
/// None of these are retried inside the crate; each cycle error propagates to the loop
/// orchestrator, which terminates and leaves restart policy to the process supervisor.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Vendor endpoint rejected or mangled an exchange.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Artifact sink could not be rewritten.
	#[error(transparent)]
	Publish(#[from] PublishError),

	/// Lease response carried an empty endpoint mapping, so no URL can be derived.
	#[error("Stream lease response contains no stream URLs.")]
	NoStreamUrls,
}

/// Configuration and validation failures raised before any exchange is attempted.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Vendor endpoint URL cannot be parsed.
	#[error("Vendor endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Caption clock format description cannot be parsed.
	#[error("Time format description is invalid.")]
	InvalidTimeFormat {
		/// Underlying parsing failure.
		#[source]
		source: time::error::InvalidFormatDescription,
	},
	/// Timestamp could not be rendered with the configured format.
	#[error("Timestamp could not be formatted.")]
	TimestampFormat {
		/// Underlying formatting failure.
		#[source]
		source: time::error::Format,
	},
	/// Secret file could not be read.
	#[error("Failed to read secret from {}.", .path.display())]
	SecretRead {
		/// Path of the unreadable secret file.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Secret source produced an empty value.
	#[error("Secret value must not be empty.")]
	EmptySecret,
	/// Neither a literal refresh secret nor a secret file was supplied.
	#[error("A refresh secret value or a secret file path must be provided.")]
	MissingRefreshSecret,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Protocol-level failures: the vendor endpoint answered, but not with a usable credential.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// Endpoint returned a non-success HTTP status.
	#[error("Vendor endpoint returned HTTP {status}: {body}.")]
	Status {
		/// HTTP status code of the response.
		status: u16,
		/// Upstream response body, kept verbatim for diagnosis.
		body: String,
	},
	/// Token endpoint returned a structured OAuth error.
	#[error("Token endpoint returned an OAuth error: {reason}.")]
	OAuth {
		/// Provider-supplied error code and description.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Endpoint responded with malformed JSON that could not be parsed.
	#[error("Vendor endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Lease response carried a stream URL the URL parser rejects.
	#[error("Stream lease response contains an unparseable stream URL.")]
	InvalidStreamUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint returned an unclassifiable response.
	#[error("Vendor endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Transport- or provider-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},

	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive validity duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the vendor endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the vendor endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures while rewriting the published artifact sink.
#[derive(Debug, ThisError)]
pub enum PublishError {
	/// Staging file next to the sink could not be written.
	#[error("Failed to stage artifact for {}.", .path.display())]
	Stage {
		/// Final sink path the staging file belongs to.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Staged artifact could not be renamed into place.
	#[error("Failed to replace artifact {}.", .path.display())]
	Replace {
		/// Sink path that should have been replaced.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}
