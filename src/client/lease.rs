//! Stream lease exchanges against the device command endpoint.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{LeaseExtension, StreamLease, TokenSecret},
	error::{ConfigError, ProtocolError, TransportError},
	http::HttpSession,
};

const GENERATE_COMMAND: &str = "sdm.devices.commands.CameraLiveStream.GenerateRtspStream";
const EXTEND_COMMAND: &str = "sdm.devices.commands.CameraLiveStream.ExtendRtspStream";

/// Issues generate/extend commands for one device's RTSP stream session.
///
/// Both operations are a single authenticated JSON POST to the same fixed command endpoint;
/// the bearer token is supplied per call so file-backed token rotation takes effect without
/// rebuilding the client.
#[derive(Clone, Debug)]
pub struct LeaseClient {
	command_endpoint: Url,
}
impl LeaseClient {
	/// Builds the fixed `:executeCommand` endpoint for the project/device pair.
	///
	/// Identifier values are opaque; they are spliced into the path uninterpreted.
	pub fn new(api_root: &str, project_id: &str, device_id: &str) -> Result<Self, ConfigError> {
		let endpoint = format!(
			"{}/v1/enterprises/{project_id}/devices/{device_id}:executeCommand",
			api_root.trim_end_matches('/'),
		);
		let command_endpoint =
			Url::parse(&endpoint).map_err(|source| ConfigError::InvalidEndpoint { source })?;

		Ok(Self { command_endpoint })
	}

	/// Performs the one-time generate call and returns the full lease.
	pub async fn generate(
		&self,
		session: &HttpSession,
		bearer: &TokenSecret,
	) -> Result<StreamLease> {
		let reply: GenerateReply = self
			.execute(
				session,
				bearer,
				&serde_json::json!({ "command": GENERATE_COMMAND, "params": {} }),
			)
			.await?;

		Ok(StreamLease {
			expires_at: reply.expires_at,
			extension_token: TokenSecret::new(reply.stream_extension_token),
			session_token: TokenSecret::new(reply.stream_token),
			endpoints: reply.stream_urls,
		})
	}

	/// Extends the current lease, spending `extension_token` and returning rotated material.
	pub async fn extend(
		&self,
		session: &HttpSession,
		bearer: &TokenSecret,
		extension_token: &TokenSecret,
	) -> Result<LeaseExtension> {
		if extension_token.expose().is_empty() {
			return Err(ConfigError::EmptySecret.into());
		}

		let reply: ExtendReply = self
			.execute(
				session,
				bearer,
				&serde_json::json!({
					"command": EXTEND_COMMAND,
					"params": { "streamExtensionToken": extension_token.expose() }
				}),
			)
			.await?;

		Ok(LeaseExtension {
			expires_at: reply.expires_at,
			extension_token: TokenSecret::new(reply.stream_extension_token),
			session_token: TokenSecret::new(reply.stream_token),
		})
	}

	async fn execute<T>(
		&self,
		session: &HttpSession,
		bearer: &TokenSecret,
		body: &serde_json::Value,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		if bearer.expose().is_empty() {
			return Err(ConfigError::EmptySecret.into());
		}

		let response = session
			.post(self.command_endpoint.clone())
			.bearer_auth(bearer.expose())
			.json(body)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();
		let body_text = response.text().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(
				ProtocolError::Status { status: status.as_u16(), body: body_text }.into()
			);
		}

		let mut deserializer = serde_json::Deserializer::from_str(&body_text);
		let envelope: CommandEnvelope<T> = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ProtocolError::ResponseParse {
				source,
				status: Some(status.as_u16()),
			})?;

		Ok(envelope.results)
	}
}

#[derive(Deserialize)]
struct CommandEnvelope<T> {
	results: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReply {
	#[serde(with = "time::serde::rfc3339")]
	expires_at: OffsetDateTime,
	stream_extension_token: String,
	stream_token: String,
	#[serde(default)]
	stream_urls: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtendReply {
	#[serde(with = "time::serde::rfc3339")]
	expires_at: OffsetDateTime,
	stream_extension_token: String,
	stream_token: String,
}
