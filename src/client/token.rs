//! OAuth refresh exchange built on the `oauth2` facade.

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError, RefreshToken,
	RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenSecret},
	error::{ConfigError, ProtocolError, TransportError},
	http::{HttpSession, ResponseMetadata, ResponseMetadataSlot},
};

type RefreshEndpoint =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Exchanges a long-lived refresh secret for a short-lived access token.
///
/// One `grant_type=refresh_token` POST per call. Client credentials ride in the request body
/// (`client_secret_post`), matching what the Google token endpoint expects.
pub struct TokenClient {
	oauth_client: RefreshEndpoint,
}
impl TokenClient {
	/// Creates a client for the provided token endpoint and OAuth client credentials.
	pub fn new(
		token_endpoint: &str,
		client_id: &str,
		client_secret: &str,
	) -> Result<Self, ConfigError> {
		let token_url = TokenUrl::new(token_endpoint.to_owned())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client })
	}

	/// Performs one refresh exchange and returns the resulting access token.
	///
	/// `issued_at` is captured before the request is dispatched, so the validity window already
	/// accounts for the round-trip and renewal stays front-loaded. The returned expiry is
	/// strictly derived from the response's `expires_in`.
	pub async fn fetch(
		&self,
		session: &HttpSession,
		refresh_secret: &TokenSecret,
	) -> Result<AccessToken> {
		if refresh_secret.expose().is_empty() {
			return Err(ConfigError::EmptySecret.into());
		}

		let meta = ResponseMetadataSlot::default();
		let handle = session.with_metadata(meta.clone());
		let refresh_token = RefreshToken::new(refresh_secret.expose().to_owned());
		let issued_at = OffsetDateTime::now_utc();
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_token)
			.request_async(&handle)
			.await
			.map_err(|err| map_exchange_error(meta.take(), err))?;
		let expires_in = response.expires_in().ok_or(ProtocolError::MissingExpiresIn)?.as_secs();
		let expires_in =
			i64::try_from(expires_in).map_err(|_| ProtocolError::ExpiresInOutOfRange)?;
		let token = AccessToken::issued(
			response.access_token().secret().to_owned(),
			issued_at,
			Duration::seconds(expires_in),
		)?;

		Ok(token)
	}
}
impl Debug for TokenClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenClient").finish()
	}
}

fn map_exchange_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let code = response.error().as_ref().to_string();
			let reason = match response.error_description() {
				Some(description) => format!("{code} ({description})"),
				None => code,
			};

			ProtocolError::OAuth { reason, status }.into()
		},
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(source, _body) =>
			ProtocolError::ResponseParse { source, status }.into(),
		RequestTokenError::Other(message) =>
			ProtocolError::Unexpected { message: message.to_string(), status }.into(),
	}
}

fn map_transport_error(status: Option<u16>, err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			ProtocolError::Unexpected { message: message.to_string(), status }.into(),
		_ => ProtocolError::Unexpected {
			message: "HTTP client error occurred while calling the token endpoint.".into(),
			status,
		}
		.into(),
	}
}
