//! Shared HTTP transport for keeper daemons.
//!
//! Each daemon owns exactly one [`HttpSession`] wrapping a connection-pooled [`ReqwestClient`]
//! and passes it explicitly into credential client calls, never reached as ambient state.
//! The pool is the only state carried between cycles; every exchange remains an independent
//! request/response pair.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::{_prelude::*, error::ConfigError};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests must not follow redirects, matching OAuth 2.0 guidance that token endpoints
/// return results directly instead of delegating to another URI. Configure any custom
/// [`ReqwestClient`] accordingly before handing it to [`HttpSession::with_client`].
#[derive(Clone, Debug)]
pub struct HttpSession(ReqwestClient);
impl HttpSession {
	/// Builds a session with redirect following disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds an [`AsyncHttpClient`] handle for `oauth2` exchanges that records the response
	/// status in `slot` for error classification.
	pub(crate) fn with_metadata(&self, slot: ResponseMetadataSlot) -> SessionHandle {
		SessionHandle::new(self.0.clone(), slot)
	}
}
impl AsRef<ReqwestClient> for HttpSession {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for HttpSession {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if available.
	pub status: Option<u16>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// A fresh slot is created for each exchange and read immediately after `oauth2` resolves, so
/// status codes from prior attempts never leak into a new invocation.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

struct MeteredHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle passed into `oauth2` exchange calls; each response's status lands in the slot.
#[derive(Clone)]
pub struct SessionHandle(Arc<MeteredHttpClient>);
impl SessionHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(MeteredHttpClient { client, slot }))
	}
}
impl<'c> AsyncHttpClient<'c> for SessionHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
