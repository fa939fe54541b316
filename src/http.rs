//! Transport primitives for marketplace API calls.
//!
//! The module exposes [`ApiHttpClient`] so downstream crates can integrate custom HTTP
//! stacks. The gateway issues at most one request per invocation and imposes no timeouts
//! of its own; those are delegated entirely to the underlying client's defaults.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
// self
use crate::_prelude::*;

/// Boxed transport error produced by [`ApiHttpClient`] implementations.
pub type TransportError = Box<dyn StdError + Send + Sync>;
/// Future returned by [`ApiHttpClient::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// HTTP verbs accepted by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
	/// HTTP GET.
	Get,
	/// HTTP POST; requires an explicit request body.
	Post,
}
impl Verb {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Verb::Get => "GET",
			Verb::Post => "POST",
		}
	}
}
impl Display for Verb {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A fully resolved marketplace request ready for transport.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub verb: Verb,
	/// Absolute endpoint URL, query string included.
	pub url: Url,
	/// Bearer credential attached as the `Authorization` header.
	pub bearer_token: String,
	/// JSON body for POST requests.
	pub body: Option<String>,
}

/// Transport-level response handed back to the gateway.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase associated with the status, when the transport knows one.
	pub reason: Option<String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// True when the status indicates a failed request (>= 400).
	pub fn is_error(&self) -> bool {
		self.status >= 400
	}
}

/// Abstraction over HTTP transports capable of executing marketplace requests.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so a gateway can be shared across request handlers, and the
/// returned future must be `Send` for the lifetime of the in-flight call.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes a single request, resolving to the raw response or a transport error.
	///
	/// Implementations must not retry internally; the gateway treats every failure as
	/// terminal for the current call.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.verb {
				Verb::Get => reqwest::Method::GET,
				Verb::Post => reqwest::Method::POST,
			};
			let mut builder = client
				.request(method, request.url)
				.header(AUTHORIZATION, format!("Bearer {}", request.bearer_token));

			if let Some(body) = request.body {
				builder = builder.header(CONTENT_TYPE, "application/json").body(body);
			}

			let response = builder.send().await.map_err(Box::new)?;
			let status = response.status();
			let reason = status.canonical_reason().map(str::to_owned);
			let body = response.bytes().await.map_err(Box::new)?.to_vec();

			Ok(ApiResponse { status: status.as_u16(), reason, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn verbs_render_canonical_tokens() {
		assert_eq!(Verb::Get.as_str(), "GET");
		assert_eq!(Verb::Post.to_string(), "POST");
	}

	#[test]
	fn error_statuses_start_at_400() {
		let ok = ApiResponse { status: 200, reason: None, body: Vec::new() };
		let rejected = ApiResponse { status: 400, reason: None, body: Vec::new() };

		assert!(!ok.is_error());
		assert!(rejected.is_error());
	}
}
