//! Crate-level error types shared by the gateway, flows, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// The first three variants form the unified authorization-failure signal
/// surfaced at the gateway boundary; see [`Error::is_unauthorized`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Org key or access token is absent; no network call was attempted.
	#[error("Organization key or access token is not configured.")]
	MissingCredentials,
	/// Marketplace returned a non-2xx status.
	#[error("Marketplace rejected the request with status {status}: {}.", reason.as_deref().unwrap_or("no reason given"))]
	RemoteRejected {
		/// HTTP status code returned by the marketplace.
		status: u16,
		/// Reason phrase from the remote, when available.
		reason: Option<String>,
	},
	/// Transport failure (DNS, TCP, TLS).
	#[error("Network error occurred while calling the marketplace API.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Marketplace payload did not match the expected model shape.
	#[error("Marketplace payload could not be decoded.")]
	Decode(
		#[from]
		#[source]
		serde_path_to_error::Error<serde_json::Error>,
	),
	/// Request could not be constructed from the provided inputs.
	#[error("Request is invalid: {reason}.")]
	InvalidRequest {
		/// Human-readable description of the construction failure.
		reason: String,
	},
}
impl Error {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// True for the unified authorization-failure signal: missing credentials, a remote
	/// rejection, or a transport failure. Callers treat all three identically and terminally
	/// for the current call.
	pub fn is_unauthorized(&self) -> bool {
		matches!(
			self,
			Self::MissingCredentials | Self::RemoteRejected { .. } | Self::Transport { .. }
		)
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		Self::transport(e)
	}
}
