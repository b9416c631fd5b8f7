//! Client-level error types shared across the pipeline, stores, and channels.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used to erase transport-specific failure types.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential-store failure.
	#[error("{0}")]
	Store(#[from] crate::store::StoreError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); safe to retry.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Streaming-channel failure; forces the availability toggle off.
	#[error(transparent)]
	Stream(#[from] crate::realtime::ChannelError),

	/// Request was rejected as unauthorized and the pipeline could not recover it.
	#[error("Request was rejected as unauthorized (HTTP {status}).")]
	Unauthorized {
		/// HTTP status code returned by the endpoint (401 or 403).
		status: u16,
	},
	/// Business endpoint rejected the request; the server message is passed on verbatim.
	#[error("Request failed validation: {message}.")]
	Validation {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Server-supplied message describing the rejection.
		message: String,
	},
	/// Server-side failure; safe to retry later.
	#[error("Server failed to process the request (HTTP {status}).")]
	Server {
		/// HTTP status code returned by the endpoint.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Endpoint responded with malformed JSON that could not be parsed.
	#[error("Response body could not be parsed.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Silent re-authentication failed; the session has been cleared locally.
	#[error("Session expired: {reason}.")]
	SessionExpired {
		/// Why the refresh protocol gave up.
		reason: String,
	},
}
impl Error {
	/// Returns `true` when the failure is transient and the call may simply be retried.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Transport(_) | Self::Server { .. })
	}

	/// Returns `true` when the failure forced a local logout and the UI must
	/// reset to the unauthenticated entry point.
	pub fn forces_logout(&self) -> bool {
		matches!(self, Self::SessionExpired { .. })
	}
}

/// Configuration and validation failures raised locally, before any request leaves the device.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be combined with the endpoint path.
	#[error("Endpoint path is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	RequestBody(#[from] serde_json::Error),
	/// Booking draft is missing its service selection.
	#[error("Booking draft has no service selected.")]
	MissingService,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn retryable_covers_transport_and_server() {
		let server = Error::Server { status: 503, retry_after: None };
		let io = Error::Transport(TransportError::Io(std::io::Error::other("down")));
		let validation = Error::Validation { status: 422, message: "Rate too low".into() };

		assert!(server.is_retryable());
		assert!(io.is_retryable());
		assert!(!validation.is_retryable());
	}

	#[test]
	fn session_expiry_forces_logout() {
		let expired = Error::SessionExpired { reason: "refresh endpoint returned HTTP 400".into() };
		let unauthorized = Error::Unauthorized { status: 401 };

		assert!(expired.forces_logout());
		assert!(!unauthorized.forces_logout());
	}
}
