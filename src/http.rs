//! Transport primitives for backend API calls.
//!
//! The module exposes [`ApiTransport`] alongside the replayable [`ApiRequest`]
//! descriptor and the status-preserving [`ApiResponse`] so downstream code can
//! integrate custom HTTP clients. The request pipeline depends only on this
//! seam; the default [`ReqwestTransport`] lives behind the `reqwest` feature.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::ConfigError, session::TokenSecret};
#[cfg(feature = "reqwest")] use crate::error::TransportError;

/// HTTP methods used by the backend surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// `GET` request, no body.
	Get,
	/// `POST` request with an optional JSON body.
	Post,
	/// `PUT` request with an optional JSON body.
	Put,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Replayable request descriptor handed to the transport.
///
/// The pipeline clones the descriptor when it needs to replay a call after a
/// token rotation, so bodies are plain JSON values rather than streams.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Endpoint path relative to the client's base URL (leading slash optional).
	pub path: String,
	/// Optional JSON body.
	pub body: Option<Value>,
}
impl ApiRequest {
	/// Builds a `GET` request for the provided path.
	pub fn get(path: impl Into<String>) -> Self {
		Self { method: Method::Get, path: path.into(), body: None }
	}

	/// Builds a `POST` request carrying a JSON body.
	pub fn post(path: impl Into<String>, body: Value) -> Self {
		Self { method: Method::Post, path: path.into(), body: Some(body) }
	}

	/// Builds a `PUT` request carrying a JSON body.
	pub fn put(path: impl Into<String>, body: Value) -> Self {
		Self { method: Method::Put, path: path.into(), body: Some(body) }
	}

	/// Builds a `POST` request by serializing a typed payload.
	pub fn post_json<T>(path: impl Into<String>, payload: &T) -> Result<Self, ConfigError>
	where
		T: Serialize,
	{
		Ok(Self::post(path, serde_json::to_value(payload)?))
	}
}

/// Raw response surfaced by the transport with its status preserved.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
	/// Retry-After hint expressed as a relative duration, when upstream supplied one.
	pub retry_after: Option<Duration>,
}
impl ApiResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for the authorization-failure statuses the pipeline recovers from.
	pub fn is_auth_failure(&self) -> bool {
		matches!(self.status, 401 | 403)
	}

	/// Deserializes the body, attaching the JSON path on failure.
	pub fn decode<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::ResponseParse { source, status: Some(self.status) })
	}

	/// Extracts the server's `message` field, falling back to the raw body text.
	pub fn error_message(&self) -> String {
		#[derive(Deserialize)]
		struct MessageBody {
			message: String,
		}

		if let Ok(body) = serde_json::from_slice::<MessageBody>(&self.body) {
			return body.message;
		}

		let text = String::from_utf8_lossy(&self.body);
		let trimmed = text.trim();

		if trimmed.is_empty() { format!("HTTP {}", self.status) } else { trimmed.to_owned() }
	}

	/// Maps the response into the crate error taxonomy, passing 2xx through.
	///
	/// 401/403 become [`Error::Unauthorized`], other 4xx carry the server message
	/// verbatim as [`Error::Validation`], and 5xx become [`Error::Server`] with
	/// any Retry-After hint attached.
	pub fn require_success(self) -> Result<Self> {
		if self.is_success() {
			return Ok(self);
		}
		if self.is_auth_failure() {
			return Err(Error::Unauthorized { status: self.status });
		}
		if self.status >= 500 {
			return Err(Error::Server { status: self.status, retry_after: self.retry_after });
		}

		Err(Error::Validation { status: self.status, message: self.error_message() })
	}
}

/// Boxed future returned by [`ApiTransport::dispatch`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing backend API calls.
///
/// The trait is the pipeline's only dependency on an HTTP implementation.
/// Implementations resolve `request.path` against `base`, attach
/// `Authorization: Bearer <token>` when `bearer` is present, and must never
/// treat non-2xx statuses as transport errors; the pipeline needs the raw
/// status to drive its refresh protocol.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Dispatches a single request and returns the raw response.
	fn dispatch<'a>(
		&'a self,
		base: &'a Url,
		request: &'a ApiRequest,
		bearer: Option<TokenSecret>,
	) -> TransportFuture<'a>;
}

/// Resolves an endpoint path against the client's base URL.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, ConfigError> {
	base.join(path.trim_start_matches('/'))
		.map_err(|source| ConfigError::InvalidEndpoint { source })
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Custom clients passed via [`ReqwestTransport::with_client`] keep their
/// configuration (certificates, proxies, timeouts); the wrapper only adds the
/// dispatch glue.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn dispatch<'a>(
		&'a self,
		base: &'a Url,
		request: &'a ApiRequest,
		bearer: Option<TokenSecret>,
	) -> TransportFuture<'a> {
		let client = self.0.clone();

		Box::pin(async move {
			let url = endpoint_url(base, &request.path)?;
			let mut builder = match request.method {
				Method::Get => client.get(url),
				Method::Post => client.post(url),
				Method::Put => client.put(url),
			};

			if let Some(token) = &bearer {
				builder = builder.bearer_auth(token.expose());
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, body, retry_after })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn endpoint_url_resolves_leading_slash() {
		let base = Url::parse("https://api.example.com/v1/").expect("Base fixture should parse.");

		let joined =
			endpoint_url(&base, "/auth/login").expect("Endpoint path should join cleanly.");

		assert_eq!(joined.as_str(), "https://api.example.com/v1/auth/login");
	}

	#[test]
	fn require_success_maps_the_error_taxonomy() {
		let ok = ApiResponse { status: 200, body: b"{}".to_vec(), retry_after: None };
		let unauthorized = ApiResponse { status: 401, body: Vec::new(), retry_after: None };
		let rejected = ApiResponse {
			status: 422,
			body: serde_json::to_vec(&json!({"message": "Hours must be at least 1"}))
				.expect("Fixture body should serialize."),
			retry_after: None,
		};
		let unavailable = ApiResponse {
			status: 503,
			body: Vec::new(),
			retry_after: Some(Duration::seconds(30)),
		};

		assert!(ok.require_success().is_ok());
		assert!(matches!(
			unauthorized.require_success(),
			Err(Error::Unauthorized { status: 401 })
		));
		assert!(matches!(
			rejected.require_success(),
			Err(Error::Validation { status: 422, message }) if message == "Hours must be at least 1"
		));
		assert!(matches!(
			unavailable.require_success(),
			Err(Error::Server { status: 503, retry_after: Some(_) })
		));
	}

	#[test]
	fn error_message_falls_back_to_body_text() {
		let plain = ApiResponse { status: 400, body: b"bad request".to_vec(), retry_after: None };
		let empty = ApiResponse { status: 400, body: Vec::new(), retry_after: None };

		assert_eq!(plain.error_message(), "bad request");
		assert_eq!(empty.error_message(), "HTTP 400");
	}

	#[test]
	fn decode_reports_the_json_path() {
		#[derive(Debug, Deserialize)]
		struct Payload {
			#[allow(dead_code)]
			status: String,
		}

		let malformed =
			ApiResponse { status: 200, body: b"{\"status\":7}".to_vec(), retry_after: None };
		let err = malformed.decode::<Payload>().expect_err("Malformed body should fail decode.");

		assert!(matches!(err, Error::ResponseParse { status: Some(200), .. }));
	}
}
