//! Authenticated request pipeline with singleflight token rotation.
//!
//! Every backend call flows through [`ApiClient::execute`]: the current access
//! token is attached, a 401/403 response triggers the refresh protocol, and the
//! original request is replayed exactly once with the rotated token. Concurrent
//! callers that fail authorization while a rotation is already in flight await
//! the same outcome behind a singleflight guard; refresh tokens rotate on every
//! use, so independent concurrent refreshes would strand all but one caller
//! with a dead token.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	session::{Credentials, Session, SessionPhase, TokenSecret},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestClientApi = ApiClient<ReqwestTransport>;

/// Token pair (plus optional profile) returned by the refresh endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshedCredentials {
	access_token: TokenSecret,
	refresh_token: TokenSecret,
	#[serde(default)]
	user: Option<Value>,
}

/// Coordinates authenticated API calls against a single backend origin.
///
/// The client owns the transport, the session record, and the credential store
/// reference so individual endpoint implementations can focus on their payloads.
/// There is one session per client, so the singleflight refresh guard is a
/// single mutex rather than a keyed map.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Backend origin every request path is resolved against.
	pub base_url: Url,
	/// HTTP transport used for every outbound call.
	pub transport: Arc<T>,
	/// In-memory session record owned by this pipeline.
	pub session: Session,
	/// Durable store holding the persisted refresh token.
	pub credentials: Arc<dyn CredentialStore>,
	/// Shared counters for rotation outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		base_url: Url,
		transport: impl Into<Arc<T>>,
		credentials: Arc<dyn CredentialStore>,
	) -> Self {
		let mut base_url = base_url;

		// `Url::join` replaces the last segment unless the base path ends with a slash.
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		Self {
			base_url,
			transport: transport.into(),
			session: Session::default(),
			credentials,
			refresh_metrics: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Replaces the session handle, sharing auth state across clients.
	pub fn with_session(mut self, session: Session) -> Self {
		self.session = session;

		self
	}

	/// Dispatches an authenticated request, recovering from token expiry at most once.
	///
	/// Responses other than 401/403 pass through with their status preserved;
	/// the typed endpoint layer maps them into the error taxonomy. An
	/// authorization failure enters the refresh protocol described in the
	/// module docs; its replay result is returned as-is, with no further
	/// recursion.
	pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.session.access_token();
				let response = self.dispatch(&request, token.clone()).await?;

				if !response.is_auth_failure() {
					return Ok(response);
				}

				self.recover(request, token, response).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Dispatches a request without a bearer token and without auth recovery.
	///
	/// Used for the unauthenticated surface (login, signup, email) and by the
	/// refresh call itself.
	pub async fn execute_public(&self, request: ApiRequest) -> Result<ApiResponse> {
		self.dispatch(&request, None).await
	}

	async fn dispatch(
		&self,
		request: &ApiRequest,
		bearer: Option<TokenSecret>,
	) -> Result<ApiResponse> {
		self.transport.dispatch(&self.base_url, request, bearer).await
	}

	/// Refresh-and-replay protocol for a request that failed authorization.
	///
	/// Ordering within one call is strict: the rotation completes (or fails and
	/// cleans up) before the replay happens. Across calls, the guard makes the
	/// whole section singleflight; waiters re-check the session after acquiring
	/// it and skip straight to the replay when another caller already rotated.
	async fn recover(
		&self,
		request: ApiRequest,
		stale_token: Option<TokenSecret>,
		original: ApiResponse,
	) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "recover");

		span.instrument(async move {
			let guard = self.refresh_guard.clone();
			let _singleflight = guard.lock().await;
			let current = self.session.access_token();

			if current.is_some() && current != stale_token {
				return self.dispatch(&request, current).await;
			}

			obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
			self.refresh_metrics.record_attempt();

			let stored = self.credentials.load().await.map_err(|err| {
				self.refresh_metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);

				Error::from(err)
			})?;
			let Some(refresh_token) = stored else {
				// Nothing to rotate with: log out locally and surface the
				// original authorization failure unchanged.
				self.refresh_metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
				self.session.clear();

				return Ok(original);
			};

			self.session.set_phase(SessionPhase::RefreshPending);

			let rotated = match self.rotate(&refresh_token).await {
				Ok(rotated) => rotated,
				Err(err) => {
					let _ = self.credentials.delete().await;

					self.session.clear();
					self.refresh_metrics.record_failure();
					obs::record_flow_outcome(KIND, FlowOutcome::Failure);

					return Err(err);
				},
			};

			self.credentials.save(rotated.refresh_token.clone()).await?;
			self.session.apply_credentials(Credentials {
				user: rotated.user,
				access_token: rotated.access_token.clone(),
				refresh_token: rotated.refresh_token,
			});
			self.refresh_metrics.record_success();
			obs::record_flow_outcome(KIND, FlowOutcome::Success);

			// Replay exactly once; the result stands regardless of its status.
			self.dispatch(&request, Some(rotated.access_token)).await
		})
		.await
	}

	/// Exchanges the persisted refresh token for a new pair.
	///
	/// Any failure (transport, non-2xx status, malformed body) collapses into
	/// [`Error::SessionExpired`]; callers perform the local logout.
	async fn rotate(&self, refresh_token: &TokenSecret) -> Result<RefreshedCredentials> {
		let request = ApiRequest::post(
			"/auth/refresh",
			serde_json::json!({ "refreshToken": refresh_token.expose() }),
		);
		let response = match self.dispatch(&request, None).await {
			Ok(response) => response,
			Err(err) =>
				return Err(Error::SessionExpired { reason: format!("refresh call failed: {err}") }),
		};

		if !response.is_success() {
			return Err(Error::SessionExpired {
				reason: format!("refresh endpoint returned HTTP {}", response.status),
			});
		}

		response.decode::<RefreshedCredentials>().map_err(|err| Error::SessionExpired {
			reason: format!("refresh response was malformed: {err}"),
		})
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			base_url: self.base_url.clone(),
			transport: self.transport.clone(),
			session: self.session.clone(),
			credentials: self.credentials.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(base_url: Url, credentials: Arc<dyn CredentialStore>) -> Self {
		Self::with_transport(base_url, ReqwestTransport::default(), credentials)
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.base_url)
			.field("session", &self.session)
			.finish()
	}
}
