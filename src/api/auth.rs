//! Identity lifecycle endpoints under `/auth`.

// self
use crate::{
	_prelude::*,
	http::{ApiRequest, ApiTransport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	pipeline::ApiClient,
	session::{Credentials, SessionPhase, TokenSecret},
};

/// Credentials submitted by the login screen.
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
	/// Account email address.
	pub email: String,
	/// Plain password; sent over TLS only.
	pub password: String,
}

/// Registration payload shared by the user and provider signup screens.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
	/// Given name.
	pub first_name: String,
	/// Family name.
	pub last_name: String,
	/// Account email address.
	pub email: String,
	/// Plain password; sent over TLS only.
	pub password: String,
}

/// Full credential set returned by the login and signup endpoints.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
	/// Opaque profile payload.
	pub user: Value,
	/// Short-lived bearer token.
	pub access_token: TokenSecret,
	/// Long-lived rotation token.
	pub refresh_token: TokenSecret,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Authenticates with email and password and installs the returned session.
	///
	/// The refresh token is persisted before the in-memory session is updated,
	/// so a crash between the two steps leaves the durable state recoverable.
	pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.authenticate("/auth/login", request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Registers a customer account; a successful signup logs the account in.
	pub async fn signup(&self, request: &SignupRequest) -> Result<LoginResponse> {
		self.authenticate("/auth/signup", request).await
	}

	/// Registers a provider account; a successful signup logs the account in.
	pub async fn provider_signup(&self, request: &SignupRequest) -> Result<LoginResponse> {
		self.authenticate("/auth/provider-signup", request).await
	}

	/// Shared credential exchange behind login and both signup variants.
	///
	/// The session sits in `Authenticating` for the duration of the round trip
	/// and settles back on failure, whichever entry point drove it.
	async fn authenticate<P>(&self, path: &str, payload: &P) -> Result<LoginResponse>
	where
		P: Serialize,
	{
		self.session.set_phase(SessionPhase::Authenticating);

		let result = async {
			let request = ApiRequest::post_json(path, payload)?;
			let response = self.execute_public(request).await?.require_success()?;
			let login = response.decode::<LoginResponse>()?;

			self.credentials.save(login.refresh_token.clone()).await?;
			self.session.apply_credentials(Credentials {
				user: Some(login.user.clone()),
				access_token: login.access_token.clone(),
				refresh_token: login.refresh_token.clone(),
			});

			Ok(login)
		}
		.await;

		if result.is_err() {
			self.session.settle_phase();
		}

		result
	}

	/// Logs out: best-effort server notification, then unconditional local cleanup.
	///
	/// A failed or unreachable logout endpoint never blocks the local cleanup;
	/// the session clears and the persisted refresh token is deleted regardless.
	pub async fn logout(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		span.instrument(async {
			let _ = self.execute(ApiRequest::post("/auth/logout", serde_json::json!({}))).await;

			self.session.clear();
			self.credentials.delete().await?;
			obs::record_flow_outcome(KIND, FlowOutcome::Success);

			Ok(())
		})
		.await
	}

	/// Fetches the authenticated account's profile.
	pub async fn fetch_user_info(&self) -> Result<Value> {
		self.execute(ApiRequest::get("/auth/user-info")).await?.require_success()?.decode()
	}

	/// Silently restores the session from the persisted refresh token at relaunch.
	///
	/// The adopted token is handed to the session without an access token, so the
	/// identity fetch below fails authorization and drives a rotation through the
	/// standard pipeline. When any step fails the persisted token is discarded and
	/// the caller must route to login.
	pub async fn resume_session(&self) -> Result<Value> {
		const KIND: FlowKind = FlowKind::Resume;

		let span = FlowSpan::new(KIND, "resume_session");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let Some(token) = self.credentials.load().await? else {
					self.session.clear();

					return Err(Error::SessionExpired {
						reason: "no persisted refresh token".into(),
					});
				};

				self.session.adopt_refresh_token(token);

				match self.fetch_user_info().await {
					Ok(user) => {
						self.session.apply_profile(user.clone());

						Ok(user)
					},
					Err(err) => {
						let _ = self.credentials.delete().await;

						self.session.clear();

						Err(err)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Marks a booking as completed on behalf of the customer.
	pub async fn complete_booking(&self, booking_id: &str) -> Result<Value> {
		self.booking_action("/auth/complete-booking", booking_id).await
	}

	/// Cancels a booking on behalf of the customer.
	pub async fn cancel_booking(&self, booking_id: &str) -> Result<Value> {
		self.booking_action("/auth/cancel-booking", booking_id).await
	}

	async fn booking_action(&self, path: &str, booking_id: &str) -> Result<Value> {
		let request = ApiRequest::post(path, serde_json::json!({ "bookingId": booking_id }));

		self.execute(request).await?.require_success()?.decode()
	}
}
