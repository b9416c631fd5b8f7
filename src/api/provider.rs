//! Provider-facing endpoints under `/provider`.

// self
use crate::{
	_prelude::*,
	booking::{BookingsCache, BookingsSnapshot},
	error::ConfigError,
	http::{ApiRequest, ApiTransport},
	pipeline::ApiClient,
	provider::AvailabilitySnapshot,
};

/// Hosted Stripe URL returned by the onboarding and dashboard endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct StripeLink {
	/// URL to open in the system browser.
	pub url: String,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Submits a provider account application with its document payload.
	pub async fn request_provider_account(&self, application: Value) -> Result<Value> {
		let request = ApiRequest::post("/provider/request-provider-account", application);

		self.execute(request).await?.require_success()?.decode()
	}

	/// Fetches the account approval screen state for a pending provider.
	pub async fn account_approval_screen(&self) -> Result<Value> {
		self.execute(ApiRequest::get("/provider/account-approval-screen"))
			.await?
			.require_success()?
			.decode()
	}

	/// Pushes the provider's availability flags to the backend.
	pub async fn update_provider_availability(
		&self,
		snapshot: &AvailabilitySnapshot,
	) -> Result<Value> {
		let body = serde_json::to_value(snapshot).map_err(ConfigError::from)?;
		let request = ApiRequest::put("/provider/update-provider-availability", body);

		self.execute(request).await?.require_success()?.decode()
	}

	/// Fetches the provider's categorized bookings and replaces the cache wholesale.
	pub async fn fetch_provider_bookings(
		&self,
		cache: &BookingsCache,
	) -> Result<BookingsSnapshot> {
		let snapshot = self
			.execute(ApiRequest::get("/provider/get-bookings"))
			.await?
			.require_success()?
			.decode::<BookingsSnapshot>()?;

		cache.replace(snapshot.clone());

		Ok(snapshot)
	}

	/// Fetches a single booking's detail payload from the provider side.
	pub async fn get_provider_booking_by_id(&self, booking_id: &str) -> Result<Value> {
		self.provider_booking_action("/provider/get-booking-by-id", booking_id).await
	}

	/// Accepts an open booking offer.
	pub async fn accept_booking(&self, booking_id: &str) -> Result<Value> {
		self.provider_booking_action("/provider/accept-booking", booking_id).await
	}

	/// Fetches the provider's accepted orders.
	pub async fn fetch_my_orders(&self) -> Result<Value> {
		self.execute(ApiRequest::get("/provider/my-orders")).await?.require_success()?.decode()
	}

	/// Requests to start a job, pending customer approval.
	pub async fn start_booking(&self, booking_id: &str) -> Result<Value> {
		self.provider_booking_action("/provider/start-booking", booking_id).await
	}

	/// Requests a Stripe Connect onboarding link for payout setup.
	pub async fn stripe_connect_onboarding(&self) -> Result<StripeLink> {
		self.execute(ApiRequest::get("/provider/stripe-connect-onboarding"))
			.await?
			.require_success()?
			.decode()
	}

	/// Fetches the provider's earnings summary.
	pub async fn fetch_earnings(&self) -> Result<Value> {
		self.execute(ApiRequest::get("/provider/get-earnings")).await?.require_success()?.decode()
	}

	/// Requests a payout of the given amount to the connected account.
	pub async fn create_payout(&self, amount: f64) -> Result<Value> {
		let request =
			ApiRequest::post("/provider/create-payout", serde_json::json!({ "amount": amount }));

		self.execute(request).await?.require_success()?.decode()
	}

	/// Requests a Stripe Express dashboard login link.
	pub async fn stripe_express_login_link(&self) -> Result<StripeLink> {
		self.execute(ApiRequest::get("/provider/stripe-express-login-link"))
			.await?
			.require_success()?
			.decode()
	}

	async fn provider_booking_action(&self, path: &str, booking_id: &str) -> Result<Value> {
		let request = ApiRequest::post(path, serde_json::json!({ "bookingId": booking_id }));

		self.execute(request).await?.require_success()?.decode()
	}
}
