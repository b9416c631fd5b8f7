//! Customer-facing endpoints under `/user`.

// self
use crate::{
	_prelude::*,
	booking::{BookingDraft, BookingHandles, BookingsCache, BookingsSnapshot},
	error::ConfigError,
	http::{ApiRequest, ApiTransport},
	pipeline::ApiClient,
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a booking from the draft and stamps the returned identifiers on it.
	///
	/// The draft must have a service selected; without one there is no wire
	/// payload to send and the call fails before reaching the network.
	pub async fn create_booking(&self, draft: &mut BookingDraft) -> Result<BookingHandles> {
		let payload = draft.wire_payload().ok_or(ConfigError::MissingService)?;
		let request = ApiRequest::post_json("/user/create-booking", &payload)?;
		let handles =
			self.execute(request).await?.require_success()?.decode::<BookingHandles>()?;

		draft.record_creation(&handles);

		Ok(handles)
	}

	/// Fetches the categorized bookings lists and replaces the cache wholesale.
	///
	/// The cache is only written on success; a failed fetch leaves the previous
	/// snapshot intact for the UI to keep rendering.
	pub async fn fetch_user_bookings(&self, cache: &BookingsCache) -> Result<BookingsSnapshot> {
		let snapshot = self
			.execute(ApiRequest::get("/user/bookings"))
			.await?
			.require_success()?
			.decode::<BookingsSnapshot>()?;

		cache.replace(snapshot.clone());

		Ok(snapshot)
	}

	/// Fetches a single booking's detail payload.
	pub async fn get_booking_by_id(&self, booking_id: &str) -> Result<Value> {
		let request = ApiRequest::post(
			"/user/get-booking-by-id",
			serde_json::json!({ "bookingId": booking_id }),
		);

		self.execute(request).await?.require_success()?.decode()
	}

	/// Approves a provider's request to start the job.
	pub async fn approve_start_job_request(&self, booking_id: &str) -> Result<Value> {
		let request = ApiRequest::post(
			"/user/approve-start-job-request",
			serde_json::json!({ "bookingId": booking_id }),
		);

		self.execute(request).await?.require_success()?.decode()
	}
}
