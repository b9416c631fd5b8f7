//! Booking wizard state and the replace-only bookings list cache.

// self
use crate::_prelude::*;

/// Hospitality services offered on the marketplace, keyed by their wire ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ServiceKind {
	/// Cleanliness and order in public areas (id 1).
	PublicAreaAttendant = 1,
	/// Guest room upkeep (id 2).
	RoomAttendant = 2,
	/// Linen management and distribution (id 3).
	LinenPorter = 3,
}
impl ServiceKind {
	/// Every service in wire-id order.
	pub const ALL: [ServiceKind; 3] =
		[ServiceKind::PublicAreaAttendant, ServiceKind::RoomAttendant, ServiceKind::LinenPorter];

	/// Returns the numeric wire id.
	pub const fn id(self) -> u8 {
		self as u8
	}

	/// Looks a service up by its wire id.
	pub const fn from_id(id: u8) -> Option<Self> {
		match id {
			1 => Some(ServiceKind::PublicAreaAttendant),
			2 => Some(ServiceKind::RoomAttendant),
			3 => Some(ServiceKind::LinenPorter),
			_ => None,
		}
	}

	/// Returns the human-readable service name.
	pub const fn display_name(self) -> &'static str {
		match self {
			ServiceKind::PublicAreaAttendant => "Public Area Attendant",
			ServiceKind::RoomAttendant => "Room Attendant",
			ServiceKind::LinenPorter => "Linen Porter",
		}
	}
}
impl Display for ServiceKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.display_name())
	}
}
impl From<ServiceKind> for u8 {
	fn from(kind: ServiceKind) -> Self {
		kind.id()
	}
}
impl TryFrom<u8> for ServiceKind {
	type Error = UnknownServiceId;

	fn try_from(id: u8) -> Result<Self, Self::Error> {
		Self::from_id(id).ok_or(UnknownServiceId(id))
	}
}

/// Error returned when a wire id does not name a service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown service id {0}.")]
pub struct UnknownServiceId(pub u8);

/// Payment progress for the booking being created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
	/// Payment sheet has not been confirmed yet.
	#[default]
	Pending,
	/// Payment confirmed; the status never reverts within a session.
	Completed,
}

/// Wire payload for the create-booking endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
	/// Numeric service id.
	pub service: u8,
	/// Hourly rate, serialized verbatim.
	pub rate: String,
	/// Number of hours booked.
	pub hours: u32,
	/// Start date string as entered in the wizard.
	pub start_date: Option<String>,
	/// Start time string as entered in the wizard.
	pub start_time: Option<String>,
	/// Free-form address.
	pub address: String,
	/// Resolved latitude, if geocoding finished.
	pub latitude: Option<f64>,
	/// Resolved longitude, if geocoding finished.
	pub longitude: Option<f64>,
}

/// Identifiers returned by the create-booking endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHandles {
	/// Server-assigned booking identifier.
	pub booking_id: String,
	/// Payment intent created for the booking.
	pub payment_intent_id: String,
	/// Client secret used to confirm the payment sheet.
	pub client_secret: String,
}

/// Mutable state of the two-step booking wizard plus post-creation payment fields.
///
/// The service name is always derived from the selected [`ServiceKind`]; it is
/// never stored independently, so the two can never drift apart.
#[derive(Clone, Debug, PartialEq)]
pub struct BookingDraft {
	service: Option<ServiceKind>,
	/// Hourly rate as entered, kept as the wire string.
	pub rate: String,
	/// Number of hours booked.
	pub hours: u32,
	/// Start date string as entered in the wizard.
	pub start_date: Option<String>,
	/// Start time string as entered in the wizard.
	pub start_time: Option<String>,
	/// Free-form address.
	pub address: String,
	/// Resolved latitude, if geocoding finished.
	pub latitude: Option<f64>,
	/// Resolved longitude, if geocoding finished.
	pub longitude: Option<f64>,
	booking_id: Option<String>,
	payment_intent_id: Option<String>,
	client_secret: Option<String>,
	payment_status: PaymentStatus,
}
impl Default for BookingDraft {
	fn default() -> Self {
		Self {
			service: None,
			rate: "20".into(),
			hours: 1,
			start_date: None,
			start_time: None,
			address: String::new(),
			latitude: None,
			longitude: None,
			booking_id: None,
			payment_intent_id: None,
			client_secret: None,
			payment_status: PaymentStatus::Pending,
		}
	}
}
impl BookingDraft {
	/// Creates a pristine draft with the wizard defaults (rate 20, one hour).
	pub fn new() -> Self {
		Self::default()
	}

	/// Selects the service being booked.
	pub fn select_service(&mut self, kind: ServiceKind) {
		self.service = Some(kind);
	}

	/// Returns the selected service, if any.
	pub fn service(&self) -> Option<ServiceKind> {
		self.service
	}

	/// Returns the display name derived from the selected service.
	pub fn service_name(&self) -> Option<&'static str> {
		self.service.map(ServiceKind::display_name)
	}

	/// Builds the create-booking wire payload; `None` until a service is selected.
	pub fn wire_payload(&self) -> Option<CreateBookingPayload> {
		Some(CreateBookingPayload {
			service: self.service?.id(),
			rate: self.rate.clone(),
			hours: self.hours,
			start_date: self.start_date.clone(),
			start_time: self.start_time.clone(),
			address: self.address.clone(),
			latitude: self.latitude,
			longitude: self.longitude,
		})
	}

	/// Stamps the server-assigned identifiers after a successful creation.
	pub fn record_creation(&mut self, handles: &BookingHandles) {
		self.booking_id = Some(handles.booking_id.clone());
		self.payment_intent_id = Some(handles.payment_intent_id.clone());
		self.client_secret = Some(handles.client_secret.clone());
	}

	/// Marks the payment as completed; the transition is one-way.
	pub fn complete_payment(&mut self) {
		self.payment_status = PaymentStatus::Completed;
	}

	/// Returns the current payment status.
	pub fn payment_status(&self) -> PaymentStatus {
		self.payment_status
	}

	/// Returns the server-assigned booking id, once created.
	pub fn booking_id(&self) -> Option<&str> {
		self.booking_id.as_deref()
	}

	/// Returns the payment intent id, once created.
	pub fn payment_intent_id(&self) -> Option<&str> {
		self.payment_intent_id.as_deref()
	}

	/// Returns the payment client secret, once created.
	pub fn client_secret(&self) -> Option<&str> {
		self.client_secret.as_deref()
	}

	/// Resets the draft to the wizard defaults for a new booking flow.
	pub fn reset(&mut self) {
		*self = Self::default();
	}
}

/// Categorized bookings as returned by the last successful fetch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingsSnapshot {
	/// Finished bookings, most recent first (server order preserved).
	pub history: Vec<Value>,
	/// Bookings currently in progress.
	pub active: Vec<Value>,
	/// Upcoming bookings.
	pub scheduled: Vec<Value>,
}

/// Shared cache over the categorized bookings lists.
///
/// The cache is a pure projection of the last successful fetch: it is replaced
/// wholesale, never merged or patched, and stays stale between fetches. Booking
/// actions go through dedicated detail calls and never write here.
#[derive(Clone, Default)]
pub struct BookingsCache(Arc<RwLock<BookingsSnapshot>>);
impl BookingsCache {
	/// Replaces all three lists with the server's response.
	pub fn replace(&self, snapshot: BookingsSnapshot) {
		*self.0.write() = snapshot;
	}

	/// Returns a copy of the cached lists.
	pub fn snapshot(&self) -> BookingsSnapshot {
		self.0.read().clone()
	}
}
impl Debug for BookingsCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let inner = self.0.read();

		f.debug_struct("BookingsCache")
			.field("history", &inner.history.len())
			.field("active", &inner.active.len())
			.field("scheduled", &inner.scheduled.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn service_name_is_derived_from_the_selection() {
		let mut draft = BookingDraft::new();

		assert_eq!(draft.service_name(), None);

		draft.select_service(ServiceKind::LinenPorter);

		assert_eq!(draft.service_name(), Some("Linen Porter"));

		draft.select_service(ServiceKind::RoomAttendant);

		assert_eq!(draft.service_name(), Some("Room Attendant"));
	}

	#[test]
	fn service_ids_round_trip_through_serde() {
		let encoded = serde_json::to_string(&ServiceKind::LinenPorter)
			.expect("Service kind should serialize to its wire id.");

		assert_eq!(encoded, "3");

		let decoded: ServiceKind =
			serde_json::from_str("1").expect("Wire id 1 should deserialize.");

		assert_eq!(decoded, ServiceKind::PublicAreaAttendant);
		assert!(serde_json::from_str::<ServiceKind>("9").is_err());
	}

	#[test]
	fn payment_status_never_reverts() {
		let mut draft = BookingDraft::new();

		assert_eq!(draft.payment_status(), PaymentStatus::Pending);

		draft.complete_payment();
		draft.complete_payment();

		assert_eq!(draft.payment_status(), PaymentStatus::Completed);

		draft.reset();

		assert_eq!(draft.payment_status(), PaymentStatus::Pending);
		assert_eq!(draft.rate, "20");
		assert_eq!(draft.hours, 1);
	}

	#[test]
	fn wire_payload_requires_a_service() {
		let mut draft = BookingDraft::new();

		assert!(draft.wire_payload().is_none());

		draft.select_service(ServiceKind::PublicAreaAttendant);
		draft.address = "12 Harbor Lane".into();

		let payload = draft.wire_payload().expect("Draft with a service should build a payload.");

		assert_eq!(payload.service, 1);
		assert_eq!(payload.rate, "20");
	}

	#[test]
	fn cache_replacement_is_wholesale() {
		let cache = BookingsCache::default();

		cache.replace(BookingsSnapshot {
			history: vec![json!({"id": "b-1"})],
			active: Vec::new(),
			scheduled: vec![json!({"id": "b-2"})],
		});

		let first = cache.snapshot();

		cache.replace(BookingsSnapshot {
			history: Vec::new(),
			active: vec![json!({"id": "b-3"})],
			scheduled: Vec::new(),
		});

		let second = cache.snapshot();

		assert_eq!(first.history.len(), 1);
		assert!(second.history.is_empty());
		assert_eq!(second.active, vec![json!({"id": "b-3"})]);
	}
}
