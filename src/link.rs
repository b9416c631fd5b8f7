//! Push notification payload routing.

// self
use crate::_prelude::*;

/// Data payload attached to an incoming push notification.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
	/// Target screen name chosen by the backend.
	pub screen: String,
	/// Booking the notification refers to, when the screen needs one.
	#[serde(default)]
	pub booking_id: Option<String>,
}

/// In-app destination resolved from a push payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushDestination {
	/// Customer-side booking detail screen.
	BookingDetails {
		/// Booking to display.
		booking_id: String,
	},
	/// Provider-side order detail screen.
	MyOrderDetails {
		/// Booking to display.
		booking_id: String,
	},
	/// Provider-side offer acceptance screen.
	AcceptOrder {
		/// Booking being offered.
		booking_id: String,
	},
	/// Provider-side earnings screen.
	Earnings,
}
impl PushDestination {
	/// Resolves a payload to a destination.
	///
	/// Unknown screen names and booking screens without a booking id resolve to
	/// `None`; the app stays where it is rather than navigating somewhere broken.
	pub fn from_payload(payload: &PushPayload) -> Option<Self> {
		match payload.screen.as_str() {
			"BookingDetails" => Some(Self::BookingDetails { booking_id: payload.booking_id.clone()? }),
			"MyOrderDetails" => Some(Self::MyOrderDetails { booking_id: payload.booking_id.clone()? }),
			"AcceptOrder" => Some(Self::AcceptOrder { booking_id: payload.booking_id.clone()? }),
			"Earnings" => Some(Self::Earnings),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn payload(screen: &str, booking_id: Option<&str>) -> PushPayload {
		PushPayload { screen: screen.into(), booking_id: booking_id.map(Into::into) }
	}

	#[test]
	fn known_screens_resolve() {
		assert_eq!(
			PushDestination::from_payload(&payload("BookingDetails", Some("b-1"))),
			Some(PushDestination::BookingDetails { booking_id: "b-1".into() }),
		);
		assert_eq!(
			PushDestination::from_payload(&payload("AcceptOrder", Some("b-2"))),
			Some(PushDestination::AcceptOrder { booking_id: "b-2".into() }),
		);
		assert_eq!(
			PushDestination::from_payload(&payload("Earnings", None)),
			Some(PushDestination::Earnings),
		);
	}

	#[test]
	fn unknown_or_incomplete_payloads_resolve_to_none() {
		assert_eq!(PushDestination::from_payload(&payload("Settings", None)), None);
		assert_eq!(PushDestination::from_payload(&payload("BookingDetails", None)), None);
		assert_eq!(PushDestination::from_payload(&payload("MyOrderDetails", None)), None);
	}

	#[test]
	fn payload_decodes_with_optional_booking_id() {
		let full: PushPayload =
			serde_json::from_str(r#"{"screen":"MyOrderDetails","bookingId":"b-9"}"#)
				.expect("Full payload should decode.");
		let bare: PushPayload = serde_json::from_str(r#"{"screen":"Earnings"}"#)
			.expect("Payload without a booking id should decode.");

		assert_eq!(full.booking_id.as_deref(), Some("b-9"));
		assert!(bare.booking_id.is_none());
	}
}
