//! Provider-side runtime state: availability, job types, and last location.

// self
use crate::{_prelude::*, booking::ServiceKind};

/// Per-service availability flags for a provider.
///
/// At least one flag stays `true` at all times; an available provider with no
/// job types would be invisible to dispatch, so the last flag cannot be turned
/// off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTypes {
	/// Accepts public area attendant jobs (id 1).
	pub public_area_attendant: bool,
	/// Accepts room attendant jobs (id 2).
	pub room_attendant: bool,
	/// Accepts linen porter jobs (id 3).
	pub linen_porter: bool,
}
impl Default for JobTypes {
	fn default() -> Self {
		Self { public_area_attendant: true, room_attendant: true, linen_porter: true }
	}
}
impl JobTypes {
	/// Returns the enabled service ids in ascending wire-id order.
	///
	/// The order is fixed regardless of toggle history, so identical flag sets
	/// always serialize identically.
	pub fn selected_ids(&self) -> Vec<u8> {
		ServiceKind::ALL
			.into_iter()
			.filter(|kind| self.is_enabled(*kind))
			.map(ServiceKind::id)
			.collect()
	}

	/// Returns whether the given service is enabled.
	pub fn is_enabled(&self, kind: ServiceKind) -> bool {
		match kind {
			ServiceKind::PublicAreaAttendant => self.public_area_attendant,
			ServiceKind::RoomAttendant => self.room_attendant,
			ServiceKind::LinenPorter => self.linen_porter,
		}
	}

	/// Flips one flag; refuses the flip that would disable the last service.
	///
	/// Returns `true` when the toggle was applied.
	pub fn toggle(&mut self, kind: ServiceKind) -> bool {
		let enabled = self.is_enabled(kind);

		if enabled && self.selected_ids().len() == 1 {
			return false;
		}

		self.set(kind, !enabled);

		true
	}

	fn set(&mut self, kind: ServiceKind, value: bool) {
		match kind {
			ServiceKind::PublicAreaAttendant => self.public_area_attendant = value,
			ServiceKind::RoomAttendant => self.room_attendant = value,
			ServiceKind::LinenPorter => self.linen_porter = value,
		}
	}

	fn any_enabled(&self) -> bool {
		self.public_area_attendant || self.room_attendant || self.linen_porter
	}
}

/// Last known device location, absent until the first fix arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentLocation {
	/// Latitude in degrees.
	pub latitude: Option<f64>,
	/// Longitude in degrees.
	pub longitude: Option<f64>,
}

/// Wire shape pushed over the availability channel and the REST mirror.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySnapshot {
	/// Whether the provider is accepting work right now.
	pub is_provider_available: bool,
	/// Last known device location.
	pub current_location: CurrentLocation,
	/// Enabled service ids in ascending wire-id order.
	pub selected_jobs: Vec<u8>,
}

#[derive(Debug)]
struct ProviderStateInner {
	available: bool,
	job_types: JobTypes,
	location: CurrentLocation,
}
impl Default for ProviderStateInner {
	fn default() -> Self {
		Self { available: false, job_types: JobTypes::default(), location: Default::default() }
	}
}

/// Cloneable handle over the shared provider runtime state.
#[derive(Clone, Debug, Default)]
pub struct ProviderState(Arc<RwLock<ProviderStateInner>>);
impl ProviderState {
	/// Sets the availability flag.
	pub fn set_availability(&self, available: bool) {
		self.0.write().available = available;
	}

	/// Returns the availability flag.
	pub fn is_available(&self) -> bool {
		self.0.read().available
	}

	/// Replaces the job type flags; an all-`false` set is rejected.
	///
	/// Returns `true` when the set was applied.
	pub fn set_job_types(&self, job_types: JobTypes) -> bool {
		if !job_types.any_enabled() {
			return false;
		}

		self.0.write().job_types = job_types;

		true
	}

	/// Returns the current job type flags.
	pub fn job_types(&self) -> JobTypes {
		self.0.read().job_types
	}

	/// Flips one job type flag, refusing to disable the last enabled service.
	///
	/// Returns `true` when the toggle was applied.
	pub fn toggle_job_type(&self, kind: ServiceKind) -> bool {
		self.0.write().job_types.toggle(kind)
	}

	/// Records the latest device location fix.
	pub fn set_current_location(&self, latitude: f64, longitude: f64) {
		self.0.write().location =
			CurrentLocation { latitude: Some(latitude), longitude: Some(longitude) };
	}

	/// Returns the last known location.
	pub fn current_location(&self) -> CurrentLocation {
		self.0.read().location
	}

	/// Captures the wire snapshot of the full runtime state.
	pub fn availability_snapshot(&self) -> AvailabilitySnapshot {
		let inner = self.0.read();

		AvailabilitySnapshot {
			is_provider_available: inner.available,
			current_location: inner.location,
			selected_jobs: inner.job_types.selected_ids(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn selected_ids_keep_ascending_order() {
		let mut job_types = JobTypes::default();

		assert_eq!(job_types.selected_ids(), vec![1, 2, 3]);

		job_types.toggle(ServiceKind::RoomAttendant);

		assert_eq!(job_types.selected_ids(), vec![1, 3]);

		// Re-enabling must not append out of order.
		job_types.toggle(ServiceKind::RoomAttendant);

		assert_eq!(job_types.selected_ids(), vec![1, 2, 3]);
	}

	#[test]
	fn last_job_type_cannot_be_disabled() {
		let mut job_types = JobTypes::default();

		assert!(job_types.toggle(ServiceKind::PublicAreaAttendant));
		assert!(job_types.toggle(ServiceKind::RoomAttendant));
		assert!(!job_types.toggle(ServiceKind::LinenPorter));
		assert_eq!(job_types.selected_ids(), vec![3]);
	}

	#[test]
	fn all_false_job_type_set_is_rejected() {
		let state = ProviderState::default();
		let rejected =
			JobTypes { public_area_attendant: false, room_attendant: false, linen_porter: false };

		assert!(!state.set_job_types(rejected));
		assert_eq!(state.job_types(), JobTypes::default());
	}

	#[test]
	fn snapshot_reflects_the_runtime_state() {
		let state = ProviderState::default();

		state.set_availability(true);
		state.set_current_location(51.5074, -0.1278);
		state.toggle_job_type(ServiceKind::RoomAttendant);

		let snapshot = state.availability_snapshot();

		assert!(snapshot.is_provider_available);
		assert_eq!(snapshot.selected_jobs, vec![1, 3]);
		assert_eq!(snapshot.current_location.latitude, Some(51.5074));
	}
}
