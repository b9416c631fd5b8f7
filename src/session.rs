//! In-memory authoritative session record and its lifecycle state machine.
//!
//! The session is the only globally shared mutable resource in the crate. It is
//! mutated exclusively through the command methods here ([`Session::apply_credentials`],
//! [`Session::apply_profile`], [`Session::adopt_refresh_token`], [`Session::clear`]),
//! which the request pipeline invokes on login, token rotation, and logout. The
//! access token is never persisted to durable storage; only the refresh token
//! reaches the credential store, and the store is written by the pipeline alone.

pub mod secret;

pub use secret::TokenSecret;

// self
use crate::_prelude::*;

/// Lifecycle phase of the session state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
	/// No credentials are held; gated screens must redirect to login.
	#[default]
	Unauthenticated,
	/// A login or silent relaunch adoption is in flight.
	Authenticating,
	/// A full credential set is held and requests carry the access token.
	Authenticated,
	/// A token rotation is in flight after an authorization failure.
	RefreshPending,
}
impl SessionPhase {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionPhase::Unauthenticated => "unauthenticated",
			SessionPhase::Authenticating => "authenticating",
			SessionPhase::Authenticated => "authenticated",
			SessionPhase::RefreshPending => "refresh_pending",
		}
	}
}
impl Display for SessionPhase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Payload of the `apply_credentials` command.
///
/// A refresh-only rotation carries `user: None`, in which case the previously
/// stored profile is preserved; login responses always carry the profile.
#[derive(Clone, Debug)]
pub struct Credentials {
	/// Opaque profile payload, absent on a pure token rotation.
	pub user: Option<Value>,
	/// Short-lived bearer credential attached to authenticated requests.
	pub access_token: TokenSecret,
	/// Long-lived credential exchanged for new token pairs.
	pub refresh_token: TokenSecret,
}
impl Credentials {
	/// Builds a credential set from raw token strings.
	pub fn new(
		user: Option<Value>,
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
	) -> Self {
		Self {
			user,
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
		}
	}
}

#[derive(Debug, Default)]
struct SessionInner {
	user: Option<Value>,
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	phase: SessionPhase,
}

/// Cloneable handle over the in-memory session record (single writer, many readers).
#[derive(Clone, Default)]
pub struct Session(Arc<RwLock<SessionInner>>);
impl Session {
	/// Installs a credential set, preserving the stored profile on a refresh-only update.
	pub fn apply_credentials(&self, credentials: Credentials) {
		let mut inner = self.0.write();

		if let Some(user) = credentials.user {
			inner.user = Some(user);
		}

		inner.access_token = Some(credentials.access_token);
		inner.refresh_token = Some(credentials.refresh_token);
		inner.phase = SessionPhase::Authenticated;
	}

	/// Replaces the stored profile after an identity fetch; tokens and phase are untouched.
	pub fn apply_profile(&self, user: Value) {
		self.0.write().user = Some(user);
	}

	/// Adopts a persisted refresh token at relaunch, before any gated screen renders.
	///
	/// The access token stays empty; the first authenticated request will fail
	/// authorization and the pipeline will rotate the adopted token silently.
	pub fn adopt_refresh_token(&self, token: TokenSecret) {
		let mut inner = self.0.write();

		inner.refresh_token = Some(token);
		inner.phase = SessionPhase::Authenticating;
	}

	/// Clears every field and returns the machine to `Unauthenticated`.
	pub fn clear(&self) {
		*self.0.write() = SessionInner::default();
	}

	/// Returns the current lifecycle phase.
	pub fn phase(&self) -> SessionPhase {
		self.0.read().phase
	}

	/// Returns the opaque profile payload, if one is held.
	pub fn user(&self) -> Option<Value> {
		self.0.read().user.clone()
	}

	/// Returns the current access token, if one is held.
	pub fn access_token(&self) -> Option<TokenSecret> {
		self.0.read().access_token.clone()
	}

	/// Returns the current refresh token, if one is held.
	pub fn refresh_token(&self) -> Option<TokenSecret> {
		self.0.read().refresh_token.clone()
	}

	/// Returns `true` when a full credential set is held.
	pub fn is_authenticated(&self) -> bool {
		self.0.read().access_token.is_some()
	}

	pub(crate) fn set_phase(&self, phase: SessionPhase) {
		self.0.write().phase = phase;
	}

	/// Re-derives the phase from held credentials after a failed auth attempt.
	pub(crate) fn settle_phase(&self) {
		let mut inner = self.0.write();

		inner.phase = if inner.access_token.is_some() {
			SessionPhase::Authenticated
		} else {
			SessionPhase::Unauthenticated
		};
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let inner = self.0.read();

		f.debug_struct("Session")
			.field("phase", &inner.phase)
			.field("user_set", &inner.user.is_some())
			.field("access_token_set", &inner.access_token.is_some())
			.field("refresh_token_set", &inner.refresh_token.is_some())
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
	fn login_and_logout_set_and_clear_everything() {
		let session = Session::default();

		assert_eq!(session.phase(), SessionPhase::Unauthenticated);

		session.apply_credentials(Credentials::new(Some(json!({"email": "a@b.com"})), "A1", "R1"));

		assert_eq!(session.phase(), SessionPhase::Authenticated);
		assert_eq!(session.access_token().map(|t| t.expose().to_owned()), Some("A1".into()));
		assert_eq!(session.refresh_token().map(|t| t.expose().to_owned()), Some("R1".into()));
		assert!(session.user().is_some());

		session.clear();

		assert_eq!(session.phase(), SessionPhase::Unauthenticated);
		assert!(session.user().is_none());
		assert!(session.access_token().is_none());
		assert!(session.refresh_token().is_none());
	}

	#[test]
	fn refresh_only_rotation_preserves_profile() {
		let session = Session::default();

		session.apply_credentials(Credentials::new(Some(json!({"email": "a@b.com"})), "A1", "R1"));
		session.apply_credentials(Credentials::new(None, "A2", "R2"));

		assert_eq!(session.user(), Some(json!({"email": "a@b.com"})));
		assert_eq!(session.access_token().map(|t| t.expose().to_owned()), Some("A2".into()));
		assert_eq!(session.refresh_token().map(|t| t.expose().to_owned()), Some("R2".into()));
	}

	#[test]
	fn relaunch_adoption_holds_refresh_token_only() {
		let session = Session::default();

		session.adopt_refresh_token(TokenSecret::new("R1"));

		assert_eq!(session.phase(), SessionPhase::Authenticating);
		assert!(session.access_token().is_none());
		assert!(session.refresh_token().is_some());
		assert!(!session.is_authenticated());
	}
}
