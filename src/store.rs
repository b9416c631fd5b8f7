//! Secure credential storage contracts and built-in backends.
//!
//! The store persists exactly one value: the refresh token, the durable anchor
//! that survives process restarts. Reads, writes, and deletes are last-writer-wins
//! and atomic from the application's perspective. Access tokens never reach this
//! layer.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

// self
use crate::{_prelude::*, session::TokenSecret};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable backend contract for the single persisted refresh token.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the refresh token.
	fn save(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Fetches the persisted refresh token, if present.
	fn load(&self) -> StoreFuture<'_, Option<TokenSecret>>;

	/// Deletes the persisted refresh token; deleting an absent token is not an error.
	fn delete(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
