//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	session::TokenSecret,
	store::{CredentialStore, StoreError, StoreFuture},
};

type StoreSlot = Arc<RwLock<Option<TokenSecret>>>;

/// In-process backend that keeps the refresh token in memory for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore(StoreSlot);
impl MemoryCredentialStore {
	fn save_now(slot: StoreSlot, token: TokenSecret) -> Result<(), StoreError> {
		*slot.write() = Some(token);

		Ok(())
	}

	fn load_now(slot: StoreSlot) -> Option<TokenSecret> {
		slot.read().clone()
	}

	fn delete_now(slot: StoreSlot) -> Result<(), StoreError> {
		*slot.write() = None;

		Ok(())
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn save(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::save_now(slot, token) })
	}

	fn load(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(slot)) })
	}

	fn delete(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::delete_now(slot) })
	}
}
