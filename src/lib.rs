//! Session and cache-synchronization client for the Helphive marketplace—silent token
//! rotation, replayable authenticated requests, derived entity stores, and availability
//! streaming in one crate built for mobile frontends.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod booking;
pub mod error;
pub mod http;
pub mod link;
pub mod obs;
pub mod pipeline;
pub mod provider;
pub mod realtime;
pub mod session;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestTransport,
		pipeline::ApiClient,
		store::{CredentialStore, MemoryCredentialStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestTransport>;

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs an [`ApiClient`] backed by an in-memory credential store and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_client(
		base_url: &str,
	) -> (ReqwestTestClient, Arc<MemoryCredentialStore>) {
		let base_url = Url::parse(base_url).expect("Failed to parse test base URL.");
		let store_backend = Arc::new(MemoryCredentialStore::default());
		let credentials: Arc<dyn CredentialStore> = store_backend.clone();
		let client = ApiClient::with_transport(base_url, test_reqwest_transport(), credentials);

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{BoxError, Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
// The crate dev-depends on itself to switch the `test` feature on for integration tests.
#[cfg(test)] use helphive_client as _;
