//! Demonstrates the interactive login flow against a live backend.
//!
//! 1. Open a [`FileCredentialStore`] so the refresh token survives restarts.
//! 2. Log in with `HELPHIVE_EMAIL` / `HELPHIVE_PASSWORD`.
//! 3. Fetch the categorized bookings into a [`BookingsCache`].
//! 4. Log out, clearing both the session and the persisted token.
//!
//! Set `HELPHIVE_API` to the backend origin, e.g. `https://api.helphive.example/`.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
// self
use helphive_client::{
	api::auth::LoginRequest,
	booking::BookingsCache,
	pipeline::ApiClient,
	store::{CredentialStore, FileCredentialStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let base_url = Url::parse(&env::var("HELPHIVE_API")?)?;
	let store: Arc<dyn CredentialStore> =
		Arc::new(FileCredentialStore::open(env::temp_dir().join("helphive-demo-token.json"))?);
	let client = ApiClient::new(base_url, store);
	let login = client
		.login(&LoginRequest {
			email: env::var("HELPHIVE_EMAIL")?,
			password: env::var("HELPHIVE_PASSWORD")?,
		})
		.await?;

	println!("logged in as {}", login.user["email"]);

	let cache = BookingsCache::default();
	let snapshot = client.fetch_user_bookings(&cache).await?;

	println!(
		"bookings: {} active, {} scheduled, {} past",
		snapshot.active.len(),
		snapshot.scheduled.len(),
		snapshot.history.len(),
	);

	client.logout().await?;

	println!("logged out; session phase is now {}", client.session.phase());

	Ok(())
}
