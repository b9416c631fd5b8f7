#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use helphive_client::{
	_preludet::*,
	booking::BookingsCache,
	session::{Credentials, SessionPhase, TokenSecret},
	store::CredentialStore,
};

const BOOKINGS_BODY: &str = "{\"history\":[],\"active\":[{\"id\":\"b-1\"}],\"scheduled\":[]}";

async fn seed_stale_session(
	client: &ReqwestTestClient,
	store: &dyn CredentialStore,
	access: &str,
	refresh: &str,
) {
	client.session.apply_credentials(Credentials::new(None, access, refresh));
	store
		.save(TokenSecret::new(refresh))
		.await
		.expect("Seeding the refresh token should succeed.");
}

#[tokio::test]
async fn expired_token_refreshes_and_replays_once() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_stale_session(&client, store.as_ref(), "A1", "R1").await;

	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/bookings").header("authorization", "Bearer A1");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"message\":\"jwt expired\"}");
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").body("{\"refreshToken\":\"R1\"}");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"A2\",\"refreshToken\":\"R2\"}");
		})
		.await;
	let replayed = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/bookings").header("authorization", "Bearer A2");
			then.status(200).header("content-type", "application/json").body(BOOKINGS_BODY);
		})
		.await;
	let cache = BookingsCache::default();
	let snapshot = client
		.fetch_user_bookings(&cache)
		.await
		.expect("Fetch behind an expired token should recover transparently.");

	stale.assert_async().await;
	refresh.assert_calls_async(1).await;
	replayed.assert_calls_async(1).await;

	assert_eq!(snapshot.active.len(), 1);
	assert_eq!(cache.snapshot(), snapshot);
	assert_eq!(client.session.phase(), SessionPhase::Authenticated);
	assert_eq!(client.session.access_token().map(|t| t.expose().to_owned()), Some("A2".into()));

	let stored = store
		.load()
		.await
		.expect("Load should succeed after rotation.")
		.expect("Rotated refresh token should be persisted.");

	assert_eq!(stored.expose(), "R2");
	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.refresh_metrics.successes(), 1);
	assert_eq!(client.refresh_metrics.failures(), 0);
}

#[tokio::test]
async fn failed_refresh_expires_the_session() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_stale_session(&client, store.as_ref(), "A1", "R-dead").await;

	let _gated = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/bookings");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"message\":\"invalid refresh token\"}");
		})
		.await;
	let cache = BookingsCache::default();
	let err = client
		.fetch_user_bookings(&cache)
		.await
		.expect_err("A rejected rotation should expire the session.");

	refresh.assert_async().await;

	assert!(matches!(err, Error::SessionExpired { .. }));
	assert!(err.forces_logout());
	assert_eq!(client.session.phase(), SessionPhase::Unauthenticated);
	assert!(client.session.access_token().is_none());
	assert_eq!(store.load().await.expect("Load should succeed after cleanup."), None);
	assert_eq!(client.refresh_metrics.failures(), 1);
	assert_eq!(client.refresh_metrics.successes(), 0);
}

#[tokio::test]
async fn missing_refresh_token_surfaces_the_original_rejection() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.base_url());

	// Access token without a persisted refresh token: nothing to rotate with.
	client.session.apply_credentials(Credentials::new(None, "A1", "R1"));

	let _gated = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/bookings");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200);
		})
		.await;
	let cache = BookingsCache::default();
	let err = client
		.fetch_user_bookings(&cache)
		.await
		.expect_err("The original authorization failure should surface.");

	refresh.assert_calls_async(0).await;

	assert!(matches!(err, Error::Unauthorized { status: 401 }));
	assert!(!err.forces_logout());
	assert_eq!(client.session.phase(), SessionPhase::Unauthenticated);
}

#[tokio::test]
async fn concurrent_expiry_rotates_the_token_once() {
	let server = MockServer::start_async().await;
	let (client, store) = build_reqwest_test_client(&server.base_url());

	seed_stale_session(&client, store.as_ref(), "A1", "R1").await;

	let _stale_bookings = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/bookings").header("authorization", "Bearer A1");
			then.status(401);
		})
		.await;
	let _stale_profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/user-info").header("authorization", "Bearer A1");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").body("{\"refreshToken\":\"R1\"}");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"A2\",\"refreshToken\":\"R2\"}");
		})
		.await;
	let _fresh_bookings = server
		.mock_async(|when, then| {
			when.method(GET).path("/user/bookings").header("authorization", "Bearer A2");
			then.status(200).header("content-type", "application/json").body(BOOKINGS_BODY);
		})
		.await;
	let _fresh_profile = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/user-info").header("authorization", "Bearer A2");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"email\":\"pro@example.com\"}");
		})
		.await;
	let cache = BookingsCache::default();
	let (bookings, profile) =
		tokio::join!(client.fetch_user_bookings(&cache), client.fetch_user_info());

	bookings.expect("Concurrent bookings fetch should recover.");
	profile.expect("Concurrent profile fetch should recover.");

	// Refresh tokens rotate on use, so a second rotation would have died with R1.
	refresh.assert_calls_async(1).await;

	assert_eq!(client.refresh_metrics.attempts(), 1);
	assert_eq!(client.session.access_token().map(|t| t.expose().to_owned()), Some("A2".into()));
}
