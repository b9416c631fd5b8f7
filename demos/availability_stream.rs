//! Demonstrates the provider availability channel over a live websocket.
//!
//! 1. Build an [`AvailabilityChannel`] keyed by the provider's email.
//! 2. Go available: the channel connects and pushes the initial snapshot.
//! 3. Mutate job types and location; each change is pushed upstream.
//! 4. Go unavailable, which tears the connection down.
//!
//! Set `HELPHIVE_WS` to the websocket origin, e.g. `wss://api.helphive.example/`.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
// self
use helphive_client::{
	booking::ServiceKind,
	provider::ProviderState,
	realtime::{AvailabilityChannel, transport::TungsteniteConnector},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let base = Url::parse(&env::var("HELPHIVE_WS")?)?;
	let email = env::var("HELPHIVE_EMAIL")?;
	let mut channel = AvailabilityChannel::new(
		&base,
		&email,
		Arc::new(TungsteniteConnector),
		ProviderState::default(),
	)?;

	channel.set_available(true).await?;

	println!("channel is {} at {}", channel.state(), channel.endpoint());

	channel.update_location(51.5074, -0.1278).await?;
	channel.toggle_job_type(ServiceKind::LinenPorter).await?;

	println!("pushed snapshot: {:?}", channel.provider().availability_snapshot());

	channel.set_available(false).await?;

	println!("channel is {}", channel.state());

	Ok(())
}
