//! Availability streaming channel over a persistent websocket.
//!
//! The channel is a one-way push pipe keyed by provider email: whenever the
//! provider is available, state changes (availability, job types, location) are
//! serialized as [`AvailabilitySnapshot`](crate::provider::AvailabilitySnapshot)
//! frames and sent upstream. The connection state machine is strictly
//! `Closed -> Connecting -> Open -> Closed`; `Open` implies the provider is
//! available, and any send failure forces the provider offline rather than
//! leaving dispatch believing in a dead connection.

#[cfg(feature = "tungstenite")] pub mod transport;

// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderState,
};

/// Connection state of the availability channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelState {
	/// No connection; nothing is pushed.
	#[default]
	Closed,
	/// A connect attempt is in flight.
	Connecting,
	/// Frames flow; only reachable while the provider is available.
	Open,
}
impl ChannelState {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ChannelState::Closed => "closed",
			ChannelState::Connecting => "connecting",
			ChannelState::Open => "open",
		}
	}
}
impl Display for ChannelState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Errors surfaced by the availability channel.
#[derive(Debug, ThisError)]
pub enum ChannelError {
	/// The streaming endpoint URL could not be built.
	#[error("Invalid streaming endpoint.")]
	InvalidEndpoint(#[source] url::ParseError),
	/// The websocket handshake failed.
	#[error("Websocket connect failed.")]
	Connect(#[source] BoxError),
	/// A frame could not be delivered on an established connection.
	#[error("Websocket send failed.")]
	Send(#[source] BoxError),
	/// The snapshot could not be serialized.
	#[error("Snapshot encoding failed.")]
	Encode(#[from] serde_json::Error),
}
impl ChannelError {
	/// Wraps a handshake failure.
	pub fn connect<E>(source: E) -> Self
	where
		E: 'static + Send + Sync + StdError,
	{
		Self::Connect(Box::new(source))
	}

	/// Wraps a delivery failure.
	pub fn send<E>(source: E) -> Self
	where
		E: 'static + Send + Sync + StdError,
	{
		Self::Send(Box::new(source))
	}
}

/// Boxed future returned by the streaming traits.
pub type StreamFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ChannelError>> + 'a + Send>>;

/// Write half of an established streaming connection.
pub trait StreamSink
where
	Self: Send,
{
	/// Delivers one text frame.
	fn send(&mut self, frame: String) -> StreamFuture<'_, ()>;

	/// Probes for an unsolicited close without blocking.
	///
	/// Returns `true` once the peer has closed or the connection has otherwise
	/// died; a healthy connection with nothing to read returns `false`.
	fn is_closed(&mut self) -> StreamFuture<'_, bool>;

	/// Closes the connection gracefully.
	fn close(&mut self) -> StreamFuture<'_, ()>;
}

/// Abstraction over websocket stacks capable of opening streaming connections.
pub trait StreamConnector
where
	Self: 'static + Send + Sync,
{
	/// Performs the handshake against the endpoint and returns the write half.
	fn connect<'a>(&'a self, endpoint: &'a Url) -> StreamFuture<'a, Box<dyn StreamSink>>;
}

/// Caller-driven availability channel bound to one provider account.
///
/// The channel owns no background task; UI events drive it directly. Every
/// mutation goes through `&mut self`, which is what makes the state machine
/// enforceable: there is exactly one writer, and each method leaves the channel
/// in a state consistent with the provider's availability flag.
pub struct AvailabilityChannel {
	connector: Arc<dyn StreamConnector>,
	endpoint: Url,
	provider: ProviderState,
	sink: Option<Box<dyn StreamSink>>,
	state: ChannelState,
}
impl AvailabilityChannel {
	/// Builds a channel for the provider identified by `email`.
	///
	/// The endpoint is `<base>/provider-availability?email=<urlencoded email>`;
	/// the caller supplies the websocket origin (`wss://...`).
	pub fn new(
		base: &Url,
		email: &str,
		connector: Arc<dyn StreamConnector>,
		provider: ProviderState,
	) -> Result<Self, ChannelError> {
		let mut endpoint = base
			.join("provider-availability")
			.map_err(ChannelError::InvalidEndpoint)?;

		endpoint.query_pairs_mut().append_pair("email", email);

		Ok(Self { connector, endpoint, provider, sink: None, state: ChannelState::Closed })
	}

	/// Returns the current connection state.
	pub fn state(&self) -> ChannelState {
		self.state
	}

	/// Returns the shared provider state the channel mirrors.
	pub fn provider(&self) -> &ProviderState {
		&self.provider
	}

	/// Returns the resolved streaming endpoint.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Sets provider availability, opening or tearing down the connection.
	///
	/// Going available walks `Closed -> Connecting -> Open` and pushes an initial
	/// snapshot; a failed handshake rolls both the channel and the availability
	/// flag back so the UI never shows an available provider without a live
	/// connection. Going unavailable tears the connection down.
	pub async fn set_available(&mut self, available: bool) -> Result<(), ChannelError> {
		const KIND: FlowKind = FlowKind::Stream;

		let span = FlowSpan::new(KIND, "set_available");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				if !available {
					self.provider.set_availability(false);
					self.teardown().await;

					return Ok(());
				}

				self.provider.set_availability(true);

				if self.state == ChannelState::Open {
					return self.push_snapshot().await;
				}

				self.state = ChannelState::Connecting;

				match self.connector.connect(&self.endpoint).await {
					Ok(sink) => {
						self.sink = Some(sink);
						self.state = ChannelState::Open;

						self.push_snapshot().await
					},
					Err(err) => {
						self.state = ChannelState::Closed;
						self.provider.set_availability(false);

						Err(err)
					},
				}
			})
			.await;

		match &result {
			Ok(()) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Replaces the job type flags and pushes the updated snapshot when open.
	///
	/// Returns `Ok(false)` when the set was rejected (all flags `false`).
	pub async fn update_job_types(
		&mut self,
		job_types: crate::provider::JobTypes,
	) -> Result<bool, ChannelError> {
		if !self.provider.set_job_types(job_types) {
			return Ok(false);
		}

		self.push_if_open().await?;

		Ok(true)
	}

	/// Flips one job type flag and pushes the updated snapshot when open.
	///
	/// Returns `Ok(false)` when the flip was refused (last enabled service).
	pub async fn toggle_job_type(
		&mut self,
		kind: crate::booking::ServiceKind,
	) -> Result<bool, ChannelError> {
		if !self.provider.toggle_job_type(kind) {
			return Ok(false);
		}

		self.push_if_open().await?;

		Ok(true)
	}

	/// Records a location fix and pushes the updated snapshot when open.
	pub async fn update_location(
		&mut self,
		latitude: f64,
		longitude: f64,
	) -> Result<(), ChannelError> {
		self.provider.set_current_location(latitude, longitude);

		self.push_if_open().await
	}

	/// Probes the connection for an unsolicited remote close.
	///
	/// The channel owns no background task, so the owner drives this check from
	/// its event loop. A closed peer forces the provider offline exactly like a
	/// send failure; returns `true` when that happened.
	pub async fn poll_remote_close(&mut self) -> Result<bool, ChannelError> {
		let closed = match self.sink.as_mut() {
			Some(sink) if self.state == ChannelState::Open => sink.is_closed().await?,
			_ => return Ok(false),
		};

		if closed {
			self.force_offline().await;
		}

		Ok(closed)
	}

	/// Tears the connection down without touching the availability flag.
	///
	/// Used at app shutdown; close failures are swallowed since the connection
	/// is being discarded either way.
	pub async fn close(&mut self) {
		self.teardown().await;
	}

	async fn teardown(&mut self) {
		if let Some(mut sink) = self.sink.take() {
			let _ = sink.close().await;
		}

		self.state = ChannelState::Closed;
	}

	async fn push_if_open(&mut self) -> Result<(), ChannelError> {
		if self.state == ChannelState::Open { self.push_snapshot().await } else { Ok(()) }
	}

	async fn push_snapshot(&mut self) -> Result<(), ChannelError> {
		let frame = serde_json::to_string(&self.provider.availability_snapshot())?;
		let outcome = match self.sink.as_mut() {
			Some(sink) => sink.send(frame).await,
			None => return Ok(()),
		};

		if let Err(err) = outcome {
			self.force_offline().await;

			return Err(err);
		}

		Ok(())
	}

	/// A dead connection must not leave the provider marked available.
	async fn force_offline(&mut self) {
		self.provider.set_availability(false);
		self.teardown().await;
	}
}
impl Debug for AvailabilityChannel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AvailabilityChannel")
			.field("endpoint", &self.endpoint)
			.field("state", &self.state)
			.field("sink_held", &self.sink.is_some())
			.finish()
	}
}
