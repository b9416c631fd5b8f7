//! Default tokio-tungstenite connector for the availability channel.

// std
use std::task::Poll;
// crates.io
use futures_util::{SinkExt, Stream, future::poll_fn};
use tokio::net::TcpStream;
use tokio_tungstenite::{
	MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
// self
use crate::{
	_prelude::*,
	realtime::{ChannelError, StreamConnector, StreamFuture, StreamSink},
};

/// Connector backed by [`tokio_tungstenite::connect_async`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TungsteniteConnector;
impl StreamConnector for TungsteniteConnector {
	fn connect<'a>(&'a self, endpoint: &'a Url) -> StreamFuture<'a, Box<dyn StreamSink>> {
		Box::pin(async move {
			let (stream, _) =
				connect_async(endpoint.as_str()).await.map_err(ChannelError::connect)?;

			Ok(Box::new(TungsteniteSink { stream }) as Box<dyn StreamSink>)
		})
	}
}

/// Write half over an established tungstenite connection.
pub struct TungsteniteSink {
	stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}
impl StreamSink for TungsteniteSink {
	fn send(&mut self, frame: String) -> StreamFuture<'_, ()> {
		Box::pin(async move {
			self.stream.send(Message::Text(frame)).await.map_err(ChannelError::send)
		})
	}

	fn is_closed(&mut self) -> StreamFuture<'_, bool> {
		Box::pin(async move {
			// Drain whatever the peer has queued without blocking; the channel
			// is one-way, so inbound data frames are discarded.
			let closed = poll_fn(|cx| loop {
				match Pin::new(&mut self.stream).poll_next(cx) {
					Poll::Ready(None) | Poll::Ready(Some(Err(_))) => return Poll::Ready(true),
					Poll::Ready(Some(Ok(Message::Close(_)))) => return Poll::Ready(true),
					Poll::Ready(Some(Ok(_))) => continue,
					Poll::Pending => return Poll::Ready(false),
				}
			})
			.await;

			Ok(closed)
		})
	}

	fn close(&mut self) -> StreamFuture<'_, ()> {
		Box::pin(async move { self.stream.close(None).await.map_err(ChannelError::send) })
	}
}
impl Debug for TungsteniteSink {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TungsteniteSink(..)")
	}
}
