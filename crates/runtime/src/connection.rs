//! Request/response correlation over a DevTools WebSocket.
//!
//! Each outgoing command gets a fresh id and a oneshot channel parked in the
//! pending map. A background task reads frames from the socket: responses are
//! matched by id and complete their channel, events are logged and dropped.
//! When the socket closes, every pending channel is dropped so callers see
//! [`Error::ChannelClosed`] instead of hanging.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use slotwatch_protocol::{Message, Request};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value>>>>>;

/// Live command channel to one DevTools target.
pub struct Connection {
	last_id: AtomicU64,
	pending: Pending,
	sink: Mutex<SplitSink<Socket, Frame>>,
	reader: JoinHandle<()>,
}

impl Connection {
	/// Connects to a target's `webSocketDebuggerUrl`.
	pub async fn connect(url: &str) -> Result<Self> {
		let (socket, _) = tokio_tungstenite::connect_async(url).await?;
		let (sink, stream) = socket.split();
		let pending: Pending = Arc::default();
		let reader = tokio::spawn(read_loop(stream, Arc::clone(&pending)));
		debug!(target = "slotwatch", %url, "connected to DevTools target");

		Ok(Self {
			last_id: AtomicU64::new(1),
			pending,
			sink: Mutex::new(sink),
			reader,
		})
	}

	/// Sends `method` with `params` and waits for the matching response.
	pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		let (tx, rx) = oneshot::channel();
		self.pending.lock().await.insert(id, tx);

		let request = Request {
			id,
			method: method.to_string(),
			params,
		};
		let text = serde_json::to_string(&request)?;
		trace!(target = "slotwatch", id, %method, "send");

		if let Err(e) = self.sink.lock().await.send(Frame::Text(text.into())).await {
			self.pending.lock().await.remove(&id);
			return Err(e.into());
		}

		rx.await.map_err(|_| Error::ChannelClosed)?
	}

}

impl Drop for Connection {
	fn drop(&mut self) {
		self.reader.abort();
	}
}

async fn read_loop(mut stream: SplitStream<Socket>, pending: Pending) {
	while let Some(frame) = stream.next().await {
		let text = match frame {
			Ok(Frame::Text(text)) => text,
			Ok(Frame::Close(_)) => break,
			Ok(_) => continue,
			Err(e) => {
				debug!(target = "slotwatch", error = %e, "DevTools socket read failed");
				break;
			}
		};

		match serde_json::from_str::<Message>(&text) {
			Ok(message) => {
				if let Err(e) = dispatch(&pending, message).await {
					warn!(target = "slotwatch", error = %e, "dropping DevTools message");
				}
			}
			Err(e) => error!(target = "slotwatch", error = %e, message = %text, "unparseable DevTools message"),
		}
	}

	debug!(target = "slotwatch", "DevTools socket closed");
	pending.lock().await.clear();
}

async fn dispatch(pending: &Pending, message: Message) -> Result<()> {
	match message {
		Message::Response(response) => {
			let callback = pending
				.lock()
				.await
				.remove(&response.id)
				.ok_or_else(|| Error::UnexpectedResponse(format!("no pending request with id={}", response.id)))?;

			let result = match response.error {
				Some(error) => Err(Error::Protocol {
					code: error.code,
					message: error.message,
				}),
				None => Ok(response.result.unwrap_or(Value::Null)),
			};
			let _ = callback.send(result);
			Ok(())
		}
		Message::Event(event) => {
			trace!(target = "slotwatch", method = %event.method, "event");
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use slotwatch_protocol::{Event, ProtocolError, Response};

	use super::*;

	#[tokio::test]
	async fn dispatch_completes_matching_request() {
		let pending: Pending = Arc::default();
		let (tx, rx) = oneshot::channel();
		pending.lock().await.insert(7, tx);

		dispatch(
			&pending,
			Message::Response(Response {
				id: 7,
				result: Some(json!({"frameId": "F"})),
				error: None,
			}),
		)
		.await
		.unwrap();

		assert_eq!(rx.await.unwrap().unwrap()["frameId"], "F");
		assert!(pending.lock().await.is_empty());
	}

	#[tokio::test]
	async fn dispatch_converts_protocol_error() {
		let pending: Pending = Arc::default();
		let (tx, rx) = oneshot::channel();
		pending.lock().await.insert(1, tx);

		dispatch(
			&pending,
			Message::Response(Response {
				id: 1,
				result: None,
				error: Some(ProtocolError {
					code: -32000,
					message: "Cannot find context with specified id".into(),
					data: None,
				}),
			}),
		)
		.await
		.unwrap();

		match rx.await.unwrap() {
			Err(Error::Protocol { code, message }) => {
				assert_eq!(code, -32000);
				assert!(message.contains("Cannot find context"));
			}
			other => panic!("expected protocol error, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn dispatch_rejects_unknown_id() {
		let pending: Pending = Arc::default();
		let err = dispatch(
			&pending,
			Message::Response(Response {
				id: 99,
				result: Some(Value::Null),
				error: None,
			}),
		)
		.await
		.unwrap_err();
		assert!(err.to_string().contains("id=99"));
	}

	#[tokio::test]
	async fn dispatch_ignores_events() {
		let pending: Pending = Arc::default();
		dispatch(
			&pending,
			Message::Event(Event {
				method: "Page.frameNavigated".into(),
				params: json!({}),
			}),
		)
		.await
		.unwrap();
	}
}
