//! Request, response and event envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command sent to a DevTools target.
///
/// ```json
/// { "id": 7, "method": "Page.navigate", "params": { "url": "https://example.com" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	/// Unique request ID for correlating responses.
	pub id: u64,
	/// Domain-qualified method name, e.g. `Runtime.evaluate`.
	pub method: String,
	/// Method parameters as a JSON object.
	#[serde(default)]
	pub params: Value,
}

/// Reply to a [`Request`], carrying either `result` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	pub id: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ProtocolError>,
}

/// Error payload returned by the browser for a failed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolError {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
}

/// Unsolicited notification from the target (no `id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

/// Discriminated union of inbound messages.
///
/// Messages with an `id` are responses; everything else is an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	Response(Response),
	Event(Event),
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn response_with_result_parses() {
		let message: Message = serde_json::from_str(r#"{"id": 3, "result": {"frameId": "F1"}}"#).unwrap();
		match message {
			Message::Response(response) => {
				assert_eq!(response.id, 3);
				assert_eq!(response.result.unwrap()["frameId"], "F1");
				assert!(response.error.is_none());
			}
			Message::Event(_) => panic!("expected response"),
		}
	}

	#[test]
	fn response_with_error_parses() {
		let message: Message = serde_json::from_str(r#"{"id": 4, "error": {"code": -32000, "message": "Cannot navigate to invalid URL"}}"#).unwrap();
		let Message::Response(response) = message else {
			panic!("expected response");
		};
		let error = response.error.unwrap();
		assert_eq!(error.code, -32000);
		assert_eq!(error.message, "Cannot navigate to invalid URL");
	}

	#[test]
	fn message_without_id_is_event() {
		let message: Message = serde_json::from_str(r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}}"#).unwrap();
		match message {
			Message::Event(event) => {
				assert_eq!(event.method, "Page.loadEventFired");
				assert_eq!(event.params["timestamp"], 1.5);
			}
			Message::Response(_) => panic!("expected event"),
		}
	}

	#[test]
	fn request_serializes_flat() {
		let request = Request {
			id: 1,
			method: "Page.navigate".into(),
			params: json!({"url": "about:blank"}),
		};
		assert_eq!(
			serde_json::to_value(&request).unwrap(),
			json!({"id": 1, "method": "Page.navigate", "params": {"url": "about:blank"}})
		);
	}
}
