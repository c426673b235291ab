//! `Runtime.evaluate` parameters and results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for `Runtime.evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
	pub expression: String,
	pub return_by_value: bool,
	pub await_promise: bool,
}

impl EvaluateParams {
	/// Evaluates `expression` and returns its JSON value, awaiting promises.
	pub fn by_value(expression: impl Into<String>) -> Self {
		Self {
			expression: expression.into(),
			return_by_value: true,
			await_promise: true,
		}
	}
}

/// Result of `Runtime.evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
	pub result: RemoteObject,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exception_details: Option<ExceptionDetails>,
}

/// Mirror object referencing the evaluated value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub subtype: Option<String>,
	#[serde(default)]
	pub value: Option<Value>,
	#[serde(default)]
	pub description: Option<String>,
}

/// Details of an exception thrown during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
	pub text: String,
	#[serde(default)]
	pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
	/// Best human-readable description of the thrown value.
	pub fn message(&self) -> String {
		self.exception
			.as_ref()
			.and_then(|e| e.description.clone())
			.unwrap_or_else(|| self.text.clone())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn params_use_camel_case() {
		let params = serde_json::to_value(EvaluateParams::by_value("1 + 1")).unwrap();
		assert_eq!(params, json!({"expression": "1 + 1", "returnByValue": true, "awaitPromise": true}));
	}

	#[test]
	fn exception_prefers_description() {
		let result: EvaluateResult = serde_json::from_value(json!({
			"result": {"type": "object", "subtype": "error", "description": "TypeError: x is null"},
			"exceptionDetails": {
				"text": "Uncaught",
				"exception": {"type": "object", "subtype": "error", "description": "TypeError: x is null"}
			}
		}))
		.unwrap();
		assert_eq!(result.exception_details.unwrap().message(), "TypeError: x is null");
	}

	#[test]
	fn value_result_parses() {
		let result: EvaluateResult = serde_json::from_value(json!({"result": {"type": "boolean", "value": true}})).unwrap();
		assert_eq!(result.result.value, Some(json!(true)));
		assert!(result.exception_details.is_none());
	}
}
