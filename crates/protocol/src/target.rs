//! Discovery documents served by the DevTools HTTP endpoint.

use serde::{Deserialize, Serialize};

/// `/json/version` response subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
	#[serde(rename = "Browser")]
	pub browser: Option<String>,
	#[serde(rename = "Protocol-Version", default)]
	pub protocol_version: Option<String>,
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
}

/// One entry of `/json/list`, also the body returned by `/json/new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
	pub web_socket_debugger_url: String,
}
