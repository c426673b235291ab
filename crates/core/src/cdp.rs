//! [`Browser`] and [`Page`] over the Chrome DevTools Protocol.
//!
//! Each page is its own target with its own WebSocket. DOM access goes through
//! `Runtime.evaluate` with small function literals; selectors and values are
//! passed in as JSON string literals so no quoting can break out of them.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use slotwatch_protocol::{EvaluateParams, EvaluateResult, TargetInfo};
use slotwatch_runtime::{Connection, DevToolsEndpoint};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::page::{Browser, Page};
use crate::wait::{WaitOptions, poll_until};

const EXISTS: &str = "(s) => document.querySelector(s) !== null";

const FOCUS: &str = "(s) => {
	const el = document.querySelector(s);
	if (!el) return false;
	el.focus();
	return true;
}";

const CLICK: &str = "(s) => {
	const el = document.querySelector(s);
	if (!el) return false;
	el.scrollIntoView({ block: 'center' });
	el.click();
	return true;
}";

const SET_VALUE: &str = "(s, v) => {
	const el = document.querySelector(s);
	if (!el) return false;
	el.value = v;
	el.dispatchEvent(new Event('change', { bubbles: true }));
	return true;
}";

const VALUE: &str = "(s) => {
	const el = document.querySelector(s);
	return el ? String(el.value ?? '') : null;
}";

const OPTION_VALUES: &str = "(s) => {
	const el = document.querySelector(s);
	if (!el) return null;
	return Array.from(el.options ?? el.querySelectorAll('option'), (o) => o.value);
}";

const TEXTS: &str = "(c, i) => {
	const root = document.querySelector(c);
	if (!root) return null;
	return Array.from(root.querySelectorAll(i), (el) => el.textContent ?? '');
}";

/// Builds `(<function>)("arg0", "arg1", ...)` with JSON-escaped arguments.
fn invoke(function: &str, args: &[&str]) -> String {
	let args: Vec<String> = args.iter().map(|arg| Value::from(*arg).to_string()).collect();
	format!("({function})({})", args.join(", "))
}

/// A browser reachable through its DevTools HTTP endpoint.
#[derive(Debug, Clone)]
pub struct CdpBrowser {
	endpoint: DevToolsEndpoint,
	load_wait: WaitOptions,
}

impl CdpBrowser {
	pub fn new(endpoint: DevToolsEndpoint) -> Self {
		Self {
			endpoint,
			load_wait: WaitOptions::default(),
		}
	}

	/// Bounds how long `goto` waits for `document.readyState == "complete"`.
	pub fn with_load_wait(mut self, load_wait: WaitOptions) -> Self {
		self.load_wait = load_wait;
		self
	}

	/// Connects to an already running browser, e.g. `http://127.0.0.1:9222`.
	pub async fn attach(base: &str) -> Result<Self> {
		let endpoint = DevToolsEndpoint::new(base)?;
		let version = endpoint.version().await?;
		info!(
			target = "slotwatch",
			endpoint = %endpoint.base_url(),
			browser = version.browser.as_deref().unwrap_or("unknown"),
			"attached to browser"
		);
		Ok(Self::new(endpoint))
	}

	pub fn endpoint(&self) -> &DevToolsEndpoint {
		&self.endpoint
	}
}

#[async_trait]
impl Browser for CdpBrowser {
	async fn new_page(&self) -> Result<Box<dyn Page>> {
		let target = self.endpoint.open_target().await?;
		let page = CdpPage::attach(self.endpoint.clone(), target, self.load_wait).await?;
		Ok(Box::new(page))
	}
}

/// One DevTools page target.
pub struct CdpPage {
	target_id: String,
	connection: Connection,
	endpoint: DevToolsEndpoint,
	load_wait: WaitOptions,
}

impl CdpPage {
	/// Connects to `target` and enables the page domain.
	pub async fn attach(endpoint: DevToolsEndpoint, target: TargetInfo, load_wait: WaitOptions) -> Result<Self> {
		let connection = Connection::connect(&target.web_socket_debugger_url).await?;
		connection.send("Page.enable", json!({})).await?;
		debug!(target = "slotwatch", id = %target.id, "page attached");
		Ok(Self {
			target_id: target.id,
			connection,
			endpoint,
			load_wait,
		})
	}

	pub fn target_id(&self) -> &str {
		&self.target_id
	}

	async fn evaluate(&self, expression: String) -> Result<Value> {
		let params = serde_json::to_value(EvaluateParams::by_value(expression))?;
		let raw = self.connection.send("Runtime.evaluate", params).await?;
		let result: EvaluateResult = serde_json::from_value(raw)?;
		if let Some(exception) = result.exception_details {
			return Err(Error::Script(exception.message()));
		}
		Ok(result.result.value.unwrap_or(Value::Null))
	}

	async fn evaluate_as<T: DeserializeOwned>(&self, expression: String) -> Result<T> {
		Ok(serde_json::from_value(self.evaluate(expression).await?)?)
	}

	/// Runs a DOM action that reports `false` when its element is missing.
	async fn act(&self, function: &str, selector: &str, args: &[&str]) -> Result<()> {
		let mut all = vec![selector];
		all.extend_from_slice(args);
		if self.evaluate_as::<bool>(invoke(function, &all)).await? {
			Ok(())
		} else {
			Err(Error::ElementNotFound(selector.to_string()))
		}
	}
}

#[async_trait]
impl Page for CdpPage {
	async fn goto(&self, url: &str) -> Result<()> {
		let navigation = self.connection.send("Page.navigate", json!({ "url": url })).await?;
		if let Some(error_text) = navigation.get("errorText").and_then(Value::as_str) {
			return Err(Error::Script(format!("{error_text} at {url}")));
		}

		poll_until(&self.load_wait, url, || async move {
			let state: String = self.evaluate_as("document.readyState".to_string()).await?;
			Ok((state == "complete").then_some(()))
		})
		.await?;
		debug!(target = "slotwatch", %url, "page loaded");
		Ok(())
	}

	async fn wait_for_selector(&self, selector: &str, wait: &WaitOptions) -> Result<()> {
		poll_until(wait, selector, || async move {
			let present: bool = self.evaluate_as(invoke(EXISTS, &[selector])).await?;
			Ok(present.then_some(()))
		})
		.await
	}

	async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
		self.act(FOCUS, selector, &[]).await?;
		self.connection.send("Input.insertText", json!({ "text": text })).await?;
		Ok(())
	}

	async fn click(&self, selector: &str) -> Result<()> {
		self.act(CLICK, selector, &[]).await
	}

	async fn set_value(&self, selector: &str, value: &str) -> Result<()> {
		self.act(SET_VALUE, selector, &[value]).await
	}

	async fn value(&self, selector: &str) -> Result<Option<String>> {
		self.evaluate_as(invoke(VALUE, &[selector])).await
	}

	async fn option_values(&self, select: &str) -> Result<Vec<String>> {
		let values: Option<Vec<String>> = self.evaluate_as(invoke(OPTION_VALUES, &[select])).await?;
		values.ok_or_else(|| Error::ElementNotFound(select.to_string()))
	}

	async fn texts(&self, container: &str, item: &str) -> Result<Vec<String>> {
		let texts: Option<Vec<String>> = self.evaluate_as(invoke(TEXTS, &[container, item])).await?;
		texts.ok_or_else(|| Error::ElementNotFound(container.to_string()))
	}

	async fn close(&self) -> Result<()> {
		self.endpoint.close_target(&self.target_id).await?;
		debug!(target = "slotwatch", id = %self.target_id, "page closed");
		Ok(())
	}
}
