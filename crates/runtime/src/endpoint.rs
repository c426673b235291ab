//! Client for the DevTools HTTP endpoint (`/json/*`).

use std::time::Duration;

use slotwatch_protocol::{TargetInfo, VersionInfo};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// HTTP side of a browser's remote debugging port.
#[derive(Debug, Clone)]
pub struct DevToolsEndpoint {
	base: Url,
	client: reqwest::Client,
}

impl DevToolsEndpoint {
	/// Creates a client for an endpoint such as `http://127.0.0.1:9222`.
	pub fn new(base: &str) -> Result<Self> {
		let mut url = Url::parse(base).map_err(|e| Error::Endpoint {
			url: base.to_string(),
			reason: e.to_string(),
		})?;
		if !matches!(url.scheme(), "http" | "https") {
			return Err(Error::Endpoint {
				url: base.to_string(),
				reason: format!("unsupported scheme `{}`", url.scheme()),
			});
		}
		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());
			url.set_path(&path);
		}

		let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;
		Ok(Self { base: url, client })
	}

	/// Endpoint of a browser listening on `port` on this machine.
	pub fn local(port: u16) -> Result<Self> {
		Self::new(&format!("http://127.0.0.1:{port}"))
	}

	pub fn base_url(&self) -> &Url {
		&self.base
	}

	fn url(&self, path: &str) -> Result<Url> {
		self.base.join(path).map_err(|e| Error::Endpoint {
			url: self.base.to_string(),
			reason: e.to_string(),
		})
	}

	/// Fetches `/json/version`.
	pub async fn version(&self) -> Result<VersionInfo> {
		let response = self.client.get(self.url("json/version")?).send().await?.error_for_status()?;
		Ok(response.json().await?)
	}

	/// Polls `/json/version` until it answers or `attempts` are exhausted.
	///
	/// `alive` runs before every probe; its error ends the wait at once.
	pub async fn wait_until_ready<F>(&self, attempts: usize, interval: Duration, mut alive: F) -> Result<VersionInfo>
	where
		F: FnMut() -> Result<()>,
	{
		let mut last_error = Error::UnexpectedResponse("endpoint not probed".into());
		for attempt in 1..=attempts {
			alive()?;
			match self.version().await {
				Ok(info) => return Ok(info),
				Err(e) => {
					debug!(target = "slotwatch", attempt, error = %e, "DevTools endpoint not ready");
					last_error = e;
				}
			}
			tokio::time::sleep(interval).await;
		}
		Err(last_error)
	}

	/// Opens a new blank page target.
	pub async fn open_target(&self) -> Result<TargetInfo> {
		let mut url = self.url("json/new")?;
		url.set_query(Some("about:blank"));
		let response = self.client.put(url).send().await?.error_for_status()?;
		let target: TargetInfo = response.json().await?;
		debug!(target = "slotwatch", id = %target.id, "opened target");
		Ok(target)
	}

	/// Closes the target with `id`.
	pub async fn close_target(&self, id: &str) -> Result<()> {
		let response = self.client.get(self.url(&format!("json/close/{id}"))?).send().await?;
		if !response.status().is_success() {
			let status = response.status();
			let body = response.text().await.unwrap_or_default();
			return Err(Error::UnexpectedResponse(format!("closing target {id} returned {status}: {body}")));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_url_gets_trailing_slash() {
		let endpoint = DevToolsEndpoint::new("http://127.0.0.1:9222").unwrap();
		assert_eq!(endpoint.url("json/version").unwrap().as_str(), "http://127.0.0.1:9222/json/version");

		let nested = DevToolsEndpoint::new("http://proxy.local/chrome").unwrap();
		assert_eq!(nested.url("json/new").unwrap().as_str(), "http://proxy.local/chrome/json/new");
	}

	#[test]
	fn rejects_websocket_scheme() {
		let err = DevToolsEndpoint::new("ws://127.0.0.1:9222").unwrap_err();
		assert!(err.to_string().contains("unsupported scheme"));
	}

	#[test]
	fn rejects_garbage() {
		assert!(matches!(DevToolsEndpoint::new("not a url"), Err(Error::Endpoint { .. })));
	}
}
