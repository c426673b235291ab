//! Launching Chrome with remote debugging enabled.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::browser_finder::find_chrome_executable;
use crate::endpoint::DevToolsEndpoint;
use crate::error::{Error, Result};
use crate::process::port_available;

const READY_ATTEMPTS: usize = 25;
const READY_INTERVAL: Duration = Duration::from_millis(200);

/// How to start the browser.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
	/// Remote debugging port.
	pub port: u16,
	pub headless: bool,
	/// Explicit browser binary; discovered on PATH when `None`.
	pub executable: Option<PathBuf>,
	/// Profile directory; a per-port directory under the temp dir when `None`.
	pub user_data_dir: Option<PathBuf>,
}

impl Default for LaunchOptions {
	fn default() -> Self {
		Self {
			port: 9222,
			headless: true,
			executable: None,
			user_data_dir: None,
		}
	}
}

impl LaunchOptions {
	fn resolved_user_data_dir(&self) -> PathBuf {
		self.user_data_dir
			.clone()
			.unwrap_or_else(|| std::env::temp_dir().join(format!("slotwatch-profile-{}", self.port)))
	}

	fn args(&self) -> Vec<String> {
		let mut args = vec![
			format!("--remote-debugging-port={}", self.port),
			format!("--user-data-dir={}", self.resolved_user_data_dir().display()),
			"--no-first-run".to_string(),
			"--no-default-browser-check".to_string(),
		];
		if self.headless {
			args.push("--headless=new".to_string());
		}
		args.push("about:blank".to_string());
		args
	}
}

/// A browser child process owned by slotwatch.
///
/// The process is killed on [`ChromeProcess::shutdown`] or when dropped.
pub struct ChromeProcess {
	child: Option<Child>,
	endpoint: DevToolsEndpoint,
}

impl ChromeProcess {
	pub fn endpoint(&self) -> &DevToolsEndpoint {
		&self.endpoint
	}

	/// Kills the browser and reaps the process.
	pub fn shutdown(mut self) -> Result<()> {
		if let Some(mut child) = self.child.take() {
			if child.try_wait()?.is_none() {
				child.kill()?;
			}
			child.wait()?;
			info!(target = "slotwatch", pid = child.id(), "browser stopped");
		}
		Ok(())
	}
}

impl Drop for ChromeProcess {
	fn drop(&mut self) {
		if let Some(mut child) = self.child.take() {
			let _ = child.kill();
			let _ = child.wait();
		}
	}
}

/// Starts a browser and waits until its DevTools endpoint answers.
pub async fn launch_chrome(options: &LaunchOptions) -> Result<ChromeProcess> {
	if !port_available(options.port) {
		return Err(Error::BrowserLaunch(format!(
			"port {} is already in use; attach to the running browser instead",
			options.port
		)));
	}

	let executable = match &options.executable {
		Some(path) => path.clone(),
		None => find_chrome_executable().ok_or_else(|| {
			Error::BrowserLaunch("could not find a Chrome/Chromium executable; set browser.executable in the config".into())
		})?,
	};

	let args = options.args();
	debug!(target = "slotwatch", executable = %executable.display(), ?args, "launching browser");

	let mut child = Command::new(&executable)
		.args(&args)
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.spawn()
		.map_err(|e| Error::BrowserLaunch(format!("failed to start {}: {}", executable.display(), e)))?;

	let endpoint = DevToolsEndpoint::local(options.port)?;
	let ready = endpoint
		.wait_until_ready(READY_ATTEMPTS, READY_INTERVAL, || match child.try_wait()? {
			Some(status) => Err(Error::BrowserLaunch(format!(
				"browser exited before its debugging endpoint came up (status: {status})"
			))),
			None => Ok(()),
		})
		.await;

	match ready {
		Ok(version) => {
			info!(
				target = "slotwatch",
				pid = child.id(),
				browser = version.browser.as_deref().unwrap_or("unknown"),
				port = options.port,
				"browser launched"
			);
			Ok(ChromeProcess {
				child: Some(child),
				endpoint,
			})
		}
		Err(e @ Error::BrowserLaunch(_)) => Err(e),
		Err(e) => {
			warn!(target = "slotwatch", port = options.port, error = %e, "debugging endpoint never came up; killing browser");
			let _ = child.kill();
			let _ = child.wait();
			Err(Error::BrowserLaunch(format!(
				"debugging endpoint not available on port {} after launch",
				options.port
			)))
		}
	}
}
