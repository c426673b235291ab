//! The JSON config file and command-line overrides.
//!
//! ```json
//! {
//!   "browser": { "port": 9223, "headless": false },
//!   "timing": { "pollIntervalMs": 2000, "optionTimeoutMs": null },
//!   "feed": { "preselect": ".moderna-button" },
//!   "rearmOnFailure": true
//! }
//! ```
//!
//! Missing keys keep their defaults; a `null` timeout waits forever.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slotwatch::SiteConfig;
use slotwatch_runtime::LaunchOptions;

use crate::cli::Cli;
use crate::error::{CliError, Result};

const CONFIG_DIR: &str = "slotwatch";
const CONFIG_FILE: &str = "config.json";

/// Browser to launch, or attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowserConfig {
	pub port: u16,
	pub headless: bool,
	pub executable: Option<PathBuf>,
	pub user_data_dir: Option<PathBuf>,
	/// DevTools HTTP endpoint of an already running browser.
	pub attach: Option<String>,
}

impl Default for BrowserConfig {
	fn default() -> Self {
		let launch = LaunchOptions::default();
		Self {
			port: launch.port,
			headless: launch.headless,
			executable: None,
			user_data_dir: None,
			attach: None,
		}
	}
}

impl BrowserConfig {
	pub fn launch_options(&self) -> LaunchOptions {
		LaunchOptions {
			port: self.port,
			headless: self.headless,
			executable: self.executable.clone(),
			user_data_dir: self.user_data_dir.clone(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
	#[serde(flatten)]
	pub site: SiteConfig,
	pub browser: BrowserConfig,
}

impl AppConfig {
	/// `<config dir>/slotwatch/config.json`.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
	}

	/// Reads `path`, or the default location when it exists, or falls back to
	/// built-in defaults.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::from_file(path),
			None => match Self::default_path().filter(|path| path.is_file()) {
				Some(path) => Self::from_file(&path),
				None => Ok(Self::default()),
			},
		}
	}

	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
			path: path.to_path_buf(),
			source,
		})?;
		let config: Self = serde_json::from_str(&raw).map_err(|source| CliError::ConfigParse {
			path: path.to_path_buf(),
			source,
		})?;
		config.site.validate()?;
		Ok(config)
	}

	/// Applies the flags given on the command line.
	pub fn apply(&mut self, cli: &Cli) {
		if let Some(port) = cli.port {
			self.browser.port = port;
		}
		if let Some(attach) = &cli.attach {
			self.browser.attach = Some(attach.clone());
		}
		if cli.headed {
			self.browser.headless = false;
		}
		if cli.rearm {
			self.site.rearm_on_failure = true;
		}
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use clap::Parser;

	use super::*;

	fn write_config(contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	#[test]
	fn partial_file_keeps_defaults() {
		let file = write_config(
			r#"{
				"browser": { "port": 9333, "headless": false },
				"timing": { "pollIntervalMs": 2500, "optionTimeoutMs": null },
				"feed": { "preselect": null },
				"rearmOnFailure": true
			}"#,
		);

		let config = AppConfig::load(Some(file.path())).unwrap();

		assert_eq!(config.browser.port, 9333);
		assert!(!config.browser.headless);
		assert_eq!(config.site.timing.poll_interval_ms, 2500);
		assert_eq!(config.site.timing.option_timeout_ms, None);
		assert_eq!(config.site.timing.element_timeout_ms, Some(30_000));
		assert_eq!(config.site.feed.preselect, None);
		assert_eq!(config.site.feed.container, ".dates-container-op");
		assert_eq!(config.site.portal, slotwatch::PortalConfig::default());
		assert!(config.site.rearm_on_failure);
	}

	#[test]
	fn invalid_url_is_rejected() {
		let file = write_config(r#"{ "portal": { "bookingUrl": "not a url" } }"#);
		let err = AppConfig::load(Some(file.path())).unwrap_err();
		assert!(matches!(err, CliError::Core(slotwatch::Error::Config(_))), "{err}");
	}

	#[test]
	fn malformed_json_names_the_file() {
		let file = write_config("{ \"browser\": ");
		let err = AppConfig::load(Some(file.path())).unwrap_err();
		assert!(matches!(err, CliError::ConfigParse { .. }));
		assert!(err.to_string().contains(&file.path().display().to_string()));
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = AppConfig::load(Some(&dir.path().join("absent.json"))).unwrap_err();
		assert!(matches!(err, CliError::ConfigRead { .. }));
	}

	#[test]
	fn flags_override_file_values() {
		let mut config = AppConfig::default();
		let cli = Cli::try_parse_from(["slotwatch", "--port", "9444", "--attach", "http://127.0.0.1:9222", "--headed", "--rearm"]).unwrap();

		config.apply(&cli);

		assert_eq!(config.browser.port, 9444);
		assert_eq!(config.browser.attach.as_deref(), Some("http://127.0.0.1:9222"));
		assert!(!config.browser.headless);
		assert!(config.site.rearm_on_failure);
		assert_eq!(config.browser.launch_options().port, 9444);
	}

	#[test]
	fn serializes_with_camel_case_keys() {
		let value = serde_json::to_value(AppConfig::default()).unwrap();
		assert_eq!(value["timing"]["pollIntervalMs"], 1000);
		assert_eq!(value["portal"]["dose1Time"], "select#dose1-appointment-time");
		assert_eq!(value["browser"]["port"], 9222);
		assert_eq!(value["rearmOnFailure"], false);
	}
}
