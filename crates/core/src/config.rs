//! Target-site selectors, URLs and timings.
//!
//! Defaults describe the Sydney Olympic Park vaccination portal and the
//! covidqueue availability feed. Every field can be overridden from the JSON
//! config file; missing keys keep their default.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::wait::WaitOptions;

/// Option value the portal uses before real time slots are loaded.
pub const PLACEHOLDER_OPTION: &str = "NULL";

/// Marker the feed prints next to dates with open slots.
pub const AVAILABILITY_MARKER: &str = "💉💉";

/// Booking portal pages and form controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortalConfig {
	pub landing_url: String,
	pub booking_url: String,
	pub phone_input: String,
	pub login_button: String,
	pub otp_input: String,
	pub otp_submit: String,
	pub confirm_registration: String,
	pub dose1_date: String,
	pub dose1_time: String,
	pub dose2_time: String,
	pub submit_button: String,
	pub placeholder: String,
}

impl Default for PortalConfig {
	fn default() -> Self {
		Self {
			landing_url: "https://vaccination.slhd.nsw.gov.au/vc/SydneyOlympicPark/2".into(),
			booking_url: "https://vaccination.slhd.nsw.gov.au/vc/appointment-requests".into(),
			phone_input: "#mobile-number".into(),
			login_button: "#login-mobile".into(),
			otp_input: "#otp-password".into(),
			otp_submit: "#otp-submit".into(),
			confirm_registration: ".btn.btn-sm.btn-primary.text-white".into(),
			dose1_date: "#dose1DatePicker".into(),
			dose1_time: "select#dose1-appointment-time".into(),
			dose2_time: "select#dose2-appointment-time".into(),
			submit_button: "button#appointment-request-submit-button".into(),
			placeholder: PLACEHOLDER_OPTION.into(),
		}
	}
}

/// Availability feed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedConfig {
	pub url: String,
	/// Control clicked once after the feed loads (vaccine brand filter).
	pub preselect: Option<String>,
	pub container: String,
	pub entry: String,
	pub marker: String,
}

impl Default for FeedConfig {
	fn default() -> Self {
		Self {
			url: "https://covidqueue.com/".into(),
			preselect: Some(".pfizer-button".into()),
			container: ".dates-container-op".into(),
			entry: "p".into(),
			marker: AVAILABILITY_MARKER.into(),
		}
	}
}

/// Poll cadence and wait bounds. `None` timeouts wait forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timing {
	pub poll_interval_ms: u64,
	pub option_poll_ms: u64,
	pub element_timeout_ms: Option<u64>,
	pub option_timeout_ms: Option<u64>,
}

impl Default for Timing {
	fn default() -> Self {
		Self {
			poll_interval_ms: 1000,
			option_poll_ms: 200,
			element_timeout_ms: Some(30_000),
			option_timeout_ms: Some(120_000),
		}
	}
}

impl Timing {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	/// Waits for page elements (inputs, buttons, the feed container).
	pub fn element_wait(&self) -> WaitOptions {
		WaitOptions {
			timeout: self.element_timeout_ms.map(Duration::from_millis),
			poll_interval: WaitOptions::DEFAULT_POLL_INTERVAL,
		}
	}

	/// Waits for asynchronously populated time-slot options.
	pub fn option_wait(&self) -> WaitOptions {
		WaitOptions {
			timeout: self.option_timeout_ms.map(Duration::from_millis),
			poll_interval: Duration::from_millis(self.option_poll_ms),
		}
	}
}

/// Everything the poller needs to know about the two target sites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
	pub portal: PortalConfig,
	pub feed: FeedConfig,
	pub timing: Timing,
	/// Resume polling when a booking attempt fails instead of stopping. Dates
	/// whose attempt failed are not tried again for the rest of the run.
	pub rearm_on_failure: bool,
}

impl SiteConfig {
	/// Rejects unusable URLs, empty selectors and a zero poll cadence.
	pub fn validate(&self) -> Result<()> {
		for (name, value) in [
			("portal.landingUrl", &self.portal.landing_url),
			("portal.bookingUrl", &self.portal.booking_url),
			("feed.url", &self.feed.url),
		] {
			let url = Url::parse(value).map_err(|e| Error::Config(format!("{name} `{value}`: {e}")))?;
			if !matches!(url.scheme(), "http" | "https" | "file") {
				return Err(Error::Config(format!("{name} `{value}`: unsupported scheme")));
			}
		}

		let selectors = [
			("portal.phoneInput", &self.portal.phone_input),
			("portal.loginButton", &self.portal.login_button),
			("portal.otpInput", &self.portal.otp_input),
			("portal.otpSubmit", &self.portal.otp_submit),
			("portal.confirmRegistration", &self.portal.confirm_registration),
			("portal.dose1Date", &self.portal.dose1_date),
			("portal.dose1Time", &self.portal.dose1_time),
			("portal.dose2Time", &self.portal.dose2_time),
			("portal.submitButton", &self.portal.submit_button),
			("feed.container", &self.feed.container),
			("feed.entry", &self.feed.entry),
			("feed.marker", &self.feed.marker),
		];
		if let Some((name, _)) = selectors.iter().find(|(_, value)| value.trim().is_empty()) {
			return Err(Error::Config(format!("{name} must not be empty")));
		}

		if self.timing.poll_interval_ms == 0 || self.timing.option_poll_ms == 0 {
			return Err(Error::Config("poll intervals must be greater than zero".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_validate() {
		SiteConfig::default().validate().unwrap();
	}

	#[test]
	fn partial_json_keeps_defaults() {
		let config: SiteConfig = serde_json::from_str(r#"{"feed": {"preselect": null}, "timing": {"pollIntervalMs": 250}}"#).unwrap();
		assert_eq!(config.feed.preselect, None);
		assert_eq!(config.feed.container, ".dates-container-op");
		assert_eq!(config.timing.poll_interval_ms, 250);
		assert_eq!(config.timing.option_poll_ms, 200);
		assert_eq!(config.portal, PortalConfig::default());
	}

	#[test]
	fn null_timeout_means_unbounded() {
		let timing: Timing = serde_json::from_str(r#"{"optionTimeoutMs": null}"#).unwrap();
		assert_eq!(timing.option_wait().timeout, None);
		assert_eq!(timing.option_wait().poll_interval, Duration::from_millis(200));
		assert_eq!(timing.element_wait().timeout, Some(Duration::from_secs(30)));
	}

	#[test]
	fn bad_url_is_rejected() {
		let mut config = SiteConfig::default();
		config.feed.url = "covidqueue.com".into();
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("feed.url"));
	}

	#[test]
	fn empty_selector_is_rejected() {
		let mut config = SiteConfig::default();
		config.portal.dose2_time = "  ".into();
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("portal.dose2Time"));
	}

	#[test]
	fn zero_poll_interval_is_rejected() {
		let mut config = SiteConfig::default();
		config.timing.poll_interval_ms = 0;
		assert!(config.validate().is_err());
	}
}
