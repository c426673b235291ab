//! Filling and submitting the appointment request form.

use std::fmt;

use tracing::{error, info, warn};

use crate::config::{PortalConfig, Timing};
use crate::date::CanonicalDate;
use crate::error::{Error, Result};
use crate::page::{Browser, Page};
use crate::select::OptionSelector;

/// Result of one booking attempt. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
	Submitted { dose1: String, dose2: String },
	Failed(String),
}

impl BookingOutcome {
	pub fn is_submitted(&self) -> bool {
		matches!(self, BookingOutcome::Submitted { .. })
	}
}

impl fmt::Display for BookingOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BookingOutcome::Submitted { dose1, dose2 } => write!(f, "submitted (dose 1 at {dose1}, dose 2 at {dose2})"),
			BookingOutcome::Failed(reason) => write!(f, "failed: {reason}"),
		}
	}
}

pub struct BookingSession<'a> {
	portal: &'a PortalConfig,
	timing: &'a Timing,
}

impl<'a> BookingSession<'a> {
	pub fn new(portal: &'a PortalConfig, timing: &'a Timing) -> Self {
		Self { portal, timing }
	}

	/// Opens a fresh form page and requests an appointment on `date`.
	///
	/// On failure the page is closed and [`BookingOutcome::Failed`] returned.
	pub async fn book(&self, browser: &dyn Browser, date: &CanonicalDate) -> BookingOutcome {
		let page = match browser.new_page().await {
			Ok(page) => page,
			Err(e) => {
				error!(target = "slotwatch", error = %e, "could not open booking page");
				return BookingOutcome::Failed(e.to_string());
			}
		};

		match self.fill(page.as_ref(), date).await {
			Ok((dose1, dose2)) => {
				info!(target = "slotwatch", %date, %dose1, %dose2, "appointment request submitted");
				BookingOutcome::Submitted { dose1, dose2 }
			}
			Err(e) => {
				let e = Error::Booking(Box::new(e));
				error!(target = "slotwatch", %date, error = %e, "booking attempt failed");
				if let Err(close_err) = page.close().await {
					warn!(target = "slotwatch", error = %close_err, "failed to close booking page");
				}
				BookingOutcome::Failed(e.to_string())
			}
		}
	}

	async fn fill(&self, page: &dyn Page, date: &CanonicalDate) -> Result<(String, String)> {
		let element_wait = self.timing.element_wait();
		page.goto(&self.portal.booking_url).await?;

		info!(target = "slotwatch", "waiting for appointment 1 date picker");
		page.wait_for_selector(&self.portal.dose1_date, &element_wait).await?;
		page.set_value(&self.portal.dose1_date, date.as_str()).await?;

		let mut selector = OptionSelector::new(self.timing.option_wait()).with_placeholder(self.portal.placeholder.as_str());
		info!(target = "slotwatch", "waiting for appointment 1 time");
		let dose1 = selector.select_first(page, &self.portal.dose1_time).await?;
		info!(target = "slotwatch", "waiting for appointment 2 time");
		let dose2 = selector.select_first(page, &self.portal.dose2_time).await?;

		info!(target = "slotwatch", "submitting");
		page.wait_for_selector(&self.portal.submit_button, &element_wait).await?;
		page.click(&self.portal.submit_button).await?;
		Ok((dose1, dose2))
	}
}
