//! The top-level acquisition loop.
//!
//! ```text
//! Unauthenticated ──login──▶ Polling ──marker──▶ SlotDetected ──date──▶ Booking ──▶ Done
//!                              ▲  │ no slot / scrape error / bad date       │
//!                              └──┴── fixed delay ◀──── rearm on failure ───┘
//! ```
//!
//! Login and opening the feed happen once; a failure there ends the run. Inside
//! the loop nothing is fatal: scrape failures and unparseable dates are logged
//! and the next cycle starts after the fixed delay.

use std::collections::HashSet;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::PortalAuthenticator;
use crate::booking::{BookingOutcome, BookingSession};
use crate::config::SiteConfig;
use crate::date::{self, CanonicalDate, DateParseError};
use crate::error::{Error, Result};
use crate::page::{Browser, CredentialProvider, Page};
use crate::wait::PollDelay;

/// Externally observable state of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
	NoSlot,
	SlotFound(CanonicalDate),
	BookingSucceeded(CanonicalDate),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	Booked {
		date: CanonicalDate,
		outcome: BookingOutcome,
		cycles: u64,
	},
	Cancelled {
		cycles: u64,
	},
}

pub struct SlotPoller<'a> {
	browser: &'a dyn Browser,
	site: &'a SiteConfig,
	cancel: CancellationToken,
	status: watch::Sender<PollStatus>,
	year: Option<i32>,
}

impl<'a> SlotPoller<'a> {
	pub fn new(browser: &'a dyn Browser, site: &'a SiteConfig) -> Self {
		Self {
			browser,
			site,
			cancel: CancellationToken::new(),
			status: watch::Sender::new(PollStatus::NoSlot),
			year: None,
		}
	}

	/// Stops the loop at the next poll delay once `cancel` fires.
	pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;
		self
	}

	/// Pins the year assumed for feed dates instead of the current one.
	pub fn with_year(mut self, year: i32) -> Self {
		self.year = Some(year);
		self
	}

	pub fn status(&self) -> watch::Receiver<PollStatus> {
		self.status.subscribe()
	}

	/// Logs in, then polls the feed until a booking attempt is made or the
	/// run is cancelled.
	pub async fn run(&self, credentials: &dyn CredentialProvider) -> Result<PollOutcome> {
		let timing = &self.site.timing;
		let session = PortalAuthenticator::new(&self.site.portal, timing.element_wait())
			.authenticate(self.browser, credentials)
			.await?;

		let feed = self.open_feed().await?;
		let booking = BookingSession::new(&self.site.portal, timing);
		let delay = PollDelay::new(timing.poll_interval(), self.cancel.clone());
		let mut cycles = 0u64;
		let mut lost = HashSet::new();

		let outcome = loop {
			if delay.is_cancelled() {
				break PollOutcome::Cancelled { cycles };
			}
			cycles += 1;

			match self.scan(feed.as_ref()).await {
				Ok(candidates) => {
					if let Some((date, outcome)) = self.try_candidates(&booking, &candidates, &lost).await {
						if outcome.is_submitted() || !self.site.rearm_on_failure {
							self.status.send_replace(PollStatus::BookingSucceeded(date.clone()));
							break PollOutcome::Booked { date, outcome, cycles };
						}
						warn!(target = "slotwatch", %date, "booking attempt failed; resuming polling");
						self.status.send_replace(PollStatus::NoSlot);
						lost.insert(date);
					}
				}
				Err(e) => warn!(target = "slotwatch", error = %e, "Failure fetching availability dates"),
			}

			if !delay.wait().await {
				break PollOutcome::Cancelled { cycles };
			}
		};

		if let PollOutcome::Cancelled { cycles } = &outcome {
			info!(target = "slotwatch", cycles, "polling cancelled");
		}
		drop(session);
		Ok(outcome)
	}

	async fn open_feed(&self) -> Result<Box<dyn Page>> {
		let feed = &self.site.feed;
		let page = self.browser.new_page().await.map_err(Error::feed)?;
		info!(target = "slotwatch", url = %feed.url, "opening availability feed");
		page.goto(&feed.url).await.map_err(Error::feed)?;

		if let Some(preselect) = &feed.preselect {
			page.wait_for_selector(preselect, &self.site.timing.element_wait())
				.await
				.map_err(Error::feed)?;
			page.click(preselect).await.map_err(Error::feed)?;
		}
		Ok(page)
	}

	/// Reads the feed entries of one cycle.
	async fn scan(&self, feed: &dyn Page) -> Result<Vec<String>> {
		let config = &self.site.feed;
		feed.wait_for_selector(&config.container, &self.site.timing.element_wait())
			.await
			.map_err(Error::feed)?;
		let entries = feed.texts(&config.container, &config.entry).await.map_err(Error::feed)?;
		debug!(target = "slotwatch", entries = entries.len(), "scanned feed");
		Ok(entries)
	}

	/// Books the first marked entry whose date parses and has not failed
	/// before. Returns `None` when no entry produced a booking attempt.
	async fn try_candidates(
		&self,
		booking: &BookingSession<'_>,
		candidates: &[String],
		lost: &HashSet<CanonicalDate>,
	) -> Option<(CanonicalDate, BookingOutcome)> {
		for text in candidates.iter().filter(|text| text.contains(self.site.feed.marker.as_str())) {
			info!(target = "slotwatch", entry = %text.trim(), "slot found");
			let date = match self.parse_date(text) {
				Ok(date) => date,
				Err(e) => {
					warn!(target = "slotwatch", error = %e, "skipping slot with unreadable date");
					continue;
				}
			};
			if lost.contains(&date) {
				debug!(target = "slotwatch", %date, "skipping date whose booking already failed");
				continue;
			}

			info!(target = "slotwatch", %date, "booking in");
			self.status.send_replace(PollStatus::SlotFound(date.clone()));
			let outcome = booking.book(self.browser, &date).await;
			return Some((date, outcome));
		}
		None
	}

	fn parse_date(&self, text: &str) -> std::result::Result<CanonicalDate, DateParseError> {
		match self.year {
			Some(year) => date::normalize_in_year(text, year),
			None => date::normalize(text),
		}
	}
}
