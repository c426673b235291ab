//! Appointment slot watching and booking.
//!
//! [`SlotPoller`] logs in through [`PortalAuthenticator`], polls an
//! availability feed on a fixed cadence and hands the first readable date to
//! [`BookingSession`]. Browser access goes through the [`Page`] and
//! [`Browser`] traits; [`cdp`] implements them over the DevTools protocol and
//! [`fake`] in memory.

pub mod auth;
pub mod booking;
pub mod cdp;
pub mod config;
pub mod date;
pub mod error;
pub mod fake;
pub mod page;
pub mod poller;
pub mod select;
pub mod wait;

pub use auth::{PortalAuthenticator, Session};
pub use booking::{BookingOutcome, BookingSession};
pub use cdp::{CdpBrowser, CdpPage};
pub use config::{FeedConfig, PortalConfig, SiteConfig, Timing};
pub use date::{CanonicalDate, DateParseError, normalize, normalize_in_year};
pub use error::{AuthStep, Error, Result};
pub use page::{Browser, CredentialProvider, Page};
pub use poller::{PollOutcome, PollStatus, SlotPoller};
pub use select::OptionSelector;
pub use wait::{PollDelay, WaitOptions};
