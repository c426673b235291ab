use std::fmt;

use thiserror::Error;

/// Steps of the portal login flow, used to tag authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
	Landing,
	Phone,
	OneTimeCode,
	Confirmation,
}

impl fmt::Display for AuthStep {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			AuthStep::Landing => "landing page",
			AuthStep::Phone => "phone number",
			AuthStep::OneTimeCode => "one-time code",
			AuthStep::Confirmation => "registration confirmation",
		})
	}
}

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Runtime(#[from] slotwatch_runtime::Error),

	#[error("Timed out after {ms}ms waiting for {what}")]
	Timeout { what: String, ms: u64 },

	#[error("Element not found: {0}")]
	ElementNotFound(String),

	#[error("Script error: {0}")]
	Script(String),

	#[error("Invalid configuration: {0}")]
	Config(String),

	#[error("Credential input failed: {0}")]
	Credentials(String),

	#[error("Authentication failed at {step}: {source}")]
	Authentication {
		step: AuthStep,
		#[source]
		source: Box<Error>,
	},

	#[error("Failure fetching availability feed: {0}")]
	FeedScrape(#[source] Box<Error>),

	#[error("Booking attempt failed: {0}")]
	Booking(#[source] Box<Error>),
}

impl Error {
	pub(crate) fn authentication(step: AuthStep) -> impl FnOnce(Error) -> Error {
		move |source| Error::Authentication {
			step,
			source: Box::new(source),
		}
	}

	pub(crate) fn feed(source: Error) -> Error {
		Error::FeedScrape(Box::new(source))
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Runtime(slotwatch_runtime::Error::Json(err))
	}
}

pub type Result<T> = std::result::Result<T, Error>;
