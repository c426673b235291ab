//! Turning feed announcements into the booking form's date format.
//!
//! Feed entries read like `"Tuesday, April 12 💉💉"`: a weekday label, a
//! `", "` separator, then the month name and day. The year is never printed,
//! so the current local year is assumed.

use std::fmt;

use chrono::{Datelike, Local, Month, NaiveDate};
use thiserror::Error;

/// A `dd/mm/yyyy` date with zero-padded day and month.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalDate(String);

impl CanonicalDate {
	pub fn from_date(date: NaiveDate) -> Self {
		Self(date.format("%d/%m/%Y").to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CanonicalDate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
	#[error("expected `<weekday>, <month> <day>` in {0:?}")]
	MissingSegments(String),
	#[error("unknown month {0:?}")]
	InvalidMonth(String),
	#[error("missing or invalid day in {0:?}")]
	InvalidDay(String),
	#[error("{month} {day} is not a date in {year}")]
	InvalidDate { year: i32, month: String, day: u32 },
}

/// Parses `text` assuming the current local year.
pub fn normalize(text: &str) -> Result<CanonicalDate, DateParseError> {
	normalize_in_year(text, Local::now().year())
}

/// Parses `text` as a date in `year`.
pub fn normalize_in_year(text: &str, year: i32) -> Result<CanonicalDate, DateParseError> {
	let mut segments = text.split(", ");
	let _weekday = segments.next();
	let month_day = segments
		.next()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.ok_or_else(|| DateParseError::MissingSegments(text.to_string()))?;

	let mut words = month_day.split_whitespace();
	let month_name = words.next().unwrap_or_default();
	let month: Month = month_name
		.parse()
		.map_err(|_| DateParseError::InvalidMonth(month_name.to_string()))?;

	let day_word = words.next().unwrap_or_default();
	let digits: String = day_word.chars().take_while(char::is_ascii_digit).collect();
	let day: u32 = digits
		.parse()
		.map_err(|_| DateParseError::InvalidDay(month_day.to_string()))?;

	NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
		.map(CanonicalDate::from_date)
		.ok_or_else(|| DateParseError::InvalidDate {
			year,
			month: month.name().to_string(),
			day,
		})
}
