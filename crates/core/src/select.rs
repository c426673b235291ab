//! Committing the first real option of an asynchronously populated `<select>`.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::PLACEHOLDER_OPTION;
use crate::error::Result;
use crate::page::Page;
use crate::wait::{WaitOptions, poll_until};

/// Picks time slots on one booking page.
///
/// A control is committed at most once: later calls for the same selector
/// return the remembered value without touching the page.
#[derive(Debug)]
pub struct OptionSelector {
	wait: WaitOptions,
	placeholder: String,
	committed: HashMap<String, String>,
}

impl OptionSelector {
	pub fn new(wait: WaitOptions) -> Self {
		Self {
			wait,
			placeholder: PLACEHOLDER_OPTION.to_string(),
			committed: HashMap::new(),
		}
	}

	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = placeholder.into();
		self
	}

	/// Value previously committed for `selector`, if any.
	pub fn committed(&self, selector: &str) -> Option<&str> {
		self.committed.get(selector).map(String::as_str)
	}

	/// Waits until `selector` offers a non-placeholder option, then selects
	/// the first one in document order and fires `change`.
	pub async fn select_first(&mut self, page: &dyn Page, selector: &str) -> Result<String> {
		if let Some(value) = self.committed.get(selector) {
			debug!(target = "slotwatch", %selector, %value, "already committed");
			return Ok(value.clone());
		}

		let options = format!("{selector} option");
		tokio::time::sleep(self.wait.poll_interval).await;
		page.wait_for_selector(&options, &self.wait).await?;
		info!(target = "slotwatch", %selector, "options ready");

		let placeholder = self.placeholder.as_str();
		let value = poll_until(&self.wait, &options, || async move {
			let values = page.option_values(selector).await?;
			Ok(values.into_iter().find(|v| v != placeholder))
		})
		.await?;

		info!(target = "slotwatch", %selector, %value, "changing selection");
		page.set_value(selector, &value).await?;
		self.committed.insert(selector.to_string(), value.clone());
		Ok(value)
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use crate::fake::{FakePage, PageAction};

	const SELECT: &str = "select#dose1-appointment-time";

	fn selector() -> OptionSelector {
		OptionSelector::new(WaitOptions::unbounded().with_poll_interval(Duration::from_millis(200)))
	}

	#[tokio::test(start_paused = true)]
	async fn waits_for_real_option_before_committing() {
		let page = FakePage::new();
		page.script_options(SELECT, [vec!["NULL"], vec!["NULL"], vec!["NULL"], vec!["NULL", "1000"]]);

		let value = selector().select_first(&page, SELECT).await.unwrap();

		assert_eq!(value, "1000");
		assert_eq!(page.option_scans(SELECT), 4);
		assert_eq!(page.set_values(), vec![(SELECT.to_string(), "1000".to_string())]);
	}

	#[tokio::test(start_paused = true)]
	async fn nothing_is_committed_while_only_placeholder_exists() {
		let page = FakePage::new();
		page.script_options(SELECT, [vec!["NULL"]]);
		let mut selector = OptionSelector::new(WaitOptions::bounded(Duration::from_secs(2)).with_poll_interval(Duration::from_millis(200)));

		let err = selector.select_first(&page, SELECT).await.unwrap_err();

		assert!(matches!(err, crate::Error::Timeout { .. }));
		assert!(page.set_values().is_empty());
		assert_eq!(selector.committed(SELECT), None);
	}

	#[tokio::test(start_paused = true)]
	async fn first_in_document_order_wins() {
		let page = FakePage::new();
		page.script_options(SELECT, [vec!["NULL", "1430", "0900", "1000"]]);

		let value = selector().select_first(&page, SELECT).await.unwrap();

		assert_eq!(value, "1430");
	}

	#[tokio::test(start_paused = true)]
	async fn second_call_is_a_no_op() {
		let page = FakePage::new();
		page.script_options(SELECT, [vec!["NULL", "1000"], vec!["NULL", "1100"]]);
		let mut selector = selector();

		let first = selector.select_first(&page, SELECT).await.unwrap();
		let second = selector.select_first(&page, SELECT).await.unwrap();

		assert_eq!(first, "1000");
		assert_eq!(second, "1000");
		assert_eq!(page.value_of(SELECT).as_deref(), Some("1000"));
		assert_eq!(page.option_scans(SELECT), 1);
		assert_eq!(page.set_values().len(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn custom_placeholder_is_skipped() {
		let page = FakePage::new();
		page.script_options(SELECT, [vec!["", "0830"]]);

		let value = selector().with_placeholder("").select_first(&page, SELECT).await.unwrap();

		assert_eq!(value, "0830");
		assert!(page.actions().contains(&PageAction::SetValue(SELECT.into(), "0830".into())));
	}
}
