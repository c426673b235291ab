//! In-memory browser, page and credential fakes.
//!
//! Used to exercise the booking flow without a browser. Pages record every
//! mutating call as a [`PageAction`], serve scripted option lists and feed
//! snapshots, and timestamp feed reads with tokio's clock so tests running on
//! paused time can assert exact poll cadence.
//!
//! Selectors are present unless marked missing with [`FakePage::with_missing`];
//! waiting on a missing selector fails at once with [`Error::Timeout`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::page::{Browser, CredentialProvider, Page};
use crate::wait::WaitOptions;

/// Mutating call recorded by a [`FakePage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
	Goto(String),
	Type(String, String),
	Click(String),
	SetValue(String, String),
	Close,
}

#[derive(Debug, Default)]
struct PageState {
	actions: Vec<PageAction>,
	missing: HashSet<String>,
	unreachable: HashSet<String>,
	options: HashMap<String, VecDeque<Vec<String>>>,
	option_scans: HashMap<String, usize>,
	values: HashMap<String, String>,
	feed: VecDeque<std::result::Result<Vec<String>, String>>,
	feed_reads: Vec<Instant>,
}

/// Scriptable page handle. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
	state: Arc<Mutex<PageState>>,
}

impl FakePage {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks `selector` as never appearing.
	pub fn with_missing(self, selector: &str) -> Self {
		self.state.lock().missing.insert(selector.to_string());
		self
	}

	/// Makes navigation to `url` fail.
	pub fn with_unreachable(self, url: &str) -> Self {
		self.state.lock().unreachable.insert(url.to_string());
		self
	}

	/// Successive option lists returned for `select`; the last one repeats.
	pub fn script_options<I, V, S>(&self, select: &str, snapshots: I)
	where
		I: IntoIterator<Item = V>,
		V: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let snapshots = snapshots
			.into_iter()
			.map(|snapshot| snapshot.into_iter().map(Into::into).collect())
			.collect();
		self.state.lock().options.insert(select.to_string(), snapshots);
	}

	/// Queues the entries returned by the next feed read.
	pub fn push_feed<I, S>(&self, entries: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let entries = entries.into_iter().map(Into::into).collect();
		self.state.lock().feed.push_back(Ok(entries));
	}

	/// Queues a failing feed read.
	pub fn push_feed_failure(&self, message: &str) {
		self.state.lock().feed.push_back(Err(message.to_string()));
	}

	pub fn actions(&self) -> Vec<PageAction> {
		self.state.lock().actions.clone()
	}

	pub fn set_values(&self) -> Vec<(String, String)> {
		self.state
			.lock()
			.actions
			.iter()
			.filter_map(|action| match action {
				PageAction::SetValue(selector, value) => Some((selector.clone(), value.clone())),
				_ => None,
			})
			.collect()
	}

	pub fn value_of(&self, selector: &str) -> Option<String> {
		self.state.lock().values.get(selector).cloned()
	}

	pub fn option_scans(&self, select: &str) -> usize {
		self.state.lock().option_scans.get(select).copied().unwrap_or(0)
	}

	/// Tokio instants of every feed read.
	pub fn feed_reads(&self) -> Vec<Instant> {
		self.state.lock().feed_reads.clone()
	}

	pub fn is_closed(&self) -> bool {
		self.state.lock().actions.contains(&PageAction::Close)
	}

	fn require(&self, selector: &str) -> Result<()> {
		if self.state.lock().missing.contains(selector) {
			return Err(Error::ElementNotFound(selector.to_string()));
		}
		Ok(())
	}

	fn record(&self, action: PageAction) {
		self.state.lock().actions.push(action);
	}
}

#[async_trait]
impl Page for FakePage {
	async fn goto(&self, url: &str) -> Result<()> {
		self.record(PageAction::Goto(url.to_string()));
		if self.state.lock().unreachable.contains(url) {
			return Err(Error::Script(format!("net::ERR_NAME_NOT_RESOLVED at {url}")));
		}
		Ok(())
	}

	async fn wait_for_selector(&self, selector: &str, wait: &WaitOptions) -> Result<()> {
		if self.state.lock().missing.contains(selector) {
			return Err(Error::Timeout {
				what: selector.to_string(),
				ms: wait.timeout.map_or(0, |t| t.as_millis() as u64),
			});
		}
		Ok(())
	}

	async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
		self.require(selector)?;
		self.record(PageAction::Type(selector.to_string(), text.to_string()));
		self.state.lock().values.entry(selector.to_string()).or_default().push_str(text);
		Ok(())
	}

	async fn click(&self, selector: &str) -> Result<()> {
		self.require(selector)?;
		self.record(PageAction::Click(selector.to_string()));
		Ok(())
	}

	async fn set_value(&self, selector: &str, value: &str) -> Result<()> {
		self.require(selector)?;
		self.record(PageAction::SetValue(selector.to_string(), value.to_string()));
		self.state.lock().values.insert(selector.to_string(), value.to_string());
		Ok(())
	}

	async fn value(&self, selector: &str) -> Result<Option<String>> {
		Ok(self.value_of(selector))
	}

	async fn option_values(&self, select: &str) -> Result<Vec<String>> {
		self.require(select)?;
		let mut state = self.state.lock();
		*state.option_scans.entry(select.to_string()).or_default() += 1;
		let Some(snapshots) = state.options.get_mut(select) else {
			return Ok(Vec::new());
		};
		let current = if snapshots.len() > 1 {
			snapshots.pop_front().unwrap_or_default()
		} else {
			snapshots.front().cloned().unwrap_or_default()
		};
		Ok(current)
	}

	async fn texts(&self, container: &str, _item: &str) -> Result<Vec<String>> {
		self.require(container)?;
		let mut state = self.state.lock();
		state.feed_reads.push(Instant::now());
		match state.feed.pop_front() {
			Some(Ok(entries)) => Ok(entries),
			Some(Err(message)) => Err(Error::Script(message)),
			None => Ok(Vec::new()),
		}
	}

	async fn close(&self) -> Result<()> {
		self.record(PageAction::Close);
		Ok(())
	}
}

#[derive(Debug, Default)]
struct BrowserState {
	queued: VecDeque<FakePage>,
	opened: Vec<(Instant, FakePage)>,
}

/// Hands out queued [`FakePage`]s (fresh ones once the queue is empty).
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
	state: Arc<Mutex<BrowserState>>,
}

impl FakeBrowser {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues `page` to be returned by the next `new_page` call.
	pub fn queue_page(&self, page: FakePage) -> &Self {
		self.state.lock().queued.push_back(page);
		self
	}

	/// Pages handed out so far, in opening order.
	pub fn pages(&self) -> Vec<FakePage> {
		self.state.lock().opened.iter().map(|(_, page)| page.clone()).collect()
	}

	/// Tokio instants at which each page was opened.
	pub fn opened_at(&self) -> Vec<Instant> {
		self.state.lock().opened.iter().map(|(at, _)| *at).collect()
	}
}

#[async_trait]
impl Browser for FakeBrowser {
	async fn new_page(&self) -> Result<Box<dyn Page>> {
		let mut state = self.state.lock();
		let page = state.queued.pop_front().unwrap_or_default();
		state.opened.push((Instant::now(), page.clone()));
		Ok(Box::new(page))
	}
}

/// Answers prompts from a fixed script and remembers what was asked.
#[derive(Debug, Default)]
pub struct ScriptedCredentials {
	answers: Mutex<VecDeque<String>>,
	prompts: Mutex<Vec<String>>,
}

impl ScriptedCredentials {
	pub fn new<I, S>(answers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
			prompts: Mutex::default(),
		}
	}

	pub fn prompts(&self) -> Vec<String> {
		self.prompts.lock().clone()
	}
}

#[async_trait]
impl CredentialProvider for ScriptedCredentials {
	async fn request(&self, prompt: &str) -> Result<String> {
		self.prompts.lock().push(prompt.to_string());
		self.answers
			.lock()
			.pop_front()
			.ok_or_else(|| Error::Credentials(format!("no scripted answer for {prompt:?}")))
	}
}
