//! Bounded waits and the cancellable poll delay.
//!
//! Every wait in the crate takes a [`WaitOptions`]. A `None` timeout waits
//! forever and has to be asked for explicitly; the defaults are bounded.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Timeout and polling cadence for one kind of wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
	pub timeout: Option<Duration>,
	pub poll_interval: Duration,
}

impl WaitOptions {
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
	pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

	pub fn bounded(timeout: Duration) -> Self {
		Self {
			timeout: Some(timeout),
			..Self::default()
		}
	}

	pub fn unbounded() -> Self {
		Self {
			timeout: None,
			..Self::default()
		}
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}
}

impl Default for WaitOptions {
	fn default() -> Self {
		Self {
			timeout: Some(Self::DEFAULT_TIMEOUT),
			poll_interval: Self::DEFAULT_POLL_INTERVAL,
		}
	}
}

/// Awaits `fut`, failing with [`Error::Timeout`] once `opts.timeout` elapses.
pub async fn within<T, F>(opts: &WaitOptions, what: &str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match opts.timeout {
		Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| Error::Timeout {
			what: what.to_string(),
			ms: timeout.as_millis() as u64,
		})?,
		None => fut.await,
	}
}

/// Calls `probe` every poll interval until it yields a value.
///
/// Errors from `probe` end the wait immediately.
pub async fn poll_until<T, F, Fut>(opts: &WaitOptions, what: &str, mut probe: F) -> Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<Option<T>>>,
{
	within(opts, what, async {
		loop {
			if let Some(value) = probe().await? {
				return Ok(value);
			}
			tokio::time::sleep(opts.poll_interval).await;
		}
	})
	.await
}

/// Fixed delay between poll cycles that returns early on shutdown.
#[derive(Debug, Clone)]
pub struct PollDelay {
	interval: Duration,
	cancel: CancellationToken,
}

impl PollDelay {
	pub fn new(interval: Duration, cancel: CancellationToken) -> Self {
		Self { interval, cancel }
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Sleeps one interval. Returns `false` if cancelled before or during the sleep.
	pub async fn wait(&self) -> bool {
		tokio::select! {
			biased;
			_ = self.cancel.cancelled() => false,
			_ = tokio::time::sleep(self.interval) => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use tokio::time::Instant;

	use super::*;

	#[tokio::test(start_paused = true)]
	async fn within_times_out_bounded_waits() {
		let opts = WaitOptions::bounded(Duration::from_millis(500));
		let err = within(&opts, "#never", std::future::pending::<Result<()>>()).await.unwrap_err();
		match err {
			Error::Timeout { what, ms } => {
				assert_eq!(what, "#never");
				assert_eq!(ms, 500);
			}
			other => panic!("expected timeout, got {other}"),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn unbounded_wait_outlasts_default_timeout() {
		let opts = WaitOptions::unbounded();
		let start = Instant::now();
		let value = within(&opts, "slow", async {
			tokio::time::sleep(Duration::from_secs(600)).await;
			Ok(7)
		})
		.await
		.unwrap();
		assert_eq!(value, 7);
		assert!(start.elapsed() >= Duration::from_secs(600));
	}

	#[tokio::test(start_paused = true)]
	async fn poll_until_sleeps_between_probes() {
		let opts = WaitOptions::bounded(Duration::from_secs(5)).with_poll_interval(Duration::from_millis(200));
		let calls = AtomicUsize::new(0);
		let start = Instant::now();

		let value = poll_until(&opts, "third probe", || {
			let n = calls.fetch_add(1, Ordering::SeqCst);
			async move { Ok((n == 2).then_some(n)) }
		})
		.await
		.unwrap();

		assert_eq!(value, 2);
		assert_eq!(start.elapsed(), Duration::from_millis(400));
	}

	#[tokio::test(start_paused = true)]
	async fn poll_delay_sleeps_full_interval() {
		let delay = PollDelay::new(Duration::from_millis(1000), CancellationToken::new());
		let start = Instant::now();
		assert!(delay.wait().await);
		assert_eq!(start.elapsed(), Duration::from_millis(1000));
	}

	#[tokio::test(start_paused = true)]
	async fn poll_delay_returns_early_when_cancelled() {
		let token = CancellationToken::new();
		let delay = PollDelay::new(Duration::from_secs(60), token.clone());
		let start = Instant::now();

		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(50)).await;
			token.cancel();
		});

		assert!(!delay.wait().await);
		assert!(start.elapsed() < Duration::from_secs(60));
		assert!(delay.is_cancelled());
	}
}
