use std::time::Duration;

use slotwatch::{CdpBrowser, PollOutcome, SlotPoller, WaitOptions};
use slotwatch_runtime::{ChromeProcess, launch_chrome};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, BrowserConfig};
use crate::error::{CliError, Result};
use crate::prompt::StdinPrompt;

/// Time a run gets to wind down after Ctrl-C before it is abandoned.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub async fn execute(config: AppConfig) -> Result<()> {
	let (browser, chrome) = open_browser(&config.browser, config.site.timing.element_wait()).await?;

	let cancel = CancellationToken::new();
	let interrupt = tokio::spawn({
		let cancel = cancel.clone();
		async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				info!(target = "slotwatch", "interrupt received; stopping");
				cancel.cancel();
			}
		}
	});

	let poller = SlotPoller::new(&browser, &config.site).with_cancellation(cancel.clone());
	let mut status = poller.status();
	let observer = tokio::spawn(async move {
		while status.changed().await.is_ok() {
			let current = status.borrow_and_update().clone();
			debug!(target = "slotwatch", status = ?current, "poll status changed");
		}
	});

	let run = poller.run(&StdinPrompt);
	tokio::pin!(run);
	let result = tokio::select! {
		result = &mut run => result.map_err(CliError::from),
		_ = cancel.cancelled() => match tokio::time::timeout(SHUTDOWN_GRACE, &mut run).await {
			Ok(result) => result.map_err(CliError::from),
			Err(_) => Err(CliError::Interrupted),
		},
	};

	interrupt.abort();
	observer.abort();
	if let Some(chrome) = chrome {
		if let Err(e) = chrome.shutdown() {
			warn!(target = "slotwatch", error = %e, "failed to stop browser");
		}
	}

	report(&result?);
	Ok(())
}

/// Attaches when an endpoint is configured, otherwise launches a browser owned by this run.
async fn open_browser(config: &BrowserConfig, load_wait: WaitOptions) -> Result<(CdpBrowser, Option<ChromeProcess>)> {
	if let Some(base) = &config.attach {
		let browser = CdpBrowser::attach(base).await?.with_load_wait(load_wait);
		return Ok((browser, None));
	}

	let chrome = launch_chrome(&config.launch_options()).await?;
	let browser = CdpBrowser::new(chrome.endpoint().clone()).with_load_wait(load_wait);
	Ok((browser, Some(chrome)))
}

fn report(outcome: &PollOutcome) {
	match outcome {
		PollOutcome::Booked { date, outcome, cycles } if outcome.is_submitted() => {
			info!(target = "slotwatch", %date, cycles, "booking succeeded");
			println!("Requested appointment on {date}: {outcome}");
		}
		PollOutcome::Booked { date, outcome, cycles } => {
			warn!(target = "slotwatch", %date, cycles, "booking attempt did not go through");
			println!("Attempted appointment on {date}: {outcome}");
		}
		PollOutcome::Cancelled { cycles } => {
			info!(target = "slotwatch", cycles, "stopped before a slot was booked");
		}
	}
}
