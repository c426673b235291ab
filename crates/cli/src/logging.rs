use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v` flags.
pub fn init_logging(verbose: u8) {
	let default = match verbose {
		0 => "warn,slotwatch=info",
		1 => "info",
		_ => "info,slotwatch=debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

	tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_ansi(std::io::stderr().is_terminal())
				.with_target(false)
				.compact(),
		)
		.init();
}
