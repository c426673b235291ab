use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "slotwatch")]
#[command(about = "Watch an availability feed and book the first open slot")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Config file (defaults to <config dir>/slotwatch/config.json when present)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Remote debugging port for a launched browser
	#[arg(long, global = true)]
	pub port: Option<u16>,

	/// Attach to a running browser instead of launching one, e.g. http://127.0.0.1:9222
	#[arg(long, global = true, value_name = "URL")]
	pub attach: Option<String>,

	/// Show the launched browser window
	#[arg(long, global = true)]
	pub headed: bool,

	/// Keep polling after a failed booking attempt
	#[arg(long, global = true)]
	pub rearm: bool,

	#[command(subcommand)]
	pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
	/// Log in, poll the feed and book the first open slot (default)
	Watch,

	/// Print the booking date for one feed entry
	ParseDate {
		/// Entry text, e.g. "Tuesday, April 12 💉💉"
		text: String,
		/// Year to assume instead of the current one
		#[arg(long)]
		year: Option<i32>,
	},

	/// Print the effective configuration as JSON
	Config,
}
