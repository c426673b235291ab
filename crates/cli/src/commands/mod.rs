mod parse_date;
mod show_config;
mod watch;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	match cli.command.clone().unwrap_or(Commands::Watch) {
		Commands::Watch => watch::execute(load_config(&cli)?).await,
		Commands::ParseDate { text, year } => parse_date::execute(&text, year),
		Commands::Config => show_config::execute(&load_config(&cli)?),
	}
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
	let mut config = AppConfig::load(cli.config.as_deref())?;
	config.apply(cli);
	Ok(config)
}
