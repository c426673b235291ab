use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Core(#[from] slotwatch::Error),

	#[error(transparent)]
	Runtime(#[from] slotwatch_runtime::Error),

	#[error(transparent)]
	Date(#[from] slotwatch::DateParseError),

	#[error("Failed to read config {path}: {source}")]
	ConfigRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid config {path}: {source}")]
	ConfigParse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error("Interrupted before the run could stop cleanly")]
	Interrupted,
}

pub type Result<T> = std::result::Result<T, CliError>;
