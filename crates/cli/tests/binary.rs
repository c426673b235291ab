use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

fn slotwatch_binary() -> PathBuf {
	let mut path = std::env::current_exe().expect("current_exe should resolve");
	path.pop();
	path.pop();
	path.push("slotwatch");
	path
}

fn run(args: &[&str]) -> Output {
	Command::new(slotwatch_binary())
		.args(args)
		.env_remove("RUST_LOG")
		.output()
		.expect("failed to run slotwatch")
}

#[test]
fn parse_date_prints_canonical_date() {
	let output = run(&["parse-date", "Tuesday, April 12 💉💉", "--year", "2022"]);

	assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
	assert_eq!(String::from_utf8_lossy(&output.stdout), "12/04/2022\n");
}

#[test]
fn parse_date_rejects_unreadable_text() {
	let output = run(&["parse-date", "Smarch 13 💉💉"]);

	assert_eq!(output.status.code(), Some(1));
	assert!(output.stdout.is_empty());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("run failed"), "stderr: {stderr}");
}

#[test]
fn config_prints_file_with_overrides() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	write!(file, r#"{{ "timing": {{ "pollIntervalMs": 1500 }}, "browser": {{ "headless": false }} }}"#).unwrap();

	let path = file.path().to_str().unwrap();
	let output = run(&["--config", path, "--port", "9555", "--rearm", "config"]);

	assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
	let config: serde_json::Value = serde_json::from_slice(&output.stdout).expect("config should be JSON");
	assert_eq!(config["timing"]["pollIntervalMs"], 1500);
	assert_eq!(config["timing"]["optionPollMs"], 200);
	assert_eq!(config["browser"]["port"], 9555);
	assert_eq!(config["browser"]["headless"], false);
	assert_eq!(config["rearmOnFailure"], true);
	assert_eq!(config["feed"]["url"], "https://covidqueue.com/");
}

#[test]
fn invalid_config_fails_before_launching_anything() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	write!(file, r#"{{ "feed": {{ "url": "covidqueue" }} }}"#).unwrap();

	let output = run(&["--config", file.path().to_str().unwrap(), "watch"]);

	assert_eq!(output.status.code(), Some(1));
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("feed.url"), "stderr: {stderr}");
}
