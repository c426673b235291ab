//! Interactive credential entry on the terminal.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use slotwatch::{CredentialProvider, Error};

/// Asks on stdout and reads one line from stdin per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

#[async_trait]
impl CredentialProvider for StdinPrompt {
	async fn request(&self, prompt: &str) -> slotwatch::Result<String> {
		let prompt = prompt.to_string();
		let answer = tokio::task::spawn_blocking(move || read_answer(&prompt, &mut io::stdin().lock(), &mut io::stdout()))
			.await
			.map_err(|e| Error::Credentials(e.to_string()))?;
		answer.map_err(|e| Error::Credentials(e.to_string()))
	}
}

/// Writes `prompt`, then returns the next line trimmed. Closed or blank input is an error.
fn read_answer(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<String> {
	write!(output, "{prompt}")?;
	output.flush()?;

	let mut line = String::new();
	if input.read_line(&mut line)? == 0 {
		return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed before an answer was given"));
	}
	let answer = line.trim();
	if answer.is_empty() {
		return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty answer"));
	}
	Ok(answer.to_string())
}
