use slotwatch::{normalize, normalize_in_year};

use crate::error::Result;

pub fn execute(text: &str, year: Option<i32>) -> Result<()> {
	let date = match year {
		Some(year) => normalize_in_year(text, year)?,
		None => normalize(text)?,
	};
	println!("{date}");
	Ok(())
}
