//! Chrome/Chromium executable discovery.

use std::path::{Path, PathBuf};

/// Returns the first Chromium-family browser found on this machine.
pub fn find_chrome_executable() -> Option<PathBuf> {
	for candidate in platform_candidates() {
		let path = Path::new(&candidate);
		if path.is_absolute() {
			if path.exists() {
				return Some(path.to_path_buf());
			}
		} else if let Ok(found) = which::which(&candidate) {
			return Some(found);
		}
	}

	None
}

fn platform_candidates() -> Vec<String> {
	if cfg!(target_os = "macos") {
		[
			"/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
			"/Applications/Chromium.app/Contents/MacOS/Chromium",
			"/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
		]
		.into_iter()
		.map(str::to_string)
		.collect()
	} else if cfg!(target_os = "windows") {
		windows_candidates()
	} else {
		[
			"google-chrome-stable",
			"google-chrome",
			"chromium-browser",
			"chromium",
			"brave-browser",
			"/usr/bin/google-chrome-stable",
			"/usr/bin/chromium-browser",
			"/usr/bin/chromium",
			"/snap/bin/chromium",
		]
		.into_iter()
		.map(str::to_string)
		.collect()
	}
}

fn windows_candidates() -> Vec<String> {
	let mut roots: Vec<PathBuf> = ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"]
		.into_iter()
		.filter_map(|key| std::env::var(key).ok())
		.map(PathBuf::from)
		.collect();
	if roots.is_empty() {
		roots.push(PathBuf::from(r"C:\Program Files"));
		roots.push(PathBuf::from(r"C:\Program Files (x86)"));
	}

	let suffixes: &[&[&str]] = &[
		&["Google", "Chrome", "Application", "chrome.exe"],
		&["Microsoft", "Edge", "Application", "msedge.exe"],
		&["Chromium", "Application", "chrome.exe"],
	];

	let mut candidates: Vec<String> = roots
		.iter()
		.flat_map(|root| {
			suffixes
				.iter()
				.map(move |suffix| suffix.iter().fold(root.clone(), |path, part| path.join(part)))
		})
		.map(|path| path.to_string_lossy().to_string())
		.collect();
	candidates.extend(["chrome.exe", "msedge.exe", "chromium.exe"].map(str::to_string));
	candidates
}
