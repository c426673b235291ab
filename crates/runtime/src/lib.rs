//! Chrome lifecycle and DevTools transport for slotwatch.
//!
//! Everything here speaks to a real browser process: finding and launching
//! Chrome with remote debugging enabled, the `/json/*` HTTP discovery
//! endpoint, and the per-target WebSocket [`Connection`] that correlates
//! command responses by id.

mod browser_finder;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod launcher;
pub mod process;

pub use browser_finder::find_chrome_executable;
pub use connection::Connection;
pub use endpoint::DevToolsEndpoint;
pub use error::{Error, Result};
pub use launcher::{ChromeProcess, LaunchOptions, launch_chrome};
pub use process::port_available;
