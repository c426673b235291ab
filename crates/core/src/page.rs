//! Collaborator interfaces the orchestration code drives.
//!
//! The booking flow never talks to a browser or a terminal directly. It goes
//! through these traits so the CDP driver ([`crate::cdp`]), the stdin prompt
//! in the CLI, and the in-memory fakes ([`crate::fake`]) are interchangeable.

use async_trait::async_trait;

use crate::error::Result;
use crate::wait::WaitOptions;

/// One independent page (tab) of the shared browser.
#[async_trait]
pub trait Page: Send + Sync {
	/// Navigates and waits for the document to finish loading.
	async fn goto(&self, url: &str) -> Result<()>;

	/// Blocks until an element matching `selector` exists.
	async fn wait_for_selector(&self, selector: &str, wait: &WaitOptions) -> Result<()>;

	/// Focuses the element and types `text` into it.
	async fn type_text(&self, selector: &str, text: &str) -> Result<()>;

	async fn click(&self, selector: &str) -> Result<()>;

	/// Assigns `value` to the element and dispatches a `change` event.
	async fn set_value(&self, selector: &str, value: &str) -> Result<()>;

	/// Current `value` of the element, `None` when it does not exist.
	async fn value(&self, selector: &str) -> Result<Option<String>>;

	/// Values of the `<option>` children of `select`, in document order.
	async fn option_values(&self, select: &str) -> Result<Vec<String>>;

	/// Text content of every `item` inside the first `container`, in document order.
	///
	/// Fails with [`crate::Error::ElementNotFound`] when the container is missing.
	async fn texts(&self, container: &str, item: &str) -> Result<Vec<String>>;

	async fn close(&self) -> Result<()>;
}

/// Factory for pages sharing one browsing context (cookies included).
#[async_trait]
pub trait Browser: Send + Sync {
	async fn new_page(&self) -> Result<Box<dyn Page>>;
}

/// Source of interactive answers such as the phone number and one-time code.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
	async fn request(&self, prompt: &str) -> Result<String>;
}
