//! Two-factor login to the booking portal.

use tracing::info;

use crate::config::PortalConfig;
use crate::error::{AuthStep, Error, Result};
use crate::page::{Browser, CredentialProvider, Page};
use crate::wait::WaitOptions;

pub const PHONE_PROMPT: &str = "Input Phone: ";
pub const OTP_PROMPT: &str = "Input OTP: ";

/// Authenticated portal page.
///
/// Pages opened later on the same browser share its cookies, so the session
/// only has to stay open for booking pages to be logged in.
pub struct Session {
	page: Box<dyn Page>,
}

impl Session {
	pub async fn close(self) -> Result<()> {
		self.page.close().await
	}
}

/// Drives phone number → one-time code → registration confirmation.
pub struct PortalAuthenticator<'a> {
	portal: &'a PortalConfig,
	wait: WaitOptions,
}

impl<'a> PortalAuthenticator<'a> {
	pub fn new(portal: &'a PortalConfig, wait: WaitOptions) -> Self {
		Self { portal, wait }
	}

	/// Runs the login flow once. Any failure is returned as
	/// [`Error::Authentication`] tagged with the step that failed.
	pub async fn authenticate(&self, browser: &dyn Browser, credentials: &dyn CredentialProvider) -> Result<Session> {
		let phone = credentials
			.request(PHONE_PROMPT)
			.await
			.map_err(Error::authentication(AuthStep::Phone))?;

		let page = browser.new_page().await.map_err(Error::authentication(AuthStep::Landing))?;
		info!(target = "slotwatch", url = %self.portal.landing_url, "opening portal");
		page.goto(&self.portal.landing_url)
			.await
			.map_err(Error::authentication(AuthStep::Landing))?;

		self.fill_and_submit(page.as_ref(), &self.portal.phone_input, &phone, &self.portal.login_button)
			.await
			.map_err(Error::authentication(AuthStep::Phone))?;

		let code = credentials
			.request(OTP_PROMPT)
			.await
			.map_err(Error::authentication(AuthStep::OneTimeCode))?;
		self.fill_and_submit(page.as_ref(), &self.portal.otp_input, &code, &self.portal.otp_submit)
			.await
			.map_err(Error::authentication(AuthStep::OneTimeCode))?;

		self.click_when_ready(page.as_ref(), &self.portal.confirm_registration)
			.await
			.map_err(Error::authentication(AuthStep::Confirmation))?;

		info!(target = "slotwatch", "portal authenticated");
		Ok(Session { page })
	}

	async fn fill_and_submit(&self, page: &dyn Page, input: &str, text: &str, submit: &str) -> Result<()> {
		page.wait_for_selector(input, &self.wait).await?;
		page.type_text(input, text).await?;
		self.click_when_ready(page, submit).await
	}

	async fn click_when_ready(&self, page: &dyn Page, selector: &str) -> Result<()> {
		page.wait_for_selector(selector, &self.wait).await?;
		page.click(selector).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fake::{FakeBrowser, FakePage, PageAction, ScriptedCredentials};

	#[tokio::test]
	async fn runs_login_steps_in_order() {
		let portal = PortalConfig::default();
		let browser = FakeBrowser::new();
		let credentials = ScriptedCredentials::new(["0400000000", "123456"]);

		let session = PortalAuthenticator::new(&portal, WaitOptions::default())
			.authenticate(&browser, &credentials)
			.await
			.unwrap();

		assert_eq!(credentials.prompts(), vec![PHONE_PROMPT, OTP_PROMPT]);
		let page = &browser.pages()[0];
		assert_eq!(
			page.actions(),
			vec![
				PageAction::Goto(portal.landing_url.clone()),
				PageAction::Type("#mobile-number".into(), "0400000000".into()),
				PageAction::Click("#login-mobile".into()),
				PageAction::Type("#otp-password".into(), "123456".into()),
				PageAction::Click("#otp-submit".into()),
				PageAction::Click(".btn.btn-sm.btn-primary.text-white".into()),
			]
		);
		session.close().await.unwrap();
		assert!(page.is_closed());
	}

	#[tokio::test]
	async fn missing_otp_field_fails_at_that_step() {
		let portal = PortalConfig::default();
		let browser = FakeBrowser::new();
		browser.queue_page(FakePage::new().with_missing("#otp-password"));
		let credentials = ScriptedCredentials::new(["0400000000", "123456"]);

		let err = PortalAuthenticator::new(&portal, WaitOptions::default())
			.authenticate(&browser, &credentials)
			.await
			.err()
			.unwrap();

		match err {
			Error::Authentication { step, source } => {
				assert_eq!(step, AuthStep::OneTimeCode);
				assert!(matches!(*source, Error::Timeout { .. }));
			}
			other => panic!("expected authentication error, got {other}"),
		}
		assert!(!browser.pages()[0].actions().contains(&PageAction::Click("#otp-submit".into())));
	}

	#[tokio::test]
	async fn unreachable_portal_fails_before_phone_entry() {
		let portal = PortalConfig::default();
		let browser = FakeBrowser::new();
		browser.queue_page(FakePage::new().with_unreachable(&portal.landing_url));
		let credentials = ScriptedCredentials::new(["0400000000"]);

		let err = PortalAuthenticator::new(&portal, WaitOptions::default())
			.authenticate(&browser, &credentials)
			.await
			.err()
			.unwrap();

		assert!(matches!(err, Error::Authentication { step: AuthStep::Landing, .. }));
		assert_eq!(browser.pages()[0].actions(), vec![PageAction::Goto(portal.landing_url.clone())]);
	}

	#[tokio::test]
	async fn missing_credentials_abort_login() {
		let portal = PortalConfig::default();
		let browser = FakeBrowser::new();
		let credentials = ScriptedCredentials::new(Vec::<String>::new());

		let err = PortalAuthenticator::new(&portal, WaitOptions::default())
			.authenticate(&browser, &credentials)
			.await
			.err()
			.unwrap();

		assert!(matches!(err, Error::Authentication { step: AuthStep::Phone, .. }));
		assert!(browser.pages().is_empty());
	}
}
