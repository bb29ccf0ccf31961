//! Thin page objects over the UI driver
//!
//! Mechanical action surfaces only; detection and retry logic live in the
//! harness core, not here.

use std::time::Duration;

use crate::error::HarnessResult;
use crate::ui::{Scope, UiDriver};

const NAV_TIMEOUT: Duration = Duration::from_secs(10);

/// The post-login dashboard with its sidebar navigation.
pub struct DashboardPage<'a, D: UiDriver> {
    driver: &'a mut D,
}

impl<'a, D: UiDriver> DashboardPage<'a, D> {
    pub const AUTOMATION_MENU: &'static str = "[href*=\"/automation\"]";
    pub const AUTOMATION_HEADING: &'static str = "h1:has-text(\"Automation\")";
    pub const CREATE_BUTTON: &'static str = "button:has-text(\"Create\")";

    pub fn new(driver: &'a mut D) -> Self {
        Self { driver }
    }

    /// Open the automation section from the sidebar.
    pub async fn go_to_automation(&mut self) -> HarnessResult<()> {
        self.driver.click(&Scope::Page, Self::AUTOMATION_MENU).await?;
        self.driver
            .wait_visible(&Scope::Page, Self::AUTOMATION_HEADING, NAV_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Open the bot-creation form via the Create menu.
    pub async fn open_bot_create(&mut self) -> HarnessResult<()> {
        self.driver.click(&Scope::Page, Self::CREATE_BUTTON).await?;
        self.driver.click(&Scope::Page, "text=Bot").await?;
        Ok(())
    }

    /// Open the form-builder via the Create menu.
    pub async fn open_form_create(&mut self) -> HarnessResult<()> {
        self.driver.click(&Scope::Page, Self::CREATE_BUTTON).await?;
        self.driver.click(&Scope::Page, "text=Form").await?;
        Ok(())
    }
}
