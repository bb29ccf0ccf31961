//! UI driver seam between the harness and the browser backend

use std::time::Duration;

use async_trait::async_trait;

use crate::error::HarnessResult;

/// Where an element lookup happens: the top-level page, or inside one
/// embedded frame identified by its iframe selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Page,
    Frame(String),
}

impl Scope {
    pub fn frame(selector: impl Into<String>) -> Self {
        Scope::Frame(selector.into())
    }
}

/// Thin action surface over a live browser session.
///
/// Operations execute strictly in call order, one at a time. Every wait is
/// bounded; `wait_visible` reports absence as `false` rather than an error,
/// since a missing element is a branching signal during topology detection.
#[async_trait]
pub trait UiDriver {
    /// Navigate to a URL (absolute, or relative to the driver's base URL).
    async fn goto(&mut self, url: &str) -> HarnessResult<()>;

    /// The page's current URL.
    async fn current_url(&mut self) -> HarnessResult<String>;

    /// Wait up to `timeout` for the element to become visible.
    async fn wait_visible(
        &mut self,
        scope: &Scope,
        selector: &str,
        timeout: Duration,
    ) -> HarnessResult<bool>;

    /// Replace the element's value with `value`.
    async fn fill(&mut self, scope: &Scope, selector: &str, value: &str) -> HarnessResult<()>;

    /// Click the element.
    async fn click(&mut self, scope: &Scope, selector: &str) -> HarnessResult<()>;

    /// Text content of the element, or None when it is absent.
    async fn text_content(
        &mut self,
        scope: &Scope,
        selector: &str,
    ) -> HarnessResult<Option<String>>;
}
