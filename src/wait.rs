//! Polling wait engine over a UI surface.
//!
//! Every interactive action is "wait for the applicable readiness condition,
//! then act", which removes the race between page rendering and interaction.
//! Polling is the only retry this layer performs, and timeout is the only
//! error it produces on its own.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::{
    surface::{Locator, UiElement, UiSurface},
    HarnessError, Result, WaitOptions,
};

/// Polls an async producer until it yields a value or the deadline expires.
///
/// The condition is evaluated at least once, so a zero timeout still succeeds
/// when the condition already holds and otherwise fails without blocking.
/// The deadline is computed once from a monotonic clock and never extended.
pub async fn poll_until<F, Fut, T>(
    mut condition: F,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();
    let deadline = started + timeout;
    loop {
        if let Some(value) = condition().await {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(HarnessError::Timeout {
                waited_ms: started.elapsed().as_millis() as u64,
            });
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Wait engine bound to one UI surface.
///
/// Page-level abstractions hold a `Wait` by composition and express their
/// interactions through it.
pub struct Wait<S> {
    surface: S,
    options: WaitOptions,
}

impl<S: UiSurface> Wait<S> {
    /// Wraps a surface with default [`WaitOptions`].
    pub fn new(surface: S) -> Self {
        Self::with_options(surface, WaitOptions::default())
    }

    /// Wraps a surface with explicit options.
    pub fn with_options(surface: S, options: WaitOptions) -> Self {
        Self { surface, options }
    }

    /// The underlying surface, for direct single-probe access.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.options.timeout_ms)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.options.poll_interval_ms)
    }

    /// Waits for an element matching `locator` to exist, using the default
    /// timeout.
    pub async fn until_present(&self, locator: &Locator) -> Result<S::Element> {
        self.until_present_within(locator, self.default_timeout())
            .await
    }

    /// Waits for an element matching `locator` to exist within `timeout`.
    pub async fn until_present_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<S::Element> {
        self.poll_element(locator, timeout, false).await
    }

    /// Waits for an element to exist, be visible and accept interaction,
    /// using the default timeout.
    pub async fn until_clickable(&self, locator: &Locator) -> Result<S::Element> {
        self.until_clickable_within(locator, self.default_timeout())
            .await
    }

    /// Waits for an element to exist, be visible and accept interaction
    /// within `timeout`.
    pub async fn until_clickable_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<S::Element> {
        self.poll_element(locator, timeout, true).await
    }

    /// Polls for presence but converts timeout into `false` instead of an
    /// error. Never fails; resolves within `timeout` plus one poll interval.
    pub async fn is_present(&self, locator: &Locator, timeout: Duration) -> bool {
        self.until_present_within(locator, timeout).await.is_ok()
    }

    /// Polls an arbitrary async producer until it yields a value, raising
    /// [`HarnessError::Timeout`] when the deadline passes first.
    pub async fn for_result<F, Fut, T>(&self, condition: F, timeout: Duration) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        poll_until(condition, timeout, self.poll_interval()).await
    }

    /// Waits for the element to become clickable, then clicks it.
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        self.until_clickable(locator).await?.click().await
    }

    /// Waits for the element, clears it, then types `text` into it.
    pub async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.until_present(locator).await?;
        element.clear().await?;
        element.type_text(text).await
    }

    /// Waits for the element, then returns its visible text.
    pub async fn read_text(&self, locator: &Locator) -> Result<String> {
        self.until_present(locator).await?.text().await
    }

    async fn poll_element(
        &self,
        locator: &Locator,
        timeout: Duration,
        interactable: bool,
    ) -> Result<S::Element> {
        let started = Instant::now();
        let deadline = started + timeout;
        loop {
            if let Some(element) = self.probe(locator, interactable).await {
                tracing::debug!(
                    locator = %locator,
                    waited_ms = started.elapsed().as_millis() as u64,
                    "element ready"
                );
                return Ok(element);
            }
            let now = Instant::now();
            if now >= deadline {
                let waited_ms = started.elapsed().as_millis() as u64;
                tracing::debug!(locator = %locator, waited_ms, "element never became ready");
                return Err(HarnessError::NotFound {
                    locator: locator.to_string(),
                    waited_ms,
                });
            }
            tracing::trace!(locator = %locator, "element not ready, polling");
            sleep(self.poll_interval().min(deadline - now)).await;
        }
    }

    /// One readiness probe. Any surface failure counts as "not ready yet";
    /// the deadline decides when to stop tolerating it.
    async fn probe(&self, locator: &Locator, interactable: bool) -> Option<S::Element> {
        let element = self.surface.find(locator).await.ok()?;
        if interactable {
            let displayed = element.is_displayed().await.ok()?;
            let enabled = element.is_enabled().await.ok()?;
            if !displayed || !enabled {
                return None;
            }
        }
        Some(element)
    }
}
