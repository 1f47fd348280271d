//! The UI collaborator boundary.
//!
//! The wait engine never talks to a browser directly; it polls through these
//! traits. A production session binds them to a real automation backend,
//! tests bind them to a scripted fake.

use std::fmt;

use crate::Result;

/// Element lookup strategy plus selector.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Locator {
    /// CSS selector.
    Css(String),
    /// XPath expression.
    XPath(String),
}

impl Locator {
    /// CSS selector locator.
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// XPath locator.
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Locator for the site's `data-test-id` attribute convention.
    pub fn test_id(id: impl AsRef<str>) -> Self {
        Self::Css(format!("[data-test-id='{}']", id.as_ref()))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "css {selector}"),
            Self::XPath(expression) => write!(f, "xpath {expression}"),
        }
    }
}

/// A UI surface that can resolve locators to elements.
///
/// `find` is a single probe: it either resolves an element currently in the
/// surface or fails immediately with [`HarnessError::NotFound`]. Polling and
/// deadlines live in the wait engine above.
///
/// [`HarnessError::NotFound`]: crate::HarnessError::NotFound
#[async_trait::async_trait]
pub trait UiSurface {
    /// Element handle type produced by this surface.
    type Element: UiElement;

    /// Resolves the first element matching `locator`, without waiting.
    async fn find(&self, locator: &Locator) -> Result<Self::Element>;

    /// Resolves every element matching `locator`; an empty match is `Ok`.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>>;
}

/// A resolved element handle.
#[async_trait::async_trait]
pub trait UiElement {
    /// Visible text content.
    async fn text(&self) -> Result<String>;

    /// Attribute value, `None` when the attribute is absent.
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Whether the element is rendered and visible.
    async fn is_displayed(&self) -> Result<bool>;

    /// Whether the element accepts interaction.
    async fn is_enabled(&self) -> Result<bool>;

    /// Clicks the element.
    async fn click(&self) -> Result<()>;

    /// Clears any existing input value.
    async fn clear(&self) -> Result<()>;

    /// Types text into the element.
    async fn type_text(&self, text: &str) -> Result<()>;
}
