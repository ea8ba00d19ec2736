//! Browser capability surface
//!
//! The engine never talks to a browser implementation directly: the
//! [`BrowserSession`] trait is the whole dependency. It exposes the small
//! set of operations the navigator and extractor need: navigation, frame
//! switching with a bounded timeout, element lookup/interaction, raw
//! markup, and script evaluation. `chrome.rs` implements it over a
//! headless Chrome tab; tests implement it with a scripted in-memory
//! session.

pub mod chrome;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use chrome::ChromeSession;

/// Browser capability errors
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser session: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Frame {locator} not attachable within {timeout_ms}ms")]
    FrameTimeout { locator: String, timeout_ms: u64 },

    #[error("No element matched {selector}")]
    ElementMissing { selector: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Browser session is no longer usable: {0}")]
    SessionLost(String),
}

impl BrowserError {
    /// Whether this error means the whole session is gone
    ///
    /// Session-level failures are fatal for a run; everything else is
    /// recovered at the record or query boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BrowserError::SessionLost(_))
    }
}

/// An element locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// A frame locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameLocator {
    /// Frame element id
    Id(String),
    /// CSS selector matching the frame element
    Css(String),
}

impl FrameLocator {
    pub fn id(value: impl Into<String>) -> Self {
        FrameLocator::Id(value.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        FrameLocator::Css(selector.into())
    }

    /// CSS selector form of this locator
    pub fn as_css(&self) -> String {
        match self {
            FrameLocator::Id(id) => format!("iframe#{}", id),
            FrameLocator::Css(selector) => selector.clone(),
        }
    }
}

impl fmt::Display for FrameLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameLocator::Id(s) => write!(f, "frame#{}", s),
            FrameLocator::Css(s) => write!(f, "frame:{}", s),
        }
    }
}

/// Opaque handle to an element found in the current frame context
///
/// Handles are positional: they stay valid only while the session remains
/// in the frame context that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub locator: Locator,
    pub index: usize,
}

/// The browser automation capability consumed by the engine
///
/// All methods are blocking with bounded internal waits; the engine is
/// strictly sequential, so no method is ever called concurrently.
pub trait BrowserSession {
    /// Navigates the top-level document to `url`
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Switches into a frame, waiting up to `timeout` for it to attach
    fn switch_to_frame(
        &mut self,
        frame: &FrameLocator,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// Returns to the top-level document
    fn switch_to_default(&mut self) -> Result<(), BrowserError>;

    /// Finds all elements matching `locator` in the current frame context
    fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, BrowserError>;

    /// Clicks a previously found element
    fn click(&mut self, element: &ElementHandle) -> Result<(), BrowserError>;

    /// Reads the visible text of an element, or of a child selected by a
    /// CSS selector relative to it
    ///
    /// A missing child yields an empty string, not an error.
    fn read_text(
        &mut self,
        element: &ElementHandle,
        child: Option<&str>,
    ) -> Result<String, BrowserError>;

    /// Returns the raw markup of the current frame context
    fn read_page_markup(&mut self) -> Result<String, BrowserError>;

    /// Evaluates a script and returns its JSON-converted result, if any
    fn evaluate_script(
        &mut self,
        script: &str,
    ) -> Result<Option<serde_json::Value>, BrowserError>;
}
