//! Headless Chrome adapter for the [`BrowserSession`] capability
//!
//! Frame switching is implemented by resolving the frame element's own
//! document URL and navigating the tab into it: map-style applications
//! render their panels as standalone documents, so the frame's content is
//! fully addressable once the tab is inside it. Element interaction and
//! text reads go through script evaluation, which keeps the adapter free
//! of element-handle lifetimes.

use crate::browser::{BrowserError, BrowserSession, ElementHandle, FrameLocator, Locator};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;

/// A [`BrowserSession`] backed by one headless Chrome tab
///
/// The browser process is owned by this value and shut down when it is
/// dropped, on every exit path.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
    root_url: Option<String>,
    in_frame: bool,
}

impl ChromeSession {
    /// Launches a headless browser and opens a fresh tab
    pub fn launch() -> Result<Self, BrowserError> {
        let browser = Browser::new(LaunchOptions {
            headless: true,
            ..Default::default()
        })
        .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Self {
            _browser: browser,
            tab,
            root_url: None,
            in_frame: false,
        })
    }

    fn goto(&self, url: &str) -> Result<(), BrowserError> {
        // A transport failure on navigate means the tab's connection is
        // gone; a failure while settling is a page-level problem.
        self.tab
            .navigate_to(url)
            .map_err(|e| BrowserError::SessionLost(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn eval(&self, script: &str) -> Result<Option<serde_json::Value>, BrowserError> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::Script(e.to_string()))?;
        Ok(result.value)
    }
}

impl BrowserSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.goto(url)?;
        self.root_url = Some(url.to_string());
        self.in_frame = false;
        Ok(())
    }

    fn switch_to_frame(
        &mut self,
        frame: &FrameLocator,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let css = frame.as_css();
        let timeout_ms = timeout.as_millis() as u64;

        self.tab
            .wait_for_element_with_custom_timeout(&css, timeout)
            .map_err(|_| BrowserError::FrameTimeout {
                locator: frame.to_string(),
                timeout_ms,
            })?;

        let src = self
            .eval(&format!(
                "(() => {{ const f = document.querySelector({}); return f ? f.src : \"\"; }})()",
                js_quote(&css)
            ))?
            .and_then(|v| v.as_str().map(str::to_owned))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BrowserError::FrameTimeout {
                locator: frame.to_string(),
                timeout_ms,
            })?;

        self.goto(&src)?;
        self.in_frame = true;
        Ok(())
    }

    fn switch_to_default(&mut self) -> Result<(), BrowserError> {
        if !self.in_frame {
            return Ok(());
        }
        let root = self
            .root_url
            .clone()
            .ok_or_else(|| BrowserError::SessionLost("no top-level document".to_string()))?;
        self.goto(&root)?;
        self.in_frame = false;
        Ok(())
    }

    fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, BrowserError> {
        let script = match locator {
            Locator::Css(selector) => {
                format!("document.querySelectorAll({}).length", js_quote(selector))
            }
            Locator::XPath(expression) => format!(
                "document.evaluate({}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
                js_quote(expression)
            ),
        };

        let count = self
            .eval(&script)?
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize;

        Ok((0..count)
            .map(|index| ElementHandle {
                locator: locator.clone(),
                index,
            })
            .collect())
    }

    fn click(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; el.click(); return true; }})()",
            locator_js(&element.locator, element.index)
        );

        match self.eval(&script)? {
            Some(serde_json::Value::Bool(true)) => Ok(()),
            _ => Err(BrowserError::ElementMissing {
                selector: element.locator.to_string(),
            }),
        }
    }

    fn read_text(
        &mut self,
        element: &ElementHandle,
        child: Option<&str>,
    ) -> Result<String, BrowserError> {
        let base = locator_js(&element.locator, element.index);
        let script = match child {
            Some(selector) => format!(
                "(() => {{ const el = {}; if (!el) return \"\"; \
                 const c = el.querySelector({}); return c ? c.innerText : \"\"; }})()",
                base,
                js_quote(selector)
            ),
            None => format!(
                "(() => {{ const el = {}; return el ? el.innerText : \"\"; }})()",
                base
            ),
        };

        Ok(self
            .eval(&script)?
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default())
    }

    fn read_page_markup(&mut self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    fn evaluate_script(
        &mut self,
        script: &str,
    ) -> Result<Option<serde_json::Value>, BrowserError> {
        self.eval(script)
    }
}

/// Quotes a string as a JavaScript string literal
fn js_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// JavaScript expression resolving an element by locator and index
fn locator_js(locator: &Locator, index: usize) -> String {
    match locator {
        Locator::Css(selector) => format!(
            "document.querySelectorAll({})[{}]",
            js_quote(selector),
            index
        ),
        Locator::XPath(expression) => format!(
            "document.evaluate({}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotItem({})",
            js_quote(expression),
            index
        ),
    }
}
