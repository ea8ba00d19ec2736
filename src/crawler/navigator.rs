//! Frame-context state machine
//!
//! The navigator drives the browser session through the fixed frame
//! hierarchy of the map application:
//!
//! ```text
//! ROOT -> SEARCH_LIST -> (ROOT) -> DETAIL -> DETAIL_SUBLIST
//! ```
//!
//! Every path back to the next entry or query goes through the
//! unconditional [`Navigator::reset`] transition, so the frame stack can
//! never leak across iterations. The navigator holds at most one frame of
//! nesting beyond the top-level document.

use crate::browser::{BrowserError, BrowserSession};
use crate::crawler::pacer::Pacer;
use crate::record::ResultEntry;
use crate::site::SiteProfile;

/// The addressable sub-document the session is currently positioned in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameContext {
    /// Top-level document
    Root,
    /// Result-list frame for the active query
    SearchList,
    /// One record's detail frame
    Detail,
    /// Detail frame after the sub-list view was activated
    DetailSublist,
}

/// Outcome of drilling into a result entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailAccess {
    /// The detail frame is attached and current
    Open,
    /// The re-acquired list showed a different entry at the target
    /// position; nothing was clicked
    Mismatch { expected: String, found: String },
}

/// Drives one browser session through the frame hierarchy
pub struct Navigator<B> {
    session: B,
    context: FrameContext,
}

impl<B: BrowserSession> Navigator<B> {
    pub fn new(session: B) -> Self {
        Self {
            session,
            context: FrameContext::Root,
        }
    }

    /// Current frame context
    pub fn context(&self) -> FrameContext {
        self.context
    }

    /// Direct session access for extraction in the current context
    pub fn session_mut(&mut self) -> &mut B {
        &mut self.session
    }

    /// Unconditional recovery transition: any state back to `ROOT`
    ///
    /// The context is reset before the session call so a failed switch can
    /// simply be retried from `Root`.
    pub fn reset(&mut self) -> Result<(), BrowserError> {
        self.context = FrameContext::Root;
        self.session.switch_to_default()
    }

    /// Issues the query navigation and attaches the result-list frame
    ///
    /// `ROOT -> SEARCH_LIST`. On a frame-attach timeout the query yields
    /// no entries and the error is reported to the caller.
    pub async fn open_search(
        &mut self,
        profile: &SiteProfile,
        pacer: &Pacer,
        search_url: &str,
    ) -> Result<(), BrowserError> {
        self.reset()?;
        self.session.navigate(search_url)?;
        pacer.settle().await;

        self.session
            .switch_to_frame(&profile.search_frame, pacer.frame_timeout())?;
        pacer.settle().await;

        self.context = FrameContext::SearchList;
        Ok(())
    }

    /// Enumerates the visible result entries, up to `max_entries`
    ///
    /// Requires `SEARCH_LIST`. Entries without a readable name are skipped;
    /// `position` always refers to the on-page index so later re-acquisition
    /// targets the same slot.
    pub fn list_entries(
        &mut self,
        profile: &SiteProfile,
        max_entries: usize,
    ) -> Result<Vec<ResultEntry>, BrowserError> {
        debug_assert_eq!(self.context, FrameContext::SearchList);

        let handles = self.session.find_elements(&profile.result_item)?;
        let mut entries = Vec::new();

        for (position, handle) in handles.iter().take(max_entries).enumerate() {
            let name = match self.session.read_text(handle, Some(profile.result_name)) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    tracing::debug!(position, error = %e, "result entry name unreadable");
                    continue;
                }
            };
            if name.is_empty() {
                continue;
            }

            let category = self
                .session
                .read_text(handle, Some(profile.result_category))
                .map(|text| text.trim().to_string())
                .unwrap_or_default();

            entries.push(ResultEntry {
                position,
                name,
                category,
            });
        }

        Ok(entries)
    }

    /// Re-acquires the result list and drills into one entry's detail view
    ///
    /// `SEARCH_LIST -> ROOT -> DETAIL`. The result list is not stable
    /// across frame contexts, so the query navigation is re-issued and the
    /// entry re-selected by position; the name at that position is checked
    /// against the enumerated name first, and a mismatch aborts the drill
    /// without clicking. The detail frame is attached with the primary
    /// locator, then the fallback; if both fail the entry is failed and
    /// the caller returns to `ROOT`.
    pub async fn open_detail(
        &mut self,
        profile: &SiteProfile,
        pacer: &Pacer,
        search_url: &str,
        entry: &ResultEntry,
    ) -> Result<DetailAccess, BrowserError> {
        self.reset()?;
        self.session.navigate(search_url)?;
        pacer.settle().await;

        self.session
            .switch_to_frame(&profile.search_frame, pacer.frame_timeout())?;
        self.context = FrameContext::SearchList;

        let handles = self.session.find_elements(&profile.result_item)?;
        let handle = match handles.get(entry.position) {
            Some(handle) => handle.clone(),
            None => {
                return Ok(DetailAccess::Mismatch {
                    expected: entry.name.clone(),
                    found: String::new(),
                });
            }
        };

        let found = self
            .session
            .read_text(&handle, Some(profile.result_name))
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        if found != entry.name {
            return Ok(DetailAccess::Mismatch {
                expected: entry.name.clone(),
                found,
            });
        }

        self.session.click(&handle)?;
        self.session.switch_to_default()?;
        self.context = FrameContext::Root;

        let timeout = pacer.frame_timeout();
        if let Err(primary) = self.session.switch_to_frame(&profile.detail_frame, timeout) {
            if primary.is_fatal() {
                return Err(primary);
            }
            tracing::debug!(error = %primary, "primary detail frame locator failed, trying fallback");
            self.session
                .switch_to_frame(&profile.detail_frame_fallback, timeout)?;
        }
        pacer.settle().await;

        self.context = FrameContext::Detail;
        Ok(DetailAccess::Open)
    }

    /// Attempts to activate the sub-list view
    ///
    /// `DETAIL -> DETAIL_SUBLIST`. Each configured activator is tried in
    /// order; the first that clicks without raising wins. When none
    /// succeeds the navigator stays in `DETAIL` and the record proceeds
    /// without sub-items; that is not a failure.
    pub async fn activate_sublist(&mut self, profile: &SiteProfile, pacer: &Pacer) -> bool {
        debug_assert_eq!(self.context, FrameContext::Detail);

        for activator in &profile.sublist_activators {
            let handle = match self.session.find_elements(activator) {
                Ok(handles) => match handles.into_iter().next() {
                    Some(handle) => handle,
                    None => continue,
                },
                Err(e) => {
                    tracing::trace!(activator = %activator, error = %e, "activator lookup failed");
                    continue;
                }
            };

            match self.session.click(&handle) {
                Ok(()) => {
                    pacer.settle().await;
                    self.context = FrameContext::DetailSublist;
                    return true;
                }
                Err(e) => {
                    tracing::trace!(activator = %activator, error = %e, "activator click failed");
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{ElementHandle, FrameLocator, Locator};
    use crate::config::DelayConfig;
    use std::time::Duration;

    /// Minimal scripted session: three result entries, a configurable
    /// detail frame, and one working activator.
    struct StubSession {
        names: Vec<&'static str>,
        primary_detail_attaches: bool,
        activator_available: bool,
        clicks: Vec<String>,
        resets: usize,
    }

    impl StubSession {
        fn new() -> Self {
            Self {
                names: vec!["Cafe A", "Cafe B", "Cafe C"],
                primary_detail_attaches: true,
                activator_available: true,
                clicks: Vec::new(),
                resets: 0,
            }
        }
    }

    impl BrowserSession for StubSession {
        fn navigate(&mut self, _url: &str) -> Result<(), BrowserError> {
            Ok(())
        }

        fn switch_to_frame(
            &mut self,
            frame: &FrameLocator,
            timeout: Duration,
        ) -> Result<(), BrowserError> {
            if matches!(frame, FrameLocator::Id(id) if id == "entryIframe")
                && !self.primary_detail_attaches
            {
                return Err(BrowserError::FrameTimeout {
                    locator: frame.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Ok(())
        }

        fn switch_to_default(&mut self) -> Result<(), BrowserError> {
            self.resets += 1;
            Ok(())
        }

        fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementHandle>, BrowserError> {
            let count = match locator {
                Locator::Css(sel) if sel.starts_with("li.") => self.names.len(),
                Locator::XPath(_) if self.activator_available => 1,
                _ => 0,
            };
            Ok((0..count)
                .map(|index| ElementHandle {
                    locator: locator.clone(),
                    index,
                })
                .collect())
        }

        fn click(&mut self, element: &ElementHandle) -> Result<(), BrowserError> {
            self.clicks.push(element.locator.to_string());
            Ok(())
        }

        fn read_text(
            &mut self,
            element: &ElementHandle,
            child: Option<&str>,
        ) -> Result<String, BrowserError> {
            match child {
                Some(sel) if sel.contains("TYaxT") => Ok(self
                    .names
                    .get(element.index)
                    .copied()
                    .unwrap_or_default()
                    .to_string()),
                _ => Ok(String::new()),
            }
        }

        fn read_page_markup(&mut self) -> Result<String, BrowserError> {
            Ok(String::new())
        }

        fn evaluate_script(
            &mut self,
            _script: &str,
        ) -> Result<Option<serde_json::Value>, BrowserError> {
            Ok(None)
        }
    }

    fn pacer() -> Pacer {
        Pacer::new(DelayConfig {
            step_ms: 100,
            record_ms: 1,
            query_ms: 1,
            frame_timeout_ms: 1000,
            settle_ms: 1,
        })
    }

    fn entry(position: usize, name: &str) -> ResultEntry {
        ResultEntry {
            position,
            name: name.to_string(),
            category: String::new(),
        }
    }

    #[tokio::test]
    async fn test_open_search_reaches_search_list() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut nav = Navigator::new(StubSession::new());

        nav.open_search(&profile, &pacer(), "https://example.com/search/q")
            .await
            .unwrap();
        assert_eq!(nav.context(), FrameContext::SearchList);
    }

    #[tokio::test]
    async fn test_list_entries_reads_names() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut nav = Navigator::new(StubSession::new());
        nav.open_search(&profile, &pacer(), "https://example.com/search/q")
            .await
            .unwrap();

        let entries = nav.list_entries(&profile, 10).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].name, "Cafe B");
        assert_eq!(entries[1].position, 1);
    }

    #[tokio::test]
    async fn test_list_entries_respects_cap() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut nav = Navigator::new(StubSession::new());
        nav.open_search(&profile, &pacer(), "https://example.com/search/q")
            .await
            .unwrap();

        let entries = nav.list_entries(&profile, 2).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_open_detail_matches_name() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut nav = Navigator::new(StubSession::new());

        let access = nav
            .open_detail(
                &profile,
                &pacer(),
                "https://example.com/search/q",
                &entry(1, "Cafe B"),
            )
            .await
            .unwrap();
        assert_eq!(access, DetailAccess::Open);
        assert_eq!(nav.context(), FrameContext::Detail);
    }

    #[tokio::test]
    async fn test_open_detail_detects_mismatch_without_click() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut nav = Navigator::new(StubSession::new());

        let access = nav
            .open_detail(
                &profile,
                &pacer(),
                "https://example.com/search/q",
                &entry(1, "Cafe Z"),
            )
            .await
            .unwrap();
        assert_eq!(
            access,
            DetailAccess::Mismatch {
                expected: "Cafe Z".to_string(),
                found: "Cafe B".to_string()
            }
        );
        assert!(nav.session_mut().clicks.is_empty());
    }

    #[tokio::test]
    async fn test_open_detail_position_gone() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut nav = Navigator::new(StubSession::new());

        let access = nav
            .open_detail(
                &profile,
                &pacer(),
                "https://example.com/search/q",
                &entry(7, "Cafe X"),
            )
            .await
            .unwrap();
        assert!(matches!(access, DetailAccess::Mismatch { .. }));
    }

    #[tokio::test]
    async fn test_open_detail_uses_fallback_frame() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut session = StubSession::new();
        session.primary_detail_attaches = false;
        let mut nav = Navigator::new(session);

        let access = nav
            .open_detail(
                &profile,
                &pacer(),
                "https://example.com/search/q",
                &entry(0, "Cafe A"),
            )
            .await
            .unwrap();
        assert_eq!(access, DetailAccess::Open);
    }

    #[tokio::test]
    async fn test_activate_sublist_success() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut nav = Navigator::new(StubSession::new());
        nav.open_detail(
            &profile,
            &pacer(),
            "https://example.com/search/q",
            &entry(0, "Cafe A"),
        )
        .await
        .unwrap();

        assert!(nav.activate_sublist(&profile, &pacer()).await);
        assert_eq!(nav.context(), FrameContext::DetailSublist);
    }

    #[tokio::test]
    async fn test_activate_sublist_stays_in_detail_when_absent() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut session = StubSession::new();
        session.activator_available = false;
        let mut nav = Navigator::new(session);
        nav.open_detail(
            &profile,
            &pacer(),
            "https://example.com/search/q",
            &entry(0, "Cafe A"),
        )
        .await
        .unwrap();

        assert!(!nav.activate_sublist(&profile, &pacer()).await);
        assert_eq!(nav.context(), FrameContext::Detail);
    }

    #[tokio::test]
    async fn test_reset_returns_to_root() {
        let profile = SiteProfile::naver_map().unwrap();
        let mut nav = Navigator::new(StubSession::new());
        nav.open_search(&profile, &pacer(), "https://example.com/search/q")
            .await
            .unwrap();

        nav.reset().unwrap();
        assert_eq!(nav.context(), FrameContext::Root);
        assert!(nav.session_mut().resets >= 1);
    }
}
