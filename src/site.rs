//! Site profile: everything the engine knows about the target markup
//!
//! The profile bundles frame locators, element selectors, the structured
//! state script, and the raw-markup key patterns into one value that is
//! passed explicitly into the navigator and extractor. Nothing in here is
//! process-global, so tests can construct variant profiles freely.

use crate::browser::{FrameLocator, Locator};
use crate::Result;
use regex::Regex;
use url::Url;

/// Prioritized DOM selectors for one record field
///
/// Tried in order; the first selector yielding non-empty text wins. An
/// empty list means the field has no DOM fallback.
pub type FieldSelectors = Vec<&'static str>;

/// Compiled key-pattern matchers for the raw-markup extraction strategy
///
/// These match the serialized objects the page embeds in its markup; each
/// is tolerant of the key being absent.
#[derive(Debug)]
pub struct MarkupPatterns {
    pub name: Regex,
    pub category: Regex,
    pub address: Regex,
    pub latitude: Regex,
    pub longitude: Regex,
    pub phone: Regex,
    pub description: Regex,
}

impl MarkupPatterns {
    fn compile() -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            name: Regex::new(r#""businessDisplayName":"([^"]+)""#)?,
            category: Regex::new(r#""placeCategoryName":"([^"]+)""#)?,
            address: Regex::new(r#""roadAddr":"([^"]+)""#)?,
            latitude: Regex::new(r#""posLat":([0-9.]+)"#)?,
            longitude: Regex::new(r#""posLong":([0-9.]+)"#)?,
            phone: Regex::new(r#""reprPhone":"([^"]+)""#)?,
            description: Regex::new(r#""desc":"([^"]*(?:\\.[^"]*)*)""#)?,
        })
    }
}

/// Everything the navigator and extractor need to address one site
#[derive(Debug)]
pub struct SiteProfile {
    /// Frame holding the result list for the active query
    pub search_frame: FrameLocator,
    /// Primary locator for the detail frame
    pub detail_frame: FrameLocator,
    /// Fallback locator tried when the primary detail frame never attaches
    pub detail_frame_fallback: FrameLocator,

    /// One result entry in the list
    pub result_item: Locator,
    /// Entry name, relative to a result item
    pub result_name: &'static str,
    /// Entry category, relative to a result item
    pub result_category: &'static str,

    /// Candidate activators for the sub-list view, tried in order
    pub sublist_activators: Vec<Locator>,

    /// One sub-item row in the sub-list view
    pub sub_item: Locator,
    /// Sub-item name, relative to a row
    pub sub_item_name: &'static str,
    /// Sub-item price, relative to a row
    pub sub_item_price: &'static str,
    /// Sub-item description, relative to a row
    pub sub_item_description: &'static str,

    /// Script returning the page's structured state object
    pub state_script: &'static str,

    /// Raw-markup key patterns
    pub markup: MarkupPatterns,

    /// DOM selector lists per record field (extraction strategy 3)
    pub detail_name: FieldSelectors,
    pub detail_category: FieldSelectors,
    pub detail_address: FieldSelectors,
    pub detail_phone: FieldSelectors,
    pub detail_description: FieldSelectors,
}

impl SiteProfile {
    /// The profile for the Naver Map place views
    pub fn naver_map() -> Result<Self> {
        Ok(Self {
            search_frame: FrameLocator::id("searchIframe"),
            detail_frame: FrameLocator::id("entryIframe"),
            detail_frame_fallback: FrameLocator::css("iframe[title=\"Naver Place Entry\"]"),

            result_item: Locator::css("li.UEzoS"),
            result_name: "span.TYaxT",
            result_category: "span.KCMnt",

            sublist_activators: vec![
                Locator::xpath("//span[contains(text(), '메뉴')]/.."),
                Locator::css("a[href*='menu']"),
            ],

            sub_item: Locator::css("li[class*='MenuContent__order_list_item']"),
            sub_item_name: "div[class*='MenuContent__tit']",
            sub_item_price: "div[class*='MenuContent__price']",
            sub_item_description: "span.detail_txt",

            state_script: "window.__APOLLO_STATE__",

            markup: MarkupPatterns::compile()?,

            detail_name: vec!["span.GHAhO", "div.zD5Nm span.Fc1rA"],
            detail_category: vec!["span.lnJFt"],
            detail_address: vec!["span.LDgIH"],
            detail_phone: vec!["span.xlx7Q"],
            detail_description: vec!["div.XtBbS", "span.zPfVt"],
        })
    }

    /// Builds the search URL for a query
    ///
    /// The query is appended as an encoded path segment of the base URL.
    pub fn search_url(&self, base_url: &str, query: &str) -> Result<String> {
        let mut url = Url::parse(base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(query);
        Ok(url.into())
    }
}
