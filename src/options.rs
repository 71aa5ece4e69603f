//! Parse options shared by the detector, format parsers and converters.
//!
//! Every leniency toggle defaults to its most permissive value: feeds on the
//! public web are rarely conformant, and a strict parse is opt-in.
use serde::Deserialize;

/// Options controlling a single parse call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Maximum number of items/entries to keep. 0 = unlimited.
    ///
    /// Only the item list is truncated; feed-level metadata that appears after
    /// the limit is reached is still read.
    pub max_items: usize,

    /// Normalize date strings into timestamps while parsing.
    pub parse_dates: bool,

    /// Capture namespaced extension elements and build the iTunes / Dublin Core bundles.
    pub parse_extensions: bool,

    /// Retain the full source document on the resulting feed.
    pub keep_original_feed: bool,

    /// Leniency toggles.
    pub strictness: StrictnessOptions,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_items: 0,
            parse_dates: true,
            parse_extensions: true,
            keep_original_feed: false,
            strictness: StrictnessOptions::default(),
        }
    }
}

impl ParseOptions {
    /// Options with every leniency toggle switched off.
    pub fn strict() -> Self {
        Self {
            strictness: StrictnessOptions::strict(),
            ..Self::default()
        }
    }

    /// Returns true when `count` items have already been collected and the
    /// remaining ones must be dropped.
    pub(crate) fn item_limit_reached(&self, count: usize) -> bool {
        self.max_items > 0 && count >= self.max_items
    }
}

/// How much malformed input is tolerated before a parse is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StrictnessOptions {
    /// Remove characters that are illegal in XML before tokenizing.
    pub strip_invalid_characters: bool,

    /// Close elements left open at end of input and accept mismatched end tags.
    pub auto_close_tags: bool,

    /// Accept element prefixes that were never bound with `xmlns:`.
    pub allow_undisclosed_xml_namespaces: bool,

    /// Capture unknown un-namespaced elements instead of rejecting the document.
    pub allow_custom_xml_elements: bool,

    /// Try the non-RFC date layouts after the RFC ones fail.
    pub allow_incorrect_date_formats: bool,

    /// Accept bare `<` / `&` and raw markup inside text content.
    pub allow_unescaped_markup: bool,
}

impl Default for StrictnessOptions {
    fn default() -> Self {
        Self {
            strip_invalid_characters: true,
            auto_close_tags: true,
            allow_undisclosed_xml_namespaces: true,
            allow_custom_xml_elements: true,
            allow_incorrect_date_formats: true,
            allow_unescaped_markup: true,
        }
    }
}

impl StrictnessOptions {
    pub fn strict() -> Self {
        Self {
            strip_invalid_characters: false,
            auto_close_tags: false,
            allow_undisclosed_xml_namespaces: false,
            allow_custom_xml_elements: false,
            allow_incorrect_date_formats: false,
            allow_unescaped_markup: false,
        }
    }
}
