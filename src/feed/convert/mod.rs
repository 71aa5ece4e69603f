//! Mapping from format-native trees to the universal [`Feed`].
//!
//! Each field follows a fixed precedence chain per format (native field
//! first, then Dublin Core / iTunes fallbacks for RSS). Conversion never
//! fails: missing data leaves the field empty.
//!
//! The mapping is pluggable through [`Converter`]. Its per-format methods
//! default to the built-in rules, so a custom converter overrides only the
//! formats it cares about:
//!
//! ```ignore
//! struct TitleCase;
//!
//! impl Converter for TitleCase {
//!     fn convert_rss(&self, feed: &RssFeed) -> Feed {
//!         let mut out = convert::rss::convert(feed);
//!         out.title = out.title.to_uppercase();
//!         out
//!     }
//! }
//! ```

pub mod atom;
pub mod json;
pub mod rss;

use super::model::{Feed, FeedType};
use crate::format::atom::AtomFeed;
use crate::format::json::JsonFeed;
use crate::format::rss::RssFeed;

/// A parsed document in its native shape, tagged by format.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeFeed {
    Atom(AtomFeed),
    Rss(RssFeed),
    Json(JsonFeed),
}

impl NativeFeed {
    pub fn feed_type(&self) -> FeedType {
        match self {
            NativeFeed::Atom(_) => FeedType::Atom,
            NativeFeed::Rss(_) => FeedType::Rss,
            NativeFeed::Json(_) => FeedType::Json,
        }
    }
}

/// Strategy turning a native tree into the universal model.
pub trait Converter: Send + Sync {
    fn convert(&self, native: &NativeFeed) -> Feed {
        match native {
            NativeFeed::Atom(feed) => self.convert_atom(feed),
            NativeFeed::Rss(feed) => self.convert_rss(feed),
            NativeFeed::Json(feed) => self.convert_json(feed),
        }
    }

    fn convert_atom(&self, feed: &AtomFeed) -> Feed {
        atom::convert(feed)
    }

    fn convert_rss(&self, feed: &RssFeed) -> Feed {
        rss::convert(feed)
    }

    fn convert_json(&self, feed: &JsonFeed) -> Feed {
        json::convert(feed)
    }
}

/// The built-in mapping rules. Stateless, so one value serves every parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalConverter;

impl Converter for UniversalConverter {}

/// `primary` unless empty, else `fallback`.
fn or_else(primary: &str, fallback: Option<&str>) -> String {
    if primary.is_empty() {
        fallback.unwrap_or_default().to_string()
    } else {
        primary.to_string()
    }
}
