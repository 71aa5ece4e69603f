//! Format-agnostic feed parsing.
//!
//! This module ties the pieces together:
//!
//! - [`detector`] - sniffs the format from the first bytes of the input
//! - [`crate::format`] - per-format parsers producing native trees
//! - [`convert`] - maps native trees onto the universal [`Feed`]
//!
//! # Example
//!
//! ```ignore
//! use unifeed::{ParseOptions, Parser};
//!
//! let parser = Parser::new();
//! let feed = parser.parse_with_options(file, &ParseOptions::default())?;
//! println!("{} ({} items)", feed.title, feed.items.len());
//! ```

pub mod convert;
pub mod detector;
pub mod model;

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;

use thiserror::Error;

use crate::format::{self, FormatError};
use crate::options::ParseOptions;
use convert::{Converter, NativeFeed, UniversalConverter};

pub use detector::detect;
pub use model::{Enclosure, Feed, FeedType, Image, Item, Person};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum FeedError {
    /// The input is not recognizably RSS, Atom or JSON Feed.
    #[error("Failed to detect feed type")]
    Detection,

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Failed to read feed: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Parser
// ============================================================================

/// Detects, parses and converts feeds of any supported format.
///
/// A `Parser` holds no per-parse state, so one value can be shared across
/// threads and reused for any number of documents.
#[derive(Clone)]
pub struct Parser {
    converter: Arc<dyn Converter>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser").finish_non_exhaustive()
    }
}

impl Parser {
    /// A parser using the built-in conversion rules.
    pub fn new() -> Self {
        Self {
            converter: Arc::new(UniversalConverter),
        }
    }

    /// A parser whose native-to-universal mapping is `converter`.
    pub fn with_converter(converter: Arc<dyn Converter>) -> Self {
        Self { converter }
    }

    pub fn parse<R: Read>(&self, reader: R) -> Result<Feed, FeedError> {
        self.parse_with_options(reader, &ParseOptions::default())
    }

    pub fn parse_str(&self, input: &str) -> Result<Feed, FeedError> {
        self.parse_bytes(input.as_bytes(), &ParseOptions::default())
    }

    pub fn parse_bytes(&self, input: &[u8], options: &ParseOptions) -> Result<Feed, FeedError> {
        self.parse_with_options(input, options)
    }

    /// Parses a feed of any supported format from `reader`.
    ///
    /// The detector consumes a bounded prefix; that prefix is replayed ahead
    /// of the rest of the stream so the format parser sees the whole input.
    pub fn parse_with_options<R: Read>(
        &self,
        mut reader: R,
        options: &ParseOptions,
    ) -> Result<Feed, FeedError> {
        let (feed_type, prefix) = detect(&mut reader)?;
        if feed_type == FeedType::Unknown {
            tracing::debug!(sniffed = prefix.len(), "No feed format recognized");
            return Err(FeedError::Detection);
        }

        let mut input = Vec::with_capacity(prefix.len());
        Cursor::new(prefix).chain(reader).read_to_end(&mut input)?;

        let native = match feed_type {
            FeedType::Atom => NativeFeed::Atom(format::atom::parse_bytes(&input, options)?),
            FeedType::Rss => NativeFeed::Rss(format::rss::parse_bytes(&input, options)?),
            FeedType::Json => NativeFeed::Json(format::json::parse_bytes(&input, options)?),
            FeedType::Unknown => return Err(FeedError::Detection),
        };

        let mut feed = self.converter.convert(&native);
        if options.keep_original_feed {
            feed.original = Some(String::from_utf8_lossy(&input).into_owned());
        }

        tracing::debug!(
            feed_type = %feed_type,
            version = %feed.feed_version,
            items = feed.items.len(),
            "Parsed feed"
        );
        Ok(feed)
    }
}

/// Parses `reader` with a default [`Parser`] and default options.
pub fn parse<R: Read>(reader: R) -> Result<Feed, FeedError> {
    Parser::new().parse(reader)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::rss::RssFeed;
    use pretty_assertions::assert_eq;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example</title>
    <item><title>One</title></item>
    <item><title>Two</title></item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_dispatches_on_detected_type() {
        let feed = parse(RSS.as_bytes()).unwrap();
        assert_eq!(feed.feed_type, FeedType::Rss);
        assert_eq!(feed.feed_version, "2.0");
        assert_eq!(feed.title, "Example");
        assert_eq!(feed.items.len(), 2);
        assert!(feed.original.is_none());

        let json = r#"{"version": "https://jsonfeed.org/version/1.1", "title": "J", "items": []}"#;
        let feed = Parser::new().parse_str(json).unwrap();
        assert_eq!(feed.feed_type, FeedType::Json);
    }

    #[test]
    fn test_unknown_input_is_detection_error() {
        let err = parse("<html></html>".as_bytes()).unwrap_err();
        assert!(matches!(err, FeedError::Detection));
        assert!(matches!(parse(&b""[..]), Err(FeedError::Detection)));
    }

    #[test]
    fn test_prefix_is_replayed_for_long_documents() {
        let mut doc = String::from("<rss version=\"2.0\"><channel><title>Long</title>");
        for i in 0..200 {
            doc.push_str(&format!("<item><title>Item {i}</title></item>"));
        }
        doc.push_str("</channel></rss>");
        assert!(doc.len() > detector::LOOKAHEAD);

        let feed = parse(doc.as_bytes()).unwrap();
        assert_eq!(feed.title, "Long");
        assert_eq!(feed.items.len(), 200);
        assert_eq!(feed.items[199].title, "Item 199");
    }

    #[test]
    fn test_keep_original_feed() {
        let options = ParseOptions {
            keep_original_feed: true,
            ..ParseOptions::default()
        };
        let feed = Parser::new().parse_bytes(RSS.as_bytes(), &options).unwrap();
        assert_eq!(feed.original.as_deref(), Some(RSS));
    }

    #[test]
    fn test_format_errors_propagate() {
        let truncated = "<rss><channel><title>x</title>";
        assert!(parse(truncated.as_bytes()).is_ok());

        let err = Parser::new()
            .parse_bytes(truncated.as_bytes(), &ParseOptions::strict())
            .unwrap_err();
        assert!(matches!(err, FeedError::Format(FormatError::UnexpectedEof(_))));
    }

    #[test]
    fn test_custom_converter() {
        struct Fixed;
        impl Converter for Fixed {
            fn convert_rss(&self, _feed: &RssFeed) -> Feed {
                Feed {
                    title: "fixed".to_string(),
                    ..Feed::default()
                }
            }
        }

        let parser = Parser::with_converter(Arc::new(Fixed));
        assert_eq!(parser.parse(RSS.as_bytes()).unwrap().title, "fixed");
    }

    #[test]
    fn test_parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
    }
}
