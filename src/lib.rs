//! Lenient parsing of RSS, Atom and JSON Feed documents into one model.
//!
//! ```ignore
//! let feed = unifeed::parse(std::fs::File::open("feed.xml")?)?;
//! for item in &feed.items {
//!     println!("{} {}", item.published, item.title);
//! }
//! ```
//!
//! The native trees ([`format::rss::RssFeed`], [`format::atom::AtomFeed`],
//! [`format::json::JsonFeed`]) are public too, for callers that need
//! format-specific fields the universal [`Feed`] does not carry.

pub mod config;
pub mod ext;
pub mod feed;
pub mod format;
pub mod options;
pub mod util;

pub use ext::{Extension, Extensions};
pub use feed::convert::{Converter, NativeFeed, UniversalConverter};
pub use feed::{detect, parse, Enclosure, Feed, FeedError, FeedType, Image, Item, Parser, Person};
pub use format::FormatError;
pub use options::{ParseOptions, StrictnessOptions};
