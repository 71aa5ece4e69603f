//! Generic capture of extension elements, plus the two vocabularies the
//! converters know by name.
//!
//! - [`namespace`] - canonical prefixes for well-known namespace URIs
//! - [`tree`] - the schema-less [`Extension`] tree and its parser
//! - [`itunes`], [`dublincore`] - typed views over an [`Extensions`] map

pub mod dublincore;
pub mod itunes;
pub mod namespace;
mod tree;

pub use dublincore::DublinCoreExtension;
pub use itunes::{ITunesCategory, ITunesFeedExtension, ITunesItemExtension, ITunesOwner};
pub use namespace::{canonical_prefix, well_known_prefix, DEFAULT_PREFIX};
pub use tree::{extension_list, extension_values, Extension, Extensions};

pub(crate) use tree::parse_extension;
