//! Format parsers: wire bytes into format-native trees.
//!
//! - [`rss`] - RSS 0.9x/2.0 and RDF (RSS 1.0)
//! - [`atom`] - Atom 1.0 and 0.3
//! - [`json`] - JSON Feed 1.0/1.1
//!
//! The XML parsers share the token layer in `xml`, which applies the
//! strictness options. Unknown elements are handed to the extension tree
//! parser instead of failing the parse.

pub mod atom;
pub mod json;
pub mod rss;
pub(crate) mod xml;

use std::io::Read;

use thiserror::Error;

use crate::ext::{parse_extension, Extensions};
use crate::options::ParseOptions;
use xml::{StartTag, Tokenizer};

/// Errors that abort a format parse. No partial tree is returned.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Reading the input failed.
    #[error("Failed to read feed: {0}")]
    Io(#[from] std::io::Error),

    /// The tokenizer rejected the document.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The JSON decoder rejected the document.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An element or attribute used a prefix with no `xmlns:` binding.
    #[error("Undeclared namespace prefix: {0}")]
    UndeclaredNamespace(String),

    /// An un-namespaced element that is not part of the format.
    #[error("Unexpected element <{0}>")]
    UnexpectedElement(String),

    /// Markup nested inside a plain-text element.
    #[error("Unexpected markup inside <{0}>")]
    UnexpectedMarkup(String),

    /// Input ended inside an open element.
    #[error("Unexpected end of input inside <{0}>")]
    UnexpectedEof(String),

    /// SEC-003: Element nesting exceeds the safety limit.
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// The document contains no element at all.
    #[error("Document has no root element")]
    MissingRoot,

    /// The root element does not belong to the format being parsed.
    #[error("Unexpected root element <{0}>")]
    WrongRoot(String),
}

/// Buffers the whole input. Parsing is one-shot and in memory.
pub(crate) fn read_all<R: Read>(mut reader: R) -> Result<Vec<u8>, FormatError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    Ok(input)
}

/// Handles an element no field of the native tree claimed.
///
/// `native` is true for elements that are un-namespaced or in the format's
/// own namespace: those are custom elements, rejected unless
/// `allow_custom_xml_elements` is set. Everything else is an extension.
/// With `parse_extensions` off the element is skipped either way.
pub(crate) fn capture_element(
    tokenizer: &mut Tokenizer<'_>,
    tag: StartTag,
    native: bool,
    extensions: &mut Extensions,
    options: &ParseOptions,
) -> Result<(), FormatError> {
    if native && !options.strictness.allow_custom_xml_elements {
        return Err(FormatError::UnexpectedElement(tag.qname));
    }

    if options.parse_extensions {
        parse_extension(tokenizer, tag, extensions)
    } else {
        tokenizer.skip(&tag)
    }
}
