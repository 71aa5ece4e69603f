//! Thin token layer over `quick-xml`'s namespace-aware reader.
//!
//! The format parsers and the extension tree parser only ever see four
//! tokens: a start tag with its namespace already resolved and its attributes
//! decoded, an end tag, a run of (unescaped) text, and end of input. All of
//! the strictness toggles that concern tokenizing are applied here, so the
//! parsers above stay declarative.
use std::borrow::Cow;

use quick_xml::escape::{resolve_html5_entity, resolve_xml_entity};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use super::FormatError;
use crate::options::StrictnessOptions;
use crate::util::{escape_unescaped_markup, strip_invalid_xml_chars};

/// SEC-003: Maximum element nesting depth. Bounds the recursion of the
/// extension parser against maliciously nested documents.
pub(crate) const MAX_DEPTH: usize = 128;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// HTML elements that never have content. Feeds often embed them unescaped
/// and unclosed (`<br>`), so in lenient mode they are closed right away.
/// `link`, `meta` and `source` are left out: RSS uses those names itself.
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "param", "track", "wbr",
];

/// Namespace an element or attribute name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Namespace {
    /// No prefix and no default namespace in scope.
    None,
    /// Bound to a namespace URI.
    Uri(String),
    /// The name carries a prefix that was never declared.
    Unknown(String),
}

impl Namespace {
    fn from_resolved(resolved: ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Bound(ns) => Namespace::Uri(lossy(ns.as_ref())),
            ResolveResult::Unbound => Namespace::None,
            ResolveResult::Unknown(prefix) => Namespace::Unknown(lossy(&prefix)),
        }
    }

    pub(crate) fn uri(&self) -> Option<&str> {
        match self {
            Namespace::Uri(uri) => Some(uri),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Attribute {
    /// Name as written in the document, prefix included.
    pub qname: String,
    pub local: String,
    pub namespace: Namespace,
    pub value: String,
}

#[derive(Debug, Clone)]
pub(crate) struct StartTag {
    /// Name as written in the document, prefix included.
    pub qname: String,
    pub local: String,
    /// Prefix as written in the document.
    pub prefix: Option<String>,
    pub namespace: Namespace,
    /// Attributes in document order; namespace declarations are not included.
    pub attributes: Vec<Attribute>,
}

impl StartTag {
    /// Value of the first attribute with the given local name.
    pub(crate) fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Value of an attribute bound to a specific namespace (e.g. `xml:lang`).
    pub(crate) fn attr_ns(&self, uri: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local == local && a.namespace.uri() == Some(uri))
            .map(|a| a.value.as_str())
    }

    /// True when the element is un-namespaced or bound to one of `uris`.
    pub(crate) fn is_native(&self, uris: &[&str]) -> bool {
        match &self.namespace {
            Namespace::None => true,
            Namespace::Uri(uri) => uris.contains(&uri.as_str()),
            Namespace::Unknown(_) => false,
        }
    }

    /// An un-prefixed HTML void element such as `<br>`.
    fn is_void(&self) -> bool {
        self.prefix.is_none()
            && HTML_VOID_ELEMENTS
                .iter()
                .any(|v| self.local.eq_ignore_ascii_case(v))
    }

    fn write_open(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.qname);
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.qname);
            out.push_str("=\"");
            out.push_str(&quick_xml::escape::escape(attr.value.as_str()));
            out.push('"');
        }
        out.push('>');
    }

    fn write_close(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.qname);
        out.push('>');
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Token {
    Start(StartTag),
    End,
    Text(String),
    Eof,
}

/// Applies the byte-level strictness pre-passes to a whole document.
pub(crate) fn prepare<'a>(input: &'a [u8], strictness: &StrictnessOptions) -> Cow<'a, [u8]> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);

    let stripped = if strictness.strip_invalid_characters {
        strip_invalid_xml_chars(input)
    } else {
        Cow::Borrowed(input)
    };

    if !strictness.allow_unescaped_markup {
        return stripped;
    }

    let repaired = match escape_unescaped_markup(&stripped) {
        Cow::Owned(bytes) => Some(bytes),
        Cow::Borrowed(_) => None,
    };
    match repaired {
        Some(bytes) => {
            tracing::debug!("Escaped bare markup characters before tokenizing");
            Cow::Owned(bytes)
        }
        None => stripped,
    }
}

pub(crate) struct Tokenizer<'a> {
    reader: NsReader<&'a [u8]>,
    strictness: StrictnessOptions,
    /// Qualified names of the currently open elements, outermost first.
    open: Vec<String>,
    /// End tokens still owed for elements closed implicitly by an ancestor's
    /// end tag (or by being void).
    pending_ends: usize,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over an already prepared document (see [`prepare`]).
    pub(crate) fn new(input: &'a [u8], strictness: StrictnessOptions) -> Self {
        let mut reader = NsReader::from_reader(input);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.trim_text(false);
        config.check_end_names = !strictness.auto_close_tags;
        config.allow_unmatched_ends = strictness.auto_close_tags;

        Self {
            reader,
            strictness,
            open: Vec::new(),
            pending_ends: 0,
        }
    }

    /// Next token. With `auto_close_tags`, end tags are matched against the
    /// open elements by name: an end tag for an ancestor closes everything
    /// inside it first, and an end tag matching nothing is dropped.
    pub(crate) fn next_token(&mut self) -> Result<Token, FormatError> {
        loop {
            if self.pending_ends > 0 {
                self.pending_ends -= 1;
                self.open.pop();
                return Ok(Token::End);
            }

            let position = self.reader.buffer_position();
            let (resolved, event) = match self.reader.read_resolved_event() {
                Ok(pair) => pair,
                Err(e) => {
                    return Err(FormatError::Xml(format!("{} (near byte {})", e, position)));
                }
            };
            let namespace = Namespace::from_resolved(resolved);

            match event {
                Event::Start(e) => {
                    if self.open.len() >= MAX_DEPTH {
                        return Err(FormatError::MaxDepthExceeded(MAX_DEPTH));
                    }
                    let tag = self.start_tag(&e, namespace)?;
                    self.open.push(tag.qname.clone());
                    if self.strictness.auto_close_tags && tag.is_void() {
                        self.pending_ends = 1;
                    }
                    return Ok(Token::Start(tag));
                }
                Event::End(e) => {
                    if !self.strictness.auto_close_tags {
                        self.open.pop();
                        return Ok(Token::End);
                    }
                    let name = lossy(e.name().as_ref());
                    match self.open.iter().rposition(|open| open.eq_ignore_ascii_case(&name)) {
                        Some(index) => {
                            self.pending_ends = self.open.len() - index - 1;
                            if self.pending_ends > 0 {
                                tracing::debug!(
                                    element = %name,
                                    unclosed = self.pending_ends,
                                    "Auto-closing elements left open"
                                );
                            }
                            self.open.pop();
                            return Ok(Token::End);
                        }
                        None => {
                            tracing::debug!(element = %name, "Dropping end tag with no open element");
                        }
                    }
                }
                Event::Text(t) => {
                    let decoded = if self.strictness.allow_unescaped_markup {
                        t.unescape_with(resolve_html5_entity)
                    } else {
                        t.unescape_with(resolve_xml_entity)
                    };
                    let text = match decoded {
                        Ok(text) => text.into_owned(),
                        Err(e) if self.strictness.allow_unescaped_markup => {
                            tracing::trace!(error = %e, "Keeping undecodable text verbatim");
                            lossy(&t)
                        }
                        Err(e) => return Err(FormatError::Xml(e.to_string())),
                    };
                    return Ok(Token::Text(text));
                }
                Event::CData(c) => return Ok(Token::Text(lossy(&c))),
                Event::Eof => return Ok(Token::Eof),
                // Declarations, comments, processing instructions, doctypes.
                // Empty elements never appear: they are expanded to Start/End.
                _ => {}
            }
        }
    }

    fn start_tag(&self, e: &BytesStart<'_>, namespace: Namespace) -> Result<StartTag, FormatError> {
        let name = e.name();
        let local = lossy(name.local_name().as_ref());
        let prefix = name.prefix().map(|p| lossy(p.as_ref()));

        if let Namespace::Unknown(p) = &namespace {
            if !self.strictness.allow_undisclosed_xml_namespaces {
                return Err(FormatError::UndeclaredNamespace(p.clone()));
            }
        }

        let mut attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = match attr_result {
                Ok(attr) => attr,
                Err(err) => {
                    tracing::warn!(element = %local, error = %err, "Skipping malformed attribute");
                    continue;
                }
            };
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }

            let (resolved, attr_local) = self.reader.resolve_attribute(attr.key);
            let attr_namespace = Namespace::from_resolved(resolved);
            if let Namespace::Unknown(p) = &attr_namespace {
                if !self.strictness.allow_undisclosed_xml_namespaces {
                    return Err(FormatError::UndeclaredNamespace(p.clone()));
                }
            }

            let decoder = self.reader.decoder();
            let decoded = if self.strictness.allow_unescaped_markup {
                attr.decode_and_unescape_value_with(decoder, resolve_html5_entity)
            } else {
                attr.decode_and_unescape_value_with(decoder, resolve_xml_entity)
            };
            let value = match decoded {
                Ok(v) => v.into_owned(),
                Err(err) if self.strictness.allow_unescaped_markup => {
                    tracing::trace!(error = %err, "Keeping undecodable attribute verbatim");
                    lossy(&attr.value)
                }
                Err(err) => return Err(FormatError::Xml(err.to_string())),
            };

            attributes.push(Attribute {
                qname: lossy(attr.key.as_ref()),
                local: lossy(attr_local.as_ref()),
                namespace: attr_namespace,
                value,
            });
        }

        Ok(StartTag {
            qname: lossy(name.as_ref()),
            local,
            prefix,
            namespace,
            attributes,
        })
    }

    /// Finds the document's root element, skipping the prolog.
    pub(crate) fn root(&mut self) -> Result<StartTag, FormatError> {
        loop {
            match self.next_token()? {
                Token::Start(tag) => return Ok(tag),
                Token::Eof => return Err(FormatError::MissingRoot),
                Token::Text(_) | Token::End => {}
            }
        }
    }

    /// Handles end of input inside `element`: closes it when auto-closing is
    /// allowed, otherwise reports the truncation.
    pub(crate) fn eof_inside(&self, element: &str) -> Result<(), FormatError> {
        if self.strictness.auto_close_tags {
            tracing::debug!(element, "Auto-closing element at end of input");
            Ok(())
        } else {
            Err(FormatError::UnexpectedEof(element.to_string()))
        }
    }

    /// Reads the text content of the element whose start tag was just
    /// consumed, up to and including its end tag. Leading and trailing
    /// whitespace is removed.
    ///
    /// Nested elements are only accepted under `allow_unescaped_markup`, in
    /// which case they are re-serialized into the text.
    pub(crate) fn read_text(&mut self, element: &StartTag) -> Result<String, FormatError> {
        let mut out = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => out.push_str(&t),
                Token::Start(child) => {
                    if !self.strictness.allow_unescaped_markup {
                        return Err(FormatError::UnexpectedMarkup(element.local.clone()));
                    }
                    self.write_subtree(&child, &mut out)?;
                }
                Token::End => break,
                Token::Eof => {
                    self.eof_inside(&element.local)?;
                    break;
                }
            }
        }
        Ok(out.trim().to_string())
    }

    /// Reads the content of the element whose start tag was just consumed as
    /// serialized markup (used for `type="xhtml"` text constructs).
    pub(crate) fn read_markup(&mut self, element: &StartTag) -> Result<String, FormatError> {
        let mut out = String::new();
        self.write_children(element, &mut out)?;
        Ok(out.trim().to_string())
    }

    fn write_subtree(&mut self, tag: &StartTag, out: &mut String) -> Result<(), FormatError> {
        tag.write_open(out);
        let body_start = out.len();
        self.write_children(tag, out)?;
        if out.len() == body_start && tag.is_void() {
            out.pop();
            out.push_str("/>");
        } else {
            tag.write_close(out);
        }
        Ok(())
    }

    fn write_children(&mut self, parent: &StartTag, out: &mut String) -> Result<(), FormatError> {
        loop {
            match self.next_token()? {
                Token::Text(t) => out.push_str(&quick_xml::escape::escape(t.as_str())),
                Token::Start(child) => self.write_subtree(&child, out)?,
                Token::End => return Ok(()),
                Token::Eof => return self.eof_inside(&parent.local),
            }
        }
    }

    /// Skips the remainder of the element whose start tag was just consumed.
    pub(crate) fn skip(&mut self, element: &StartTag) -> Result<(), FormatError> {
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::Start(_) => depth += 1,
                Token::End if depth == 0 => return Ok(()),
                Token::End => depth -= 1,
                Token::Text(_) => {}
                Token::Eof => return self.eof_inside(&element.local),
            }
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
