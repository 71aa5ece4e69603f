//! Atom 1.0 and 0.3 parser.
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::xml::{prepare, StartTag, Token, Tokenizer};
use super::{capture_element, read_all, FormatError};
use crate::ext::Extensions;
use crate::options::ParseOptions;
use crate::util::parse_date_field;

const ATOM_10: &str = "http://www.w3.org/2005/Atom";
const ATOM_03: &str = "http://purl.org/atom/ns#";
const ATOM_NAMESPACES: &[&str] = &[ATOM_10, ATOM_03];
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomFeed {
    pub title: String,
    pub id: String,
    pub updated: String,
    pub updated_parsed: Option<DateTime<Utc>>,
    pub subtitle: String,
    pub links: Vec<AtomLink>,
    /// `xml:lang` of the root element.
    pub language: String,
    pub generator: Option<AtomGenerator>,
    pub icon: String,
    pub logo: String,
    pub rights: String,
    pub authors: Vec<AtomPerson>,
    pub contributors: Vec<AtomPerson>,
    pub categories: Vec<AtomCategory>,
    pub entries: Vec<AtomEntry>,
    pub extensions: Extensions,
    /// `"1.0"` or `"0.3"`.
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomEntry {
    pub title: String,
    pub id: String,
    pub updated: String,
    pub updated_parsed: Option<DateTime<Utc>>,
    pub published: String,
    pub published_parsed: Option<DateTime<Utc>>,
    pub summary: String,
    pub content: Option<AtomContent>,
    pub rights: String,
    pub authors: Vec<AtomPerson>,
    pub contributors: Vec<AtomPerson>,
    pub categories: Vec<AtomCategory>,
    pub links: Vec<AtomLink>,
    pub source: Option<AtomSource>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtomLink {
    pub href: String,
    /// Defaults to `alternate` when the attribute is missing.
    pub rel: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub hreflang: String,
    pub title: String,
    pub length: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtomPerson {
    pub name: String,
    pub email: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtomCategory {
    pub term: String,
    pub scheme: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtomGenerator {
    pub value: String,
    pub uri: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AtomContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub src: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtomSource {
    pub title: String,
    pub id: String,
    pub updated: String,
    pub updated_parsed: Option<DateTime<Utc>>,
}

/// Reads an Atom document to the end and parses it.
pub fn parse<R: Read>(reader: R, options: &ParseOptions) -> Result<AtomFeed, FormatError> {
    parse_bytes(&read_all(reader)?, options)
}

pub fn parse_bytes(input: &[u8], options: &ParseOptions) -> Result<AtomFeed, FormatError> {
    let prepared = prepare(input, &options.strictness);
    let mut tok = Tokenizer::new(&prepared, options.strictness);

    let root = tok.root()?;
    if !root.local.eq_ignore_ascii_case("feed") {
        return Err(FormatError::WrongRoot(root.qname));
    }

    let version = match root.namespace.uri() {
        Some(ATOM_03) => "0.3",
        _ if root.attr("version") == Some("0.3") => "0.3",
        _ => "1.0",
    };
    let mut feed = AtomFeed {
        version: version.to_string(),
        language: root
            .attr_ns(XML_NAMESPACE, "lang")
            .unwrap_or_default()
            .to_string(),
        ..AtomFeed::default()
    };

    let mut parser = AtomParser {
        tok,
        options,
        skipped_entries: 0,
    };
    parser.read_feed(&root, &mut feed)?;

    if parser.skipped_entries > 0 {
        tracing::debug!(
            max_items = options.max_items,
            skipped = parser.skipped_entries,
            "Item limit reached"
        );
    }
    tracing::debug!(version = %feed.version, entries = feed.entries.len(), "Parsed Atom feed");
    Ok(feed)
}

struct AtomParser<'a, 'o> {
    tok: Tokenizer<'a>,
    options: &'o ParseOptions,
    skipped_entries: usize,
}

impl AtomParser<'_, '_> {
    fn next_child(&mut self, parent: &StartTag) -> Result<Option<StartTag>, FormatError> {
        loop {
            match self.tok.next_token()? {
                Token::Start(tag) => return Ok(Some(tag)),
                Token::End => return Ok(None),
                Token::Text(_) => {}
                Token::Eof => {
                    self.tok.eof_inside(&parent.local)?;
                    return Ok(None);
                }
            }
        }
    }

    fn capture(&mut self, tag: StartTag, extensions: &mut Extensions) -> Result<(), FormatError> {
        let native = tag.is_native(ATOM_NAMESPACES);
        capture_element(&mut self.tok, tag, native, extensions, self.options)
    }

    fn date(&self, raw: &str) -> Option<DateTime<Utc>> {
        parse_date_field(raw, self.options)
    }

    /// Reads an Atom text construct. `xhtml` content keeps its markup.
    fn text_construct(&mut self, tag: &StartTag) -> Result<String, FormatError> {
        match tag.attr("type") {
            Some("xhtml") => self.tok.read_markup(tag),
            _ => self.tok.read_text(tag),
        }
    }

    fn read_feed(&mut self, root: &StartTag, feed: &mut AtomFeed) -> Result<(), FormatError> {
        while let Some(tag) = self.next_child(root)? {
            let name = native_name(&tag);
            match name.as_str() {
                "title" => feed.title = self.text_construct(&tag)?,
                "id" => feed.id = self.tok.read_text(&tag)?,
                "updated" | "modified" => {
                    feed.updated = self.tok.read_text(&tag)?;
                    feed.updated_parsed = self.date(&feed.updated);
                }
                "subtitle" | "tagline" => feed.subtitle = self.text_construct(&tag)?,
                "link" => feed.links.push(self.read_link(&tag)?),
                "generator" => feed.generator = Some(self.read_generator(&tag)?),
                "icon" => feed.icon = self.tok.read_text(&tag)?,
                "logo" => feed.logo = self.tok.read_text(&tag)?,
                "rights" | "copyright" => feed.rights = self.text_construct(&tag)?,
                "author" => feed.authors.push(self.read_person(&tag)?),
                "contributor" => feed.contributors.push(self.read_person(&tag)?),
                "category" => feed.categories.push(self.read_category(&tag)?),
                "entry" => {
                    if self.options.item_limit_reached(feed.entries.len()) {
                        self.skipped_entries += 1;
                        self.tok.skip(&tag)?;
                    } else {
                        let entry = self.read_entry(&tag)?;
                        feed.entries.push(entry);
                    }
                }
                "info" => self.tok.skip(&tag)?,
                _ => self.capture(tag, &mut feed.extensions)?,
            }
        }
        Ok(())
    }

    fn read_entry(&mut self, entry_tag: &StartTag) -> Result<AtomEntry, FormatError> {
        let mut entry = AtomEntry::default();
        while let Some(tag) = self.next_child(entry_tag)? {
            let name = native_name(&tag);
            match name.as_str() {
                "title" => entry.title = self.text_construct(&tag)?,
                "id" => entry.id = self.tok.read_text(&tag)?,
                "updated" | "modified" => {
                    entry.updated = self.tok.read_text(&tag)?;
                    entry.updated_parsed = self.date(&entry.updated);
                }
                "published" | "issued" => {
                    entry.published = self.tok.read_text(&tag)?;
                    entry.published_parsed = self.date(&entry.published);
                }
                "summary" => entry.summary = self.text_construct(&tag)?,
                "content" => entry.content = Some(self.read_content(&tag)?),
                "rights" | "copyright" => entry.rights = self.text_construct(&tag)?,
                "author" => entry.authors.push(self.read_person(&tag)?),
                "contributor" => entry.contributors.push(self.read_person(&tag)?),
                "category" => entry.categories.push(self.read_category(&tag)?),
                "link" => entry.links.push(self.read_link(&tag)?),
                "source" => entry.source = Some(self.read_source(&tag)?),
                "created" => self.tok.skip(&tag)?,
                _ => self.capture(tag, &mut entry.extensions)?,
            }
        }
        Ok(entry)
    }

    fn read_link(&mut self, tag: &StartTag) -> Result<AtomLink, FormatError> {
        let link = AtomLink {
            href: attr(tag, "href"),
            rel: tag.attr("rel").unwrap_or("alternate").to_string(),
            mime_type: attr(tag, "type"),
            hreflang: attr(tag, "hreflang"),
            title: attr(tag, "title"),
            length: attr(tag, "length"),
        };
        self.tok.skip(tag)?;
        Ok(link)
    }

    fn read_category(&mut self, tag: &StartTag) -> Result<AtomCategory, FormatError> {
        let category = AtomCategory {
            term: attr(tag, "term"),
            scheme: attr(tag, "scheme"),
            label: attr(tag, "label"),
        };
        self.tok.skip(tag)?;
        Ok(category)
    }

    fn read_generator(&mut self, tag: &StartTag) -> Result<AtomGenerator, FormatError> {
        let uri = tag.attr("uri").or_else(|| tag.attr("url")).unwrap_or_default().to_string();
        let version = attr(tag, "version");
        Ok(AtomGenerator {
            value: self.tok.read_text(tag)?,
            uri,
            version,
        })
    }

    fn read_content(&mut self, tag: &StartTag) -> Result<AtomContent, FormatError> {
        let content_type = attr(tag, "type");
        let src = attr(tag, "src");
        Ok(AtomContent {
            value: self.text_construct(tag)?,
            content_type,
            src,
        })
    }

    fn read_person(&mut self, person_tag: &StartTag) -> Result<AtomPerson, FormatError> {
        let mut person = AtomPerson::default();
        while let Some(tag) = self.next_child(person_tag)? {
            let field = match native_name(&tag).as_str() {
                "name" => &mut person.name,
                "email" => &mut person.email,
                "uri" | "url" => &mut person.uri,
                _ => {
                    self.tok.skip(&tag)?;
                    continue;
                }
            };
            *field = self.tok.read_text(&tag)?;
        }
        Ok(person)
    }

    fn read_source(&mut self, source_tag: &StartTag) -> Result<AtomSource, FormatError> {
        let mut source = AtomSource::default();
        while let Some(tag) = self.next_child(source_tag)? {
            match native_name(&tag).as_str() {
                "title" => source.title = self.text_construct(&tag)?,
                "id" => source.id = self.tok.read_text(&tag)?,
                "updated" => {
                    source.updated = self.tok.read_text(&tag)?;
                    source.updated_parsed = self.date(&source.updated);
                }
                _ => self.tok.skip(&tag)?,
            }
        }
        Ok(source)
    }
}

fn native_name(tag: &StartTag) -> String {
    if tag.is_native(ATOM_NAMESPACES) {
        tag.local.clone()
    } else {
        String::new()
    }
}

fn attr(tag: &StartTag, name: &str) -> String {
    tag.attr(name).unwrap_or_default().to_string()
}
