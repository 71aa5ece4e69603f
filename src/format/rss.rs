//! RSS 0.9x / 2.0 and RDF (RSS 1.0) parser.
//!
//! RSS 2.0 nests items inside `<channel>`; RDF places `<item>`, `<image>` and
//! `<textinput>` next to it under `<rdf:RDF>`. Both layouts are accepted for
//! either root.
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::xml::{prepare, StartTag, Tokenizer};
use super::{capture_element, read_all, FormatError};
use crate::ext::dublincore::first;
use crate::ext::{DublinCoreExtension, Extensions, ITunesFeedExtension, ITunesItemExtension};
use crate::options::ParseOptions;
use crate::util::parse_date_field;

/// Namespaces RSS itself lives in (RSS 2.0 has none at all).
const RSS_NAMESPACES: &[&str] = &[
    "http://purl.org/rss/1.0/",
    "http://my.netscape.com/rdf/simple/0.9/",
    "http://channel.netscape.com/rdf/simple/0.9/",
];

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssFeed {
    pub title: String,
    pub link: String,
    /// Every `<link>` text, in document order.
    pub links: Vec<String>,
    pub description: String,
    pub language: String,
    pub copyright: String,
    pub managing_editor: String,
    pub web_master: String,
    pub pub_date: String,
    pub pub_date_parsed: Option<DateTime<Utc>>,
    pub last_build_date: String,
    pub last_build_date_parsed: Option<DateTime<Utc>>,
    pub categories: Vec<RssCategory>,
    pub generator: String,
    pub docs: String,
    pub ttl: String,
    pub image: Option<RssImage>,
    pub rating: String,
    pub skip_hours: Vec<String>,
    pub skip_days: Vec<String>,
    pub cloud: Option<RssCloud>,
    pub text_input: Option<RssTextInput>,
    pub itunes_ext: Option<ITunesFeedExtension>,
    pub dublin_core_ext: Option<DublinCoreExtension>,
    /// First `dc:date`, normalized under the same options as native dates.
    pub dublin_core_date_parsed: Option<DateTime<Utc>>,
    pub extensions: Extensions,
    pub items: Vec<RssItem>,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub links: Vec<String>,
    pub description: String,
    /// `<content:encoded>`.
    pub content: String,
    pub author: String,
    pub categories: Vec<RssCategory>,
    pub comments: String,
    pub enclosures: Vec<RssEnclosure>,
    pub guid: Option<RssGuid>,
    pub pub_date: String,
    pub pub_date_parsed: Option<DateTime<Utc>>,
    pub source: Option<RssSource>,
    pub itunes_ext: Option<ITunesItemExtension>,
    pub dublin_core_ext: Option<DublinCoreExtension>,
    pub dublin_core_date_parsed: Option<DateTime<Utc>>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RssCategory {
    pub domain: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RssImage {
    pub url: String,
    pub link: String,
    pub title: String,
    pub width: String,
    pub height: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RssEnclosure {
    pub url: String,
    pub length: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RssGuid {
    pub value: String,
    pub is_perma_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RssSource {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RssCloud {
    pub domain: String,
    pub port: String,
    pub path: String,
    pub register_procedure: String,
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RssTextInput {
    pub title: String,
    pub description: String,
    pub name: String,
    pub link: String,
}

/// Reads an RSS or RDF document to the end and parses it.
pub fn parse<R: Read>(reader: R, options: &ParseOptions) -> Result<RssFeed, FormatError> {
    parse_bytes(&read_all(reader)?, options)
}

pub fn parse_bytes(input: &[u8], options: &ParseOptions) -> Result<RssFeed, FormatError> {
    let prepared = prepare(input, &options.strictness);
    let mut tok = Tokenizer::new(&prepared, options.strictness);

    let root = tok.root()?;
    let version = match root.local.to_ascii_lowercase().as_str() {
        "rss" => root.attr("version").unwrap_or_default().to_string(),
        "rdf" => "1.0".to_string(),
        _ => return Err(FormatError::WrongRoot(root.qname)),
    };

    let mut parser = RssParser {
        tok,
        options,
        skipped_items: 0,
    };
    let mut feed = RssFeed {
        version,
        ..RssFeed::default()
    };
    parser.read_root(&root, &mut feed)?;

    if options.parse_extensions {
        feed.itunes_ext = ITunesFeedExtension::from_extensions(&feed.extensions);
        feed.dublin_core_ext = DublinCoreExtension::from_extensions(&feed.extensions);
        feed.dublin_core_date_parsed = dublin_core_date(feed.dublin_core_ext.as_ref(), options);
    }
    if parser.skipped_items > 0 {
        tracing::debug!(
            max_items = options.max_items,
            skipped = parser.skipped_items,
            "Item limit reached"
        );
    }
    tracing::debug!(version = %feed.version, items = feed.items.len(), "Parsed RSS feed");
    Ok(feed)
}

struct RssParser<'a, 'o> {
    tok: Tokenizer<'a>,
    options: &'o ParseOptions,
    skipped_items: usize,
}

enum Next {
    Child(StartTag),
    Done,
}

impl RssParser<'_, '_> {
    /// Next child of `parent`, or `Done` once its end tag is consumed.
    fn next_child(&mut self, parent: &StartTag) -> Result<Next, FormatError> {
        use super::xml::Token;
        loop {
            match self.tok.next_token()? {
                Token::Start(tag) => return Ok(Next::Child(tag)),
                Token::End => return Ok(Next::Done),
                Token::Text(_) => {}
                Token::Eof => {
                    self.tok.eof_inside(&parent.local)?;
                    return Ok(Next::Done);
                }
            }
        }
    }

    fn text(&mut self, tag: &StartTag) -> Result<String, FormatError> {
        self.tok.read_text(tag)
    }

    fn date(&self, raw: &str) -> Option<DateTime<Utc>> {
        parse_date_field(raw, self.options)
    }

    fn capture(&mut self, tag: StartTag, extensions: &mut Extensions) -> Result<(), FormatError> {
        let native = is_rss_element(&tag);
        capture_element(&mut self.tok, tag, native, extensions, self.options)
    }

    fn read_root(&mut self, root: &StartTag, feed: &mut RssFeed) -> Result<(), FormatError> {
        while let Next::Child(tag) = self.next_child(root)? {
            let name = native_name(&tag);
            match name.as_str() {
                "channel" => self.read_channel(&tag, feed)?,
                "item" => self.read_item_into(tag, feed)?,
                "image" => feed.image = Some(self.read_image(&tag)?),
                "textinput" | "textInput" => feed.text_input = Some(self.read_text_input(&tag)?),
                _ => self.capture(tag, &mut feed.extensions)?,
            }
        }
        Ok(())
    }

    fn read_channel(&mut self, channel: &StartTag, feed: &mut RssFeed) -> Result<(), FormatError> {
        while let Next::Child(tag) = self.next_child(channel)? {
            let name = native_name(&tag);
            match name.as_str() {
                "title" => feed.title = self.text(&tag)?,
                "link" => {
                    let link = self.text(&tag)?;
                    push_link(&mut feed.link, &mut feed.links, link);
                }
                "description" => feed.description = self.text(&tag)?,
                "language" => feed.language = self.text(&tag)?,
                "copyright" => feed.copyright = self.text(&tag)?,
                "managingEditor" => feed.managing_editor = self.text(&tag)?,
                "webMaster" => feed.web_master = self.text(&tag)?,
                "pubDate" => {
                    feed.pub_date = self.text(&tag)?;
                    feed.pub_date_parsed = self.date(&feed.pub_date);
                }
                "lastBuildDate" => {
                    feed.last_build_date = self.text(&tag)?;
                    feed.last_build_date_parsed = self.date(&feed.last_build_date);
                }
                "category" => feed.categories.push(self.read_category(&tag)?),
                "generator" => feed.generator = self.text(&tag)?,
                "docs" => feed.docs = self.text(&tag)?,
                "ttl" => feed.ttl = self.text(&tag)?,
                "rating" => feed.rating = self.text(&tag)?,
                "image" => feed.image = Some(self.read_image(&tag)?),
                "skipHours" => feed.skip_hours = self.read_list(&tag, "hour")?,
                "skipDays" => feed.skip_days = self.read_list(&tag, "day")?,
                "cloud" => {
                    feed.cloud = Some(RssCloud {
                        domain: attr(&tag, "domain"),
                        port: attr(&tag, "port"),
                        path: attr(&tag, "path"),
                        register_procedure: attr(&tag, "registerProcedure"),
                        protocol: attr(&tag, "protocol"),
                    });
                    self.tok.skip(&tag)?;
                }
                "textInput" | "textinput" => feed.text_input = Some(self.read_text_input(&tag)?),
                "item" => self.read_item_into(tag, feed)?,
                // RDF table of contents; the items themselves follow the channel.
                "items" => self.tok.skip(&tag)?,
                _ => self.capture(tag, &mut feed.extensions)?,
            }
        }
        Ok(())
    }

    fn read_item_into(&mut self, tag: StartTag, feed: &mut RssFeed) -> Result<(), FormatError> {
        if self.options.item_limit_reached(feed.items.len()) {
            self.skipped_items += 1;
            return self.tok.skip(&tag);
        }
        let item = self.read_item(&tag)?;
        feed.items.push(item);
        Ok(())
    }

    fn read_item(&mut self, item_tag: &StartTag) -> Result<RssItem, FormatError> {
        let mut item = RssItem::default();

        while let Next::Child(tag) = self.next_child(item_tag)? {
            if tag.local == "encoded" && is_content_module(&tag) {
                item.content = self.text(&tag)?;
                continue;
            }

            let name = native_name(&tag);
            match name.as_str() {
                "title" => item.title = self.text(&tag)?,
                "link" => {
                    let link = self.text(&tag)?;
                    push_link(&mut item.link, &mut item.links, link);
                }
                "description" => item.description = self.text(&tag)?,
                "author" => item.author = self.text(&tag)?,
                "category" => item.categories.push(self.read_category(&tag)?),
                "comments" => item.comments = self.text(&tag)?,
                "enclosure" => {
                    item.enclosures.push(RssEnclosure {
                        url: attr(&tag, "url"),
                        length: attr(&tag, "length"),
                        mime_type: attr(&tag, "type"),
                    });
                    self.tok.skip(&tag)?;
                }
                "guid" => {
                    let is_perma_link = attr(&tag, "isPermaLink");
                    item.guid = Some(RssGuid {
                        value: self.text(&tag)?,
                        is_perma_link,
                    });
                }
                "pubDate" => {
                    item.pub_date = self.text(&tag)?;
                    item.pub_date_parsed = self.date(&item.pub_date);
                }
                "source" => {
                    let url = attr(&tag, "url");
                    item.source = Some(RssSource {
                        title: self.text(&tag)?,
                        url,
                    });
                }
                _ => self.capture(tag, &mut item.extensions)?,
            }
        }

        if self.options.parse_extensions {
            item.itunes_ext = ITunesItemExtension::from_extensions(&item.extensions);
            item.dublin_core_ext = DublinCoreExtension::from_extensions(&item.extensions);
            item.dublin_core_date_parsed =
                dublin_core_date(item.dublin_core_ext.as_ref(), self.options);
        }
        Ok(item)
    }

    fn read_category(&mut self, tag: &StartTag) -> Result<RssCategory, FormatError> {
        Ok(RssCategory {
            domain: attr(tag, "domain"),
            value: self.text(tag)?,
        })
    }

    fn read_image(&mut self, image_tag: &StartTag) -> Result<RssImage, FormatError> {
        let mut image = RssImage {
            // RDF puts the URL on the element itself.
            url: image_tag
                .attr("resource")
                .or_else(|| image_tag.attr("about"))
                .unwrap_or_default()
                .to_string(),
            ..RssImage::default()
        };
        while let Next::Child(tag) = self.next_child(image_tag)? {
            let field = match native_name(&tag).as_str() {
                "url" => &mut image.url,
                "link" => &mut image.link,
                "title" => &mut image.title,
                "width" => &mut image.width,
                "height" => &mut image.height,
                "description" => &mut image.description,
                _ => {
                    self.tok.skip(&tag)?;
                    continue;
                }
            };
            *field = self.tok.read_text(&tag)?;
        }
        Ok(image)
    }

    fn read_text_input(&mut self, input_tag: &StartTag) -> Result<RssTextInput, FormatError> {
        let mut input = RssTextInput::default();
        while let Next::Child(tag) = self.next_child(input_tag)? {
            let field = match native_name(&tag).as_str() {
                "title" => &mut input.title,
                "description" => &mut input.description,
                "name" => &mut input.name,
                "link" => &mut input.link,
                _ => {
                    self.tok.skip(&tag)?;
                    continue;
                }
            };
            *field = self.tok.read_text(&tag)?;
        }
        Ok(input)
    }

    /// Text of every `child` element (`<skipHours><hour>1</hour>...`).
    fn read_list(&mut self, parent: &StartTag, child: &str) -> Result<Vec<String>, FormatError> {
        let mut values = Vec::new();
        while let Next::Child(tag) = self.next_child(parent)? {
            if tag.local == child {
                values.push(self.tok.read_text(&tag)?);
            } else {
                self.tok.skip(&tag)?;
            }
        }
        Ok(values)
    }
}

/// Un-prefixed elements belong to RSS whatever default namespace the document
/// declares (some RSS 2.0 generators bind one); prefixed ones only when bound
/// to an RSS 1.0 / 0.9 namespace.
fn is_rss_element(tag: &StartTag) -> bool {
    tag.prefix.is_none() || tag.is_native(RSS_NAMESPACES)
}

/// Local name of an RSS element; empty for anything else so it falls through
/// to extension capture.
fn native_name(tag: &StartTag) -> String {
    if is_rss_element(tag) {
        tag.local.clone()
    } else {
        String::new()
    }
}

fn dublin_core_date(
    dc: Option<&DublinCoreExtension>,
    options: &ParseOptions,
) -> Option<DateTime<Utc>> {
    dc.and_then(|dc| first(&dc.date))
        .and_then(|raw| parse_date_field(raw, options))
}

fn is_content_module(tag: &StartTag) -> bool {
    tag.namespace.uri() == Some(CONTENT_NAMESPACE) || tag.prefix.as_deref() == Some("content")
}

fn attr(tag: &StartTag, name: &str) -> String {
    tag.attr(name).unwrap_or_default().to_string()
}

fn push_link(first: &mut String, links: &mut Vec<String>, link: String) {
    if link.is_empty() {
        return;
    }
    if first.is_empty() {
        *first = link.clone();
    }
    links.push(link);
}
