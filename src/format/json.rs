//! JSON Feed 1.0 / 1.1 parser.
//!
//! Decoding is plain `serde`. Publishers are sloppy with JSON too, so every
//! field tolerates `null`, and item ids may be numbers.
use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{read_all, FormatError};
use crate::options::ParseOptions;
use crate::util::parse_date_field;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonFeed {
    #[serde(default, deserialize_with = "nullable")]
    pub version: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub home_page_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub feed_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_comment: String,
    #[serde(default, deserialize_with = "nullable")]
    pub next_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub icon: String,
    #[serde(default, deserialize_with = "nullable")]
    pub favicon: String,
    /// 1.0 single author.
    #[serde(default)]
    pub author: Option<JsonAuthor>,
    /// 1.1 author list.
    #[serde(default)]
    pub authors: Option<Vec<JsonAuthor>>,
    #[serde(default, deserialize_with = "nullable")]
    pub language: String,
    #[serde(default)]
    pub expired: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub hubs: Vec<JsonHub>,
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<JsonItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonItem {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub external_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub content_html: String,
    #[serde(default, deserialize_with = "nullable")]
    pub content_text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub image: String,
    #[serde(default, deserialize_with = "nullable")]
    pub banner_image: String,
    #[serde(default, deserialize_with = "nullable")]
    pub date_published: String,
    #[serde(skip)]
    pub date_published_parsed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub date_modified: String,
    #[serde(skip)]
    pub date_modified_parsed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<JsonAuthor>,
    #[serde(default)]
    pub authors: Option<Vec<JsonAuthor>>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub language: String,
    #[serde(default)]
    pub attachments: Option<Vec<JsonAttachment>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonAuthor {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonHub {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub hub_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonAttachment {
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub mime_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    /// Kept as the number written in the document.
    #[serde(default)]
    pub size_in_bytes: Option<serde_json::Number>,
    #[serde(default)]
    pub duration_in_seconds: Option<serde_json::Number>,
}

/// Reads a JSON Feed document to the end and parses it.
pub fn parse<R: Read>(reader: R, options: &ParseOptions) -> Result<JsonFeed, FormatError> {
    parse_bytes(&read_all(reader)?, options)
}

pub fn parse_bytes(input: &[u8], options: &ParseOptions) -> Result<JsonFeed, FormatError> {
    let mut feed: JsonFeed = serde_json::from_slice(input)?;

    if options.max_items > 0 && feed.items.len() > options.max_items {
        tracing::debug!(
            max_items = options.max_items,
            skipped = feed.items.len() - options.max_items,
            "Item limit reached"
        );
        feed.items.truncate(options.max_items);
    }

    for item in &mut feed.items {
        item.date_published_parsed = parse_date_field(&item.date_published, options);
        item.date_modified_parsed = parse_date_field(&item.date_modified, options);
    }

    tracing::debug!(version = %feed.version, items = feed.items.len(), "Parsed JSON feed");
    Ok(feed)
}

/// `null` decodes to the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Item ids are strings per the format, but integers show up in the wild.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Text(s)) => s,
        Some(Id::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FEED: &str = r#"{
        "version": "https://jsonfeed.org/version/1.1",
        "title": "My Example Feed",
        "home_page_url": "https://example.org/",
        "feed_url": "https://example.org/feed.json",
        "authors": [{"name": "Jane Doe <jane@example.org>"}],
        "language": "en",
        "hubs": [{"type": "WebSub", "url": "https://hub.example.org/"}],
        "items": [
            {
                "id": "2",
                "content_text": "This is a second item.",
                "url": "https://example.org/second-item",
                "date_published": "2010-02-07T14:04:00-05:00",
                "tags": ["a", "b"],
                "attachments": [
                    {"url": "https://example.org/a.mp3", "mime_type": "audio/mpeg", "duration_in_seconds": 5}
                ]
            },
            {
                "id": 1,
                "content_html": "<p>Hello, world!</p>",
                "url": "https://example.org/initial-post",
                "title": null,
                "date_modified": "not a date"
            }
        ]
    }"#;

    #[test]
    fn test_feed_fields() {
        let feed = parse_bytes(FEED.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(feed.version, "https://jsonfeed.org/version/1.1");
        assert_eq!(feed.title, "My Example Feed");
        assert_eq!(feed.home_page_url, "https://example.org/");
        assert_eq!(feed.hubs[0].hub_type, "WebSub");
        assert_eq!(feed.authors.as_ref().unwrap()[0].name, "Jane Doe <jane@example.org>");
        assert_eq!(feed.items.len(), 2);
    }

    #[test]
    fn test_item_fields() {
        let feed = parse_bytes(FEED.as_bytes(), &ParseOptions::default()).unwrap();
        let first = &feed.items[0];
        assert_eq!(first.id, "2");
        assert_eq!(first.tags, vec!["a", "b"]);
        assert!(first.date_published_parsed.is_some());

        let attachment = &first.attachments.as_ref().unwrap()[0];
        assert_eq!(attachment.mime_type, "audio/mpeg");
        assert_eq!(
            attachment.duration_in_seconds.as_ref().map(|n| n.to_string()),
            Some("5".to_string())
        );
        assert!(attachment.size_in_bytes.is_none());
    }

    #[test]
    fn test_numeric_id_and_null_fields() {
        let feed = parse_bytes(FEED.as_bytes(), &ParseOptions::default()).unwrap();
        let second = &feed.items[1];
        assert_eq!(second.id, "1");
        assert_eq!(second.title, "");
        assert_eq!(second.date_modified, "not a date");
        assert!(second.date_modified_parsed.is_none());
    }

    #[test]
    fn test_max_items() {
        let options = ParseOptions {
            max_items: 1,
            ..ParseOptions::default()
        };
        let feed = parse_bytes(FEED.as_bytes(), &options).unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].id, "2");
    }

    #[test]
    fn test_parse_dates_off() {
        let options = ParseOptions {
            parse_dates: false,
            ..ParseOptions::default()
        };
        let feed = parse_bytes(FEED.as_bytes(), &options).unwrap();
        assert!(feed.items[0].date_published_parsed.is_none());
        assert_eq!(feed.items[0].date_published, "2010-02-07T14:04:00-05:00");
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        assert!(matches!(
            parse_bytes(b"{\"title\": ", &ParseOptions::default()),
            Err(FormatError::Json(_))
        ));
    }
}
