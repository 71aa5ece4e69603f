use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ext::{DublinCoreExtension, Extensions, ITunesFeedExtension, ITunesItemExtension};

/// Wire format of a feed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    Atom,
    Rss,
    Json,
    #[default]
    Unknown,
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedType::Atom => "atom",
            FeedType::Rss => "rss",
            FeedType::Json => "json",
            FeedType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A feed in the universal model, whatever format it was read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Feed {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    /// URL of the feed document itself.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub feed_link: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Person>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub copyright: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub generator: String,
    /// In source order, duplicates kept.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dublin_core_ext: Option<DublinCoreExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itunes_ext: Option<ITunesFeedExtension>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
    /// In source order. See [`Feed::sort_items_by_published`].
    pub items: Vec<Item>,
    /// The source document, when `keep_original_feed` is set.
    #[serde(skip)]
    pub original: Option<String>,
    pub feed_type: FeedType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub feed_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Item {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub published: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_parsed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Person>,
    /// Source identifier. Left empty when the source has none.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub guid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enclosures: Vec<Enclosure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dublin_core_ext: Option<DublinCoreExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itunes_ext: Option<ITunesItemExtension>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
}

impl Person {
    /// Builds a person from a combined `"Name <email>"` style string.
    pub fn from_name_address(raw: &str) -> Self {
        let (name, email) = crate::util::parse_name_address(raw);
        Self { name, email }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
}

impl Image {
    pub(crate) fn from_url(url: &str) -> Option<Self> {
        (!url.is_empty()).then(|| Self {
            url: url.to_string(),
            title: String::new(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enclosure {
    pub url: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Opaque; not always numeric in the wild.
    pub length: String,
}

impl Feed {
    /// Orders items by parsed publish date, oldest first.
    ///
    /// Items without a parsed date go after every dated item. The sort is
    /// stable, so undated items (and items sharing a timestamp) keep their
    /// source order.
    pub fn sort_items_by_published(&mut self) {
        self.items
            .sort_by_key(|item| (item.published_parsed.is_none(), item.published_parsed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn item(title: &str, secs: Option<i64>) -> Item {
        Item {
            title: title.to_string(),
            published_parsed: secs.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            ..Item::default()
        }
    }

    fn titles(feed: &Feed) -> Vec<&str> {
        feed.items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_sort_items_by_published() {
        let mut feed = Feed {
            items: vec![item("newest", Some(2)), item("oldest", Some(0)), item("middle", Some(1))],
            ..Feed::default()
        };
        feed.sort_items_by_published();
        assert_eq!(titles(&feed), vec!["oldest", "middle", "newest"]);
    }

    #[test]
    fn test_sort_puts_undated_last_and_is_stable() {
        let mut feed = Feed {
            items: vec![
                item("undated-a", None),
                item("late", Some(10)),
                item("undated-b", None),
                item("early", Some(5)),
                item("early-twin", Some(5)),
            ],
            ..Feed::default()
        };
        feed.sort_items_by_published();
        assert_eq!(
            titles(&feed),
            vec!["early", "early-twin", "late", "undated-a", "undated-b"]
        );
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let feed = Feed {
            title: "T".to_string(),
            feed_type: FeedType::Rss,
            original: Some("<rss/>".to_string()),
            ..Feed::default()
        };
        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "T", "items": [], "feedType": "rss"})
        );
    }

    #[test]
    fn test_feed_type_display() {
        assert_eq!(FeedType::Atom.to_string(), "atom");
        assert_eq!(FeedType::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_image_from_url() {
        assert_eq!(Image::from_url(""), None);
        assert_eq!(Image::from_url("u").map(|i| i.url), Some("u".to_string()));
    }
}
