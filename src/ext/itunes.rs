use serde::{Deserialize, Serialize};

use super::tree::{extension_list, Extension, Extensions};

const PREFIX: &str = "itunes";

/// Channel-level iTunes podcast tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ITunesFeedExtension {
    pub author: String,
    pub block: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<ITunesCategory>,
    pub explicit: String,
    pub keywords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<ITunesOwner>,
    pub subtitle: String,
    pub summary: String,
    /// `href` attribute of `<itunes:image>`.
    pub image: String,
    pub complete: String,
    pub new_feed_url: String,
    #[serde(rename = "type")]
    pub feed_type: String,
}

/// Item-level iTunes podcast tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ITunesItemExtension {
    pub author: String,
    pub block: String,
    pub duration: String,
    pub explicit: String,
    pub keywords: String,
    pub subtitle: String,
    pub summary: String,
    pub image: String,
    pub is_closed_captioned: String,
    pub episode: String,
    pub season: String,
    pub order: String,
    pub episode_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ITunesCategory {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<Box<ITunesCategory>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ITunesOwner {
    pub email: String,
    pub name: String,
}

impl ITunesFeedExtension {
    /// Builds the bundle from the `itunes` bucket. `None` if the feed uses no
    /// iTunes tags at all.
    pub fn from_extensions(extensions: &Extensions) -> Option<Self> {
        if !extensions.contains_key(PREFIX) {
            return None;
        }

        Some(Self {
            author: text(extensions, "author"),
            block: text(extensions, "block"),
            categories: extension_list(extensions, PREFIX, "category")
                .iter()
                .map(category)
                .collect(),
            explicit: text(extensions, "explicit"),
            keywords: text(extensions, "keywords"),
            owner: extension_list(extensions, PREFIX, "owner")
                .first()
                .map(|owner| ITunesOwner {
                    email: owner.child("email").map(|e| e.value.clone()).unwrap_or_default(),
                    name: owner.child("name").map(|e| e.value.clone()).unwrap_or_default(),
                }),
            subtitle: text(extensions, "subtitle"),
            summary: text(extensions, "summary"),
            image: image(extensions),
            complete: text(extensions, "complete"),
            new_feed_url: text(extensions, "new-feed-url"),
            feed_type: text(extensions, "type"),
        })
    }
}

impl ITunesItemExtension {
    /// Builds the bundle from the `itunes` bucket of an item.
    pub fn from_extensions(extensions: &Extensions) -> Option<Self> {
        if !extensions.contains_key(PREFIX) {
            return None;
        }

        Some(Self {
            author: text(extensions, "author"),
            block: text(extensions, "block"),
            duration: text(extensions, "duration"),
            explicit: text(extensions, "explicit"),
            keywords: text(extensions, "keywords"),
            subtitle: text(extensions, "subtitle"),
            summary: text(extensions, "summary"),
            image: image(extensions),
            is_closed_captioned: text(extensions, "isClosedCaptioned"),
            episode: text(extensions, "episode"),
            season: text(extensions, "season"),
            order: text(extensions, "order"),
            episode_type: text(extensions, "episodeType"),
        })
    }
}

fn text(extensions: &Extensions, name: &str) -> String {
    extension_list(extensions, PREFIX, name)
        .first()
        .map(|e| e.value.clone())
        .unwrap_or_default()
}

fn image(extensions: &Extensions) -> String {
    extension_list(extensions, PREFIX, "image")
        .first()
        .and_then(|e| e.attr("href"))
        .unwrap_or_default()
        .to_string()
}

fn category(ext: &Extension) -> ITunesCategory {
    ITunesCategory {
        text: ext.attr("text").unwrap_or_default().to_string(),
        subcategory: ext.child("category").map(|sub| Box::new(category(sub))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ext(name: &str, value: &str) -> Extension {
        Extension {
            name: name.to_string(),
            value: value.to_string(),
            ..Extension::default()
        }
    }

    fn with_attr(mut e: Extension, key: &str, value: &str) -> Extension {
        e.attrs.insert(key.to_string(), value.to_string());
        e
    }

    fn bucket(entries: Vec<Extension>) -> Extensions {
        let mut names: BTreeMap<String, Vec<Extension>> = BTreeMap::new();
        for e in entries {
            names.entry(e.name.clone()).or_default().push(e);
        }
        BTreeMap::from([(PREFIX.to_string(), names)])
    }

    #[test]
    fn test_absent_bucket_yields_none() {
        assert!(ITunesFeedExtension::from_extensions(&Extensions::new()).is_none());
        assert!(ITunesItemExtension::from_extensions(&Extensions::new()).is_none());
    }

    #[test]
    fn test_feed_fields() {
        let mut arts = with_attr(ext("category", ""), "text", "Arts");
        arts.children.insert(
            "category".to_string(),
            vec![with_attr(ext("category", ""), "text", "Design")],
        );
        let mut owner = ext("owner", "");
        owner.children.insert("name".to_string(), vec![ext("name", "Jane")]);
        owner
            .children
            .insert("email".to_string(), vec![ext("email", "jane@example.com")]);

        let exts = bucket(vec![
            ext("author", "Jane Doe"),
            ext("keywords", "a,b"),
            with_attr(ext("image", ""), "href", "http://example.com/cover.png"),
            arts,
            with_attr(ext("category", ""), "text", "News"),
            owner,
            ext("new-feed-url", "http://example.com/new"),
        ]);

        let itunes = ITunesFeedExtension::from_extensions(&exts).unwrap();
        assert_eq!(itunes.author, "Jane Doe");
        assert_eq!(itunes.keywords, "a,b");
        assert_eq!(itunes.image, "http://example.com/cover.png");
        assert_eq!(itunes.new_feed_url, "http://example.com/new");
        assert_eq!(itunes.categories.len(), 2);
        assert_eq!(itunes.categories[0].text, "Arts");
        assert_eq!(
            itunes.categories[0].subcategory.as_deref().map(|c| c.text.as_str()),
            Some("Design")
        );
        assert!(itunes.categories[1].subcategory.is_none());
        assert_eq!(
            itunes.owner,
            Some(ITunesOwner {
                email: "jane@example.com".to_string(),
                name: "Jane".to_string(),
            })
        );
    }

    #[test]
    fn test_item_fields() {
        let exts = bucket(vec![
            ext("duration", "01:02:03"),
            ext("episode", "4"),
            ext("episodeType", "full"),
        ]);
        let itunes = ITunesItemExtension::from_extensions(&exts).unwrap();
        assert_eq!(itunes.duration, "01:02:03");
        assert_eq!(itunes.episode, "4");
        assert_eq!(itunes.episode_type, "full");
        assert_eq!(itunes.author, "");
    }
}
