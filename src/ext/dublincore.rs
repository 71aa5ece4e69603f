use serde::{Deserialize, Serialize};

use super::tree::{extension_values, Extensions};

const PREFIX: &str = "dc";

/// Dublin Core element set. Every element may repeat, so every field keeps
/// all occurrences in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DublinCoreExtension {
    pub title: Vec<String>,
    pub creator: Vec<String>,
    pub author: Vec<String>,
    pub subject: Vec<String>,
    pub description: Vec<String>,
    pub publisher: Vec<String>,
    pub contributor: Vec<String>,
    pub date: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Vec<String>,
    pub format: Vec<String>,
    pub identifier: Vec<String>,
    pub source: Vec<String>,
    pub language: Vec<String>,
    pub relation: Vec<String>,
    pub coverage: Vec<String>,
    pub rights: Vec<String>,
}

impl DublinCoreExtension {
    /// Builds the bundle from the `dc` bucket. `None` if no Dublin Core
    /// element is present.
    pub fn from_extensions(extensions: &Extensions) -> Option<Self> {
        if !extensions.contains_key(PREFIX) {
            return None;
        }

        let values = |name| extension_values(extensions, PREFIX, name);
        Some(Self {
            title: values("title"),
            creator: values("creator"),
            author: values("author"),
            subject: values("subject"),
            description: values("description"),
            publisher: values("publisher"),
            contributor: values("contributor"),
            date: values("date"),
            kind: values("type"),
            format: values("format"),
            identifier: values("identifier"),
            source: values("source"),
            language: values("language"),
            relation: values("relation"),
            coverage: values("coverage"),
            rights: values("rights"),
        })
    }
}

/// First entry of a repeated Dublin Core field.
pub(crate) fn first(values: &[String]) -> Option<&str> {
    values.first().map(String::as_str)
}
