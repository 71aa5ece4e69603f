use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::namespace::canonical_prefix;
use crate::format::xml::{Namespace, StartTag, Token, Tokenizer};
use crate::format::FormatError;

/// An element the format parsers have no dedicated field for, captured
/// generically instead of being dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    /// Text content with leading/trailing whitespace removed.
    #[serde(default)]
    pub value: String,
    /// Attribute local name -> value. When two attributes share a local name
    /// under different namespaces, the last one wins.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Child local name -> children with that name, in document order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, Vec<Extension>>,
}

impl Extension {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Extension> {
        self.children.get(name).and_then(|c| c.first())
    }
}

/// Canonical namespace prefix -> element local name -> occurrences.
pub type Extensions = BTreeMap<String, BTreeMap<String, Vec<Extension>>>;

/// All occurrences of `prefix:name`.
pub fn extension_list<'a>(extensions: &'a Extensions, prefix: &str, name: &str) -> &'a [Extension] {
    extensions
        .get(prefix)
        .and_then(|names| names.get(name))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Text values of every `prefix:name` occurrence.
pub fn extension_values(extensions: &Extensions, prefix: &str, name: &str) -> Vec<String> {
    extension_list(extensions, prefix, name)
        .iter()
        .map(|e| e.value.clone())
        .collect()
}

/// Parses the element whose start tag was just read and registers it in
/// `extensions` under its canonical prefix and local name. Same-named
/// elements accumulate; nothing is ever overwritten.
pub(crate) fn parse_extension(
    tokenizer: &mut Tokenizer<'_>,
    tag: StartTag,
    extensions: &mut Extensions,
) -> Result<(), FormatError> {
    let namespace_uri = match &tag.namespace {
        Namespace::Uri(uri) => Some(uri.clone()),
        Namespace::None | Namespace::Unknown(_) => None,
    };
    let prefix = canonical_prefix(namespace_uri.as_deref(), tag.prefix.as_deref());

    let extension = parse_element(tokenizer, tag)?;
    extensions
        .entry(prefix)
        .or_default()
        .entry(extension.name.clone())
        .or_default()
        .push(extension);
    Ok(())
}

fn parse_element(tokenizer: &mut Tokenizer<'_>, tag: StartTag) -> Result<Extension, FormatError> {
    let mut extension = Extension {
        name: tag.local,
        attrs: tag
            .attributes
            .into_iter()
            .map(|a| (a.local, a.value))
            .collect(),
        ..Extension::default()
    };

    let mut value = String::new();
    loop {
        match tokenizer.next_token()? {
            Token::Start(child_tag) => {
                let child = parse_element(tokenizer, child_tag)?;
                extension
                    .children
                    .entry(child.name.clone())
                    .or_default()
                    .push(child);
            }
            Token::Text(text) => value.push_str(&text),
            Token::End => break,
            Token::Eof => {
                tokenizer.eof_inside(&extension.name)?;
                break;
            }
        }
    }

    extension.value = value.trim().to_string();
    Ok(extension)
}
