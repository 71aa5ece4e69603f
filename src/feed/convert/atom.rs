use crate::feed::model::{Enclosure, Feed, FeedType, Image, Item, Person};
use crate::format::atom::{AtomCategory, AtomEntry, AtomFeed, AtomGenerator, AtomLink, AtomPerson};

pub fn convert(atom: &AtomFeed) -> Feed {
    Feed {
        title: atom.title.clone(),
        description: atom.subtitle.clone(),
        link: first_href(&atom.links, "alternate"),
        feed_link: first_href(&atom.links, "self"),
        links: page_links(&atom.links),
        updated: atom.updated.clone(),
        updated_parsed: atom.updated_parsed,
        authors: persons(&atom.authors),
        language: atom.language.clone(),
        image: Image::from_url(&atom.logo),
        copyright: atom.rights.clone(),
        generator: atom.generator.as_ref().map(generator).unwrap_or_default(),
        categories: terms(&atom.categories),
        extensions: atom.extensions.clone(),
        items: atom.entries.iter().map(convert_entry).collect(),
        feed_type: FeedType::Atom,
        feed_version: atom.version.clone(),
        ..Feed::default()
    }
}

fn convert_entry(entry: &AtomEntry) -> Item {
    let (published, published_parsed) = if entry.published.is_empty() {
        (entry.updated.clone(), entry.updated_parsed)
    } else {
        (
            entry.published.clone(),
            entry.published_parsed.or(entry.updated_parsed),
        )
    };

    Item {
        title: entry.title.clone(),
        description: entry.summary.clone(),
        content: entry
            .content
            .as_ref()
            .map(|c| c.value.clone())
            .unwrap_or_default(),
        link: first_href(&entry.links, "alternate"),
        links: page_links(&entry.links),
        updated: entry.updated.clone(),
        updated_parsed: entry.updated_parsed,
        published,
        published_parsed,
        authors: persons(&entry.authors),
        guid: entry.id.clone(),
        image: None,
        categories: terms(&entry.categories),
        enclosures: entry
            .links
            .iter()
            .filter(|l| l.rel == "enclosure")
            .map(|l| Enclosure {
                url: l.href.clone(),
                mime_type: l.mime_type.clone(),
                length: l.length.clone(),
            })
            .collect(),
        extensions: entry.extensions.clone(),
        ..Item::default()
    }
}

fn first_href(links: &[AtomLink], rel: &str) -> String {
    links
        .iter()
        .find(|l| l.rel == rel)
        .map(|l| l.href.clone())
        .unwrap_or_default()
}

/// Links pointing at the feed or its pages, not at related resources.
fn page_links(links: &[AtomLink]) -> Vec<String> {
    links
        .iter()
        .filter(|l| matches!(l.rel.as_str(), "" | "alternate" | "self"))
        .map(|l| l.href.clone())
        .collect()
}

fn persons(people: &[AtomPerson]) -> Vec<Person> {
    people
        .iter()
        .map(|p| Person {
            name: p.name.clone(),
            email: p.email.clone(),
        })
        .collect()
}

fn terms(categories: &[AtomCategory]) -> Vec<String> {
    categories.iter().map(|c| c.term.clone()).collect()
}

/// `"Name vVersion URI"`, skipping the empty parts.
fn generator(g: &AtomGenerator) -> String {
    let mut out = g.value.clone();
    if !g.version.is_empty() {
        out.push_str(" v");
        out.push_str(&g.version);
    }
    if !g.uri.is_empty() {
        out.push(' ');
        out.push_str(&g.uri);
    }
    out.trim().to_string()
}
