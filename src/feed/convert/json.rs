use crate::feed::model::{Enclosure, Feed, FeedType, Image, Item, Person};
use crate::format::json::{JsonAuthor, JsonFeed, JsonItem};

pub fn convert(json: &JsonFeed) -> Feed {
    // The format has no feed-level dates; the first item stands in.
    let first = json.items.first();

    Feed {
        title: json.title.clone(),
        description: json.description.clone(),
        link: json.home_page_url.clone(),
        feed_link: json.feed_url.clone(),
        links: non_empty([&json.home_page_url, &json.feed_url]),
        updated: first.map(|i| i.date_modified.clone()).unwrap_or_default(),
        updated_parsed: first.and_then(|i| i.date_modified_parsed),
        published: first.map(|i| i.date_published.clone()).unwrap_or_default(),
        published_parsed: first.and_then(|i| i.date_published_parsed),
        authors: authors(json.authors.as_deref(), json.author.as_ref()),
        language: json.language.clone(),
        image: Image::from_url(&json.icon),
        items: json.items.iter().map(convert_item).collect(),
        feed_type: FeedType::Json,
        feed_version: json.version.clone(),
        ..Feed::default()
    }
}

fn convert_item(item: &JsonItem) -> Item {
    let content = if item.content_html.is_empty() {
        &item.content_text
    } else {
        &item.content_html
    };
    let image = if item.image.is_empty() {
        &item.banner_image
    } else {
        &item.image
    };

    Item {
        title: item.title.clone(),
        description: item.summary.clone(),
        content: content.clone(),
        link: item.url.clone(),
        links: non_empty([&item.url, &item.external_url]),
        updated: item.date_modified.clone(),
        updated_parsed: item.date_modified_parsed,
        published: item.date_published.clone(),
        published_parsed: item.date_published_parsed,
        authors: authors(item.authors.as_deref(), item.author.as_ref()),
        guid: item.id.clone(),
        image: Image::from_url(image),
        categories: item.tags.clone(),
        enclosures: item
            .attachments
            .iter()
            .flatten()
            .map(|a| Enclosure {
                url: a.url.clone(),
                mime_type: a.mime_type.clone(),
                length: a
                    .duration_in_seconds
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            })
            .collect(),
        ..Item::default()
    }
}

/// The 1.1 `authors` list when present (even if empty), else the 1.0 `author`.
fn authors(list: Option<&[JsonAuthor]>, single: Option<&JsonAuthor>) -> Vec<Person> {
    match list {
        Some(list) => list.iter().map(|a| Person::from_name_address(&a.name)).collect(),
        None => single
            .map(|a| Person::from_name_address(&a.name))
            .into_iter()
            .collect(),
    }
}

fn non_empty<const N: usize>(values: [&String; N]) -> Vec<String> {
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .cloned()
        .collect()
}
