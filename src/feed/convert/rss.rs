use super::or_else;
use crate::ext::dublincore::first;
use crate::ext::{extension_list, DublinCoreExtension, Extensions};
use crate::feed::model::{Enclosure, Feed, FeedType, Image, Item, Person};
use crate::format::rss::{RssCategory, RssFeed, RssItem};

/// Buckets an RSS document may use for embedded Atom elements.
const ATOM_PREFIXES: &[&str] = &["atom", "atom10", "atom03"];

pub fn convert(rss: &RssFeed) -> Feed {
    let dc = rss.dublin_core_ext.as_ref();
    let itunes = rss.itunes_ext.as_ref();

    // The parsed value falls back on its own: an unparseable lastBuildDate
    // still yields a timestamp from dc:date.
    let updated = or_else(&rss.last_build_date, dc_field(dc, |d| &d.date));
    let updated_parsed = rss.last_build_date_parsed.or(rss.dublin_core_date_parsed);

    let mut categories = category_values(&rss.categories);
    if let Some(itunes) = itunes {
        categories.extend(split_keywords(&itunes.keywords));
        for category in &itunes.categories {
            categories.push(category.text.clone());
            if let Some(sub) = &category.subcategory {
                categories.push(sub.text.clone());
            }
        }
    }
    if let Some(dc) = dc {
        categories.extend(dc.subject.iter().cloned());
    }

    let author = [rss.managing_editor.as_str(), rss.web_master.as_str()]
        .into_iter()
        .find(|s| !s.is_empty())
        .or_else(|| dc_field(dc, |d| &d.author))
        .or_else(|| dc_field(dc, |d| &d.creator))
        .or_else(|| itunes.map(|i| i.author.as_str()).filter(|s| !s.is_empty()));

    let image = match &rss.image {
        Some(image) => Some(Image {
            url: image.url.clone(),
            title: image.title.clone(),
        }),
        None => itunes.and_then(|i| Image::from_url(&i.image)),
    };

    Feed {
        title: or_else(&rss.title, dc_field(dc, |d| &d.title)),
        description: rss.description.clone(),
        link: or_else(&rss.link, itunes.map(|i| i.subtitle.as_str())),
        feed_link: self_link(&rss.extensions),
        links: feed_links(rss),
        updated,
        updated_parsed,
        published: rss.pub_date.clone(),
        published_parsed: rss.pub_date_parsed,
        authors: author.map(Person::from_name_address).into_iter().collect(),
        language: or_else(&rss.language, dc_field(dc, |d| &d.language)),
        image,
        copyright: or_else(&rss.copyright, dc_field(dc, |d| &d.rights)),
        generator: rss.generator.clone(),
        categories,
        dublin_core_ext: rss.dublin_core_ext.clone(),
        itunes_ext: rss.itunes_ext.clone(),
        extensions: rss.extensions.clone(),
        items: rss.items.iter().map(convert_item).collect(),
        original: None,
        feed_type: FeedType::Rss,
        feed_version: rss.version.clone(),
    }
}

fn convert_item(item: &RssItem) -> Item {
    let dc = item.dublin_core_ext.as_ref();
    let itunes = item.itunes_ext.as_ref();
    let dc_date = dc_field(dc, |d| &d.date);

    let mut categories = category_values(&item.categories);
    if let Some(itunes) = itunes {
        categories.extend(split_keywords(&itunes.keywords));
    }
    if let Some(dc) = dc {
        categories.extend(dc.subject.iter().cloned());
    }

    let author = Some(item.author.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| dc_field(dc, |d| &d.author))
        .or_else(|| dc_field(dc, |d| &d.creator))
        .or_else(|| itunes.map(|i| i.author.as_str()).filter(|s| !s.is_empty()));

    Item {
        title: or_else(&item.title, dc_field(dc, |d| &d.title)),
        description: or_else(&item.description, dc_field(dc, |d| &d.description)),
        content: item.content.clone(),
        link: item.link.clone(),
        links: item.links.clone(),
        updated: dc_date.unwrap_or_default().to_string(),
        updated_parsed: item.dublin_core_date_parsed,
        published: or_else(&item.pub_date, dc_date),
        published_parsed: item.pub_date_parsed.or(item.dublin_core_date_parsed),
        authors: author.map(Person::from_name_address).into_iter().collect(),
        guid: item.guid.as_ref().map(|g| g.value.clone()).unwrap_or_default(),
        image: itunes.and_then(|i| Image::from_url(&i.image)),
        categories,
        enclosures: item
            .enclosures
            .iter()
            .map(|e| Enclosure {
                url: e.url.clone(),
                mime_type: e.mime_type.clone(),
                length: e.length.clone(),
            })
            .collect(),
        dublin_core_ext: item.dublin_core_ext.clone(),
        itunes_ext: item.itunes_ext.clone(),
        extensions: item.extensions.clone(),
    }
}

/// First entry of a Dublin Core field, if the bundle and the entry exist.
fn dc_field<'a>(
    dc: Option<&'a DublinCoreExtension>,
    field: impl Fn(&'a DublinCoreExtension) -> &'a Vec<String>,
) -> Option<&'a str> {
    dc.and_then(|d| first(field(d)))
}

fn category_values(categories: &[RssCategory]) -> Vec<String> {
    categories.iter().map(|c| c.value.clone()).collect()
}

fn split_keywords(keywords: &str) -> impl Iterator<Item = String> + '_ {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

fn atom_links(extensions: &Extensions) -> impl Iterator<Item = (&str, &str)> {
    ATOM_PREFIXES
        .iter()
        .flat_map(move |prefix| extension_list(extensions, prefix, "link"))
        .map(|l| (l.attr("rel").unwrap_or_default(), l.attr("href").unwrap_or_default()))
}

fn self_link(extensions: &Extensions) -> String {
    atom_links(extensions)
        .filter(|(rel, _)| *rel == "self")
        .last()
        .map(|(_, href)| href.to_string())
        .unwrap_or_default()
}

fn feed_links(rss: &RssFeed) -> Vec<String> {
    let mut links = rss.links.clone();
    links.extend(
        atom_links(&rss.extensions)
            .filter(|(rel, _)| matches!(*rel, "" | "alternate" | "self"))
            .map(|(_, href)| href.to_string()),
    );
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ext::{ITunesCategory, ITunesFeedExtension, ITunesItemExtension};
    use crate::format::rss::{RssEnclosure, RssGuid, RssImage};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn dc() -> DublinCoreExtension {
        DublinCoreExtension::default()
    }

    #[test]
    fn test_category_aggregation_order() {
        let rss = RssFeed {
            categories: vec![RssCategory {
                domain: String::new(),
                value: "A".to_string(),
            }],
            itunes_ext: Some(ITunesFeedExtension {
                keywords: "b,c".to_string(),
                ..ITunesFeedExtension::default()
            }),
            dublin_core_ext: Some(DublinCoreExtension {
                subject: vec!["D".to_string()],
                ..dc()
            }),
            ..RssFeed::default()
        };
        assert_eq!(convert(&rss).categories, vec!["A", "b", "c", "D"]);
    }

    #[test]
    fn test_itunes_categories_follow_keywords() {
        let rss = RssFeed {
            itunes_ext: Some(ITunesFeedExtension {
                keywords: "k".to_string(),
                categories: vec![ITunesCategory {
                    text: "Arts".to_string(),
                    subcategory: Some(Box::new(ITunesCategory {
                        text: "Design".to_string(),
                        subcategory: None,
                    })),
                }],
                ..ITunesFeedExtension::default()
            }),
            dublin_core_ext: Some(DublinCoreExtension {
                subject: vec!["A".to_string(), "A".to_string()],
                ..dc()
            }),
            ..RssFeed::default()
        };
        assert_eq!(convert(&rss).categories, vec!["k", "Arts", "Design", "A", "A"]);
    }

    #[test]
    fn test_title_and_language_fallbacks() {
        let rss = RssFeed {
            dublin_core_ext: Some(DublinCoreExtension {
                title: vec!["DC Title".to_string()],
                language: vec!["fr".to_string()],
                rights: vec!["CC-BY".to_string()],
                ..dc()
            }),
            ..RssFeed::default()
        };
        let feed = convert(&rss);
        assert_eq!(feed.title, "DC Title");
        assert_eq!(feed.language, "fr");
        assert_eq!(feed.copyright, "CC-BY");

        let native = RssFeed {
            title: "Native".to_string(),
            ..rss
        };
        assert_eq!(convert(&native).title, "Native");
    }

    #[test]
    fn test_link_falls_back_to_itunes_subtitle() {
        let rss = RssFeed {
            itunes_ext: Some(ITunesFeedExtension {
                subtitle: "http://example.com/sub".to_string(),
                ..ITunesFeedExtension::default()
            }),
            ..RssFeed::default()
        };
        assert_eq!(convert(&rss).link, "http://example.com/sub");
    }

    #[test]
    fn test_author_precedence() {
        let base = RssFeed {
            web_master: "web@example.com (Web Master)".to_string(),
            dublin_core_ext: Some(DublinCoreExtension {
                creator: vec!["Creator".to_string()],
                ..dc()
            }),
            itunes_ext: Some(ITunesFeedExtension {
                author: "iTunes Author".to_string(),
                ..ITunesFeedExtension::default()
            }),
            ..RssFeed::default()
        };
        assert_eq!(
            convert(&base).authors,
            vec![Person {
                name: "Web Master".to_string(),
                email: "web@example.com".to_string(),
            }]
        );

        let editor = RssFeed {
            managing_editor: "Ed <ed@example.com>".to_string(),
            ..base.clone()
        };
        assert_eq!(convert(&editor).authors[0].email, "ed@example.com");

        let creator_only = RssFeed {
            web_master: String::new(),
            ..base.clone()
        };
        assert_eq!(convert(&creator_only).authors[0].name, "Creator");

        let itunes_only = RssFeed {
            web_master: String::new(),
            dublin_core_ext: None,
            ..base
        };
        assert_eq!(convert(&itunes_only).authors[0].name, "iTunes Author");

        assert!(convert(&RssFeed::default()).authors.is_empty());
    }

    #[test]
    fn test_updated_falls_back_to_dc_date() {
        let rss = RssFeed {
            dublin_core_ext: Some(DublinCoreExtension {
                date: vec!["2006-01-02T15:04:05Z".to_string()],
                ..dc()
            }),
            dublin_core_date_parsed: Some(Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap()),
            ..RssFeed::default()
        };
        let feed = convert(&rss);
        assert_eq!(feed.updated, "2006-01-02T15:04:05Z");
        assert_eq!(
            feed.updated_parsed,
            Some(Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap())
        );

        // An unparsed dc:date leaves the timestamp empty but keeps the string.
        let unparsed = RssFeed {
            dublin_core_date_parsed: None,
            ..rss
        };
        let feed = convert(&unparsed);
        assert_eq!(feed.updated, "2006-01-02T15:04:05Z");
        assert_eq!(feed.updated_parsed, None);
    }

    #[test]
    fn test_image_precedence() {
        let with_itunes = RssFeed {
            itunes_ext: Some(ITunesFeedExtension {
                image: "http://example.com/itunes.png".to_string(),
                ..ITunesFeedExtension::default()
            }),
            ..RssFeed::default()
        };
        assert_eq!(
            convert(&with_itunes).image,
            Some(Image {
                url: "http://example.com/itunes.png".to_string(),
                title: String::new(),
            })
        );

        let with_both = RssFeed {
            image: Some(RssImage {
                url: "http://example.com/logo.png".to_string(),
                title: "Logo".to_string(),
                ..RssImage::default()
            }),
            ..with_itunes
        };
        assert_eq!(convert(&with_both).image.unwrap().title, "Logo");
    }

    #[test]
    fn test_feed_link_and_links_from_atom_extension() {
        let link = |rel: &str, href: &str| crate::ext::Extension {
            name: "link".to_string(),
            attrs: [("rel", rel), ("href", href)]
                .into_iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..crate::ext::Extension::default()
        };
        let mut extensions = Extensions::new();
        extensions.entry("atom".to_string()).or_default().insert(
            "link".to_string(),
            vec![
                link("self", "http://example.com/feed.xml"),
                link("hub", "http://hub.example.com/"),
                link("", "http://example.com/alt"),
            ],
        );
        let rss = RssFeed {
            links: vec!["http://example.com/".to_string()],
            extensions,
            ..RssFeed::default()
        };

        let feed = convert(&rss);
        assert_eq!(feed.feed_link, "http://example.com/feed.xml");
        assert_eq!(
            feed.links,
            vec![
                "http://example.com/",
                "http://example.com/feed.xml",
                "http://example.com/alt",
            ]
        );
    }

    #[test]
    fn test_item_mapping() {
        let item = RssItem {
            title: "T".to_string(),
            author: "Jane <jane@example.com>".to_string(),
            guid: Some(RssGuid {
                value: String::new(),
                is_perma_link: String::new(),
            }),
            enclosures: vec![RssEnclosure {
                url: "u".to_string(),
                length: "5".to_string(),
                mime_type: "t".to_string(),
            }],
            itunes_ext: Some(ITunesItemExtension {
                image: "http://example.com/ep.png".to_string(),
                keywords: "x, y".to_string(),
                ..ITunesItemExtension::default()
            }),
            dublin_core_ext: Some(DublinCoreExtension {
                date: vec!["2006-01-02T15:04:05Z".to_string()],
                description: vec!["DC description".to_string()],
                ..dc()
            }),
            dublin_core_date_parsed: Some(Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap()),
            ..RssItem::default()
        };
        let out = convert_item(&item);

        assert_eq!(
            out.enclosures,
            vec![Enclosure {
                url: "u".to_string(),
                mime_type: "t".to_string(),
                length: "5".to_string(),
            }]
        );
        assert_eq!(out.guid, "");
        assert_eq!(out.description, "DC description");
        assert_eq!(out.authors[0].name, "Jane");
        assert_eq!(out.categories, vec!["x", "y"]);
        assert_eq!(out.image.unwrap().url, "http://example.com/ep.png");
        assert_eq!(out.published, "2006-01-02T15:04:05Z");
        assert!(out.published_parsed.is_some());
        assert_eq!(out.updated_parsed, out.published_parsed);
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let rss = RssFeed {
            title: "T".to_string(),
            items: vec![RssItem::default(), RssItem::default()],
            ..RssFeed::default()
        };
        assert_eq!(convert(&rss), convert(&rss));
    }
}
