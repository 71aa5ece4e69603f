/// Bucket for elements that carry no namespace at all.
pub const DEFAULT_PREFIX: &str = "default";

/// Well-known syndication extension namespaces and their canonical prefixes.
///
/// These always win over whatever prefix the document author declared, so
/// `xmlns:podcast="http://www.itunes.com/DTDs/PodCast-1.0.dtd"` still lands
/// under `itunes`.
const CANONICAL_NAMESPACES: &[(&str, &str)] = &[
    ("http://webns.net/mvcb/", "admin"),
    ("http://purl.org/rss/1.0/modules/aggregation/", "ag"),
    ("http://purl.org/rss/1.0/modules/annotate/", "annotate"),
    ("http://www.w3.org/2005/Atom", "atom"),
    ("http://purl.org/atom/ns#", "atom03"),
    ("http://media.tangent.org/rss/1.0/", "audio"),
    ("http://backend.userland.com/blogChannelModule", "blogChannel"),
    ("http://creativecommons.org/ns#license", "cc"),
    ("http://web.resource.org/cc/", "cc"),
    ("http://cyber.law.harvard.edu/rss/creativeCommonsRssModule.html", "creativeCommons"),
    ("http://backend.userland.com/creativeCommonsRssModule", "creativeCommons"),
    ("http://purl.org/rss/1.0/modules/company", "co"),
    ("http://purl.org/rss/1.0/modules/content/", "content"),
    ("http://my.theinfo.org/changed/1.0/rss/", "cp"),
    ("http://purl.org/dc/elements/1.1/", "dc"),
    ("http://purl.org/dc/terms/", "dcterms"),
    ("http://purl.org/rss/1.0/modules/email/", "email"),
    ("http://purl.org/rss/1.0/modules/event/", "ev"),
    ("http://rssnamespace.org/feedburner/ext/1.0", "feedburner"),
    ("http://freshmeat.net/rss/fm/", "fm"),
    ("http://xmlns.com/foaf/0.1/", "foaf"),
    ("http://www.w3.org/2003/01/geo/wgs84_pos#", "geo"),
    ("http://www.georss.org/georss", "georss"),
    ("http://www.opengis.net/gml", "gml"),
    ("http://www.google.com/schemas/play-podcasts/1.0", "googleplay"),
    ("http://postneo.com/icbm/", "icbm"),
    ("http://purl.org/rss/1.0/modules/image/", "image"),
    ("http://www.itunes.com/DTDs/PodCast-1.0.dtd", "itunes"),
    ("http://www.itunes.com/dtds/podcast-1.0.dtd", "itunes"),
    ("http://example.com/DTDs/PodCast-1.0.dtd", "itunes"),
    ("http://purl.org/rss/1.0/modules/link/", "l"),
    ("http://search.yahoo.com/mrss", "media"),
    ("http://search.yahoo.com/mrss/", "media"),
    ("http://madskills.com/public/xml/rss/module/pingback/", "pingback"),
    ("https://podcastindex.org/namespace/1.0", "podcast"),
    ("http://prismstandard.org/namespaces/1.2/basic/", "prism"),
    ("http://podlove.org/simple-chapters", "psc"),
    ("http://www.w3.org/1999/02/22-rdf-syntax-ns#", "rdf"),
    ("http://www.w3.org/2000/01/rdf-schema#", "rdfs"),
    ("http://purl.org/rss/1.0/modules/reference/", "ref"),
    ("http://purl.org/rss/1.0/modules/richequiv/", "reqv"),
    ("http://purl.org/rss/1.0/modules/search/", "search"),
    ("http://purl.org/rss/1.0/modules/slash/", "slash"),
    ("http://schemas.xmlsoap.org/soap/envelope/", "soap"),
    ("http://purl.org/rss/1.0/modules/servicestatus/", "ss"),
    ("http://hacks.benhammersley.com/rss/streaming/", "str"),
    ("http://purl.org/rss/1.0/modules/subscription/", "sub"),
    ("http://purl.org/rss/1.0/modules/syndication/", "sy"),
    ("http://schemas.pocketsoap.com/rss/myDescModule/", "szf"),
    ("http://purl.org/rss/1.0/modules/taxonomy/", "taxo"),
    ("http://purl.org/syndication/thread/1.0", "thr"),
    ("http://purl.org/rss/1.0/modules/threading/", "thr"),
    ("http://purl.org/rss/1.0/modules/textinput/", "ti"),
    ("http://madskills.com/public/xml/rss/module/trackback/", "trackback"),
    ("http://wellformedweb.org/commentAPI/", "wfw"),
    ("http://purl.org/rss/1.0/modules/wiki/", "wiki"),
    ("http://www.w3.org/1999/xhtml", "xhtml"),
    ("http://www.w3.org/1999/xlink", "xlink"),
    ("http://www.w3.org/XML/1998/namespace", "xml"),
];

/// Returns the canonical prefix for a well-known namespace URI.
pub fn well_known_prefix(namespace_uri: &str) -> Option<&'static str> {
    CANONICAL_NAMESPACES
        .iter()
        .find(|(uri, _)| *uri == namespace_uri)
        .map(|(_, prefix)| *prefix)
}

/// Picks the extension bucket for an element.
///
/// Lookup order:
/// 1. the fixed table of well-known namespaces,
/// 2. the prefix the document itself used for the element,
/// 3. the namespace URI verbatim.
///
/// An element without a namespace goes to its (undeclared) prefix if it has
/// one, and to [`DEFAULT_PREFIX`] otherwise. Resolution never fails.
pub fn canonical_prefix(namespace_uri: Option<&str>, declared_prefix: Option<&str>) -> String {
    let declared = declared_prefix.filter(|p| !p.is_empty());

    let Some(uri) = namespace_uri.filter(|u| !u.is_empty()) else {
        return declared.unwrap_or(DEFAULT_PREFIX).to_string();
    };

    well_known_prefix(uri)
        .or(declared)
        .unwrap_or(uri)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_overrides_document_prefix() {
        assert_eq!(
            canonical_prefix(
                Some("http://www.itunes.com/DTDs/PodCast-1.0.dtd"),
                Some("podcast")
            ),
            "itunes"
        );
        assert_eq!(
            canonical_prefix(Some("http://purl.org/dc/elements/1.1/"), Some("DC")),
            "dc"
        );
        assert_eq!(
            canonical_prefix(Some("http://purl.org/dc/terms/"), None),
            "dcterms"
        );
    }

    #[test]
    fn test_unknown_namespace_uses_document_prefix() {
        assert_eq!(
            canonical_prefix(Some("http://example.com/ns/custom"), Some("cust")),
            "cust"
        );
    }

    #[test]
    fn test_unknown_namespace_without_prefix_uses_uri() {
        assert_eq!(
            canonical_prefix(Some("http://example.com/ns/custom"), None),
            "http://example.com/ns/custom"
        );
    }

    #[test]
    fn test_no_namespace_goes_to_default() {
        assert_eq!(canonical_prefix(None, None), "default");
        assert_eq!(canonical_prefix(Some(""), Some("")), "default");
    }

    #[test]
    fn test_undeclared_prefix_is_kept() {
        assert_eq!(canonical_prefix(None, Some("foo")), "foo");
    }

    #[test]
    fn test_table_has_no_duplicate_uris() {
        for (i, (uri, _)) in CANONICAL_NAMESPACES.iter().enumerate() {
            assert!(
                CANONICAL_NAMESPACES[i + 1..].iter().all(|(u, _)| u != uri),
                "duplicate namespace {uri}"
            );
        }
    }
}
