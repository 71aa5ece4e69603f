//! Cheap format sniffing over a bounded prefix of the document.
use std::io::{self, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::IgnoredAny;

use super::model::FeedType;

/// Bytes read before deciding. The same prefix is replayed to the parser.
pub const LOOKAHEAD: usize = 1024;

/// Reads up to [`LOOKAHEAD`] bytes from `reader` and sniffs the format.
///
/// Returns the bytes consumed alongside the result so the caller can rebuild
/// the full stream (`Cursor::new(prefix).chain(reader)`). Only read errors
/// propagate; an undecidable prefix is [`FeedType::Unknown`].
pub fn detect<R: Read>(reader: &mut R) -> io::Result<(FeedType, Vec<u8>)> {
    let mut prefix = Vec::with_capacity(LOOKAHEAD);
    reader.take(LOOKAHEAD as u64).read_to_end(&mut prefix)?;
    Ok((detect_bytes(&prefix), prefix))
}

/// Sniffs the format of a document prefix. Never fails and never panics.
///
/// A JSON document is only recognized when `prefix` holds all of it: a feed
/// larger than the lookahead window is reported as unknown.
pub fn detect_bytes(prefix: &[u8]) -> FeedType {
    let prefix = &prefix[..prefix.len().min(LOOKAHEAD)];
    let Some(start) = prefix
        .iter()
        .position(|&b| !b.is_ascii_whitespace() && !is_bom_byte(b))
    else {
        return FeedType::Unknown;
    };
    let body = &prefix[start..];

    match body[0] {
        b'{' => {
            if serde_json::from_slice::<IgnoredAny>(body).is_ok() {
                FeedType::Json
            } else {
                FeedType::Unknown
            }
        }
        b'<' => detect_xml(body),
        _ => FeedType::Unknown,
    }
}

/// Bytes of the UTF-8, UTF-16 and UTF-32 byte order marks.
fn is_bom_byte(b: u8) -> bool {
    matches!(b, 0xFE | 0xFF | 0x00 | 0xEF | 0xBB | 0xBF)
}

fn detect_xml(body: &[u8]) -> FeedType {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().check_end_names = false;

    loop {
        let name = match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => e.local_name().as_ref().to_ascii_lowercase(),
            Ok(Event::Eof) => return FeedType::Unknown,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "XML probe failed");
                return FeedType::Unknown;
            }
        };

        return match name.as_slice() {
            b"rss" | b"rdf" => FeedType::Rss,
            b"feed" => FeedType::Atom,
            _ => FeedType::Unknown,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    #[test]
    fn test_rss_and_rdf() {
        assert_eq!(detect_bytes(b"<rss version=\"2.0\"><channel/></rss>"), FeedType::Rss);
        assert_eq!(
            detect_bytes(b"<rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">"),
            FeedType::Rss
        );
        assert_eq!(detect_bytes(b"<RSS>"), FeedType::Rss);
    }

    #[test]
    fn test_atom() {
        assert_eq!(
            detect_bytes(b"<feed xmlns=\"http://www.w3.org/2005/Atom\"><title>x</title>"),
            FeedType::Atom
        );
    }

    #[test]
    fn test_prolog_is_skipped() {
        let doc = b"\xEF\xBB\xBF  \n<?xml version=\"1.0\"?>\n<!-- hi -->\n<!DOCTYPE rss>\n<rss>";
        assert_eq!(detect_bytes(doc), FeedType::Rss);
    }

    #[test]
    fn test_json() {
        assert_eq!(detect_bytes(b"  {\"version\": \"1.1\", \"items\": []}"), FeedType::Json);
    }

    #[test]
    fn test_truncated_json_is_unknown() {
        assert_eq!(detect_bytes(b"{\"version\": \"1.1\", \"items\": ["), FeedType::Unknown);

        let mut big = String::from("{\"title\": \"");
        big.push_str(&"x".repeat(LOOKAHEAD));
        big.push_str("\"}");
        let mut cursor = Cursor::new(big.into_bytes());
        let (feed_type, prefix) = detect(&mut cursor).unwrap();
        assert_eq!(feed_type, FeedType::Unknown);
        assert_eq!(prefix.len(), LOOKAHEAD);
    }

    #[test]
    fn test_unknown_inputs() {
        assert_eq!(detect_bytes(b""), FeedType::Unknown);
        assert_eq!(detect_bytes(b"   \n\t"), FeedType::Unknown);
        assert_eq!(detect_bytes(b"<html><body/></html>"), FeedType::Unknown);
        assert_eq!(detect_bytes(b"plain text"), FeedType::Unknown);
        assert_eq!(detect_bytes(b"<"), FeedType::Unknown);
    }

    #[test]
    fn test_detect_returns_consumed_prefix() {
        let doc = b"<rss><channel><title>t</title></channel></rss>".to_vec();
        let mut cursor = Cursor::new(doc.clone());
        let (feed_type, prefix) = detect(&mut cursor).unwrap();
        assert_eq!(feed_type, FeedType::Rss);

        let mut rebuilt = Vec::new();
        Cursor::new(prefix).chain(cursor).read_to_end(&mut rebuilt).unwrap();
        assert_eq!(rebuilt, doc);
    }

    proptest! {
        #[test]
        fn prop_detection_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let first = detect(&mut Cursor::new(bytes.clone())).unwrap().0;
            let second = detect(&mut Cursor::new(bytes)).unwrap().0;
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_known_roots(ws in "[ \t\r\n]{0,8}", root in prop::sample::select(vec!["rss", "rdf", "feed"])) {
            let doc = format!("{ws}<{root}>");
            let expected = if root == "feed" { FeedType::Atom } else { FeedType::Rss };
            prop_assert_eq!(detect_bytes(doc.as_bytes()), expected);
        }
    }
}
