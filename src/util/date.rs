//! Heuristic date normalization.
//!
//! Feeds are supposed to carry RFC 822 (RSS) or RFC 3339 (Atom, JSON Feed)
//! timestamps. In practice they carry almost anything: two-digit years,
//! missing leading zeros, weekday names that do not match the date, stray
//! commas, and time zone abbreviations RFC 822 never heard of.
//!
//! [`parse_date`] first tries the RFC layouts on the trimmed input. In lenient
//! mode it then rewrites the input into a canonical shape (commas removed,
//! whitespace collapsed, weekday dropped, zone abbreviation replaced by a
//! numeric offset) and walks a fixed, priority-ordered layout list. The first
//! layout that consumes the whole string wins.
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::options::ParseOptions;

/// A date string matched none of the known layouts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("unparseable date: {0:?}")]
    Unparseable(String),
}

/// Layouts that carry an explicit numeric offset (`%z`).
///
/// `%Y` happily reads `06` as the year 6, so every two-digit-year layout comes
/// before its four-digit twin (`%y` cannot match a four-digit year).
const OFFSET_LAYOUTS: &[&str] = &[
    "%d %b %y %H:%M:%S %z",
    "%d %b %y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%b %d %Y %H:%M:%S %z",
    "%d-%b-%y %H:%M:%S %z",
    "%d-%b-%Y %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y/%m/%d %H:%M:%S %z",
];

/// Layouts without zone information; interpreted as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only layouts; interpreted as midnight UTC.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%b %d %Y", "%Y/%m/%d", "%m/%d/%Y"];

/// Zone abbreviations seen in the wild, mapped to numeric offsets.
const ZONE_OFFSETS: &[(&str, &str)] = &[
    ("UT", "+0000"),
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("Z", "+0000"),
    ("WET", "+0000"),
    ("WEST", "+0100"),
    ("BST", "+0100"),
    ("CET", "+0100"),
    ("CEST", "+0200"),
    ("EET", "+0200"),
    ("EEST", "+0300"),
    ("MSK", "+0300"),
    ("IST", "+0530"),
    ("HKT", "+0800"),
    ("SGT", "+0800"),
    ("AWST", "+0800"),
    ("JST", "+0900"),
    ("KST", "+0900"),
    ("ACST", "+0930"),
    ("AEST", "+1000"),
    ("AEDT", "+1100"),
    ("NZST", "+1200"),
    ("NZDT", "+1300"),
    ("NST", "-0330"),
    ("NDT", "-0230"),
    ("AST", "-0400"),
    ("ADT", "-0300"),
    ("EST", "-0500"),
    ("EDT", "-0400"),
    ("CST", "-0600"),
    ("CDT", "-0500"),
    ("MST", "-0700"),
    ("MDT", "-0600"),
    ("PST", "-0800"),
    ("PDT", "-0700"),
    ("AKST", "-0900"),
    ("AKDT", "-0800"),
    ("HST", "-1000"),
];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Parses a feed date string into a UTC timestamp.
///
/// With `lenient == false` only RFC 3339 and RFC 2822 (which covers RFC 822
/// and RFC 1123, numeric and named zones) are accepted.
pub fn parse_date(raw: &str, lenient: bool) -> Result<DateTime<Utc>, DateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DateError::Unparseable(raw.to_string()));
    }

    if let Some(dt) = parse_rfc(trimmed) {
        return Ok(dt);
    }

    if lenient {
        let canonical = canonicalize(trimmed);
        if let Some(dt) = parse_rfc(&canonical).or_else(|| parse_layouts(&canonical)) {
            return Ok(dt);
        }
    }

    Err(DateError::Unparseable(raw.to_string()))
}

/// Normalizes an optional date field according to the parse options.
///
/// Returns `None` when date parsing is disabled or the string is unparseable;
/// a bad date never aborts the surrounding parse.
pub(crate) fn parse_date_field(raw: &str, options: &ParseOptions) -> Option<DateTime<Utc>> {
    if !options.parse_dates || raw.trim().is_empty() {
        return None;
    }
    match parse_date(raw, options.strictness.allow_incorrect_date_formats) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::debug!(error = %e, "Leaving date field unparsed");
            None
        }
    }
}

fn parse_rfc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_layouts(s: &str) -> Option<DateTime<Utc>> {
    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(s, layout) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
                return Some(Utc.from_utc_datetime(&ndt));
            }
        }
    }
    None
}

/// Rewrites a messy date string into the shape the lenient layouts expect.
fn canonicalize(s: &str) -> String {
    let without_commas = s.replace(',', " ");
    let mut tokens: Vec<String> = without_commas
        .split_whitespace()
        .map(str::to_string)
        .collect();

    if tokens.len() > 1 && is_weekday(&tokens[0]) {
        tokens.remove(0);
    }

    if let Some(last) = tokens.last_mut() {
        if let Some(offset) = zone_offset(last) {
            *last = offset.to_string();
        } else if let Some(stripped) = strip_zulu(last) {
            *last = stripped;
        }
    }

    tokens.join(" ")
}

fn is_weekday(token: &str) -> bool {
    let lower = token.trim_end_matches('.').to_ascii_lowercase();
    lower.len() >= 3
        && lower.chars().all(|c| c.is_ascii_alphabetic())
        && WEEKDAYS.iter().any(|day| day.starts_with(&lower))
}

fn zone_offset(token: &str) -> Option<&'static str> {
    ZONE_OFFSETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, offset)| *offset)
}

/// `2006-01-02T15:04Z` -> `2006-01-02T15:04+0000`
fn strip_zulu(token: &str) -> Option<String> {
    let body = token.strip_suffix('Z').or_else(|| token.strip_suffix('z'))?;
    body.chars()
        .last()
        .filter(char::is_ascii_digit)
        .map(|_| format!("{body}+0000"))
}
