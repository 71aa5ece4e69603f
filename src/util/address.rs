/// Splits a combined author string into `(name, email)`.
///
/// Feeds encode people in a handful of ways:
///
/// - `Jane Doe <jane@example.com>` (RFC 5322 style)
/// - `jane@example.com (Jane Doe)` (the form the RSS 2.0 spec recommends)
/// - `jane@example.com`
/// - `Jane Doe`
///
/// Either half may come back empty. Surrounding whitespace and quotes around
/// the display name are removed.
pub fn parse_name_address(raw: &str) -> (String, String) {
    let s = raw.trim();
    if s.is_empty() {
        return (String::new(), String::new());
    }

    if let (Some(open), Some(close)) = (s.find('<'), s.rfind('>')) {
        if open < close {
            let name = clean_name(&s[..open]);
            let email = s[open + 1..close].trim().to_string();
            return (name, email);
        }
    }

    if let (Some(open), Some(close)) = (s.find('('), s.rfind(')')) {
        let head = s[..open].trim();
        if open < close && is_email(head) {
            let name = clean_name(&s[open + 1..close]);
            return (name, head.to_string());
        }
    }

    if is_email(s) {
        return (String::new(), s.to_string());
    }

    (clean_name(s), String::new())
}

fn is_email(s: &str) -> bool {
    !s.is_empty()
        && !s.contains(char::is_whitespace)
        && s.find('@').is_some_and(|at| at > 0 && at + 1 < s.len())
}

fn clean_name(s: &str) -> String {
    s.trim().trim_matches('"').trim().to_string()
}
