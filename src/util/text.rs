use std::borrow::Cow;

/// Removes bytes that may not appear anywhere in an XML document.
///
/// Strips C0 control characters other than TAB, LF and CR, the DEL byte, and
/// the UTF-8 encodings of the non-characters U+FFFE and U+FFFF. Multi-byte
/// UTF-8 sequences are otherwise left untouched.
///
/// The fast path (a single scan with no allocation) makes calls on already-clean
/// documents essentially free.
pub fn strip_invalid_xml_chars(input: &[u8]) -> Cow<'_, [u8]> {
    let len = input.len();

    let needs_strip = input
        .iter()
        .enumerate()
        .any(|(i, &b)| is_invalid_control(b) || is_non_character_at(input, i));

    if !needs_strip {
        return Cow::Borrowed(input);
    }

    let mut out = Vec::with_capacity(len);
    let mut i = 0;
    while i < len {
        let b = input[i];
        if is_invalid_control(b) {
            i += 1;
            continue;
        }
        if is_non_character_at(input, i) {
            i += 3;
            continue;
        }
        out.push(b);
        i += 1;
    }

    Cow::Owned(out)
}

fn is_invalid_control(b: u8) -> bool {
    b == 0x7f || (b < 0x20 && b != 0x09 && b != 0x0a && b != 0x0d)
}

/// U+FFFE / U+FFFF encode as EF BF BE / EF BF BF.
fn is_non_character_at(input: &[u8], i: usize) -> bool {
    input.len() >= i + 3
        && input[i] == 0xef
        && input[i + 1] == 0xbf
        && (input[i + 2] == 0xbe || input[i + 2] == 0xbf)
}

/// Longest entity name accepted as an existing reference (`&name;`).
const MAX_ENTITY_LEN: usize = 32;

/// Escapes bare `<` and `&` that cannot start markup or an entity reference.
///
/// Comments, CDATA sections and processing instructions are copied verbatim.
/// Inside tags, only bare `&` within quoted attribute values is rewritten.
/// A `<` followed by something that can start a tag name, `/`, `!` or `?` is
/// treated as markup; anything else (`a < b`, `<3`) becomes `&lt;`.
pub fn escape_unescaped_markup(input: &[u8]) -> Cow<'_, [u8]> {
    if !needs_markup_repair(input) {
        return Cow::Borrowed(input);
    }

    let len = input.len();
    let mut out = Vec::with_capacity(len + 16);
    let mut i = 0;

    while i < len {
        let b = input[i];
        match b {
            b'<' => {
                let rest = &input[i..];
                if let Some(end) = verbatim_section_end(rest) {
                    out.extend_from_slice(&rest[..end]);
                    i += end;
                } else if starts_markup(rest) {
                    i += copy_tag(rest, &mut out);
                } else {
                    out.extend_from_slice(b"&lt;");
                    i += 1;
                }
            }
            b'&' => {
                if starts_reference(&input[i..]) {
                    out.push(b'&');
                } else {
                    out.extend_from_slice(b"&amp;");
                }
                i += 1;
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }

    Cow::Owned(out)
}

/// Cheap pre-scan so well-formed documents are never copied.
fn needs_markup_repair(input: &[u8]) -> bool {
    input.iter().enumerate().any(|(i, &b)| match b {
        b'<' => !starts_markup(&input[i..]),
        b'&' => !starts_reference(&input[i..]),
        _ => false,
    })
}

fn starts_markup(rest: &[u8]) -> bool {
    match rest.get(1) {
        Some(&c) => c == b'/' || c == b'!' || c == b'?' || is_name_start(c),
        None => false,
    }
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b':' || c >= 0x80
}

fn starts_reference(rest: &[u8]) -> bool {
    let body = &rest[1..];
    let Some(semi) = body.iter().take(MAX_ENTITY_LEN + 1).position(|&c| c == b';') else {
        return false;
    };
    let name = &body[..semi];
    match name {
        [] => false,
        [b'#', b'x' | b'X', hex @ ..] => !hex.is_empty() && hex.iter().all(u8::is_ascii_hexdigit),
        [b'#', digits @ ..] => !digits.is_empty() && digits.iter().all(u8::is_ascii_digit),
        _ => {
            is_name_start(name[0])
                && name
                    .iter()
                    .all(|&c| is_name_start(c) || c.is_ascii_digit() || c == b'-' || c == b'.')
        }
    }
}

/// Length of a comment, CDATA section or processing instruction at the start of
/// `rest`, including its terminator. Unterminated sections run to end of input.
fn verbatim_section_end(rest: &[u8]) -> Option<usize> {
    let (open, close): (&[u8], &[u8]) = if rest.starts_with(b"<!--") {
        (b"<!--", b"-->")
    } else if rest.starts_with(b"<![CDATA[") {
        (b"<![CDATA[", b"]]>")
    } else if rest.starts_with(b"<?") {
        (b"<?", b"?>")
    } else {
        return None;
    };

    let body = &rest[open.len()..];
    let end = body
        .windows(close.len())
        .position(|w| w == close)
        .map(|p| open.len() + p + close.len())
        .unwrap_or(rest.len());
    Some(end)
}

/// Copies one tag (up to and including its closing `>`), escaping bare `&`
/// inside quoted attribute values. Returns the number of input bytes consumed.
fn copy_tag(rest: &[u8], out: &mut Vec<u8>) -> usize {
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < rest.len() {
        let c = rest[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) if c == b'&' && !starts_reference(&rest[i..]) => {
                out.extend_from_slice(b"&amp;");
                i += 1;
                continue;
            }
            Some(_) => {}
            None if c == b'"' || c == b'\'' => quote = Some(c),
            None if c == b'>' => {
                out.push(c);
                return i + 1;
            }
            None => {}
        }
        out.push(c);
        i += 1;
    }
    i
}
