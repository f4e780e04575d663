//! Pattern scan for stylesheet `url()` arguments.
//!
//! This is a byte scan, not a CSS parser. Comments and string escapes are
//! not interpreted, so a `url()` inside a comment is still reported.

use bstr::ByteSlice;
use memchr::memmem;

/// Every `url(...)` argument in `css`, in source order.
///
/// The function name matches case-insensitively. Whitespace around the
/// argument and one layer of single or double quotes are removed. Empty
/// arguments and a trailing `url(` without a closing parenthesis are
/// ignored.
///
/// ```
/// use imgaudit::audit::css::extract_urls;
///
/// let urls = extract_urls(r#"a { background: URL( "../images/a.png" ) } b { src: url(b.gif) }"#);
/// assert_eq!(urls, vec!["../images/a.png", "b.gif"]);
/// ```
pub fn extract_urls(css: &str) -> Vec<String> {
    let bytes = css.as_bytes();
    // ASCII lowercasing keeps byte offsets aligned with `bytes`.
    let folded = bytes.to_ascii_lowercase();
    let finder = memmem::Finder::new(b"url(");

    let mut urls = Vec::new();
    let mut pos = 0;

    while let Some(rel_start) = finder.find(&folded[pos..]) {
        let content_start = pos + rel_start + 4;

        if !is_function_start(&folded, pos + rel_start) {
            pos = content_start;
            continue;
        }

        let Some(len) = closing_paren(&bytes[content_start..]) else {
            break;
        };
        let argument = unquote(&bytes[content_start..content_start + len]);
        if !argument.is_empty() {
            urls.push(argument.to_str_lossy().into_owned());
        }
        pos = content_start + len + 1;
    }

    urls
}

/// `url(` only counts when it is not the tail of a longer identifier.
fn is_function_start(folded: &[u8], at: usize) -> bool {
    match at.checked_sub(1).map(|i| folded[i]) {
        Some(b) => !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'),
        None => true,
    }
}

/// Offset of the `)` closing an argument, skipping over a quoted string.
fn closing_paren(rest: &[u8]) -> Option<usize> {
    let lead = rest.len() - rest.trim_ascii_start().len();
    if let Some(&quote) = rest.get(lead)
        && matches!(quote, b'"' | b'\'')
        && let Some(end) = rest[lead + 1..].find_byte(quote)
    {
        let after = lead + 1 + end + 1;
        return rest[after..].find_byte(b')').map(|p| after + p);
    }
    rest.find_byte(b')')
}

fn unquote(argument: &[u8]) -> &[u8] {
    let trimmed = argument.trim_ascii();
    for quote in [b'"', b'\''] {
        if trimmed.len() >= 2 && trimmed[0] == quote && trimmed[trimmed.len() - 1] == quote {
            return trimmed[1..trimmed.len() - 1].trim_ascii();
        }
    }
    trimmed
}
