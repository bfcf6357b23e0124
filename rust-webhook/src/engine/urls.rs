//! Strict URL extraction from plain text.
//!
//! Only links with an explicit scheme (`https://…`, `ftp://…`, `mailto:…`)
//! count. Bare domains such as `example.com` are ignored.

use std::sync::OnceLock;

use regex::Regex;

fn strict_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:[a-z][a-z0-9+.\-]*://|mailto:)[^\s<>"]+"#)
            .expect("Invalid strict URL pattern")
    })
}

/// Find all strict URLs in `text`, in order of appearance.
pub fn extract_strict_urls(text: &str) -> Vec<&str> {
    strict_url_regex()
        .find_iter(text)
        .filter_map(|m| trim_trailing(m.as_str()))
        .collect()
}

/// Drop sentence punctuation and unbalanced closing brackets from the end of
/// a match. Returns `None` when nothing remains after the scheme.
fn trim_trailing(candidate: &str) -> Option<&str> {
    let mut url = candidate;

    while let Some(last) = url.chars().last() {
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' => true,
            ')' => url.matches(')').count() > url.matches('(').count(),
            ']' => url.matches(']').count() > url.matches('[').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }

    let (_, rest) = url.split_once(':')?;
    if rest.trim_start_matches('/').is_empty() {
        return None;
    }

    Some(url)
}
