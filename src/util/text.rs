//! String helpers for building user-facing text and URLs.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use std::sync::LazyLock;

/// Characters removed by [`strip_punctuation`].
const PUNCTUATION: &[char] = &[
    '/', '.', ',', '-', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '_', '`', '~',
    '(', ')', '\'', '"',
];

static MULTI_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"));

/// Join words into a language-friendly enumeration.
///
/// ```
/// use preloadkit::util::text::create_enumeration_string;
///
/// assert_eq!(create_enumeration_string(&["cat"]), "cat");
/// assert_eq!(create_enumeration_string(&["cat", "dog"]), "cat and dog");
/// assert_eq!(create_enumeration_string(&["cat", "dog", "bird"]), "cat, dog, and bird");
/// ```
pub fn create_enumeration_string<S: AsRef<str>>(words: &[S]) -> String {
    match words {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let mut out = String::new();
            for word in init {
                out.push_str(word.as_ref());
                out.push_str(", ");
            }
            out.push_str("and ");
            out.push_str(last.as_ref());
            out
        }
    }
}

/// Replace every `$$n$$` in `format` with the n-th argument.
///
/// Placeholders without a matching argument are left in place.
pub fn format_string<S: ToString>(format: &str, args: &[S]) -> String {
    let mut out = format.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("$${}$$", i), &arg.to_string());
    }
    out
}

/// Map a one-based index to an uppercase letter: 1 -> 'A', 2 -> 'B'.
pub fn letter_for_index(index: u32) -> Option<char> {
    match index {
        1..=26 => char::from_u32(64 + index),
        _ => None,
    }
}

/// Append query parameters to `url`, percent-encoding every value.
///
/// A `?` is added if the url has none; an `&` separates each parameter
/// from whatever precedes it unless the url already ends in `?` or `&`.
pub fn add_url_params<K: AsRef<str>, V: AsRef<str>>(url: &str, params: &[(K, V)]) -> String {
    let mut out = url.to_string();
    if !out.contains('?') {
        out.push('?');
    }
    for (key, value) in params {
        if !out.ends_with('?') && !out.ends_with('&') {
            out.push('&');
        }
        out.push_str(key.as_ref());
        out.push('=');
        out.push_str(&encode_uri_component(value.as_ref()));
    }
    out
}

/// Remove every occurrence of the named query parameter from `url`.
///
/// Parameters may be separated by `&` or `;`; the survivors are rejoined
/// with `&`. When no parameter survives the `?` is dropped as well.
pub fn remove_parameter(url: &str, parameter: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let prefix = format!("{}=", encode_uri_component(parameter));
    let kept: Vec<&str> = query
        .split(['&', ';'])
        .filter(|part| !part.starts_with(&prefix))
        .collect();
    if kept.iter().all(|part| part.is_empty()) {
        base.to_string()
    } else {
        format!("{}?{}", base, kept.join("&"))
    }
}

/// Replace all literal (non-regex) occurrences of `pattern`.
/// An empty pattern leaves the input unchanged.
pub fn replace_all(input: &str, pattern: &str, replacement: &str) -> String {
    if pattern.is_empty() {
        return input.to_string();
    }
    input.replace(pattern, replacement)
}

pub fn capitalize_first_letter(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Remove punctuation and collapse runs of whitespace to a single space.
pub fn strip_punctuation(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| !PUNCTUATION.contains(c)).collect();
    MULTI_SPACE_RE.replace_all(&stripped, " ").into_owned()
}

pub fn trim_whitespace(input: &str) -> String {
    input.trim().to_string()
}

/// Bytes left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}
