//! RFC 6901 JSON Pointer resolution over `serde_json` values.
//!
//! Pointers arrive either in plain form (`/components/schemas/User`) or as a
//! URI fragment (`#/components/schemas/User`, possibly percent-encoded).
use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::Error;

/// Escape a single pointer token: `~` becomes `~0`, `/` becomes `~1`.
#[must_use]
pub fn escape(token: &str) -> Cow<'_, str> {
    if !token.contains(['~', '/']) {
        return Cow::Borrowed(token);
    }
    let mut escaped = String::with_capacity(token.len() + 2);
    for ch in token.chars() {
        match ch {
            '~' => escaped.push_str("~0"),
            '/' => escaped.push_str("~1"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Unescape a single pointer token: `~1` becomes `/`, `~0` becomes `~`.
///
/// A stray `~` not followed by `0` or `1` is kept as a literal character.
#[must_use]
pub fn unescape(token: &str) -> Cow<'_, str> {
    if !token.contains('~') {
        return Cow::Borrowed(token);
    }
    let mut unescaped = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.peek() {
                Some('0') => {
                    chars.next();
                    unescaped.push('~');
                }
                Some('1') => {
                    chars.next();
                    unescaped.push('/');
                }
                _ => unescaped.push('~'),
            }
        } else {
            unescaped.push(ch);
        }
    }
    Cow::Owned(unescaped)
}

/// Split a pointer into unescaped tokens.
///
/// Accepts `#`, an empty string, `#/…`, `/…`, and percent-encoded fragments.
pub(crate) fn tokens(pointer: &str) -> Result<Vec<String>, Error> {
    let fragment = pointer.strip_prefix('#').unwrap_or(pointer);
    let decoded: Cow<'_, str> = if fragment.contains('%') {
        match percent_decode_str(fragment).decode_utf8() {
            Ok(decoded) => decoded,
            Err(_) => return Err(Error::invalid_percent_encoding(pointer)),
        }
    } else {
        Cow::Borrowed(fragment)
    };
    if decoded.is_empty() {
        return Ok(Vec::new());
    }
    if !decoded.starts_with('/') {
        return Err(Error::pointer_to_nowhere(pointer));
    }
    Ok(decoded
        .split('/')
        .skip(1)
        .map(|token| unescape(token).into_owned())
        .collect())
}

/// Rebuild the canonical `#/…` form of a pointer.
///
/// Canonical pointers are the node identity used by the reference graph and
/// the registry cache, so percent-encoded and plain spellings of the same
/// location collapse into one key.
pub(crate) fn canonical(pointer: &str) -> Result<String, Error> {
    Ok(canonical_from_tokens(&tokens(pointer)?))
}

pub(crate) fn canonical_from_tokens(tokens: &[String]) -> String {
    let mut canonical = String::from("#");
    for token in tokens {
        canonical.push('/');
        canonical.push_str(&escape(token));
    }
    canonical
}

/// Resolve a JSON Pointer against a document.
///
/// # Errors
///
/// Returns [`Error::PointerToNowhere`] when any token cannot be followed,
/// [`Error::InvalidArrayIndex`] for tokens that are not valid base-10 indexes
/// (leading zeros rejected), and [`Error::InvalidPercentEncoding`] for
/// fragments that do not decode to UTF-8.
pub fn resolve<'a>(document: &'a Value, pointer: &str) -> Result<&'a Value, Error> {
    let mut target = document;
    for token in tokens(pointer)? {
        match target {
            Value::Object(object) => {
                target = object
                    .get(&token)
                    .ok_or_else(|| Error::pointer_to_nowhere(pointer))?;
            }
            Value::Array(items) => {
                let index = parse_index(pointer, &token)?;
                target = items
                    .get(index)
                    .ok_or_else(|| Error::pointer_to_nowhere(pointer))?;
            }
            _ => return Err(Error::pointer_to_nowhere(pointer)),
        }
    }
    Ok(target)
}

fn parse_index(pointer: &str, token: &str) -> Result<usize, Error> {
    if token.len() > 1 && token.starts_with('0') {
        return Err(Error::invalid_array_index(pointer, token));
    }
    token
        .parse::<usize>()
        .map_err(|_| Error::invalid_array_index(pointer, token))
}
