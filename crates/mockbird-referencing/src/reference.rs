//! Classification of `$ref` values.
//!
//! Only fragment references and bare `$id` strings resolve inside a single
//! document; everything else is classified as external so callers can surface
//! a structured diagnostic instead of fetching.
use url::Url;

use crate::Error;

/// The resolution strategy implied by a `$ref` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    /// `#` — the document root.
    Root,
    /// `#/…` — a JSON Pointer into the document, kept verbatim.
    Pointer(String),
    /// `#name` — a `$anchor` to search for.
    Anchor(String),
    /// A bare string matched exactly against `$id` declarations.
    Id(String),
    /// Anything pointing outside the document.
    External {
        scheme: Option<String>,
        host: Option<String>,
        path: String,
    },
}

/// Classify a `$ref` string.
///
/// # Errors
///
/// Returns [`Error::MalformedRef`] with a fix-it suggestion for values that
/// cannot be any of the supported forms: double `#`, a fragment that is
/// neither a pointer nor a valid anchor name, embedded spaces or backslashes,
/// and query strings.
pub fn classify(reference: &str) -> Result<RefTarget, Error> {
    if reference.is_empty() {
        return Err(Error::malformed_ref(
            reference,
            "an empty reference resolves nothing; use '#' for the document root",
        ));
    }
    if let Some(space) = reference.find(' ') {
        return Err(Error::malformed_ref(
            reference,
            format!("unescaped space at offset {space}; percent-encode it as '%20'"),
        ));
    }
    if reference.contains('\\') {
        return Err(Error::malformed_ref(
            reference,
            "backslashes are not valid in JSON Pointers; use '/' as the separator",
        ));
    }
    if reference.matches('#').count() > 1 {
        return Err(Error::malformed_ref(
            reference,
            "a reference may contain at most one '#' fragment marker",
        ));
    }

    if let Some(fragment) = reference.strip_prefix('#') {
        if fragment.is_empty() {
            return Ok(RefTarget::Root);
        }
        if let Some(query) = fragment.find('?') {
            return Err(Error::malformed_ref(
                reference,
                format!("query string at offset {query}; fragments cannot carry queries"),
            ));
        }
        if fragment.starts_with('/') {
            return Ok(RefTarget::Pointer(reference.to_string()));
        }
        if is_anchor_name(fragment) {
            return Ok(RefTarget::Anchor(fragment.to_string()));
        }
        if fragment.contains('/') {
            return Err(Error::malformed_ref(
                reference,
                format!("missing '/' after '#'; did you mean '#/{fragment}'?"),
            ));
        }
        return Err(Error::malformed_ref(
            reference,
            "a fragment must be a JSON Pointer ('#/…') or an anchor name",
        ));
    }

    if let Ok(url) = Url::parse(reference) {
        return Ok(RefTarget::External {
            scheme: Some(url.scheme().to_string()),
            host: url.host_str().map(ToString::to_string),
            path: url.path().to_string(),
        });
    }
    if reference.contains('/') {
        // Relative file path, e.g. `common/errors.json`.
        return Ok(RefTarget::External {
            scheme: None,
            host: None,
            path: reference.to_string(),
        });
    }
    Ok(RefTarget::Id(reference.to_string()))
}

/// Anchor names per 2020-12: a letter followed by letters, digits, `-`, `_`,
/// `:`, or `.`.
fn is_anchor_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.'))
}

#[cfg(test)]
mod tests {
    use super::{classify, RefTarget};
    use crate::Error;
    use test_case::test_case;

    #[test]
    fn root() {
        assert_eq!(classify("#").unwrap(), RefTarget::Root);
    }

    #[test_case("#/components/schemas/User")]
    #[test_case("#/$defs/Node")]
    #[test_case("#/a~0b/a~1b")]
    fn pointers(reference: &str) {
        assert_eq!(
            classify(reference).unwrap(),
            RefTarget::Pointer(reference.to_string())
        );
    }

    #[test_case("#node", "node")]
    #[test_case("#my-anchor_1", "my-anchor_1")]
    fn anchors(reference: &str, name: &str) {
        assert_eq!(classify(reference).unwrap(), RefTarget::Anchor(name.into()));
    }

    #[test_case("User")]
    #[test_case("urn-less-identifier")]
    fn bare_ids(reference: &str) {
        assert_eq!(classify(reference).unwrap(), RefTarget::Id(reference.into()));
    }

    #[test]
    fn external_with_scheme() {
        match classify("https://example.com/schemas/user.json").unwrap() {
            RefTarget::External { scheme, host, path } => {
                assert_eq!(scheme.as_deref(), Some("https"));
                assert_eq!(host.as_deref(), Some("example.com"));
                assert_eq!(path, "/schemas/user.json");
            }
            other => panic!("expected external, got {other:?}"),
        }
    }

    #[test]
    fn external_relative_path() {
        match classify("common/errors.json").unwrap() {
            RefTarget::External { scheme, host, path } => {
                assert_eq!(scheme, None);
                assert_eq!(host, None);
                assert_eq!(path, "common/errors.json");
            }
            other => panic!("expected external, got {other:?}"),
        }
    }

    #[test_case(""; "empty")]
    #[test_case("#/a#/b"; "double hash")]
    #[test_case("#defs/Node"; "missing slash after hash")]
    #[test_case("#/a b"; "space")]
    #[test_case("#\\defs"; "backslash")]
    #[test_case("#/a?b=c"; "query string")]
    #[test_case("#1abc"; "anchor starting with a digit")]
    fn malformed(reference: &str) {
        assert!(matches!(
            classify(reference),
            Err(Error::MalformedRef { .. })
        ));
    }

    #[test]
    fn missing_slash_suggestion_names_the_fix() {
        let error = classify("#defs/Node").unwrap_err();
        assert!(error.suggestion().unwrap().contains("#/defs/Node"));
    }
}
