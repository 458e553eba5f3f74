//! Guarded regex execution for `pattern`, `patternProperties`, and the
//! `regex` format.
//!
//! Patterns are ECMA 262 regexes. Rust's engines give `\d`/`\w`/`\s`
//! Unicode semantics, so those shorthand classes are rewritten to their
//! ASCII (ECMA) bracket equivalents and `\cX` control escapes are resolved
//! before compilation.
//!
//! Three failure classes, none of which may silently pass:
//! - invalid pattern: the owning keyword fails;
//! - haystack longer than the guard: the owning keyword fails;
//! - slow match: logged, result still honored.
use std::time::Instant;

use ahash::AHashMap;
use fancy_regex::Regex;
use tracing::warn;

/// Haystacks longer than this are rejected instead of matched.
pub(crate) const DEFAULT_MAX_HAYSTACK: usize = 262_144;

/// Matches slower than this are reported via `tracing`.
const SLOW_MATCH_MILLIS: u128 = 100;

/// The ECMA `\s` set: ASCII whitespace plus the extended members JS names.
const ECMA_WHITESPACE: &str = " \t\n\r\u{b}\u{c}\u{a0}\u{2003}\u{2029}\u{feff}";

/// Why a guarded match could not produce a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RegexGuard {
    /// The pattern did not compile as an ECMA-style regex.
    InvalidPattern,
    /// The haystack exceeded the configured length ceiling.
    HaystackTooLong { limit: usize },
    /// The engine gave up (backtracking limit).
    Exhausted,
}

pub(crate) struct SafeRegex {
    regex: Regex,
    pattern: String,
}

impl SafeRegex {
    pub(crate) fn compile(pattern: &str) -> Result<SafeRegex, RegexGuard> {
        let rewritten = to_ecma_classes(pattern)?;
        match Regex::new(&rewritten) {
            Ok(regex) => Ok(SafeRegex {
                regex,
                pattern: pattern.to_string(),
            }),
            Err(_) => Err(RegexGuard::InvalidPattern),
        }
    }

    /// Unanchored search, guarded by haystack length and wall clock.
    pub(crate) fn is_match(
        &self,
        haystack: &str,
        max_haystack: usize,
    ) -> Result<bool, RegexGuard> {
        if haystack.len() > max_haystack {
            return Err(RegexGuard::HaystackTooLong {
                limit: max_haystack,
            });
        }
        let started = Instant::now();
        let outcome = self.regex.is_match(haystack);
        let elapsed = started.elapsed().as_millis();
        if elapsed > SLOW_MATCH_MILLIS {
            warn!(
                pattern = self.pattern,
                elapsed_ms = elapsed,
                "slow regex match"
            );
        }
        outcome.map_err(|_| RegexGuard::Exhausted)
    }
}

/// Rewrite the ECMA escapes Rust disagrees about: shorthand classes become
/// ASCII bracket sets, `\cX` becomes the control character it names. Other
/// escapes pass through untouched; a trailing backslash is an error.
fn to_ecma_classes(pattern: &str) -> Result<String, RegexGuard> {
    let mut rewritten = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars();
    while let Some(current) = chars.next() {
        if current != '\\' {
            rewritten.push(current);
            continue;
        }
        match chars.next() {
            Some('d') => rewritten.push_str("[0-9]"),
            Some('D') => rewritten.push_str("[^0-9]"),
            Some('w') => rewritten.push_str("[A-Za-z0-9_]"),
            Some('W') => rewritten.push_str("[^A-Za-z0-9_]"),
            Some('s') => {
                rewritten.push('[');
                rewritten.push_str(ECMA_WHITESPACE);
                rewritten.push(']');
            }
            Some('S') => {
                rewritten.push_str("[^");
                rewritten.push_str(ECMA_WHITESPACE);
                rewritten.push(']');
            }
            Some('c') => match chars.next() {
                Some(letter) if letter.is_ascii_alphabetic() => {
                    rewritten.push((letter.to_ascii_uppercase() as u8 % 32) as char);
                }
                _ => return Err(RegexGuard::InvalidPattern),
            },
            Some(other) => {
                rewritten.push('\\');
                rewritten.push(other);
            }
            None => return Err(RegexGuard::InvalidPattern),
        }
    }
    Ok(rewritten)
}

/// Per-call compile cache; validators are short-lived, so this only
/// deduplicates compilation within one validation pass.
#[derive(Default)]
pub(crate) struct RegexCache {
    compiled: AHashMap<String, Result<SafeRegex, RegexGuard>>,
}

impl RegexCache {
    pub(crate) fn get(&mut self, pattern: &str) -> &Result<SafeRegex, RegexGuard> {
        if !self.compiled.contains_key(pattern) {
            self.compiled
                .insert(pattern.to_string(), SafeRegex::compile(pattern));
        }
        &self.compiled[pattern]
    }
}

#[cfg(test)]
mod tests {
    use super::{RegexGuard, SafeRegex, DEFAULT_MAX_HAYSTACK};
    use test_case::test_case;

    fn matches(pattern: &str, haystack: &str) -> bool {
        SafeRegex::compile(pattern)
            .unwrap()
            .is_match(haystack, DEFAULT_MAX_HAYSTACK)
            .unwrap()
    }

    #[test]
    fn plain_match() {
        let regex = SafeRegex::compile("^[a-z]+$").unwrap();
        assert_eq!(regex.is_match("abc", DEFAULT_MAX_HAYSTACK), Ok(true));
        assert_eq!(regex.is_match("ABC", DEFAULT_MAX_HAYSTACK), Ok(false));
    }

    #[test]
    fn lookahead_is_supported() {
        let regex = SafeRegex::compile(r"^(?=.*[0-9])\w+$").unwrap();
        assert_eq!(regex.is_match("abc1", DEFAULT_MAX_HAYSTACK), Ok(true));
        assert_eq!(regex.is_match("abcd", DEFAULT_MAX_HAYSTACK), Ok(false));
    }

    #[test_case(r"^\w+$", "snake_case_1", true)]
    #[test_case(r"^\w+$", "café", false; "w is ascii only")]
    #[test_case(r"^\w+$", "Ω", false; "w rejects greek letters")]
    #[test_case(r"^\d+$", "0042", true)]
    #[test_case(r"^\d+$", "١٢٣", false; "d rejects arabic indic digits")]
    #[test_case(r"^\D+$", "abc", true)]
    #[test_case(r"^\s$", "\u{a0}", true; "s includes no break space")]
    #[test_case(r"^\S+$", "abc", true)]
    #[test_case(r"^[\w\-]+$", "CC-BY-4", true; "class shorthand nests in brackets")]
    #[test_case(r"^\W+$", "1_0", false)]
    #[test_case(r"\\w", r"\w", true; "escaped backslash stays literal")]
    #[test_case(r"^\cJ$", "\n", true; "control escape")]
    fn ecma_class_semantics(pattern: &str, haystack: &str, expected: bool) {
        assert_eq!(matches(pattern, haystack), expected);
    }

    #[test_case("(unclosed")]
    #[test_case(r"\"; "trailing backslash")]
    #[test_case(r"\d\"; "class then trailing backslash")]
    #[test_case(r"\c1"; "control escape needs a letter")]
    fn invalid_patterns_are_errors(pattern: &str) {
        assert!(matches!(
            SafeRegex::compile(pattern),
            Err(RegexGuard::InvalidPattern)
        ));
    }

    #[test]
    fn overlong_haystack_is_rejected() {
        let regex = SafeRegex::compile("a+").unwrap();
        let haystack = "a".repeat(32);
        assert_eq!(
            regex.is_match(&haystack, 16),
            Err(RegexGuard::HaystackTooLong { limit: 16 })
        );
    }
}
