// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Quote/unquote processing.
//!
//! `unquote` strips a single leading quoted region (single- or
//! double-quoted, or bare) from a value, discarding anything after the
//! closing quote. `quote` is its inverse: given a [`QuoteType`] it wraps a
//! string so that unquoting it recovers the original.

use crate::QuoteType;
use crate::error::QuoteError;

/// Splits `input` into its quoted content and the [`QuoteType`] that was
/// used, scanning past any leading whitespace first if `strip_spaces` is
/// set.
///
/// For a single-quoted input, the only recognized escape is `escape_char`
/// immediately followed by the quote character itself (collapsed to a
/// literal quote) or by another `escape_char` (collapsed to one
/// `escape_char`); every other character is passed through completely
/// unprocessed, matching the "opaque" single-quote semantics documented for
/// the expansion engine. For a double-quoted input, an `escape_char`
/// followed by any character is retained as a literal two-character
/// sequence in the returned content — enough to keep the real closing quote
/// from being mistaken for an escaped one — and is left for a later call to
/// [`crate::escape::unescape`] to resolve.
pub fn unquote(
    input: &str,
    escape_char: char,
    strip_spaces: bool,
) -> Result<(String, QuoteType), QuoteError> {
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    if strip_spaces {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
    }
    match chars.get(i) {
        Some('\'') => {
            let content = scan_single(&chars, i + 1, '\'', escape_char)?;
            Ok((content, QuoteType::Single))
        }
        Some('"') => {
            let content = scan_double(&chars, i + 1, '"', escape_char)?;
            Ok((content, QuoteType::Double))
        }
        _ => Ok((chars[i..].iter().collect(), QuoteType::None)),
    }
}

fn scan_single(
    chars: &[char],
    start: usize,
    quote_char: char,
    escape_char: char,
) -> Result<String, QuoteError> {
    let mut content = String::new();
    let mut i = start;
    loop {
        match chars.get(i) {
            None => return Err(QuoteError::UnterminatedQuote),
            Some(&c) if c == quote_char => return Ok(content),
            Some(&c) if c == escape_char => match chars.get(i + 1) {
                Some(&next) if next == quote_char => {
                    content.push(quote_char);
                    i += 2;
                }
                Some(&next) if next == escape_char => {
                    content.push(escape_char);
                    i += 2;
                }
                Some(&next) => {
                    content.push(escape_char);
                    content.push(next);
                    i += 2;
                }
                None => return Err(QuoteError::UnterminatedQuote),
            },
            Some(&c) => {
                content.push(c);
                i += 1;
            }
        }
    }
}

fn scan_double(
    chars: &[char],
    start: usize,
    quote_char: char,
    escape_char: char,
) -> Result<String, QuoteError> {
    let mut content = String::new();
    let mut i = start;
    loop {
        match chars.get(i) {
            None => return Err(QuoteError::UnterminatedQuote),
            Some(&c) if c == quote_char => return Ok(content),
            Some(&c) if c == escape_char => match chars.get(i + 1) {
                Some(&next) => {
                    content.push(c);
                    content.push(next);
                    i += 2;
                }
                None => return Err(QuoteError::UnterminatedQuote),
            },
            Some(&c) => {
                content.push(c);
                i += 1;
            }
        }
    }
}

/// Wraps `input` in the quote style named by `quote_type`, escaping
/// internal occurrences of the quote character and `escape_char` so that
/// [`unquote`] recovers `input` exactly.
///
/// `QuoteType::None` returns `input` unchanged.
pub fn quote(input: &str, quote_type: QuoteType, escape_char: char) -> String {
    let Some(quote_char) = quote_type.quote_char() else {
        return input.to_string();
    };
    let mut out = String::with_capacity(input.len() + 2);
    out.push(quote_char);
    for c in input.chars() {
        if c == quote_char || c == escape_char {
            out.push(escape_char);
        }
        out.push(c);
    }
    out.push(quote_char);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::unescape;

    /// Mirrors what the expansion engine does with the default flags
    /// (`SKIP_SINGLE_QUOTED | UNESCAPE`): single-quoted content is used
    /// as-is, everything else passes through the escape codec too.
    fn unquote_and_resolve(input: &str, escape_char: char) -> Result<(String, QuoteType), QuoteError> {
        let (content, quote_type) = unquote(input, escape_char, false)?;
        match quote_type {
            QuoteType::Single => Ok((content, quote_type)),
            _ => Ok((unescape(&content, escape_char)?, quote_type)),
        }
    }

    #[test]
    fn bare_value_has_no_quote_type() {
        assert_eq!(
            unquote("plain", '\\', false).unwrap(),
            ("plain".to_string(), QuoteType::None)
        );
    }

    #[test]
    fn single_quoted_content_is_opaque() {
        assert_eq!(
            unquote("'$HOME'", '\\', false).unwrap(),
            ("$HOME".to_string(), QuoteType::Single)
        );
    }

    #[test]
    fn anything_after_closing_quote_is_discarded() {
        assert_eq!(
            unquote("'a' trailing junk", '\\', false).unwrap(),
            ("a".to_string(), QuoteType::Single)
        );
    }

    #[test]
    fn strip_spaces_skips_leading_whitespace_before_detecting_quote() {
        assert_eq!(
            unquote("   'x'", '\\', true).unwrap(),
            ("x".to_string(), QuoteType::Single)
        );
        assert_eq!(
            unquote("   'x'", '\\', false).unwrap(),
            ("   'x'".to_string(), QuoteType::None)
        );
    }

    #[test]
    fn unterminated_quotes_are_errors() {
        assert_matches::assert_matches!(
            unquote("'abc", '\\', false),
            Err(QuoteError::UnterminatedQuote)
        );
        assert_matches::assert_matches!(
            unquote("\"abc", '\\', false),
            Err(QuoteError::UnterminatedQuote)
        );
    }

    #[test]
    fn quote_then_unquote_roundtrips_single_and_double() {
        for s in [
            "",
            "plain",
            "has space",
            "has'single",
            "has\"double",
            "has\\backslash",
            "both'\"kinds\\of\\trouble",
        ] {
            for qt in [QuoteType::Single, QuoteType::Double] {
                let quoted = quote(s, qt, '\\');
                let (content, detected) = unquote_and_resolve(&quoted, '\\').unwrap();
                assert_eq!(detected, qt, "quote type for {s:?} as {qt:?}");
                assert_eq!(content, s, "roundtrip of {s:?} as {qt:?}");
            }
        }
    }

    #[test]
    fn none_roundtrips_through_quote_unchanged() {
        assert_eq!(quote("abc", QuoteType::None, '\\'), "abc");
    }
}
