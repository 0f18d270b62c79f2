// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Escape/unescape codec.
//!
//! Maps the escape sequences in the table below to their characters and
//! back. Unlike [`crate::quote`], this module never looks at surrounding
//! quotes; it operates on already-unquoted text.

use crate::error::QuoteError;

/// Decodes escape sequences introduced by `escape_char`.
///
/// Recognized sequences: `n`, `r`, `t`, `b`, `f`, `a`, `v`, `0`, the escape
/// character itself, `"`, `'`, `` ` ``, `xHH`, `uHHHH`, `UHHHHHHHH`. Any
/// other character following `escape_char` is not an escape sequence at
/// all: the escape character is dropped and the character passes through
/// literally, per the documented behavior for unknown escapes.
pub fn unescape(input: &str, escape_char: char) -> Result<String, QuoteError> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != escape_char {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let (decoded, next) = decode_one(&chars, i, escape_char)?;
        out.push(decoded);
        i = next;
    }
    Ok(out)
}

/// Decodes a single escape sequence starting at `chars[pos]` (which must be
/// `escape_char`). Returns the decoded character and the index just past
/// the sequence.
///
/// This is the primitive the expansion engine's scanners use to decode one
/// escape at a time while also tracking parser state (quoting, brace
/// nesting) that a whole-string pass like [`unescape`] doesn't need to
/// care about.
pub fn decode_one(chars: &[char], pos: usize, escape_char: char) -> Result<(char, usize), QuoteError> {
    debug_assert_eq!(chars[pos], escape_char);
    let Some(&next) = chars.get(pos + 1) else {
        return Err(QuoteError::DanglingEscape);
    };
    match next {
        'n' => Ok(('\n', pos + 2)),
        'r' => Ok(('\r', pos + 2)),
        't' => Ok(('\t', pos + 2)),
        'b' => Ok(('\u{8}', pos + 2)),
        'f' => Ok(('\u{c}', pos + 2)),
        'a' => Ok(('\u{7}', pos + 2)),
        'v' => Ok(('\u{b}', pos + 2)),
        '0' => Ok(('\0', pos + 2)),
        'x' => {
            let value = read_hex_digits(chars, pos + 2, 2)?;
            Ok((char_from_scalar(value)?, pos + 2 + 2))
        }
        'u' => {
            let value = read_hex_digits(chars, pos + 2, 4)?;
            Ok((char_from_scalar(value)?, pos + 2 + 4))
        }
        'U' => {
            let value = read_hex_digits(chars, pos + 2, 8)?;
            Ok((char_from_scalar(value)?, pos + 2 + 8))
        }
        // Everything else, including the escape character itself, a quote
        // character, or a genuinely unrecognized letter, passes through as
        // the literal following character: the backslash is dropped.
        other => Ok((other, pos + 2)),
    }
}

fn read_hex_digits(chars: &[char], start: usize, count: usize) -> Result<u32, QuoteError> {
    let digits = chars.get(start..start + count);
    let digits = digits.ok_or(QuoteError::InvalidEscapeSequence)?;
    let mut value: u32 = 0;
    for &d in digits {
        let digit = d.to_digit(16).ok_or(QuoteError::InvalidEscapeSequence)?;
        value = value * 16 + digit;
    }
    Ok(value)
}

fn char_from_scalar(value: u32) -> Result<char, QuoteError> {
    char::from_u32(value).ok_or(QuoteError::InvalidEscapeSequence)
}

/// Encodes `input` so that [`unescape`] with the same `escape_char` recovers
/// it exactly.
///
/// Only `escape_char` itself and the small set of control characters with a
/// named sequence (`\n`, `\r`, `\t`, `\b`, `\f`, `\a`, `\v`, NUL) are
/// rewritten; every other character, including quote characters, is left
/// untouched. That is enough to make `unescape(escape(s)) == s` hold for
/// every `s`, since [`unescape`] only ever transforms `escape_char` followed
/// by one of those same characters.
pub fn escape(input: &str, escape_char: char) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\n' => push_escape(&mut out, escape_char, 'n'),
            '\r' => push_escape(&mut out, escape_char, 'r'),
            '\t' => push_escape(&mut out, escape_char, 't'),
            '\u{8}' => push_escape(&mut out, escape_char, 'b'),
            '\u{c}' => push_escape(&mut out, escape_char, 'f'),
            '\u{7}' => push_escape(&mut out, escape_char, 'a'),
            '\u{b}' => push_escape(&mut out, escape_char, 'v'),
            '\0' => push_escape(&mut out, escape_char, '0'),
            c if c == escape_char => {
                out.push(escape_char);
                out.push(escape_char);
            }
            c => out.push(c),
        }
    }
    out
}

fn push_escape(out: &mut String, escape_char: char, code: char) {
    out.push(escape_char);
    out.push(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_named_sequences() {
        assert_eq!(unescape(r"a\nb\tc", '\\').unwrap(), "a\nb\tc");
        assert_eq!(unescape(r"\\", '\\').unwrap(), "\\");
        assert_eq!(unescape(r#"\""#, '\\').unwrap(), "\"");
    }

    #[test]
    fn unescape_hex_and_unicode() {
        assert_eq!(unescape(r"\x41", '\\').unwrap(), "A");
        assert_eq!(unescape(r"A", '\\').unwrap(), "A");
        assert_eq!(unescape(r"\U00000041", '\\').unwrap(), "A");
    }

    #[test]
    fn unescape_unknown_sequence_passes_through_literal_character() {
        assert_eq!(unescape(r"\q", '\\').unwrap(), "q");
    }

    #[test]
    fn dangling_escape_is_an_error() {
        assert_matches::assert_matches!(unescape(r"abc\", '\\'), Err(QuoteError::DanglingEscape));
    }

    #[test]
    fn invalid_hex_digits_are_an_error() {
        assert_matches::assert_matches!(
            unescape(r"\xZZ", '\\'),
            Err(QuoteError::InvalidEscapeSequence)
        );
        assert_matches::assert_matches!(
            unescape(r"\x4", '\\'),
            Err(QuoteError::InvalidEscapeSequence)
        );
    }

    #[test]
    fn escape_then_unescape_round_trips_for_arbitrary_text() {
        for s in [
            "",
            "plain text",
            "line\nbreak\ttab",
            "back\\slash",
            "quote\"s'and`ticks",
            "\0null\u{7}bel\u{8}bs\u{c}ff\u{b}vt",
        ] {
            let escaped = escape(s, '\\');
            assert_eq!(unescape(&escaped, '\\').unwrap(), s, "roundtrip of {s:?}");
        }
    }

    #[test]
    fn escape_uses_the_active_escape_character() {
        // With `^` as the escape character (the symmetric dialect), the
        // codec still operates consistently.
        let escaped = escape("a\nb^c", '^');
        assert_eq!(unescape(&escaped, '^').unwrap(), "a\nb^c");
    }
}
