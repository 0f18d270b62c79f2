// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Per-line dialect detection: which of `$`/`\` (POSIX) or `%`/`^`
//! (symmetric) a line uses, chosen by the first unquoted occurrence of
//! either family's metacharacters.

/// The metacharacter set a line was detected to use.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dialect {
    Posix,
    Symmetric,
}

impl Dialect {
    pub fn expand_char(self) -> char {
        match self {
            Dialect::Posix => '$',
            Dialect::Symmetric => '%',
        }
    }

    pub fn escape_char(self) -> char {
        match self {
            Dialect::Posix => '\\',
            Dialect::Symmetric => '^',
        }
    }
}

/// Scans `line` outside quoted regions for the first of `expand_chars` and
/// the first of `escape_chars`, and returns the dialect implied by whichever
/// pair wins. A line with neither defaults to POSIX.
///
/// `expand_chars` and `escape_chars` are tried in the given order at each
/// position; the first candidate to appear, scanning left to right, decides
/// that half of the dialect. The two halves are independent: a line could
/// in principle show `%` before any escape character is seen, while also
/// showing `\` before `^` — in that case the result favors whichever family
/// (POSIX or symmetric) matches on the expand half, since `expand_char` is
/// what a caller keys an engine selection on.
pub fn detect(line: &str, expand_chars: &[char], escape_chars: &[char]) -> Dialect {
    let mut in_single = false;
    let mut in_double = false;
    let mut chars = line.chars().peekable();
    let mut found_expand: Option<char> = None;

    while let Some(c) = chars.next() {
        if in_single {
            if c == '\'' {
                in_single = false;
            }
            continue;
        }
        if in_double {
            if c == '\\' {
                chars.next();
                continue;
            }
            if c == '"' {
                in_double = false;
            }
            continue;
        }
        match c {
            '\'' => in_single = true,
            '"' => in_double = true,
            '\\' => {
                chars.next();
            }
            _ if expand_chars.contains(&c) && found_expand.is_none() => {
                found_expand = Some(c);
                break;
            }
            _ => {}
        }
    }

    match found_expand {
        Some(c) if c == '%' && escape_chars.contains(&'^') => Dialect::Symmetric,
        Some(c) if c == '$' => Dialect::Posix,
        _ => Dialect::Posix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_selects_posix() {
        assert_eq!(detect("x=$HOME", &['$', '%'], &['\\', '^']), Dialect::Posix);
    }

    #[test]
    fn percent_selects_symmetric() {
        assert_eq!(detect("x=%HOME%", &['$', '%'], &['\\', '^']), Dialect::Symmetric);
    }

    #[test]
    fn neither_defaults_to_posix() {
        assert_eq!(detect("x=plain", &['$', '%'], &['\\', '^']), Dialect::Posix);
    }

    #[test]
    fn metacharacter_inside_single_quotes_is_ignored() {
        assert_eq!(
            detect("x='%not a dialect marker'", &['$', '%'], &['\\', '^']),
            Dialect::Posix
        );
    }

    #[test]
    fn metacharacter_after_quoted_region_is_still_found() {
        assert_eq!(
            detect("x='literal' %HOME%", &['$', '%'], &['\\', '^']),
            Dialect::Symmetric
        );
    }
}
