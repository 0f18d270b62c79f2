// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Glob-style pattern matching with shortest/longest match-length selection.
//!
//! This crate supports the following syntax in patterns:
//!
//! - Any single character (`?`)
//! - Any character sequence, including the empty one (`*`)
//! - Bracket expressions (`[...]`), with optional leading `!`/`^` negation
//!   and `a-z` ranges
//!
//! Unlike a whole-string matcher, [`match_prefix`] and [`match_suffix`] only
//! need the glob to match a prefix (respectively suffix) of the subject
//! text, and report *how much* of the text was consumed, in either its
//! shortest or longest form. This is what shell parameter-expansion
//! operators such as `${NAME#pattern}` and `${NAME%%pattern}` are built on.
//!
//! Patterns are compiled to an anchored regular expression and matched with
//! the [`regex`] crate: greedy quantifiers give the longest match, lazy
//! quantifiers give the shortest, and both land on the same leftmost
//! position because the expression is anchored with `\A`.

mod parse;

use parse::{Atom, BracketItem};
use regex::Regex;
use std::fmt::Write as _;

pub use parse::GlobError;

/// Which match length to report when a glob can match several lengths.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchLength {
    /// The smallest `k` such that the glob matches the first `k` bytes.
    Shortest,
    /// The largest `k` such that the glob matches the first `k` bytes.
    Longest,
}

/// Returns the byte length of the prefix of `text` matched by `glob`, or
/// `None` if no prefix of any length matches.
pub fn match_prefix(
    glob: &str,
    text: &str,
    length: MatchLength,
) -> Result<Option<usize>, GlobError> {
    let atoms = parse::parse(glob)?;
    let re = compile(&atoms, length);
    Ok(re.find(text).map(|m| m.end()))
}

/// Returns the byte length of the suffix of `text` matched by `glob`, or
/// `None` if no suffix of any length matches.
///
/// This runs the same machinery as [`match_prefix`] against the atom
/// sequence and the text both reversed, since a suffix match is a prefix
/// match on the mirror image of the problem.
pub fn match_suffix(
    glob: &str,
    text: &str,
    length: MatchLength,
) -> Result<Option<usize>, GlobError> {
    let mut atoms = parse::parse(glob)?;
    atoms.reverse();
    let re = compile(&atoms, length);
    let reversed: String = text.chars().rev().collect();
    Ok(re.find(&reversed).map(|m| m.end()))
}

fn compile(atoms: &[Atom], length: MatchLength) -> Regex {
    let body = atoms_to_regex_body(atoms, length);
    // `(?s)` so `.` can match newlines too; `\A` anchors at the true start
    // of the haystack regardless of how many lines the text contains.
    let pattern = format!(r"(?s)\A(?:{body})");
    Regex::new(&pattern).expect("pattern compiled from a parsed glob must be valid regex")
}

fn atoms_to_regex_body(atoms: &[Atom], length: MatchLength) -> String {
    let mut out = String::new();
    for atom in atoms {
        match atom {
            Atom::Literal(c) => write_escaped_literal(&mut out, *c),
            Atom::AnyChar => out.push('.'),
            Atom::AnyString => {
                out.push_str(".*");
                if length == MatchLength::Shortest {
                    out.push('?');
                }
            }
            Atom::Bracket { negate, items } => {
                out.push('[');
                if *negate {
                    out.push('^');
                }
                for item in items {
                    write_bracket_item(&mut out, item);
                }
                out.push(']');
            }
        }
    }
    out
}

fn write_escaped_literal(out: &mut String, c: char) {
    if regex_syntax_needs_escape(c) {
        out.push('\\');
    }
    out.push(c);
}

fn regex_syntax_needs_escape(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
    )
}

fn write_bracket_item(out: &mut String, item: &BracketItem) {
    match item {
        BracketItem::Char(c) => write_bracket_char(out, *c),
        BracketItem::Range(a, b) => {
            write_bracket_char(out, *a);
            out.push('-');
            write_bracket_char(out, *b);
        }
    }
}

fn write_bracket_char(out: &mut String, c: char) {
    if matches!(c, '\\' | ']' | '^' | '-') {
        out.push('\\');
    }
    let _ = write!(out, "{c}");
}
