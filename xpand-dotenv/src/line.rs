// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Per-line processing: dialect detection, optional comment stripping,
//! `KEY=VALUE` splitting, unquoting, and expansion: the step that turns one
//! raw line from a concatenated dot-env buffer into a variable assignment.

use std::collections::HashMap;

use xpand_core::dialect::{self, Dialect};
use xpand_core::logger::Logger;
use xpand_core::subprocess::SubprocessRunner;
use xpand_core::{ExpandConfig, ExpandFlags, Expander};
use xpand_quote::QuoteType;

use crate::error::LoadError;

/// Everything observed while parsing one value: the raw text, the resolved
/// result, which metacharacters were in play, and which quote style (if
/// any) wrapped it. Transient, built fresh for every line, never
/// persisted.
#[derive(Clone, Debug)]
pub struct ParseInfo {
    pub input: String,
    pub result: String,
    pub expand_char: char,
    pub escape_char: char,
    pub cutter_char: Option<char>,
    pub quote_type: QuoteType,
}

/// Processes one raw line, mutating `vars` in place if it is a well-formed
/// assignment. Returns `None` (after logging, if a logger is injected) for
/// lines that are blank, comment-only, or malformed; those are silently
/// skipped per the loader's contract, not errors. Returns `Err` only for
/// genuine expansion failures (unterminated quote, bad substitution, failed
/// command substitution, …), which the caller propagates without touching
/// `vars` for this line.
#[allow(clippy::too_many_arguments)]
pub fn process_line(
    line: &str,
    vars: &mut HashMap<String, String>,
    args: &[String],
    pid: i64,
    flags: ExpandFlags,
    config: &ExpandConfig,
    runner: &dyn SubprocessRunner,
    logger: &dyn Logger,
) -> Result<Option<(String, ParseInfo)>, LoadError> {
    let dialect = dialect::detect(line, &config.expand_chars, &config.escape_chars);

    let (working, cutter_char) = if flags.contains(ExpandFlags::REMOVE_LINE_COMMENT) {
        match strip_comment(line, &config.cutter_chars) {
            Some((stripped, cutter)) => (stripped, Some(cutter)),
            None => (line.to_string(), None),
        }
    } else {
        (line.to_string(), None)
    };

    let trimmed = working.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let Some((key_part, value_part)) = split_key_value(trimmed) else {
        logger.log(&format!("skipping dot-env line with no '=': {trimmed}"));
        return Ok(None);
    };
    let key = key_part.trim();
    if !is_valid_key(key) {
        logger.log(&format!("skipping dot-env line with invalid key {key:?}"));
        return Ok(None);
    }

    let (content, quote_type) = xpand_quote::unquote(value_part, dialect.escape_char(), config.strip_spaces)?;
    let opaque = quote_type == QuoteType::Single && flags.contains(ExpandFlags::SKIP_SINGLE_QUOTED);
    let result = if opaque {
        content
    } else {
        let mut expander = Expander::new(vars, args, pid, flags, config, runner, logger);
        match dialect {
            Dialect::Posix => expander.expand_posix(&content)?,
            Dialect::Symmetric => expander.expand_symmetric(&content)?,
        }
    };
    // The outer quote stripped by `unquote` above is put back when the
    // caller didn't ask for it removed, so clearing `REMOVE_QUOTES` has the
    // same observable effect here as it does inside the expander itself.
    let result = if flags.contains(ExpandFlags::REMOVE_QUOTES) {
        result
    } else if let Some(quote_char) = quote_type.quote_char() {
        format!("{quote_char}{result}{quote_char}")
    } else {
        result
    };

    vars.insert(key.to_string(), result.clone());
    let info = ParseInfo {
        input: line.to_string(),
        result,
        expand_char: dialect.expand_char(),
        escape_char: dialect.escape_char(),
        cutter_char,
        quote_type,
    };
    Ok(Some((key.to_string(), info)))
}

/// Finds the first unquoted, unescaped occurrence of any character in
/// `cutter_chars` and returns the text before it along with which cutter
/// character matched. Leaves any whitespace before the cutter character
/// untouched (§4.10 scenario 4: `"A=1 # comment"` → `"A=1 "`).
fn strip_comment(line: &str, cutter_chars: &[char]) -> Option<(String, char)> {
    let mut in_single = false;
    let mut in_double = false;
    let mut chars = line.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
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
            _ if cutter_chars.contains(&c) => return Some((line[..idx].to_string(), c)),
            _ => {}
        }
    }
    None
}

/// Splits `s` at the first unquoted, unescaped `=`, returning `(key, value)`
/// with neither side trimmed or unquoted yet.
fn split_key_value(s: &str) -> Option<(&str, &str)> {
    let mut in_single = false;
    let mut in_double = false;
    let chars: Vec<(usize, char)> = s.char_indices().collect();
    let mut i = 0;
    while i < chars.len() {
        let (idx, c) = chars[i];
        if in_single {
            if c == '\'' {
                in_single = false;
            }
            i += 1;
            continue;
        }
        if in_double {
            if c == '\\' {
                i += 2;
                continue;
            }
            if c == '"' {
                in_double = false;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' => {
                in_single = true;
                i += 1;
            }
            '"' => {
                in_double = true;
                i += 1;
            }
            '\\' => i += 2,
            '=' => return Some((&s[..idx], &s[idx + c.len_utf8()..])),
            _ => i += 1,
        }
    }
    None
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpand_core::logger::NullLogger;
    use xpand_core::subprocess::StdSubprocessRunner;

    fn run(vars: &mut HashMap<String, String>, flags: ExpandFlags, line: &str) -> Option<(String, ParseInfo)> {
        let config = ExpandConfig::default();
        let runner = StdSubprocessRunner;
        let logger = NullLogger;
        process_line(line, vars, &[], 1, flags, &config, &runner, &logger).unwrap()
    }

    #[test]
    fn plain_assignment_is_expanded_and_applied() {
        let mut vars = HashMap::from([("HOME".to_string(), "/u/a".to_string())]);
        let (key, info) = run(&mut vars, ExpandFlags::default(), "GREETING=hi $HOME").unwrap();
        assert_eq!(key, "GREETING");
        assert_eq!(info.result, "hi /u/a");
        assert_eq!(vars.get("GREETING"), Some(&"hi /u/a".to_string()));
    }

    #[test]
    fn line_with_no_equals_is_skipped() {
        let mut vars = HashMap::new();
        assert!(run(&mut vars, ExpandFlags::default(), "not an assignment").is_none());
        assert!(vars.is_empty());
    }

    #[test]
    fn invalid_key_is_skipped() {
        let mut vars = HashMap::new();
        assert!(run(&mut vars, ExpandFlags::default(), "9BAD=value").is_none());
        assert!(vars.is_empty());
    }

    #[test]
    fn blank_line_is_skipped() {
        let mut vars = HashMap::new();
        assert!(run(&mut vars, ExpandFlags::default(), "   ").is_none());
    }

    #[test]
    fn comment_is_stripped_and_the_whole_line_is_then_trimmed() {
        // The comment-stripping step itself preserves the whitespace before
        // the cutter character (see `strip_comment`'s own tests); the line
        // processor's subsequent whole-line trim (§4.10 step 3) is what
        // removes it before the key/value split happens.
        let mut vars = HashMap::new();
        let (key, info) = run(&mut vars, ExpandFlags::default() | ExpandFlags::REMOVE_LINE_COMMENT, "A=1 # comment").unwrap();
        assert_eq!(key, "A");
        assert_eq!(info.result, "1");
    }

    #[test]
    fn strip_comment_itself_preserves_space_before_the_cutter_character() {
        let (stripped, cutter) = strip_comment("A=1 # comment", &['#', ';']).unwrap();
        assert_eq!(stripped, "A=1 ");
        assert_eq!(cutter, '#');
    }

    #[test]
    fn single_quoted_value_is_opaque_by_default() {
        let mut vars = HashMap::from([("HOME".to_string(), "/home".to_string())]);
        let (_, info) = run(&mut vars, ExpandFlags::default(), "A='$HOME'").unwrap();
        assert_eq!(info.result, "$HOME");
        assert_eq!(info.quote_type, QuoteType::Single);
    }

    #[test]
    fn clearing_remove_quotes_keeps_the_quote_characters_in_the_assigned_value() {
        let mut vars = HashMap::from([("HOME".to_string(), "/home".to_string())]);
        let flags = ExpandFlags::default() - ExpandFlags::REMOVE_QUOTES;
        let (key, info) = run(&mut vars, flags, "A='$HOME'").unwrap();
        assert_eq!(key, "A");
        assert_eq!(info.result, "'$HOME'");
        assert_eq!(vars.get("A"), Some(&"'$HOME'".to_string()));
    }

    #[test]
    fn symmetric_dialect_line_is_detected_and_expanded() {
        let mut vars = HashMap::from([("USER".to_string(), "root".to_string())]);
        let (_, info) = run(&mut vars, ExpandFlags::default(), "A=%USER%").unwrap();
        assert_eq!(info.result, "root");
        assert_eq!(info.expand_char, '%');
    }

    #[test]
    fn expansion_failure_propagates_and_leaves_vars_untouched() {
        let mut vars = HashMap::new();
        let config = ExpandConfig::default();
        let runner = StdSubprocessRunner;
        let logger = NullLogger;
        let err = process_line(
            "A=${X:?required}",
            &mut vars,
            &[],
            1,
            ExpandFlags::default(),
            &config,
            &runner,
            &logger,
        );
        assert!(err.is_err());
        assert!(vars.is_empty());
    }
}
