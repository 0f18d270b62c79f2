// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Shell-style string expansion: variable and positional-argument
//! substitution, parameter-expansion operators (`${…}`), quote and escape
//! handling, and optional command substitution, in a POSIX `$`/`\` dialect
//! and a symmetric `%`/`^` dialect.
//!
//! [`Expander`] holds the state a single expansion call needs — the
//! variable map, positional arguments, the caller's pid, flags, and the
//! injected collaborators (subprocess runner, logger) — and its
//! [`Expander::expand_posix`]/[`Expander::expand_symmetric`] methods do the
//! work. Nothing here touches real process environment or spawns a
//! subprocess unless a flag explicitly allows it.
//!
//! ```
//! use std::collections::HashMap;
//! use xpand_core::{Expander, ExpandConfig, ExpandFlags};
//! use xpand_core::logger::NullLogger;
//! use xpand_core::subprocess::StdSubprocessRunner;
//!
//! let mut vars = HashMap::from([("HOME".to_string(), "/u/a".to_string())]);
//! let args = vec!["app".to_string()];
//! let config = ExpandConfig::default();
//! let runner = StdSubprocessRunner;
//! let logger = NullLogger;
//! let mut expander = Expander::new(&mut vars, &args, 1, ExpandFlags::default(), &config, &runner, &logger);
//! let result = expander.expand_posix("Home ${HOME:-$USERPROFILE}, arg #1: $1").unwrap();
//! assert_eq!(result, "Home /u/a, arg #1: app");
//! ```

mod config;
pub mod dialect;
mod error;
mod flags;
pub mod logger;
mod param;
pub mod subprocess;
mod symmetric;
mod util;

pub use config::ExpandConfig;
pub use error::ExpandError;
pub use flags::{ExpandFlags, FileFlags};

use std::collections::HashMap;

use logger::Logger;
use subprocess::SubprocessRunner;

const MAX_RECURSION_DEPTH: usize = 64;

/// Whether the scanner is at the top level (or inside `${…}` operator
/// text) or already inside a double-quoted region, where a single quote
/// is an ordinary character rather than the start of an opaque region.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Ctx {
    Bare,
    InDoubleQuote,
}

/// Holds everything a single expansion call needs: the mutable variable
/// map, positional arguments, the caller's pid (used for `$$`), the active
/// flags and configuration, and the injected subprocess runner and logger.
pub struct Expander<'a> {
    vars: &'a mut HashMap<String, String>,
    args: &'a [String],
    pid: i64,
    flags: ExpandFlags,
    config: &'a ExpandConfig,
    runner: &'a dyn SubprocessRunner,
    logger: &'a dyn Logger,
    depth: usize,
}

impl<'a> Expander<'a> {
    pub fn new(
        vars: &'a mut HashMap<String, String>,
        args: &'a [String],
        pid: i64,
        flags: ExpandFlags,
        config: &'a ExpandConfig,
        runner: &'a dyn SubprocessRunner,
        logger: &'a dyn Logger,
    ) -> Self {
        Expander {
            vars,
            args,
            pid,
            flags,
            config,
            runner,
            logger,
            depth: 0,
        }
    }

    /// Expands `input` under the POSIX dialect (`$` for expansion, `\` for
    /// escapes).
    pub fn expand_posix(&mut self, input: &str) -> Result<String, ExpandError> {
        self.depth = 0;
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;
        self.scan(&chars, &mut pos, Ctx::Bare)
    }

    /// Runs a full, depth-guarded nested expansion of `text` (used for the
    /// word/pattern/replacement parts of `${…}` operators and for command
    /// substitution bodies).
    fn expand_nested(&mut self, text: &str) -> Result<String, ExpandError> {
        self.depth += 1;
        if self.depth > MAX_RECURSION_DEPTH {
            self.depth -= 1;
            return Err(ExpandError::RecursionLimitExceeded);
        }
        let chars: Vec<char> = text.chars().collect();
        let mut pos = 0;
        let result = self.scan(&chars, &mut pos, Ctx::Bare);
        self.depth -= 1;
        result
    }

    fn scan(&mut self, chars: &[char], pos: &mut usize, ctx: Ctx) -> Result<String, ExpandError> {
        let mut out = String::new();
        while *pos < chars.len() {
            let c = chars[*pos];
            match c {
                '\'' if ctx == Ctx::Bare => self.consume_single_quote(chars, pos, &mut out)?,
                '"' if ctx == Ctx::Bare => self.consume_double_quote(chars, pos, &mut out)?,
                '\\' => self.consume_escape(chars, pos, &mut out)?,
                '$' => {
                    let expanded = self.expand_dollar(chars, pos)?;
                    out.push_str(&expanded);
                }
                '`' => {
                    let expanded = self.expand_backtick(chars, pos)?;
                    out.push_str(&expanded);
                }
                _ => {
                    out.push(c);
                    *pos += 1;
                }
            }
        }
        Ok(out)
    }

    fn consume_escape(&mut self, chars: &[char], pos: &mut usize, out: &mut String) -> Result<(), ExpandError> {
        if chars.get(*pos + 1).is_none() {
            return Err(ExpandError::DanglingEscape);
        }
        if self.flags.contains(ExpandFlags::UNESCAPE) {
            let (decoded, next) = xpand_quote::decode_one(chars, *pos, '\\')?;
            out.push(decoded);
            *pos = next;
        } else {
            out.push('\\');
            out.push(chars[*pos + 1]);
            *pos += 2;
        }
        Ok(())
    }

    fn consume_single_quote(&mut self, chars: &[char], pos: &mut usize, out: &mut String) -> Result<(), ExpandError> {
        let start = *pos + 1;
        let mut end = start;
        while matches!(chars.get(end), Some(&c) if c != '\'') {
            end += 1;
        }
        if chars.get(end).is_none() {
            return Err(ExpandError::UnterminatedQuote);
        }
        let content = &chars[start..end];
        *pos = end + 1;
        let keep_quotes = !self.flags.contains(ExpandFlags::REMOVE_QUOTES);
        if keep_quotes {
            out.push('\'');
        }
        if self.flags.contains(ExpandFlags::SKIP_SINGLE_QUOTED) {
            out.push_str(&util::chars_to_string(content));
        } else {
            out.push_str(&self.expand_nested(&util::chars_to_string(content))?);
        }
        if keep_quotes {
            out.push('\'');
        }
        Ok(())
    }

    fn consume_double_quote(&mut self, chars: &[char], pos: &mut usize, out: &mut String) -> Result<(), ExpandError> {
        *pos += 1;
        let content = self.scan_double_region(chars, pos)?;
        self.depth += 1;
        if self.depth > MAX_RECURSION_DEPTH {
            self.depth -= 1;
            return Err(ExpandError::RecursionLimitExceeded);
        }
        let mut inner_pos = 0;
        let expanded = self.scan(&content, &mut inner_pos, Ctx::InDoubleQuote);
        self.depth -= 1;
        let expanded = expanded?;
        let keep_quotes = !self.flags.contains(ExpandFlags::REMOVE_QUOTES);
        if keep_quotes {
            out.push('"');
        }
        out.push_str(&expanded);
        if keep_quotes {
            out.push('"');
        }
        Ok(())
    }

    /// Scans from just after the opening `"` to the matching (unescaped)
    /// closing quote, keeping escape pairs intact for the recursive
    /// [`Self::scan`] call to resolve.
    fn scan_double_region(&self, chars: &[char], pos: &mut usize) -> Result<Vec<char>, ExpandError> {
        let mut content = Vec::new();
        loop {
            match chars.get(*pos) {
                None => return Err(ExpandError::UnterminatedQuote),
                Some('"') => {
                    *pos += 1;
                    return Ok(content);
                }
                Some('\\') => match chars.get(*pos + 1) {
                    Some(&next) => {
                        content.push('\\');
                        content.push(next);
                        *pos += 2;
                    }
                    None => return Err(ExpandError::UnterminatedQuote),
                },
                Some(&c) => {
                    content.push(c);
                    *pos += 1;
                }
            }
        }
    }

    fn expand_dollar(&mut self, chars: &[char], pos: &mut usize) -> Result<String, ExpandError> {
        let after = *pos + 1;
        match chars.get(after) {
            Some('$') => {
                *pos = after + 1;
                Ok(self.pid.to_string())
            }
            Some('{') => {
                *pos = after + 1;
                let close = find_matching(chars, *pos, '{', '}')
                    .ok_or_else(|| ExpandError::BadSubstitution("unterminated ${...}".to_string()))?;
                let body = chars[*pos..close].to_vec();
                *pos = close + 1;
                self.expand_brace_body(&body)
            }
            Some('(') => {
                let marker_start = *pos;
                let body_start = after + 1;
                let close = find_matching(chars, body_start, '(', ')')
                    .ok_or(ExpandError::UnterminatedQuote)?;
                let raw: String = chars[marker_start..=close].iter().collect();
                *pos = close + 1;
                if !self.flags.intersects(ExpandFlags::ALLOW_SHELL | ExpandFlags::ALLOW_SUBPROC) {
                    return Ok(raw);
                }
                let inner_text: String = chars[body_start..close].iter().collect();
                let expanded_inner = self.expand_nested(&inner_text)?;
                self.run_command_substitution(&expanded_inner)
            }
            Some(c) if c.is_ascii_digit() => {
                let n = c.to_digit(10).expect("ascii digit") as usize;
                *pos = after + 1;
                match self.args.get(n.wrapping_sub(1)) {
                    Some(v) if n > 0 => Ok(v.clone()),
                    _ => Ok(format!("${n}")),
                }
            }
            Some(&c) if util::is_name_start(c) => {
                let (name, next) = util::read_name(chars, after);
                *pos = next;
                Ok(self.var_value(&name))
            }
            _ => {
                *pos = after;
                Ok("$".to_string())
            }
        }
    }

    fn expand_backtick(&mut self, chars: &[char], pos: &mut usize) -> Result<String, ExpandError> {
        let marker_start = *pos;
        let mut i = marker_start + 1;
        loop {
            match chars.get(i) {
                None => return Err(ExpandError::UnterminatedQuote),
                Some('\\') => i += 2,
                Some('`') => break,
                Some(_) => i += 1,
            }
        }
        let close = i;
        let raw: String = chars[marker_start..=close].iter().collect();
        *pos = close + 1;
        if !self.flags.intersects(ExpandFlags::ALLOW_SHELL | ExpandFlags::ALLOW_SUBPROC) {
            return Ok(raw);
        }
        let inner_text: String = chars[marker_start + 1..close].iter().collect();
        let expanded_inner = self.expand_nested(&inner_text)?;
        self.run_command_substitution(&expanded_inner)
    }

    fn run_command_substitution(&mut self, command_text: &str) -> Result<String, ExpandError> {
        let timeout = self.config.subprocess_timeout;
        let output = if self.flags.contains(ExpandFlags::ALLOW_SUBPROC) && !self.flags.contains(ExpandFlags::ALLOW_SHELL)
        {
            let argv = subprocess::tokenize(command_text)?;
            self.runner.run_argv(&argv, timeout)?
        } else {
            self.runner.run_shell(command_text, timeout)?
        };
        if output.status != 0 {
            self.logger.log(&format!("command substitution failed: {}", output.stderr));
            return Err(ExpandError::SubprocessFailed {
                status: output.status,
                stderr: output.stderr,
            });
        }
        Ok(output.stdout)
    }
}

/// Finds the index of the `close` that matches the `open` already consumed
/// just before `start`, honoring nested `open`/`close` pairs and quoted
/// regions (so a `}` inside a string literal inside `${…}` doesn't end the
/// expansion early).
fn find_matching(chars: &[char], start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 1i32;
    let mut i = start;
    let mut in_single = false;
    let mut in_double = false;
    while i < chars.len() {
        let c = chars[i];
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
            '\\' => i += 2,
            '\'' => {
                in_single = true;
                i += 1;
            }
            '"' => {
                in_double = true;
                i += 1;
            }
            _ if c == open => {
                depth += 1;
                i += 1;
            }
            _ if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use logger::NullLogger;
    use subprocess::StdSubprocessRunner;

    fn expand(vars: &mut HashMap<String, String>, args: &[&str], input: &str) -> Result<String, ExpandError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let config = ExpandConfig::default();
        let runner = StdSubprocessRunner;
        let logger = NullLogger;
        let mut expander = Expander::new(vars, &args, 4242, ExpandFlags::default(), &config, &runner, &logger);
        expander.expand_posix(input)
    }

    #[test]
    fn plain_text_with_no_metacharacters_is_unchanged() {
        let mut vars = HashMap::new();
        assert_eq!(expand(&mut vars, &[], "plain text, no tricks").unwrap(), "plain text, no tricks");
    }

    #[test]
    fn end_to_end_scenario_one() {
        let mut vars = HashMap::from([("HOME".to_string(), "/u/a".to_string())]);
        assert_eq!(
            expand(&mut vars, &["app"], "Home ${HOME:-$USERPROFILE}, arg #1: $1").unwrap(),
            "Home /u/a, arg #1: app"
        );
    }

    #[test]
    fn end_to_end_scenario_assign_default() {
        let mut vars = HashMap::new();
        let config = ExpandConfig::default();
        let runner = StdSubprocessRunner;
        let logger = NullLogger;
        let mut expander = Expander::new(&mut vars, &[], 1, ExpandFlags::default(), &config, &runner, &logger);
        assert_eq!(expander.expand_posix("${X:=42}-${X}").unwrap(), "42-42");
        assert_eq!(vars.get("X"), Some(&"42".to_string()));
    }

    #[test]
    fn end_to_end_scenario_suffix_trim() {
        let mut vars = HashMap::from([("F".to_string(), "file.tar.gz".to_string())]);
        assert_eq!(
            expand(&mut vars, &[], "${F%.gz} ${F%%.*}").unwrap(),
            "file.tar file"
        );
    }

    #[test]
    fn single_quoted_with_skip_single_quoted_stays_opaque() {
        let mut vars = HashMap::from([("HOME".to_string(), "/home".to_string())]);
        assert_eq!(expand(&mut vars, &[], "'$HOME'").unwrap(), "$HOME");
    }

    #[test]
    fn double_quoted_content_still_expands() {
        let mut vars = HashMap::from([("HOME".to_string(), "/home".to_string())]);
        assert_eq!(expand(&mut vars, &[], "\"$HOME/bin\"").unwrap(), "/home/bin");
    }

    #[test]
    fn clearing_remove_quotes_keeps_the_quote_characters() {
        let mut vars = HashMap::from([("HOME".to_string(), "/home".to_string())]);
        let args: Vec<String> = Vec::new();
        let config = ExpandConfig::default();
        let runner = StdSubprocessRunner;
        let logger = NullLogger;
        let flags = ExpandFlags::default() - ExpandFlags::REMOVE_QUOTES;
        let mut expander = Expander::new(&mut vars, &args, 1, flags, &config, &runner, &logger);
        assert_eq!(expander.expand_posix("\"$HOME/bin\"").unwrap(), "\"/home/bin\"");

        let mut vars = HashMap::from([("HOME".to_string(), "/home".to_string())]);
        let mut expander = Expander::new(&mut vars, &args, 1, flags, &config, &runner, &logger);
        assert_eq!(expander.expand_posix("'$HOME'").unwrap(), "'$HOME'");
    }

    #[test]
    fn out_of_range_positional_arg_is_left_verbatim() {
        let mut vars = HashMap::new();
        assert_eq!(expand(&mut vars, &["a"], "$9").unwrap(), "$9");
    }

    #[test]
    fn unset_variable_with_default() {
        let mut vars = HashMap::new();
        assert_eq!(expand(&mut vars, &[], "${X:-d}").unwrap(), "d");
    }

    #[test]
    fn command_substitution_disabled_is_left_verbatim() {
        let mut vars = HashMap::new();
        let args: Vec<String> = Vec::new();
        let config = ExpandConfig::default();
        let runner = StdSubprocessRunner;
        let logger = NullLogger;
        let mut expander = Expander::new(
            &mut vars,
            &args,
            1,
            ExpandFlags::REMOVE_QUOTES | ExpandFlags::UNESCAPE,
            &config,
            &runner,
            &logger,
        );
        assert_eq!(expander.expand_posix("$(echo hi)").unwrap(), "$(echo hi)");
    }

    #[test]
    fn dollar_dollar_is_callers_pid() {
        let mut vars = HashMap::new();
        assert_eq!(expand(&mut vars, &[], "pid=$$").unwrap(), "pid=4242");
    }

    #[test]
    fn error_message_form_fails_on_unset_variable() {
        let mut vars = HashMap::new();
        let err = expand(&mut vars, &[], "${X:?required}").unwrap_err();
        assert_matches::assert_matches!(err, ExpandError::MissingVariable { .. });
    }

    #[test]
    fn recursion_limit_is_enforced() {
        let mut vars = HashMap::new();
        let mut input = "d".to_string();
        for _ in 0..100 {
            input = format!("${{X:-{input}}}");
        }
        let err = expand(&mut vars, &[], &input).unwrap_err();
        assert_matches::assert_matches!(err, ExpandError::RecursionLimitExceeded);
    }

    #[test]
    fn global_empty_pattern_insertion() {
        let mut vars = HashMap::from([("V".to_string(), "abc".to_string())]);
        assert_eq!(expand(&mut vars, &[], "${V///X}").unwrap(), "XaXbXcX");
    }

    #[test]
    fn anchored_empty_global_is_a_no_op() {
        let mut vars = HashMap::from([("V".to_string(), "abc".to_string())]);
        assert_eq!(expand(&mut vars, &[], "${V//#/P}").unwrap(), "abc");
        assert_eq!(expand(&mut vars, &[], "${V//%/P}").unwrap(), "abc");
    }

    #[test]
    fn anchored_empty_one_shot_prepends_or_appends() {
        let mut vars = HashMap::from([("V".to_string(), "abc".to_string())]);
        assert_eq!(expand(&mut vars, &[], "${V/#/P}").unwrap(), "Pabc");
        assert_eq!(expand(&mut vars, &[], "${V/%/P}").unwrap(), "abcP");
    }
}
