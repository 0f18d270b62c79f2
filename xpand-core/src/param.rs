// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Evaluation of the `${…}` parameter-expansion operator family.
//!
//! [`crate::Expander::expand_brace_body`] dispatches on the operator found
//! after the variable name; everything below it implements one operator
//! each, matching the table in the module-level docs of [`crate`].

use xpand_glob::{MatchLength, match_prefix, match_suffix};

use crate::error::ExpandError;
use crate::util::{chars_to_string, split_top_level_once};
use crate::Expander;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Anchor {
    None,
    Prefix,
    Suffix,
}

const MAX_ANCHORED_ITERATIONS: usize = 10_000;

impl Expander<'_> {
    pub(crate) fn expand_brace_body(&mut self, body: &[char]) -> Result<String, ExpandError> {
        if body.first() == Some(&'#') {
            let rest = &body[1..];
            let (name, consumed) = crate::util::read_name(rest, 0);
            if !name.is_empty() && consumed == rest.len() {
                return Ok(self.var_value(&name).chars().count().to_string());
            }
        }

        let (name, after_name) = crate::util::read_name(body, 0);
        if name.is_empty() {
            return Err(ExpandError::BadSubstitution(chars_to_string(body)));
        }
        if after_name == body.len() {
            return Ok(self.var_value(&name));
        }

        let rest = &body[after_name..];
        match rest[0] {
            ':' => match rest.get(1) {
                Some('-') => self.eval_default(&name, &rest[2..], true),
                Some('+') => self.eval_alternate(&name, &rest[2..]),
                Some('?') => self.eval_error(&name, &rest[2..], true),
                Some('=') => self.eval_assign(&name, &rest[2..], true),
                Some(c) if c.is_ascii_digit() || *c == ' ' => self.eval_substring(&name, &rest[1..]),
                _ => Err(ExpandError::BadSubstitution(chars_to_string(body))),
            },
            '-' => self.eval_default(&name, &rest[1..], false),
            '=' => self.eval_assign(&name, &rest[1..], false),
            '?' => self.eval_error(&name, &rest[1..], false),
            '#' => {
                if rest.get(1) == Some(&'#') {
                    self.eval_trim(&name, &rest[2..], Anchor::Prefix, true)
                } else {
                    self.eval_trim(&name, &rest[1..], Anchor::Prefix, false)
                }
            }
            '%' => {
                if rest.get(1) == Some(&'%') {
                    self.eval_trim(&name, &rest[2..], Anchor::Suffix, true)
                } else {
                    self.eval_trim(&name, &rest[1..], Anchor::Suffix, false)
                }
            }
            '/' => self.eval_replace(&name, &rest[1..]),
            _ => Err(ExpandError::BadSubstitution(chars_to_string(body))),
        }
    }

    pub(crate) fn var_value(&self, name: &str) -> String {
        if self.flags.contains(crate::ExpandFlags::SKIP_ENV_VARS) {
            return String::new();
        }
        self.vars.get(name).cloned().unwrap_or_default()
    }

    fn var_set(&self, name: &str) -> bool {
        !self.flags.contains(crate::ExpandFlags::SKIP_ENV_VARS) && self.vars.contains_key(name)
    }

    fn eval_default(&mut self, name: &str, word: &[char], require_non_empty: bool) -> Result<String, ExpandError> {
        let set = self.var_set(name);
        let value = self.var_value(name);
        let use_value = if require_non_empty { set && !value.is_empty() } else { set };
        if use_value {
            Ok(value)
        } else {
            self.expand_nested(&chars_to_string(word))
        }
    }

    fn eval_alternate(&mut self, name: &str, word: &[char]) -> Result<String, ExpandError> {
        if self.var_set(name) && !self.var_value(name).is_empty() {
            self.expand_nested(&chars_to_string(word))
        } else {
            Ok(String::new())
        }
    }

    fn eval_error(&mut self, name: &str, message: &[char], require_non_empty: bool) -> Result<String, ExpandError> {
        let set = self.var_set(name);
        let value = self.var_value(name);
        let fail = if require_non_empty { !set || value.is_empty() } else { !set };
        if fail {
            let text = chars_to_string(message);
            let expanded_message = if text.is_empty() {
                "parameter null or not set".to_string()
            } else {
                self.expand_nested(&text)?
            };
            Err(ExpandError::MissingVariable {
                name: name.to_string(),
                message: expanded_message,
            })
        } else {
            Ok(value)
        }
    }

    fn eval_assign(&mut self, name: &str, word: &[char], require_non_empty: bool) -> Result<String, ExpandError> {
        let set = self.var_set(name);
        let value = self.var_value(name);
        let needs_assign = if require_non_empty { !set || value.is_empty() } else { !set };
        if needs_assign {
            let new_value = self.expand_nested(&chars_to_string(word))?;
            self.vars.insert(name.to_string(), new_value.clone());
            Ok(new_value)
        } else {
            Ok(value)
        }
    }

    fn eval_substring(&mut self, name: &str, rest: &[char]) -> Result<String, ExpandError> {
        let (off_chars, len_chars) = match split_top_level_once(rest, ':') {
            Some((a, b)) => (a, Some(b)),
            None => (rest.to_vec(), None),
        };
        let off_text = self.expand_nested(&chars_to_string(&off_chars))?;
        let off: isize = off_text
            .trim()
            .parse()
            .map_err(|_| ExpandError::BadSubstitution(off_text.clone()))?;

        let value = self.var_value(name);
        let value_chars: Vec<char> = value.chars().collect();
        let total = value_chars.len() as isize;
        let start = if off < 0 { (total + off).max(0) } else { off.min(total) } as usize;

        let end = match len_chars {
            None => value_chars.len(),
            Some(len_chars) => {
                let len_text = self.expand_nested(&chars_to_string(&len_chars))?;
                let len: isize = len_text
                    .trim()
                    .parse()
                    .map_err(|_| ExpandError::BadSubstitution(len_text.clone()))?;
                if len < 0 {
                    (total + len).max(start as isize).min(total) as usize
                } else {
                    (start as isize + len).min(total).max(start as isize) as usize
                }
            }
        };
        Ok(value_chars[start..end].iter().collect())
    }

    fn eval_trim(
        &mut self,
        name: &str,
        pattern_chars: &[char],
        anchor: Anchor,
        longest: bool,
    ) -> Result<String, ExpandError> {
        let pattern = self.expand_nested(&chars_to_string(pattern_chars))?;
        let value = self.var_value(name);
        let length = if pattern.is_empty() {
            Some(0)
        } else {
            let length = if longest { MatchLength::Longest } else { MatchLength::Shortest };
            match anchor {
                Anchor::Prefix | Anchor::None => match_prefix(&pattern, &value, length)?,
                Anchor::Suffix => match_suffix(&pattern, &value, length)?,
            }
        };
        Ok(match (anchor, length) {
            (_, None) => value,
            (Anchor::Suffix, Some(len)) => value[..value.len() - len].to_string(),
            (_, Some(len)) => value[len..].to_string(),
        })
    }

    fn eval_replace(&mut self, name: &str, rest: &[char]) -> Result<String, ExpandError> {
        let (global, rest) = match rest.first() {
            Some('/') => (true, &rest[1..]),
            _ => (false, rest),
        };
        let (anchor, rest) = match rest.first() {
            Some('#') => (Anchor::Prefix, &rest[1..]),
            Some('%') => (Anchor::Suffix, &rest[1..]),
            _ => (Anchor::None, rest),
        };
        let (pattern_chars, replacement_chars) =
            split_top_level_once(rest, '/').unwrap_or_else(|| (rest.to_vec(), Vec::new()));

        let pattern = self.expand_nested(&chars_to_string(&pattern_chars))?;
        let replacement = self.expand_nested(&chars_to_string(&replacement_chars))?;
        let value = self.var_value(name);

        if pattern.is_empty() {
            return Ok(self.replace_empty_pattern(&value, &replacement, global, anchor));
        }

        match (anchor, global) {
            (Anchor::None, false) => Ok(replace_first(&value, &pattern, &replacement)?),
            (Anchor::None, true) => Ok(replace_all(&value, &pattern, &replacement)?),
            (Anchor::Prefix, false) => replace_anchored_once(&value, &pattern, &replacement, true),
            (Anchor::Suffix, false) => replace_anchored_once(&value, &pattern, &replacement, false),
            (Anchor::Prefix, true) => replace_anchored_iterate(&value, &pattern, &replacement, true),
            (Anchor::Suffix, true) => replace_anchored_iterate(&value, &pattern, &replacement, false),
        }
    }

    fn replace_empty_pattern(&self, value: &str, replacement: &str, global: bool, anchor: Anchor) -> String {
        match (anchor, global) {
            (Anchor::Prefix, true) | (Anchor::Suffix, true) => value.to_string(),
            (Anchor::Prefix, false) => format!("{replacement}{value}"),
            (Anchor::Suffix, false) => format!("{value}{replacement}"),
            (Anchor::None, true) => {
                let mut out = String::from(replacement);
                for c in value.chars() {
                    out.push(c);
                    out.push_str(replacement);
                }
                out
            }
            (Anchor::None, false) => format!("{replacement}{value}"),
        }
    }
}

fn find_leftmost_match(pattern: &str, text: &str) -> Result<Option<(usize, usize)>, ExpandError> {
    for (start, _) in text.char_indices() {
        if let Some(len) = match_prefix(pattern, &text[start..], MatchLength::Longest)? {
            return Ok(Some((start, len)));
        }
    }
    if let Some(len) = match_prefix(pattern, "", MatchLength::Longest)? {
        return Ok(Some((text.len(), len)));
    }
    Ok(None)
}

fn replace_first(value: &str, pattern: &str, replacement: &str) -> Result<String, ExpandError> {
    match find_leftmost_match(pattern, value)? {
        Some((start, len)) => Ok(format!("{}{replacement}{}", &value[..start], &value[start + len..])),
        None => Ok(value.to_string()),
    }
}

fn replace_all(value: &str, pattern: &str, replacement: &str) -> Result<String, ExpandError> {
    let mut out = String::new();
    let mut rest = value;
    loop {
        match find_leftmost_match(pattern, rest)? {
            None => {
                out.push_str(rest);
                break;
            }
            Some((start, len)) => {
                out.push_str(&rest[..start]);
                out.push_str(replacement);
                if len == 0 {
                    match rest[start..].chars().next() {
                        Some(c) => {
                            out.push(c);
                            rest = &rest[start + c.len_utf8()..];
                        }
                        None => break,
                    }
                } else {
                    rest = &rest[start + len..];
                }
            }
        }
    }
    Ok(out)
}

fn replace_anchored_once(
    value: &str,
    pattern: &str,
    replacement: &str,
    is_prefix: bool,
) -> Result<String, ExpandError> {
    if is_prefix {
        match match_prefix(pattern, value, MatchLength::Longest)? {
            Some(len) => Ok(format!("{replacement}{}", &value[len..])),
            None => Ok(value.to_string()),
        }
    } else {
        match match_suffix(pattern, value, MatchLength::Longest)? {
            Some(len) => Ok(format!("{}{replacement}", &value[..value.len() - len])),
            None => Ok(value.to_string()),
        }
    }
}

fn replace_anchored_iterate(
    value: &str,
    pattern: &str,
    replacement: &str,
    is_prefix: bool,
) -> Result<String, ExpandError> {
    let mut current = value.to_string();
    for _ in 0..MAX_ANCHORED_ITERATIONS {
        let next = replace_anchored_once(&current, pattern, replacement, is_prefix)?;
        if next == current {
            return Ok(current);
        }
        current = next;
    }
    Err(ExpandError::RecursionLimitExceeded)
}
