// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! The symmetric (`%`/`^`) dialect's expansion engine.

use crate::error::ExpandError;
use crate::util::{is_name_start, read_name};
use crate::Expander;

impl Expander<'_> {
    /// Expands `input` under the symmetric dialect: `%NAME%`, `%N`, `%*`,
    /// `%%`, `%~mods N`, `%NAME:~start[,len]%`, with `^` as the escape
    /// character. There is no command substitution in this dialect.
    pub fn expand_symmetric(&mut self, input: &str) -> Result<String, ExpandError> {
        self.depth = 0;
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;
        let mut out = String::new();
        while pos < chars.len() {
            match chars[pos] {
                '^' => match chars.get(pos + 1) {
                    Some(&next) => {
                        out.push(next);
                        pos += 2;
                    }
                    None => return Err(ExpandError::DanglingEscape),
                },
                '%' => {
                    pos += 1;
                    out.push_str(&self.expand_percent(&chars, &mut pos)?);
                }
                c => {
                    out.push(c);
                    pos += 1;
                }
            }
        }
        Ok(out)
    }

    fn expand_percent(&mut self, chars: &[char], pos: &mut usize) -> Result<String, ExpandError> {
        match chars.get(*pos) {
            Some('%') => {
                *pos += 1;
                Ok("%".to_string())
            }
            Some('*') => {
                *pos += 1;
                Ok(self.args.join(" "))
            }
            Some('~') => {
                *pos += 1;
                let mods_start = *pos;
                while matches!(chars.get(*pos), Some(c) if c.is_ascii_alphabetic()) {
                    *pos += 1;
                }
                let mods: String = chars[mods_start..*pos].iter().collect();
                while matches!(chars.get(*pos), Some(c) if c.is_whitespace()) {
                    *pos += 1;
                }
                let digit_start = *pos;
                while matches!(chars.get(*pos), Some(c) if c.is_ascii_digit()) {
                    *pos += 1;
                }
                if digit_start == *pos {
                    return Err(ExpandError::BadSubstitution(
                        "expected argument index after %~mods".to_string(),
                    ));
                }
                let n: usize = chars[digit_start..*pos].iter().collect::<String>().parse().unwrap();
                let arg = self.args.get(n.saturating_sub(1)).cloned().unwrap_or_default();
                Ok(apply_path_modifiers(&arg, &mods))
            }
            Some(c) if c.is_ascii_digit() => {
                let digit_start = *pos;
                while matches!(chars.get(*pos), Some(c) if c.is_ascii_digit()) {
                    *pos += 1;
                }
                let n: usize = chars[digit_start..*pos].iter().collect::<String>().parse().unwrap();
                Ok(self
                    .args
                    .get(n.saturating_sub(1))
                    .cloned()
                    .unwrap_or_else(|| format!("%{n}")))
            }
            Some(&c) if is_name_start(c) => {
                let (name, next) = read_name(chars, *pos);
                *pos = next;
                if chars.get(*pos) == Some(&':') && chars.get(*pos + 1) == Some(&'~') {
                    *pos += 2;
                    return self.eval_symmetric_substring(&name, chars, pos);
                }
                if chars.get(*pos) == Some(&'%') {
                    *pos += 1;
                }
                Ok(self.var_value(&name))
            }
            _ => Ok("%".to_string()),
        }
    }

    fn eval_symmetric_substring(
        &mut self,
        name: &str,
        chars: &[char],
        pos: &mut usize,
    ) -> Result<String, ExpandError> {
        let start_begin = *pos;
        while matches!(chars.get(*pos), Some(c) if c.is_ascii_digit() || *c == '-') {
            *pos += 1;
        }
        let start_text: String = chars[start_begin..*pos].iter().collect();
        let start: isize = start_text
            .parse()
            .map_err(|_| ExpandError::BadSubstitution(start_text.clone()))?;

        let length = if chars.get(*pos) == Some(&',') {
            *pos += 1;
            let len_begin = *pos;
            while matches!(chars.get(*pos), Some(c) if c.is_ascii_digit() || *c == '-') {
                *pos += 1;
            }
            let len_text: String = chars[len_begin..*pos].iter().collect();
            Some(
                len_text
                    .parse::<isize>()
                    .map_err(|_| ExpandError::BadSubstitution(len_text.clone()))?,
            )
        } else {
            None
        };
        if chars.get(*pos) == Some(&'%') {
            *pos += 1;
        }

        let value = self.var_value(name);
        let value_chars: Vec<char> = value.chars().collect();
        let total = value_chars.len() as isize;
        let s = if start < 0 { (total + start).max(0) } else { start.min(total) } as usize;
        let e = match length {
            None => value_chars.len(),
            Some(l) if l < 0 => (total + l).max(s as isize).min(total) as usize,
            Some(l) => (s as isize + l).min(total).max(s as isize) as usize,
        };
        Ok(value_chars[s..e].iter().collect())
    }
}

/// Applies Windows-batch-style `%~mods` path modifiers to `value`, combined
/// in the order they're given. Unknown letters are ignored.
fn apply_path_modifiers(value: &str, mods: &str) -> String {
    let path = std::path::Path::new(value);
    let mut out = String::new();
    for m in mods.chars() {
        match m {
            'd' => {
                if let Some(colon) = value.find(':') {
                    if colon <= 2 {
                        out.push_str(&value[..=colon]);
                    }
                }
            }
            'p' => {
                if let Some(parent) = path.parent() {
                    out.push_str(&parent.to_string_lossy());
                }
            }
            'n' => {
                if let Some(stem) = path.file_stem() {
                    out.push_str(&stem.to_string_lossy());
                }
            }
            'x' => {
                if let Some(ext) = path.extension() {
                    out.push('.');
                    out.push_str(&ext.to_string_lossy());
                }
            }
            's' | 'f' => out.push_str(value),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpandConfig, ExpandFlags};
    use crate::logger::NullLogger;
    use crate::subprocess::StdSubprocessRunner;
    use std::collections::HashMap;

    fn expand(vars: &mut HashMap<String, String>, args: &[&str], input: &str) -> String {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let config = ExpandConfig::default();
        let runner = StdSubprocessRunner;
        let logger = NullLogger;
        let mut expander = Expander::new(vars, &args, 1, ExpandFlags::default(), &config, &runner, &logger);
        expander.expand_symmetric(input).unwrap()
    }

    #[test]
    fn variable_and_positional_and_star() {
        let mut vars = HashMap::from([("USER".to_string(), "root".to_string())]);
        assert_eq!(expand(&mut vars, &["x"], "%USER%-%1"), "root-x");
    }

    #[test]
    fn double_percent_is_literal() {
        let mut vars = HashMap::new();
        assert_eq!(expand(&mut vars, &[], "100%%done"), "100%done");
    }

    #[test]
    fn caret_escapes_next_metacharacter() {
        let mut vars = HashMap::from([("X".to_string(), "y".to_string())]);
        assert_eq!(expand(&mut vars, &[], "^%X%"), "%X%");
    }

    #[test]
    fn substring_with_negative_start() {
        let mut vars = HashMap::from([("V".to_string(), "abcdef".to_string())]);
        assert_eq!(expand(&mut vars, &[], "%V:~-3%"), "def");
        assert_eq!(expand(&mut vars, &[], "%V:~1,2%"), "bc");
    }

    #[test]
    fn star_joins_all_args_with_space() {
        let mut vars = HashMap::new();
        assert_eq!(expand(&mut vars, &["a", "b", "c"], "%*"), "a b c");
    }
}
