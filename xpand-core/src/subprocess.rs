// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Command substitution's subprocess half: running a command line (either
//! through a platform shell or as a tokenized argv) and capturing its
//! output under a timeout.

use std::io::Read as _;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::ExpandError;

/// Result of running a command: captured standard output and standard
/// error (both UTF-8, lossily decoded), and the exit status.
#[derive(Clone, Debug)]
pub struct SubprocessOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

/// Executes command substitutions. Injected so tests can stub child
/// process behavior without spawning a real shell.
pub trait SubprocessRunner {
    fn run_shell(
        &self,
        command_line: &str,
        timeout: Option<Duration>,
    ) -> Result<SubprocessOutput, ExpandError>;

    fn run_argv(
        &self,
        argv: &[String],
        timeout: Option<Duration>,
    ) -> Result<SubprocessOutput, ExpandError>;
}

/// Runs commands with `std::process::Command`, polling `try_wait` on a
/// short interval to enforce the timeout without pulling in an async
/// runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdSubprocessRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

impl SubprocessRunner for StdSubprocessRunner {
    fn run_shell(
        &self,
        command_line: &str,
        timeout: Option<Duration>,
    ) -> Result<SubprocessOutput, ExpandError> {
        let mut command = platform_shell_command(command_line);
        run(&mut command, timeout)
    }

    fn run_argv(
        &self,
        argv: &[String],
        timeout: Option<Duration>,
    ) -> Result<SubprocessOutput, ExpandError> {
        let Some((program, args)) = argv.split_first() else {
            return Ok(SubprocessOutput {
                stdout: String::new(),
                stderr: String::new(),
                status: 0,
            });
        };
        let mut command = Command::new(program);
        command.args(args);
        run(&mut command, timeout)
    }
}

#[cfg(unix)]
fn platform_shell_command(command_line: &str) -> Command {
    let mut command = Command::new("/bin/sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(not(unix))]
fn platform_shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(command_line);
    command
}

fn run(command: &mut Command, timeout: Option<Duration>) -> Result<SubprocessOutput, ExpandError> {
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    let mut child = command.spawn().map_err(|e| ExpandError::Io(e.to_string()))?;

    let deadline = timeout.map(|d| Instant::now() + d);
    let status = loop {
        if let Some(status) = child.try_wait().map_err(|e| ExpandError::Io(e.to_string()))? {
            break status;
        }
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExpandError::SubprocessTimeout);
            }
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        let mut buf = Vec::new();
        out.read_to_end(&mut buf).map_err(|e| ExpandError::Io(e.to_string()))?;
        stdout = String::from_utf8_lossy(&buf).into_owned();
    }
    let mut stderr = String::new();
    if let Some(mut err) = child.stderr.take() {
        let mut buf = Vec::new();
        err.read_to_end(&mut buf).map_err(|e| ExpandError::Io(e.to_string()))?;
        stderr = String::from_utf8_lossy(&buf).into_owned();
    }

    Ok(SubprocessOutput {
        stdout: strip_trailing_newline(&stdout),
        stderr: strip_trailing_newline(&stderr),
        status: status.code().unwrap_or(-1),
    })
}

fn strip_trailing_newline(s: &str) -> String {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
        .to_string()
}

/// Splits `input` into shell words, respecting single and double quotes and
/// backslash escapes, for the `ALLOW_SUBPROC` (no-shell) code path.
pub fn tokenize(input: &str) -> Result<Vec<String>, ExpandError> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        let mut word = String::new();
        while i < chars.len() && !chars[i].is_whitespace() {
            match chars[i] {
                '\'' => {
                    i += 1;
                    let start = i;
                    while i < chars.len() && chars[i] != '\'' {
                        i += 1;
                    }
                    if i >= chars.len() {
                        return Err(ExpandError::UnterminatedQuote);
                    }
                    word.extend(&chars[start..i]);
                    i += 1;
                }
                '"' => {
                    i += 1;
                    while i < chars.len() && chars[i] != '"' {
                        if chars[i] == '\\' && i + 1 < chars.len() {
                            word.push(chars[i + 1]);
                            i += 2;
                        } else {
                            word.push(chars[i]);
                            i += 1;
                        }
                    }
                    if i >= chars.len() {
                        return Err(ExpandError::UnterminatedQuote);
                    }
                    i += 1;
                }
                '\\' if i + 1 < chars.len() => {
                    word.push(chars[i + 1]);
                    i += 2;
                }
                c => {
                    word.push(c);
                    i += 1;
                }
            }
        }
        words.push(word);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_whitespace() {
        assert_eq!(tokenize("echo hi there").unwrap(), vec!["echo", "hi", "there"]);
    }

    #[test]
    fn tokenize_respects_quotes() {
        assert_eq!(
            tokenize(r#"echo "hi there" 'and this'"#).unwrap(),
            vec!["echo", "hi there", "and this"]
        );
    }

    #[test]
    fn tokenize_unterminated_quote_is_an_error() {
        assert_matches::assert_matches!(tokenize("echo 'oops"), Err(ExpandError::UnterminatedQuote));
    }
}
