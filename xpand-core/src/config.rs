// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Configuration knobs for a round of expansion.

use std::time::Duration;

/// Candidate metacharacters and behavioral toggles threaded through a call
/// to the expansion engine. A plain struct with `Default`, rather than a
/// builder, since every field already has an obvious default and callers
/// typically only override one or two.
#[derive(Clone, Debug)]
pub struct ExpandConfig {
    /// Candidate escape characters; the first one found unescaped and
    /// unquoted in a line wins dialect detection.
    pub escape_chars: Vec<char>,
    /// Candidate expansion markers; same first-wins rule.
    pub expand_chars: Vec<char>,
    /// Candidate line-comment markers; first unquoted occurrence wins.
    pub cutter_chars: Vec<char>,
    /// Characters that must be escaped even inside their own matching
    /// quote (e.g. a quote character that is also a hard delimiter).
    pub hard_quotes: Vec<char>,
    /// Whether to trim outer whitespace before quote detection.
    pub strip_spaces: bool,
    /// Subprocess timeout; `None` means unbounded.
    pub subprocess_timeout: Option<Duration>,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        ExpandConfig {
            escape_chars: vec!['\\', '^'],
            expand_chars: vec!['$', '%'],
            cutter_chars: vec!['#', ';'],
            hard_quotes: Vec::new(),
            strip_spaces: true,
            subprocess_timeout: None,
        }
    }
}
