// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Filenames-as-tag-sets: decomposing a filename into tokens, and deciding
//! whether a set of tokens satisfies a filter dimension (e.g. "only the
//! `prod` stage, not `dev` or `test`").

use std::collections::HashSet;

/// The default filter indicator, matching the canonical `.env` family of
/// filenames.
pub const DEFAULT_INDICATOR: &str = "env";

/// One filter dimension: `indicator` is the marker token every filename
/// subject to this dimension must contain (e.g. `"env"` for the dot-env
/// family itself); `cur_values` names the values currently selected;
/// `all_values` names every value this dimension can take. A filename's
/// token set satisfies the dimension if either none of `all_values` appear
/// in it (the file doesn't name this dimension at all, so it's a wildcard)
/// or at least one of `cur_values` does.
#[derive(Clone, Debug)]
pub struct EnvFilter {
    pub indicator: String,
    pub cur_values: HashSet<String>,
    pub all_values: HashSet<String>,
}

impl Default for EnvFilter {
    fn default() -> Self {
        EnvFilter {
            indicator: DEFAULT_INDICATOR.to_string(),
            cur_values: HashSet::new(),
            all_values: HashSet::new(),
        }
    }
}

impl EnvFilter {
    /// Builds a filter with the default `"env"` indicator and the given
    /// current/all value sets.
    pub fn new(
        cur_values: impl IntoIterator<Item = String>,
        all_values: impl IntoIterator<Item = String>,
    ) -> Self {
        EnvFilter {
            cur_values: cur_values.into_iter().collect(),
            all_values: all_values.into_iter().collect(),
            ..EnvFilter::default()
        }
    }

    /// Builds a filter with an explicit indicator, falling back to
    /// [`DEFAULT_INDICATOR`] if given an empty one (the indicator must be
    /// nonempty).
    pub fn with_indicator(
        indicator: impl Into<String>,
        cur_values: impl IntoIterator<Item = String>,
        all_values: impl IntoIterator<Item = String>,
    ) -> Self {
        let indicator = indicator.into();
        EnvFilter {
            indicator: if indicator.is_empty() {
                DEFAULT_INDICATOR.to_string()
            } else {
                indicator
            },
            cur_values: cur_values.into_iter().collect(),
            all_values: all_values.into_iter().collect(),
        }
    }

    /// Whether `tokens` (a filename's decomposed tokens) satisfies this
    /// filter: the indicator must be present, and the dimension check
    /// (wildcard or a current value present) must pass.
    pub fn matches(&self, tokens: &HashSet<String>) -> bool {
        tokens.contains(&self.indicator) && wildcard_or_match(&self.cur_values, &self.all_values, tokens)
    }
}

/// The core "wildcard or match" rule shared by [`EnvFilter::matches`] and
/// the file discoverer's platform-tag dimension, which is structurally the
/// same check but without requiring a separate indicator token.
pub(crate) fn wildcard_or_match(cur_values: &HashSet<String>, all_values: &HashSet<String>, tokens: &HashSet<String>) -> bool {
    all_values.iter().all(|v| !tokens.contains(v)) || cur_values.iter().any(|v| tokens.contains(v))
}

/// Splits a filename into its dot/underscore/hyphen-separated tokens,
/// lowercased, discarding empty tokens (so a leading dot doesn't produce a
/// spurious empty entry). Token sets, not sequences: `.env.prod.linux` and
/// `.linux.prod.env` decompose identically.
pub fn decompose_tokens(filename: &str) -> HashSet<String> {
    filename
        .split(['.', '_', '-'])
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn decompose_ignores_token_order() {
        assert_eq!(decompose_tokens(".env.prod.linux"), decompose_tokens(".linux.prod.env"));
    }

    #[test]
    fn decompose_is_lowercased() {
        assert_eq!(decompose_tokens(".ENV.PROD"), set(&["env", "prod"]));
    }

    #[test]
    fn matches_requires_indicator() {
        let filter = EnvFilter::new(set(&["prod"]), set(&["dev", "test", "prod"]));
        assert!(!filter.matches(&set(&["prod"])), "missing the 'env' indicator token");
        assert!(filter.matches(&set(&["env", "prod"])));
    }

    #[test]
    fn wildcard_when_dimension_absent() {
        let filter = EnvFilter::new(set(&["prod"]), set(&["dev", "test", "prod"]));
        assert!(filter.matches(&set(&["env", "linux"])));
    }

    #[test]
    fn rejects_non_current_value() {
        let filter = EnvFilter::new(set(&["prod"]), set(&["dev", "test", "prod"]));
        assert!(!filter.matches(&set(&["env", "dev"])));
    }
}
