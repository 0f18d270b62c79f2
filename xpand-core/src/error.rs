// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Error types for expansion and subprocess execution.

use thiserror::Error;
use xpand_glob::GlobError;
use xpand_quote::QuoteError;

/// Failure modes of [`crate::Expander::expand_posix`] and
/// [`crate::Expander::expand_symmetric`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExpandError {
    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("dangling escape at end of input")]
    DanglingEscape,

    #[error("{name}: {message}")]
    MissingVariable { name: String, message: String },

    #[error("bad substitution: {0}")]
    BadSubstitution(String),

    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("subprocess exited with status {status}: {stderr}")]
    SubprocessFailed { status: i32, stderr: String },

    #[error("subprocess timed out")]
    SubprocessTimeout,

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error("i/o error: {0}")]
    Io(String),
}
