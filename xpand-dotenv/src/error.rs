// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Errors produced while discovering, reading, or applying dot-env files.

use std::path::PathBuf;

use thiserror::Error;
use xpand_core::ExpandError;
use xpand_quote::QuoteError;

/// Failure modes of [`crate::Loader::load_dir`] and its component steps.
///
/// A malformed `KEY=VALUE` line (no `=`, or a key that doesn't match
/// `[A-Za-z_][A-Za-z0-9_]*`) is never one of these: per §4.10 the line
/// processor logs it and skips the line, it does not raise.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LoadError {
    /// A directory could not be scanned for candidate files.
    #[error("failed to scan directory {path}: {source}")]
    DirRead { path: PathBuf, source: std::io::Error },

    /// A file selected for loading (the user-specified custom file, or a
    /// discovered file that later failed to read after being selected)
    /// could not be read.
    #[error("failed to read {path}: {source}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Expand(#[from] ExpandError),

    #[error(transparent)]
    Quote(#[from] QuoteError),
}
