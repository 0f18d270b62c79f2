// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Errors produced by quote and escape processing.

use thiserror::Error;

/// Types of errors that can happen while unquoting or unescaping a value.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum QuoteError {
    /// A `'` or `"` was opened but never closed.
    #[error("unterminated quote")]
    UnterminatedQuote,
    /// The escape character is the last character of the input, with
    /// nothing following it to escape.
    #[error("dangling escape character at end of input")]
    DanglingEscape,
    /// A `\x`, `\u` or `\U` escape was not followed by enough hexadecimal
    /// digits, or the digits did not form a valid Unicode scalar value.
    #[error("invalid escape sequence")]
    InvalidEscapeSequence,
}
