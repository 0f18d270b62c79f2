// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Quote/unquote processing and an escape/unescape codec for shell-style
//! value expansion.
//!
//! See [`quote::unquote`]/[`quote::quote`] for the quoting half and
//! [`escape::escape`]/[`escape::unescape`] for the escaping half. The two
//! are deliberately separate passes, mirroring the expansion engine's own
//! two-step processing of a raw value: first strip (or add) a surrounding
//! quote, then — unless the quote was single and thus opaque — resolve
//! backslash escapes in what's left.

mod error;
mod escape;
mod quote;
mod quote_type;

pub use error::QuoteError;
pub use escape::{decode_one, escape, unescape};
pub use quote::{quote, unquote};
pub use quote_type::QuoteType;
