// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Flags controlling how a value is expanded.

use bitflags::bitflags;

bitflags! {
    /// Options controlling a single call to [`crate::Expander::expand_posix`]
    /// or [`crate::Expander::expand_symmetric`].
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ExpandFlags: u16 {
        /// Command substitutions are executed via a platform shell.
        const ALLOW_SHELL = 1 << 0;
        /// Command substitutions are executed as a tokenized argv, with no
        /// shell involved.
        const ALLOW_SUBPROC = 1 << 1;
        /// Drop an unquoted `cutter_char` through end of line.
        const REMOVE_LINE_COMMENT = 1 << 2;
        /// Strip the enclosing quote characters from a quoted region's
        /// result. When cleared, the quote characters are kept verbatim
        /// around the (still expanded, still escape-processed) content.
        const REMOVE_QUOTES = 1 << 3;
        /// Suppress variable lookup (every reference expands to empty).
        const SKIP_ENV_VARS = 1 << 4;
        /// Treat single-quoted regions as opaque literal text.
        const SKIP_SINGLE_QUOTED = 1 << 5;
        /// Apply the escape codec to decoded escape sequences.
        const UNESCAPE = 1 << 6;
    }
}

impl Default for ExpandFlags {
    fn default() -> Self {
        ExpandFlags::ALLOW_SHELL
            | ExpandFlags::REMOVE_QUOTES
            | ExpandFlags::SKIP_SINGLE_QUOTED
            | ExpandFlags::UNESCAPE
    }
}

bitflags! {
    /// Options controlling how a dot-env file is read by the loader.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct FileFlags: u8 {
        /// Add the platform-derived tags to the explicit filter set instead
        /// of replacing it.
        const ADD_PLATFORMS = 1 << 0;
        /// Clear the load accumulator before this call, so previously
        /// loaded files are eligible to be loaded again.
        const RESET_ACCUMULATED = 1 << 1;
    }
}

impl Default for FileFlags {
    fn default() -> Self {
        FileFlags::ADD_PLATFORMS
    }
}
