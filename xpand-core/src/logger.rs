// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! A minimal logging seam for diagnostics that are not themselves errors
//! (skipped dot-env lines, optional files that failed to read).

/// Receives diagnostic messages the loader and line processor produce along
/// the way. Injected by the caller; absent by default.
pub trait Logger {
    fn log(&self, message: &str);
}

/// A [`Logger`] that discards everything. Used whenever the caller does not
/// inject one, so the rest of the code never has to special-case a missing
/// logger.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _message: &str) {}
}
