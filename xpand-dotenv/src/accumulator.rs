// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! The process-scoped set of already-loaded file paths.
//!
//! A load call skips any file already in the accumulator, so repeated calls
//! against the same directory don't re-apply the same assignments; a caller
//! that wants a clean slate sets [`xpand_core::FileFlags::RESET_ACCUMULATED`],
//! which clears it before that call's discovery runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Tracks the absolute paths of files already loaded in this process.
#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    loaded: HashSet<PathBuf>,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.loaded.contains(path)
    }

    pub fn mark_loaded(&mut self, path: PathBuf) {
        self.loaded.insert(path);
    }

    /// Clears the accumulator, making every previously loaded file eligible
    /// to be loaded again.
    pub fn reset(&mut self) {
        self.loaded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_and_resets() {
        let mut acc = Accumulator::new();
        let path = PathBuf::from("/tmp/.env");
        assert!(!acc.contains(&path));
        acc.mark_loaded(path.clone());
        assert!(acc.contains(&path));
        acc.reset();
        assert!(!acc.contains(&path));
    }
}
