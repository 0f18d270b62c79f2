// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! The top-level orchestrator: discover files, read and concatenate their
//! text, split into lines, and run each line through the line processor,
//! in the order §2's data-flow diagram describes.

use std::collections::HashMap;
use std::path::Path;

use xpand_core::logger::{Logger, NullLogger};
use xpand_core::subprocess::{StdSubprocessRunner, SubprocessRunner};
use xpand_core::{ExpandConfig, ExpandFlags, FileFlags};
use xpand_platform::PlatformFlags;

use crate::discover::discover;
use crate::error::LoadError;
use crate::filter::EnvFilter;
use crate::line::{process_line, ParseInfo};
use crate::Accumulator;

/// Configuration and injected collaborators for a round of dot-env loading.
///
/// Like [`xpand_core::Expander`], a `Loader` borrows its collaborators
/// rather than owning them, so the same runner/logger pair can back many
/// loads (and many expansions) without re-injecting them each time.
pub struct Loader<'a> {
    pub platform_id: String,
    pub platform_flags: PlatformFlags,
    pub file_flags: FileFlags,
    pub filters: Vec<EnvFilter>,
    pub expand_flags: ExpandFlags,
    pub expand_config: ExpandConfig,
    pub args: Vec<String>,
    pub pid: i64,
    pub runner: &'a dyn SubprocessRunner,
    pub logger: &'a dyn Logger,
}

impl<'a> Loader<'a> {
    /// A loader with every documented default: the host's own platform
    /// identity (via [`std::env::consts::OS`]), no explicit filters, and
    /// the default [`ExpandFlags`]/[`ExpandConfig`].
    pub fn new(runner: &'a dyn SubprocessRunner, logger: &'a dyn Logger) -> Self {
        Loader {
            platform_id: std::env::consts::OS.to_string(),
            platform_flags: PlatformFlags::empty(),
            file_flags: FileFlags::default(),
            filters: Vec::new(),
            expand_flags: ExpandFlags::default(),
            expand_config: ExpandConfig::default(),
            args: Vec::new(),
            pid: std::process::id() as i64,
            runner,
            logger,
        }
    }

    /// Discovers and loads every matching dot-env file in `dir` into
    /// `vars`, in deterministic read order (so a later file's assignments
    /// override an earlier file's for the same key), returning the
    /// [`ParseInfo`] for each assignment actually applied.
    ///
    /// A read failure for a file [`crate::discover::discover`] selected on
    /// its own is logged and skipped (it was an optional default file);
    /// a read failure for `custom_path` is propagated, since the caller
    /// asked for that file by name.
    pub fn load_dir(
        &self,
        dir: &Path,
        custom_path: Option<&Path>,
        vars: &mut HashMap<String, String>,
        accumulator: &mut Accumulator,
    ) -> Result<Vec<ParseInfo>, LoadError> {
        if self.file_flags.contains(FileFlags::RESET_ACCUMULATED) {
            accumulator.reset();
        }

        let platform_tags = self
            .file_flags
            .contains(FileFlags::ADD_PLATFORMS)
            .then(|| xpand_platform::classify(&self.platform_id, self.platform_flags));

        let files = discover(dir, &self.filters, platform_tags.as_deref(), custom_path, accumulator)?;
        // `discover` only appends `custom_path` when it currently exists as
        // a file; mirror that check here so a custom path that was never
        // actually selected doesn't get mistaken for the last discovered
        // file when deciding which read failures to propagate.
        let custom_index = custom_path
            .filter(|p| p.is_file())
            .map(|_| files.len().saturating_sub(1));

        let mut infos = Vec::new();
        for (index, file) in files.iter().enumerate() {
            let text = match std::fs::read_to_string(file) {
                Ok(text) => text,
                Err(source) => {
                    if Some(index) == custom_index {
                        return Err(LoadError::FileRead { path: file.clone(), source });
                    }
                    self.logger.log(&format!("skipping unreadable dot-env file {}: {source}", file.display()));
                    continue;
                }
            };
            for line in split_lines(&text) {
                if let Some((_, info)) = process_line(
                    line,
                    vars,
                    &self.args,
                    self.pid,
                    self.expand_flags,
                    &self.expand_config,
                    self.runner,
                    self.logger,
                )? {
                    infos.push(info);
                }
            }
        }
        Ok(infos)
    }
}

impl Default for Loader<'static> {
    fn default() -> Self {
        Loader::new(&STD_RUNNER, &NULL_LOGGER)
    }
}

static STD_RUNNER: StdSubprocessRunner = StdSubprocessRunner;
static NULL_LOGGER: NullLogger = NullLogger;

/// Splits `text` into lines on `\n` or `\r\n`, stripping a leading UTF-8 BOM
/// if present (§6: "No BOM handling required (strip if present)").
fn split_lines(text: &str) -> Vec<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)).collect()
}
