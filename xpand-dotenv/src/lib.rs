// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Layered dot-env file loading: scanning a directory for `.env`-family
//! files, filtering them by caller-supplied dimensions and the current
//! platform stack, and feeding each surviving line through
//! [`xpand_core::Expander`] to build up a variable map.
//!
//! [`Loader`] is the entry point; it ties together [`discover::discover`]
//! (file selection and ordering) and [`line::process_line`] (per-line
//! parsing and expansion), tracking what's already been loaded in an
//! [`Accumulator`] so repeated calls over the same directory don't re-apply
//! the same assignments.
//!
//! ```
//! use std::collections::HashMap;
//! use xpand_dotenv::{Accumulator, Loader};
//! use xpand_core::logger::NullLogger;
//! use xpand_core::subprocess::StdSubprocessRunner;
//!
//! # fn write(dir: &std::path::Path, name: &str, contents: &str) {
//! #     std::fs::write(dir.join(name), contents).unwrap();
//! # }
//! let dir = tempfile::tempdir().unwrap();
//! write(dir.path(), ".env", "GREETING=hello\n");
//!
//! let runner = StdSubprocessRunner;
//! let logger = NullLogger;
//! let loader = Loader::new(&runner, &logger);
//! let mut vars = HashMap::new();
//! let mut accumulator = Accumulator::new();
//! loader.load_dir(dir.path(), None, &mut vars, &mut accumulator).unwrap();
//! assert_eq!(vars.get("GREETING"), Some(&"hello".to_string()));
//! ```

pub mod accumulator;
pub mod discover;
pub mod error;
pub mod filter;
pub mod line;
mod loader;

pub use accumulator::Accumulator;
pub use error::LoadError;
pub use filter::{decompose_tokens, EnvFilter, DEFAULT_INDICATOR};
pub use line::ParseInfo;
pub use loader::Loader;
