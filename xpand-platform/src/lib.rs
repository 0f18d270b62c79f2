// SPDX-License-Identifier: MIT OR Apache-2.0
// This file is part of xpand, a shell-style string expansion engine.

//! Platform tag classification for dot-env file discovery.
//!
//! [`classify`] turns a raw platform identity string (as one might read
//! from `std::env::consts::OS`, a `uname -a` line, or a JVM `os.name`
//! property) into an ordered list of tags, broadest first, that the file
//! discoverer uses to select `.env.<tag>` files.

use bitflags::bitflags;

bitflags! {
    /// Options affecting [`classify`].
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct PlatformFlags: u8 {
        /// Prepend an empty tag, so that untagged files (e.g. bare `.env`)
        /// are treated as matching every platform.
        const ADD_EMPTY = 1 << 0;
    }
}

/// The full vocabulary of tags [`classify`] can ever produce (excluding the
/// raw platform identity itself, which is open-ended). A dot-env file
/// discoverer uses this to tell "this filename names a specific platform"
/// from "this token is unrelated to platform filtering" when one of these
/// words shows up in a filename but isn't in the current platform stack.
pub const KNOWN_TAGS: &[&str] = &["posix", "bsd", "linux", "darwin", "macos", "vms", "windows"];

/// Returns the ordered platform tag stack for `platform_id`, broadest tag
/// first, the raw (lowercased) identity last if it is more specific than
/// any tag already produced.
///
/// `platform_id` is matched case-insensitively; the returned tags are
/// always lowercase.
pub fn classify(platform_id: &str, flags: PlatformFlags) -> Vec<String> {
    let id = platform_id.to_lowercase();
    let mut tags = Vec::new();

    if flags.contains(PlatformFlags::ADD_EMPTY) {
        tags.push(String::new());
    }

    let is_posix_like = [
        "aix", "bsd", "darwin", "hp-ux", "linux", "sunos", "cygwin", "msys",
    ]
    .iter()
    .any(|s| id.contains(s));

    if is_posix_like {
        tags.push("posix".to_string());
    }
    if id.contains("bsd") || id.contains("darwin") {
        tags.push("bsd".to_string());
    }
    if id.contains("linux") {
        tags.push("linux".to_string());
    }
    if id.contains("darwin") || id.contains("macos") || id.starts_with("ios") {
        tags.push("darwin".to_string());
    }
    if id.contains("darwin") || id.contains("macos") {
        tags.push("macos".to_string());
    }
    if id.contains("vms") {
        tags.push("vms".to_string());
    }
    if id.starts_with("win") {
        tags.push("windows".to_string());
    }
    if id.contains("java") {
        if id.starts_with("win") {
            tags.push("windows".to_string());
        } else {
            tags.push("posix".to_string());
        }
    }

    if !id.is_empty() && !tags.iter().any(|t| t == &id) {
        tags.push(id);
    }

    dedup_preserving_order(tags)
}

/// Removes duplicate tags while keeping the first occurrence's position,
/// since a platform identity can trigger the same rule twice (e.g. a
/// `java`-on-POSIX identity that also contains `linux`).
fn dedup_preserving_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}
