//! Index root discovery.
//!
//! An index root is a directory holding the `GTAGS` marker file directly.
//! Lookup walks from a starting directory towards the filesystem root and
//! stops at the first hit.

use crate::util;
use std::fs;
use std::path::{Path, PathBuf};

pub const MARKER_FILE: &str = "GTAGS";

/// Upper bound on directories probed in one walk.
const MAX_WALK_STEPS: usize = 4096;

pub fn find_root(start: &Path) -> Option<PathBuf> {
    find_root_with_marker(start, MARKER_FILE)
}

/// Like [`find_root`], starting from the directory containing `path` when it
/// names a file.
pub fn find_root_for_file(path: &Path) -> Option<PathBuf> {
    let path = util::absolutize(path);
    if path.is_dir() {
        return find_root(&path);
    }
    find_root(path.parent()?)
}

pub fn find_root_with_marker(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut current = util::absolutize(start);
    if !current.is_dir() {
        return None;
    }
    let mut previous: Option<PathBuf> = None;
    for _ in 0..MAX_WALK_STEPS {
        if previous.as_deref() == Some(current.as_path()) {
            return None;
        }
        if has_marker(&current, marker) {
            return Some(current);
        }
        let parent = current.parent().map(Path::to_path_buf)?;
        previous = Some(std::mem::replace(&mut current, parent));
    }
    tracing::debug!(start = %start.display(), "gave up looking for tag root");
    None
}

fn has_marker(dir: &Path, marker: &str) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_name() == marker)
}
