//! Include graph resolution.
//!
//! Only quoted includes (`#include "x.h"`) are followed. Angle-bracket
//! includes name system headers that project search roots do not hold.
//! Missing or unreadable files contribute no edges.

use crate::model::FileSet;
use crate::project::ProjectLayout;
use crate::util;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

const INCLUDE_DIRECTIVE: &str = "#include";

/// Quoted include targets of `path`, exactly as written.
pub fn direct_includes(path: &Path) -> BTreeSet<String> {
    let mut includes = BTreeSet::new();
    if !path.is_file() {
        return includes;
    }
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(path = %path.display(), "skip unreadable file: {err}");
            return includes;
        }
    };
    let content = String::from_utf8_lossy(&bytes);
    for line in content.lines() {
        if let Some(target) = quoted_include(line) {
            includes.insert(target.to_string());
        }
    }
    includes
}

/// Target of a `#include "..."` line. The target runs to the last quote.
pub fn quoted_include(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(INCLUDE_DIRECTIVE)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('"')?;
    let end = rest.rfind('"')?;
    Some(&rest[..end])
}

/// First `root/target` that exists as a file, in root order.
pub fn resolve(search_roots: &[PathBuf], target: &str) -> Option<PathBuf> {
    if target.is_empty() {
        return None;
    }
    search_roots
        .iter()
        .map(|root| util::normalize_lexical(&root.join(target)))
        .find(|candidate| candidate.is_file())
}

/// Every file reachable from `seed` through quoted includes, seed included.
pub fn transitive_closure(search_roots: &[PathBuf], seed: &Path) -> FileSet {
    let seed = util::absolutize(seed);
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    seen.insert(seed.clone());
    queue.push_back(seed);

    while let Some(current) = queue.pop_front() {
        for target in direct_includes(&current) {
            let Some(resolved) = resolve(search_roots, &target) else {
                tracing::trace!(from = %current.display(), include = %target, "unresolved include");
                continue;
            };
            let resolved = util::absolutize(&resolved);
            if seen.insert(resolved.clone()) {
                queue.push_back(resolved);
            }
        }
    }

    seen.into_iter().collect()
}

/// Directories include targets are resolved against.
///
/// Without a project this is the file's own directory. With one, each project
/// folder in declared order.
pub fn search_roots(file: &Path, project: Option<&ProjectLayout>) -> Vec<PathBuf> {
    match project {
        Some(project) if !project.folders.is_empty() => project.folder_paths(),
        _ => util::absolutize(file)
            .parent()
            .map(|dir| vec![dir.to_path_buf()])
            .unwrap_or_default(),
    }
}
