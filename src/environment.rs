use crate::util;
use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const PATH_VAR: &str = "PATH";
pub const ROOT_VAR: &str = "GTAGSROOT";
pub const LIBPATH_VAR: &str = "GTAGSLIBPATH";

/// Environment handed to every child process of a tag index.
///
/// Built once and never mutated afterwards. The child sees exactly these
/// variables and nothing inherited implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexEnvironment {
    vars: BTreeMap<String, OsString>,
}

impl IndexEnvironment {
    /// `root` is taken as already expanded. It is omitted when it does not
    /// name an existing directory; an index without a usable root just runs
    /// unscoped. `lib_paths` get `~` and `$VAR` expansion here.
    pub fn new(search_path: &OsStr, root: Option<&Path>, lib_paths: &[PathBuf]) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert(PATH_VAR.to_string(), search_path.to_os_string());

        if let Some(root) = root {
            if root.is_dir() {
                vars.insert(ROOT_VAR.to_string(), root.as_os_str().to_os_string());
            } else {
                tracing::debug!(root = %root.display(), "tag root is not a directory, leaving GTAGSROOT unset");
            }
        }

        if !lib_paths.is_empty() {
            let expanded: Vec<PathBuf> = lib_paths.iter().map(|p| util::expand_path(p)).collect();
            match env::join_paths(&expanded) {
                Ok(joined) => {
                    vars.insert(LIBPATH_VAR.to_string(), joined);
                }
                Err(err) => {
                    tracing::warn!("cannot build {LIBPATH_VAR}: {err}");
                }
            }
        }

        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&OsStr> {
        self.vars.get(name).map(OsString::as_os_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OsStr)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_carries_search_path() {
        let env = IndexEnvironment::new(OsStr::new("/usr/bin"), None, &[]);
        assert_eq!(env.get(PATH_VAR), Some(OsStr::new("/usr/bin")));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn existing_root_is_exported() {
        let dir = tempfile::tempdir().unwrap();
        let env = IndexEnvironment::new(OsStr::new(""), Some(dir.path()), &[]);
        assert_eq!(env.get(ROOT_VAR), Some(dir.path().as_os_str()));
    }

    #[test]
    fn missing_root_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let env = IndexEnvironment::new(OsStr::new(""), Some(&missing), &[]);
        assert_eq!(env.get(ROOT_VAR), None);
    }

    #[cfg(unix)]
    #[test]
    fn root_is_not_expanded_again() {
        if env::var_os("PATH").is_none() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let literal = dir.path().join("$PATH");
        std::fs::create_dir(&literal).unwrap();
        let env = IndexEnvironment::new(OsStr::new(""), Some(&literal), &[]);
        assert_eq!(env.get(ROOT_VAR), Some(literal.as_os_str()));
    }

    #[test]
    fn lib_paths_are_joined_with_platform_separator() {
        let libs = vec![PathBuf::from("/opt/liba"), PathBuf::from("/opt/libb")];
        let env = IndexEnvironment::new(OsStr::new(""), None, &libs);
        let joined = env.get(LIBPATH_VAR).unwrap();
        let split: Vec<PathBuf> = env::split_paths(joined).collect();
        assert_eq!(split, libs);
    }
}
