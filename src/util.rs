use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Make `path` absolute against the current directory, then normalize it.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    normalize_lexical(&joined)
}

/// Expand a leading `~` and `$VAR` / `${VAR}` references. Unknown variables
/// are left as written.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    if !raw.contains('$') && !raw.starts_with('~') {
        return path.to_path_buf();
    }
    let with_vars = expand_vars(&raw);
    PathBuf::from(expand_home(&with_vars))
}

fn expand_home(raw: &str) -> String {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return raw.to_string(),
    };
    match directories::BaseDirs::new() {
        Some(dirs) => format!("{}{rest}", dirs.home_dir().display()),
        None => raw.to_string(),
    }
}

fn expand_vars(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };
        match (name.is_empty(), env::var(name)) {
            (false, Ok(value)) => out.push_str(&value),
            _ => out.push_str(&rest[pos..pos + 1 + consumed]),
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(
            normalize_lexical(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(normalize_lexical(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_lexical(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize_lexical(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn expand_leaves_plain_paths_alone() {
        assert_eq!(
            expand_path(Path::new("/usr/include")),
            PathBuf::from("/usr/include")
        );
    }

    #[test]
    fn expand_keeps_unknown_variables() {
        let raw = "/x/$TAGSCOPE_SURELY_UNSET_VAR/y";
        assert_eq!(expand_path(Path::new(raw)), PathBuf::from(raw));
        let braced = "/x/${TAGSCOPE_SURELY_UNSET_VAR}/y";
        assert_eq!(expand_path(Path::new(braced)), PathBuf::from(braced));
    }

    #[test]
    fn expand_substitutes_known_variables() {
        let Ok(path) = env::var("PATH") else {
            return;
        };
        assert_eq!(
            expand_path(Path::new("$PATH/x")),
            PathBuf::from(format!("{path}/x"))
        );
        assert_eq!(
            expand_path(Path::new("${PATH}x")),
            PathBuf::from(format!("{path}x"))
        );
    }
}
