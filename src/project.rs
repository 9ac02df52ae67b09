use crate::util;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Folders of the caller's active project, used as include search roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLayout {
    pub project_file: PathBuf,
    pub folders: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    folders: Vec<ProjectFolder>,
}

#[derive(Debug, Deserialize)]
struct ProjectFolder {
    path: PathBuf,
}

impl ProjectLayout {
    pub fn new(project_file: PathBuf, folders: Vec<PathBuf>) -> Self {
        Self {
            project_file,
            folders,
        }
    }

    /// Load a JSON project file of the form `{"folders": [{"path": "..."}]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = util::read_to_string(path)?;
        let parsed: ProjectFile = serde_json::from_str(&raw)
            .with_context(|| format!("parse project file {}", path.display()))?;
        Ok(Self {
            project_file: util::absolutize(path),
            folders: parsed.folders.into_iter().map(|folder| folder.path).collect(),
        })
    }

    /// Folders resolved against the project file's directory, in order.
    pub fn folder_paths(&self) -> Vec<PathBuf> {
        let base = util::absolutize(&self.project_file)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.folders
            .iter()
            .map(|folder| util::normalize_lexical(&base.join(util::expand_path(folder))))
            .collect()
    }
}
