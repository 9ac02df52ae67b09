use crate::error::Result;
use crate::include;
use crate::model::{FileSet, QueryScope, TagRecord};
use crate::project::ProjectLayout;
use crate::tags::TagIndex;
use crate::util;
use std::path::{Path, PathBuf};

/// Symbol queries narrowed to what the caller is looking at: open files, or
/// the include closure of one file.
#[derive(Debug, Clone)]
pub struct ContextQueryService {
    index: TagIndex,
}

impl ContextQueryService {
    pub fn new(index: TagIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    pub fn symbols_in_open_files<P: AsRef<Path>>(&self, open_files: &[P]) -> Result<Vec<String>> {
        let files: FileSet = open_files
            .iter()
            .filter_map(|path| {
                let path: &Path = path.as_ref();
                path.is_file().then(|| util::absolutize(path))
            })
            .collect();
        self.index.symbols_in_files(&files)
    }

    pub fn symbols_in_include_scope(
        &self,
        file: &Path,
        search_roots: &[PathBuf],
    ) -> Result<Vec<String>> {
        let files = include_scope(file, search_roots);
        self.index.symbols_in_files(&files)
    }

    pub fn symbols_in_project_scope(
        &self,
        file: &Path,
        project: Option<&ProjectLayout>,
    ) -> Result<Vec<String>> {
        let roots = include::search_roots(file, project);
        self.symbols_in_include_scope(file, &roots)
    }

    /// Definitions matching `pattern` inside the include closure of `file`.
    pub fn records_in_include_scope(
        &self,
        file: &Path,
        search_roots: &[PathBuf],
        pattern: &str,
    ) -> Result<Vec<TagRecord>> {
        let files = include_scope(file, search_roots);
        self.index
            .query(pattern, QueryScope::Definitions, Some(&files))
    }
}

/// Include closure of `file`, limited to files that exist. A missing seed
/// gives an empty scope.
fn include_scope(file: &Path, search_roots: &[PathBuf]) -> FileSet {
    if !file.is_file() {
        return FileSet::new();
    }
    let closure = include::transitive_closure(search_roots, file);
    tracing::debug!(file = %file.display(), files = closure.len(), "computed include scope");
    closure
}
