//! Queries against a GNU Global tag index.
//!
//! A `TagIndex` owns the child environment and launches `global` / `gtags`
//! for each operation. Query shapes:
//!
//! - completion: `global -c [-- PREFIX]`
//! - match: `global -a -x -E [-r] -- PATTERN`
//! - restricted to files: `global -a -x -f FILE...` (pattern matched locally
//!   against the whole symbol, as `global` does)
//! - symbols in files: `global -q -f FILE...`
//! - rebuild: `gtags -v` in the index root
//!
//! Non-zero exits from query shapes mean "nothing found" and produce empty
//! results. Output that is not UTF-8 is an error.

use crate::config::Config;
use crate::environment::IndexEnvironment;
use crate::error::{Result, TagError};
use crate::model::{FileSet, QueryScope, TagRecord};
use crate::parse;
use crate::process::{Capture, ProcessOutput, ProcessRunner};
use crate::root;
use crate::util;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone)]
pub struct TagIndex {
    env: IndexEnvironment,
    root: Option<PathBuf>,
    runner: ProcessRunner,
    rebuild_runner: ProcessRunner,
    global_program: String,
    gtags_program: String,
    // Queries hold the read side, rebuild the write side. Shared by clones.
    rebuild_lock: Arc<RwLock<()>>,
}

impl TagIndex {
    pub fn new(config: &Config, root: Option<PathBuf>, lib_paths: &[PathBuf]) -> Self {
        let root = root.map(|root| util::expand_path(&root));
        let env = IndexEnvironment::new(&config.search_path, root.as_deref(), lib_paths);
        Self {
            env,
            root,
            runner: ProcessRunner::new(config.exec_mode, config.query_timeout()),
            rebuild_runner: ProcessRunner::new(config.exec_mode, config.rebuild_timeout()),
            global_program: config.global_program.clone(),
            gtags_program: config.gtags_program.clone(),
            rebuild_lock: Arc::new(RwLock::new(())),
        }
    }

    /// Index rooted at the nearest `GTAGS` above `path`, or unrooted when
    /// there is none.
    pub fn for_path(config: &Config, path: &Path, lib_paths: &[PathBuf]) -> Self {
        let root = root::find_root_for_file(path);
        if root.is_none() {
            tracing::debug!(path = %path.display(), "no tag root found");
        }
        Self::new(config, root, lib_paths)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn environment(&self) -> &IndexEnvironment {
        &self.env
    }

    /// Symbols starting with `prefix`, as emitted. Duplicates are kept.
    pub fn complete(&self, prefix: &str) -> Result<Vec<String>> {
        let mut args = vec!["-c".to_string()];
        if !prefix.is_empty() {
            args.push("--".to_string());
            args.push(prefix.to_string());
        }
        let text = self.query_text(args)?;
        let symbols = parse::parse_symbol_lines(&text)
            .map(str::to_string)
            .collect();
        Ok(symbols)
    }

    /// Definitions or references matching `pattern`.
    ///
    /// With `file_filter` the tool lists every tag in those files and
    /// `pattern` is matched locally against the symbol; `scope` does not
    /// apply to that shape.
    pub fn query(
        &self,
        pattern: &str,
        scope: QueryScope,
        file_filter: Option<&FileSet>,
    ) -> Result<Vec<TagRecord>> {
        match file_filter {
            None => {
                let mut args = vec!["-a".to_string(), "-x".to_string(), "-E".to_string()];
                if scope == QueryScope::References {
                    args.push("-r".to_string());
                }
                args.push("--".to_string());
                args.push(pattern.to_string());
                let text = self.query_text(args)?;
                let records = parse::parse_tag_lines(&text).collect();
                Ok(records)
            }
            Some(files) => {
                let matcher = Regex::new(&format!("^(?:{pattern})$"))?;
                if files.is_empty() {
                    return Ok(Vec::new());
                }
                if scope == QueryScope::References {
                    tracing::debug!("reference scope ignored for file-restricted query");
                }
                let mut args = vec!["-a".to_string(), "-x".to_string(), "-f".to_string()];
                args.extend(file_args(files));
                let text = self.query_text(args)?;
                let records = parse::parse_tag_lines(&text)
                    .filter(|record| matcher.is_match(&record.symbol))
                    .collect();
                Ok(records)
            }
        }
    }

    /// Symbol column of every tag defined in `files`.
    pub fn symbols_in_files(&self, files: &FileSet) -> Result<Vec<String>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let mut args = vec!["-q".to_string(), "-f".to_string()];
        args.extend(file_args(files));
        let text = self.query_text(args)?;
        let symbols = parse::parse_symbol_lines(&text)
            .map(str::to_string)
            .collect();
        Ok(symbols)
    }

    /// Run `gtags -v` in the index root. Returns whether it exited cleanly;
    /// the tool's stderr is logged on failure.
    pub fn rebuild(&self) -> Result<bool> {
        let _guard = self
            .rebuild_lock
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let argv = vec![self.gtags_program.clone(), "-v".to_string()];
        let output = self
            .rebuild_runner
            .run(&argv, &self.env, self.root.as_deref(), Capture::STDERR)?;
        if output.success() {
            tracing::debug!(root = ?self.root, "rebuilt tag index");
            return Ok(true);
        }
        tracing::warn!(
            root = ?self.root,
            exit_code = ?output.exit_code,
            "{} failed: {}",
            self.gtags_program,
            output.stderr_lossy()
        );
        Ok(false)
    }

    fn query_text(&self, args: Vec<String>) -> Result<String> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(self.global_program.clone());
        argv.extend(args);
        let output = {
            let _guard = self
                .rebuild_lock
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            self.runner
                .run(&argv, &self.env, self.root.as_deref(), Capture::STDOUT)?
        };
        self.decode(output)
    }

    fn decode(&self, output: ProcessOutput) -> Result<String> {
        if !output.success() {
            tracing::debug!(
                program = %self.global_program,
                exit_code = ?output.exit_code,
                "query returned no results"
            );
            return Ok(String::new());
        }
        String::from_utf8(output.stdout).map_err(|source| TagError::Decode {
            program: self.global_program.clone(),
            source,
        })
    }
}

fn file_args(files: &FileSet) -> impl Iterator<Item = String> + '_ {
    files
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
}
