use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tagscope",
    version,
    about = "Scoped symbol queries over a GNU Global tag index",
    after_help = r#"Examples:
  tagscope root src/main.c
  tagscope complete Exp_Set --from src/main.c
  tagscope find 'ExpAdd.*' --root ~/src/proto1
  tagscope refs Exp_IsSkipProgress --root ~/src/proto1
  tagscope closure src/main.c --project app.project
  tagscope scope-symbols src/main.c --project app.project
  tagscope open-symbols src/main.c include/util.h
  tagscope rebuild --root .
"#
)]
pub struct Args {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Where the tag index lives.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct IndexArgs {
    /// Index root (directory holding GTAGS). Overrides --from.
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Locate the index root upward from this path.
    #[arg(long)]
    pub from: Option<PathBuf>,
    /// Additional library index roots, exported as GTAGSLIBPATH.
    #[arg(long = "lib-path", value_name = "DIR")]
    pub lib_paths: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the index root above a path.
    Root {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Complete symbol names starting with a prefix.
    Complete {
        prefix: String,
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Find definitions matching an extended regular expression.
    Find {
        pattern: String,
        /// Only report tags defined in the include closure of this file.
        #[arg(long, value_name = "FILE")]
        scope_file: Option<PathBuf>,
        /// Project file providing include search roots.
        #[arg(long)]
        project: Option<PathBuf>,
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Find references matching an extended regular expression.
    Refs {
        pattern: String,
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Rebuild the index with gtags.
    Rebuild {
        #[command(flatten)]
        index: IndexArgs,
    },
    /// List quoted includes of a file as written.
    Includes { file: PathBuf },
    /// List the transitive include closure of a file.
    Closure {
        file: PathBuf,
        /// Project file providing include search roots.
        #[arg(long)]
        project: Option<PathBuf>,
        /// Explicit search roots, tried in order. Overrides --project.
        #[arg(long = "search-root", value_name = "DIR")]
        search_roots: Vec<PathBuf>,
    },
    /// Symbols defined in the given open files.
    OpenSymbols {
        files: Vec<PathBuf>,
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Symbols defined in the include closure of a file.
    ScopeSymbols {
        file: PathBuf,
        /// Project file providing include search roots.
        #[arg(long)]
        project: Option<PathBuf>,
        /// Explicit search roots, tried in order. Overrides --project.
        #[arg(long = "search-root", value_name = "DIR")]
        search_roots: Vec<PathBuf>,
        #[command(flatten)]
        index: IndexArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_index_flags() {
        let args = Args::try_parse_from([
            "tagscope",
            "complete",
            "Exp_Set",
            "--root",
            "/src",
            "--lib-path",
            "/lib/a",
            "--lib-path",
            "/lib/b",
        ])
        .unwrap();
        match args.command {
            Command::Complete { prefix, index } => {
                assert_eq!(prefix, "Exp_Set");
                assert_eq!(index.root, Some(PathBuf::from("/src")));
                assert_eq!(index.lib_paths.len(), 2);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn search_roots_keep_order() {
        let args = Args::try_parse_from([
            "tagscope",
            "-v",
            "closure",
            "a.c",
            "--search-root",
            "b",
            "--search-root",
            "a",
        ])
        .unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Closure { search_roots, .. } => {
                assert_eq!(search_roots, vec![PathBuf::from("b"), PathBuf::from("a")]);
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
