use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::{Path, PathBuf};
use tagscope::cli::{self, IndexArgs};
use tagscope::config::Config;
use tagscope::project::ProjectLayout;
use tagscope::{ContextQueryService, QueryScope, TagIndex, include, root};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "tagscope=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("TAGSCOPE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_index(config: &Config, args: &IndexArgs) -> TagIndex {
    match (&args.root, &args.from) {
        (Some(root), _) => TagIndex::new(config, Some(root.clone()), &args.lib_paths),
        (None, Some(from)) => TagIndex::for_path(config, from, &args.lib_paths),
        (None, None) => TagIndex::for_path(config, Path::new("."), &args.lib_paths),
    }
}

fn roots_for(
    file: &Path,
    project: Option<&PathBuf>,
    explicit: Vec<PathBuf>,
) -> Result<Vec<PathBuf>> {
    if !explicit.is_empty() {
        return Ok(explicit);
    }
    let layout = project.map(|path| ProjectLayout::load(path)).transpose()?;
    Ok(include::search_roots(file, layout.as_ref()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_logging(args.verbose);
    let config = Config::from_env();

    match args.command {
        cli::Command::Root { path } => {
            let found = root::find_root_for_file(&path);
            print_json(&json!({ "root": found }))
        }
        cli::Command::Complete { prefix, index } => {
            let index = open_index(&config, &index);
            let symbols = index
                .complete(&prefix)
                .with_context(|| format!("complete {prefix}"))?;
            print_json(&symbols)
        }
        cli::Command::Find {
            pattern,
            scope_file,
            project,
            index,
        } => {
            let index = open_index(&config, &index);
            let records = match scope_file {
                Some(file) => {
                    let roots = roots_for(&file, project.as_ref(), Vec::new())?;
                    ContextQueryService::new(index).records_in_include_scope(&file, &roots, &pattern)
                }
                None => index.query(&pattern, QueryScope::Definitions, None),
            }
            .with_context(|| format!("find {pattern}"))?;
            print_json(&records)
        }
        cli::Command::Refs { pattern, index } => {
            let index = open_index(&config, &index);
            let records = index
                .query(&pattern, QueryScope::References, None)
                .with_context(|| format!("refs {pattern}"))?;
            print_json(&records)
        }
        cli::Command::Rebuild { index } => {
            let index = open_index(&config, &index);
            let success = index.rebuild().context("rebuild")?;
            print_json(&json!({ "root": index.root(), "success": success }))?;
            if !success {
                std::process::exit(1);
            }
            Ok(())
        }
        cli::Command::Includes { file } => print_json(&include::direct_includes(&file)),
        cli::Command::Closure {
            file,
            project,
            search_roots,
        } => {
            let roots = roots_for(&file, project.as_ref(), search_roots)?;
            print_json(&include::transitive_closure(&roots, &file))
        }
        cli::Command::OpenSymbols { files, index } => {
            let service = ContextQueryService::new(open_index(&config, &index));
            let symbols = service
                .symbols_in_open_files(&files)
                .context("open file symbols")?;
            print_json(&symbols)
        }
        cli::Command::ScopeSymbols {
            file,
            project,
            search_roots,
            index,
        } => {
            let roots = roots_for(&file, project.as_ref(), search_roots)?;
            let service = ContextQueryService::new(open_index(&config, &index));
            let symbols = service
                .symbols_in_include_scope(&file, &roots)
                .with_context(|| format!("scope symbols for {}", file.display()))?;
            print_json(&symbols)
        }
    }
}
