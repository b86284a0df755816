//! CLI argument parsing (spec.md §6), kept as thin glue around `clap`
//! derive macros, the way `mergiraf::bin::mergiraf` builds its `Cli`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

const SOURCE_EXTENSIONS: &[&str] = &["sv", "svh", "v", "vh"];

#[derive(Parser, Debug)]
#[command(name = "sv-bugpoint", about = "A syntax-aware test-case minimizer for SystemVerilog")]
pub struct CliArgs {
    /// Directory the minimizer writes its working state to.
    pub work_dir: PathBuf,

    /// Oracle script: exit 0 iff the candidate files are still "interesting".
    pub check_script: PathBuf,

    /// Input source files to minimize.
    pub input_files: Vec<PathBuf>,

    /// Do not prompt when `work-dir` is non-empty.
    #[arg(long)]
    pub force: bool,

    /// Archive every attempt's scratch file under `debug/attempts/`.
    #[arg(long)]
    pub save_intermediates: bool,

    /// Write syntax/AST dumps to `debug/` before minimizing.
    #[arg(long)]
    pub dump_trees: bool,

    /// Response file(s): one path, `-f <file>`, or `-y <dir>` per line.
    #[arg(short = 'f', value_name = "FILE")]
    pub response_files: Vec<PathBuf>,

    /// Add every `.sv`/`.svh`/`.v`/`.vh` file in a directory as an input.
    #[arg(short = 'y', value_name = "DIR")]
    pub directories: Vec<PathBuf>,

    /// Increase log verbosity (`-v`, `-vv`, ...).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Resolves `args`' positional inputs plus every `-f`/`-y` expansion into a
/// final, order-preserving list of input files.
pub fn resolve_input_files(args: &CliArgs) -> Result<Vec<PathBuf>, String> {
    let mut files = args.input_files.clone();
    let mut visiting = HashSet::new();

    for response_file in &args.response_files {
        files.extend(expand_response_file(response_file, &mut visiting)?);
    }
    for dir in &args.directories {
        files.extend(expand_directory(dir)?);
    }
    Ok(files)
}

/// One line of a response file is either a comment (`#...`), a nested
/// response file reference (`-f <path>`), a directory reference
/// (`-y <path>`), or a bare input file path.
fn expand_response_file(path: &Path, visiting: &mut HashSet<PathBuf>) -> Result<Vec<PathBuf>, String> {
    let canonical = fs::canonicalize(path).map_err(|err| format!("cannot read response file {path:?}: {err}"))?;
    if !visiting.insert(canonical.clone()) {
        return Err(format!("cycle detected in response files at {path:?}"));
    }

    let contents = fs::read_to_string(path).map_err(|err| format!("cannot read response file {path:?}: {err}"))?;
    let mut files = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(nested) = line.strip_prefix("-f ") {
            files.extend(expand_response_file(Path::new(nested.trim()), visiting)?);
        } else if let Some(dir) = line.strip_prefix("-y ") {
            files.extend(expand_directory(Path::new(dir.trim()))?);
        } else {
            files.push(PathBuf::from(line));
        }
    }

    visiting.remove(&canonical);
    Ok(files)
}

fn expand_directory(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = fs::read_dir(dir).map_err(|err| format!("cannot read directory {dir:?}: {err}"))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| format!("error reading directory {dir:?}: {err}"))?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn directory_expansion_only_picks_source_extensions() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.sv"), "").expect("write a.sv");
        fs::write(dir.path().join("b.svh"), "").expect("write b.svh");
        fs::write(dir.path().join("readme.md"), "").expect("write readme");

        let files = expand_directory(dir.path()).expect("expand directory");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn response_file_cycle_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let a = dir.path().join("a.rsp");
        let b = dir.path().join("b.rsp");
        fs::write(&a, format!("-f {}\n", b.display())).expect("write a");
        fs::write(&b, format!("-f {}\n", a.display())).expect("write b");

        let mut visiting = HashSet::new();
        let result = expand_response_file(&a, &mut visiting);
        assert!(result.is_err());
    }

    #[test]
    fn response_file_lists_bare_paths_and_skips_comments() {
        let dir = tempdir().expect("tempdir");
        let rsp = dir.path().join("files.rsp");
        fs::write(&rsp, "# comment\n\nfoo.sv\nbar.sv\n").expect("write response file");

        let mut visiting = HashSet::new();
        let files = expand_response_file(&rsp, &mut visiting).expect("expand");
        assert_eq!(files, vec![PathBuf::from("foo.sv"), PathBuf::from("bar.sv")]);
    }
}
