//! Binary entry point (spec.md §6): thin CLI glue around the engine, in
//! the style of `mergiraf::bin::mergiraf::main` / `real_main`.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;
use log::info;

use sv_bugpoint::attempt::AttemptTracker;
use sv_bugpoint::cli::{resolve_input_files, CliArgs};
use sv_bugpoint::config::EngineConfig;
use sv_bugpoint::dump::{dump_ast, dump_syntax};
use sv_bugpoint::oracle::{OracleInput, OracleOutcome, OracleRunner};
use sv_bugpoint::outer::{run_outer_minimizer, InputFile};
use sv_bugpoint::tree::SyntaxTree;
use sv_bugpoint::workdir::{common_ancestor, refresh_combined_file, WorkDir};

fn main() {
    let args = CliArgs::parse();

    stderrlog::new()
        .module(module_path!())
        .verbosity(2 + args.verbose as usize)
        .init()
        .unwrap();

    match real_main(args) {
        Ok(code) => exit(code),
        Err(error) => {
            eprintln!("sv-bugpoint: {error}");
            exit(1)
        }
    }
}

fn real_main(args: CliArgs) -> Result<i32, String> {
    let input_files = resolve_input_files(&args)?;
    if input_files.is_empty() {
        return Err("no input files given (positional arguments, -f, or -y)".to_string());
    }

    let mut config = EngineConfig::new(args.work_dir.clone(), args.check_script.clone(), input_files);
    config.force = args.force;
    config.save_intermediates = args.save_intermediates;
    config.dump_trees = args.dump_trees;
    config.verbosity = args.verbose as usize;

    let workdir = WorkDir::new(config.work_dir.clone());
    if workdir.is_non_empty() && !config.force && !confirm_non_empty_work_dir(workdir.root())? {
        return Ok(0);
    }

    workdir
        .create_layout(config.save_intermediates, config.dump_trees)
        .map_err(|err| format!("could not create work dir layout: {err}"))?;

    let ancestor = common_ancestor(&config.input_files);
    let mut inputs = Vec::with_capacity(config.input_files.len());
    for original in &config.input_files {
        let committed_path = WorkDir::mirror_path(&workdir.minimized_dir(), &ancestor, original);
        let scratch_path = WorkDir::mirror_path(&workdir.tmp_dir(), &ancestor, original);
        if let Some(parent) = committed_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("could not create {parent:?}: {err}"))?;
        }
        if let Some(parent) = scratch_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("could not create {parent:?}: {err}"))?;
        }
        fs::copy(original, &committed_path)
            .map_err(|err| format!("could not copy {original:?} into the work dir: {err}"))?;
        inputs.push(InputFile {
            committed_path,
            scratch_path,
        });
    }

    if config.dump_trees {
        dump_all_trees(&workdir, &inputs)?;
    }

    let save_dir = config.save_intermediates.then(|| workdir.attempts_dir());
    let oracle = OracleRunner::new(config.check_script.clone(), save_dir);

    // spec.md §7, "Fatal-oracle": a dry-run rejection on unmodified input
    // (i.e. the oracle doesn't even accept the inputs as given) is fatal.
    for input in &inputs {
        let others: Vec<PathBuf> = inputs
            .iter()
            .filter(|other| other.committed_path != input.committed_path)
            .map(|other| other.committed_path.clone())
            .collect();
        let source = fs::read_to_string(&input.committed_path)
            .map_err(|err| format!("failed to read {:?}: {err}", input.committed_path))?;
        let dry_run = OracleInput {
            committed_path: &input.committed_path,
            scratch_path: &input.scratch_path,
        };
        match oracle.test(&source, &dry_run, &others, None)? {
            OracleOutcome::Accepted => {}
            OracleOutcome::Rejected => {
                return Err(format!(
                    "the oracle script rejects the unmodified input {:?}; nothing to minimize",
                    input.committed_path
                ));
            }
        }
    }

    let mut tracker = AttemptTracker::new(&workdir.trace_path())
        .map_err(|err| format!("could not open trace file: {err}"))?;

    info!("minimizing {} input file(s) in {:?}", inputs.len(), workdir.root());
    run_outer_minimizer(
        &inputs,
        &oracle,
        &mut tracker,
        config.initial_sieve_lower,
        config.save_intermediates,
    )?;

    let committed_paths: Vec<PathBuf> = inputs.iter().map(|i| i.committed_path.clone()).collect();
    refresh_combined_file(&workdir, &committed_paths)
        .map_err(|err| format!("could not write combined output: {err}"))?;

    info!("done; minimized files are under {:?}", workdir.minimized_dir());
    Ok(0)
}

/// spec.md §7 "User decision": read one char; `Y`/`y`/newline proceeds,
/// anything else declines (exit 0, not an error).
fn confirm_non_empty_work_dir(root: &Path) -> Result<bool, String> {
    print!("{root:?} is not empty; continue anyway? [Y/n] ");
    io::stdout().flush().map_err(|err| err.to_string())?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .map_err(|err| err.to_string())?;
    let answer = line.trim();
    Ok(answer.is_empty() || answer.eq_ignore_ascii_case("y"))
}

fn dump_all_trees(workdir: &WorkDir, inputs: &[InputFile]) -> Result<(), String> {
    let mut syntax_out = String::new();
    let mut ast_out = String::new();
    for input in inputs {
        let source = fs::read_to_string(&input.committed_path)
            .map_err(|err| format!("failed to read {:?}: {err}", input.committed_path))?;
        let tree = SyntaxTree::parse(&source)?;
        syntax_out.push_str(&format!("=== {:?} ===\n", input.committed_path));
        syntax_out.push_str(&dump_syntax(tree.root()));
        ast_out.push_str(&format!("=== {:?} ===\n", input.committed_path));
        ast_out.push_str(&dump_ast(tree.root()));
    }
    fs::write(workdir.syntax_dump_path(), syntax_out)
        .map_err(|err| format!("could not write syntax dump: {err}"))?;
    fs::write(workdir.ast_dump_path(), ast_out)
        .map_err(|err| format!("could not write ast dump: {err}"))?;
    Ok(())
}
