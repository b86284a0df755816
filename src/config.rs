//! Ambient engine configuration (SPEC_FULL.md §2 ADDED), modeled on
//! `mergiraf::settings::DisplaySettings`: the tunables a production run
//! needs that spec.md leaves as fixed constants in prose.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub work_dir: PathBuf,
    pub check_script: PathBuf,
    pub input_files: Vec<PathBuf>,
    pub force: bool,
    pub save_intermediates: bool,
    pub dump_trees: bool,
    pub verbosity: usize,
    /// Initial size sieve upper/lower bound, spec.md §3 "Size Sieve":
    /// `(1024, +inf)`. Exposed here rather than hardcoded so tests can run
    /// the engine against small fixtures without waiting through every
    /// sieve level from 1024 down.
    pub initial_sieve_lower: u32,
}

impl EngineConfig {
    pub fn new(work_dir: PathBuf, check_script: PathBuf, input_files: Vec<PathBuf>) -> Self {
        EngineConfig {
            work_dir,
            check_script,
            input_files,
            force: false,
            save_intermediates: false,
            dump_trees: false,
            verbosity: 0,
            initial_sieve_lower: 1024,
        }
    }
}
