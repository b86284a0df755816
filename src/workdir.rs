//! Work-dir layout helpers (spec.md §6, "Work-dir layout").

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: PathBuf) -> Self {
        WorkDir { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn minimized_dir(&self) -> PathBuf {
        self.root.join("minimized")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    pub fn trace_path(&self) -> PathBuf {
        self.root.join("debug").join("trace")
    }

    pub fn syntax_dump_path(&self) -> PathBuf {
        self.root.join("debug").join("syntax-dump")
    }

    pub fn ast_dump_path(&self) -> PathBuf {
        self.root.join("debug").join("ast-dump")
    }

    pub fn attempts_dir(&self) -> PathBuf {
        self.root.join("debug").join("attempts")
    }

    pub fn combined_file_path(&self) -> PathBuf {
        self.root.join("sv-bugpoint-combined.sv")
    }

    /// Create every directory this run needs up front. `save_intermediates`
    /// and `dump_trees` gate the optional `debug/attempts` and dump
    /// subdirectories (no point creating empty dirs the run will never
    /// populate).
    pub fn create_layout(&self, save_intermediates: bool, dump_trees: bool) -> io::Result<()> {
        fs::create_dir_all(self.minimized_dir())?;
        fs::create_dir_all(self.tmp_dir())?;
        fs::create_dir_all(self.root.join("debug"))?;
        if save_intermediates {
            fs::create_dir_all(self.attempts_dir())?;
        }
        if dump_trees {
            // syntax-dump and ast-dump are files, but their parent (debug/)
            // already exists; nothing further to create.
            let _ = dump_trees;
        }
        Ok(())
    }

    /// Returns true if `root` already contains files (the CLI's
    /// non-empty-work-dir prompt, spec.md §7 "User decision").
    pub fn is_non_empty(&self) -> bool {
        match fs::read_dir(&self.root) {
            Ok(mut entries) => entries.next().is_some(),
            Err(_) => false,
        }
    }

    /// Mirrors `input_path`'s components under `minimized/` or `tmp/`,
    /// relative to `common_ancestor`.
    pub fn mirror_path(base: &Path, common_ancestor: &Path, input_path: &Path) -> PathBuf {
        let relative = input_path.strip_prefix(common_ancestor).unwrap_or(input_path);
        base.join(relative)
    }
}

/// Refreshes `sv-bugpoint-combined.sv`: the concatenation of every
/// currently-committed minimized file, in input order (spec.md §6).
pub fn refresh_combined_file(workdir: &WorkDir, committed_paths: &[PathBuf]) -> io::Result<()> {
    let mut combined = String::new();
    for path in committed_paths {
        combined.push_str(&fs::read_to_string(path)?);
        if !combined.ends_with('\n') {
            combined.push('\n');
        }
    }
    fs::write(workdir.combined_file_path(), combined)
}

/// Finds the common ancestor directory of a set of input paths, so inputs
/// can be mirrored under `minimized/`/`tmp/` without collisions.
pub fn common_ancestor(paths: &[PathBuf]) -> PathBuf {
    let mut iter = paths.iter();
    let Some(first) = iter.next() else {
        return PathBuf::from(".");
    };
    let mut ancestor: Vec<_> = first
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .components()
        .collect();
    for path in iter {
        let components: Vec<_> = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .components()
            .collect();
        let common_len = ancestor
            .iter()
            .zip(components.iter())
            .take_while(|(a, b)| a == b)
            .count();
        ancestor.truncate(common_len);
    }
    ancestor.into_iter().collect()
}
