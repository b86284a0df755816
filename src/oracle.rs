//! The child-process oracle (spec.md §4.1, §4.9, §6 "Oracle invocation").

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Everything the oracle needs to know about one input besides the
/// candidate tree being tested: its committed path, its scratch path, and
/// (if `--save-intermediates` is set) where to archive this attempt.
pub struct OracleInput<'a> {
    pub committed_path: &'a Path,
    pub scratch_path: &'a Path,
}

pub struct OracleRunner {
    check_script: PathBuf,
    save_intermediates_dir: Option<PathBuf>,
}

/// Fatal conditions distinguished from ordinary rejection (spec.md §4.9):
/// the caller prints and exits 1 on `SpawnFailure`, but treats `Rejected`
/// as an ordinary rollback.
#[derive(Debug)]
pub enum OracleOutcome {
    Accepted,
    Rejected,
}

impl OracleRunner {
    pub fn new(check_script: PathBuf, save_intermediates_dir: Option<PathBuf>) -> Self {
        OracleRunner {
            check_script,
            save_intermediates_dir,
        }
    }

    /// Writes `candidate_source` to `input.scratch_path`, invokes the check
    /// script with `argv[0] = check_script`, `argv[1..] = other_committed`
    /// followed by the scratch path, and waits synchronously.
    ///
    /// Exit 0 => Accepted, candidate copied over the committed file.
    /// Non-zero or abnormal termination => Rejected.
    /// Spawn failure is distinguished as an `Err` (fatal per spec.md §4.9,
    /// "must signal the parent").
    pub fn test(
        &self,
        candidate_source: &str,
        input: &OracleInput<'_>,
        other_committed: &[PathBuf],
        attempt_idx: Option<u64>,
    ) -> Result<OracleOutcome, String> {
        fs::write(input.scratch_path, candidate_source)
            .map_err(|err| format!("failed to write scratch file {:?}: {err}", input.scratch_path))?;

        if let Some(dir) = &self.save_intermediates_dir {
            if let Some(idx) = attempt_idx {
                let stem = input
                    .committed_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("input");
                let ext = input
                    .committed_path
                    .extension()
                    .and_then(|s| s.to_str())
                    .unwrap_or("sv");
                let archived = dir.join(format!("{stem}.attempt{idx}.{ext}"));
                let _ = fs::copy(input.scratch_path, archived);
            }
        }

        let argv0 = coerce_relative(&self.check_script);
        let mut cmd = Command::new(&argv0);
        for other in other_committed {
            cmd.arg(other);
        }
        cmd.arg(input.scratch_path);

        let status = cmd
            .status()
            .map_err(|err| format!("failed to spawn oracle {:?}: {err}", self.check_script))?;

        if status.success() {
            fs::copy(input.scratch_path, input.committed_path).map_err(|err| {
                format!(
                    "failed to copy scratch {:?} over committed {:?}: {err}",
                    input.scratch_path, input.committed_path
                )
            })?;
            Ok(OracleOutcome::Accepted)
        } else {
            Ok(OracleOutcome::Rejected)
        }
    }
}

/// `argv[0]` must start with `./` if it carries no path separator, so the
/// shell/exec machinery doesn't search `$PATH` for a script meant to be run
/// from the current directory (spec.md §6).
fn coerce_relative(script: &Path) -> PathBuf {
    let has_separator = script.components().count() > 1 || script.is_absolute();
    if has_separator {
        script.to_path_buf()
    } else {
        PathBuf::from(format!("./{}", script.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn write_executable(path: &Path, body: &str) {
        fs::write(path, body).expect("write script");
        let mut perms = fs::metadata(path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).expect("chmod");
    }

    #[test]
    fn accepted_copies_scratch_over_committed() {
        let dir = tempdir().expect("tempdir");
        let script = dir.path().join("check.sh");
        write_executable(&script, "#!/bin/sh\nexit 0\n");

        let committed = dir.path().join("a.sv");
        let scratch = dir.path().join("a.sv.scratch");
        fs::write(&committed, "old\n").expect("seed committed");

        let runner = OracleRunner::new(script, None);
        let input = OracleInput {
            committed_path: &committed,
            scratch_path: &scratch,
        };
        let outcome = runner
            .test("new\n", &input, &[], None)
            .expect("oracle should run");
        assert!(matches!(outcome, OracleOutcome::Accepted));
        assert_eq!(fs::read_to_string(&committed).expect("read"), "new\n");
    }

    #[test]
    fn rejected_leaves_committed_untouched() {
        let dir = tempdir().expect("tempdir");
        let script = dir.path().join("check.sh");
        write_executable(&script, "#!/bin/sh\nexit 1\n");

        let committed = dir.path().join("a.sv");
        let scratch = dir.path().join("a.sv.scratch");
        fs::write(&committed, "old\n").expect("seed committed");

        let runner = OracleRunner::new(script, None);
        let input = OracleInput {
            committed_path: &committed,
            scratch_path: &scratch,
        };
        let outcome = runner
            .test("new\n", &input, &[], None)
            .expect("oracle should run");
        assert!(matches!(outcome, OracleOutcome::Rejected));
        assert_eq!(fs::read_to_string(&committed).expect("read"), "old\n");
    }

    #[test]
    fn spawn_failure_on_missing_script_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let script = dir.path().join("does-not-exist.sh");
        let committed = dir.path().join("a.sv");
        let scratch = dir.path().join("a.sv.scratch");
        fs::write(&committed, "old\n").expect("seed committed");

        let runner = OracleRunner::new(script, None);
        let input = OracleInput {
            committed_path: &committed,
            scratch_path: &scratch,
        };
        let result = runner.test("new\n", &input, &[], None);
        assert!(result.is_err());
    }
}
