//! Black-box CLI integration tests, in the style of
//! `mergiraf`'s `tests/integration_tests.rs`: drive the built binary
//! end-to-end via `assert_cmd` against a real (trivial) oracle script and
//! inspect the resulting work directory, rather than calling library
//! internals directly.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use assert_cmd::Command;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn write_executable(path: &Path, body: &str) {
    fs::write(path, body).expect("failed to write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

/// Scenario A (spec.md §8): a standalone removable genfor loop disappears,
/// leaving only the minimal module the oracle actually cares about.
#[test]
fn scenario_a_single_removable_loop_end_to_end() {
    let tmp = tempdir().expect("tempdir");
    let work_dir = tmp.path().join("work");
    let oracle = tmp.path().join("check.sh");
    write_executable(&oracle, "#!/bin/sh\ngrep -q module \"$1\"\n");

    let input = tmp.path().join("top.sv");
    fs::write(
        &input,
        "\
module m; endmodule
module g;
  for (genvar i=0;i<4;i++) begin : lp
    assign x=i;
  end
endmodule
",
    )
    .expect("write input");

    Command::cargo_bin("sv-bugpoint")
        .expect("binary should build")
        .arg(&work_dir)
        .arg(&oracle)
        .arg(&input)
        .arg("--force")
        .assert()
        .success();

    let minimized = work_dir.join("minimized").join("top.sv");
    let result = fs::read_to_string(&minimized).expect("read minimized file");
    assert!(result.contains("module m"));
    assert!(!result.contains("genvar"));

    let trace = work_dir.join("debug").join("trace");
    assert!(trace.exists());
    let trace_contents = fs::read_to_string(&trace).expect("read trace");
    assert_eq!(
        trace_contents.lines().next(),
        Some("pass\tstage\tlines_removed\tcommitted\ttime(ms)\tidx\ttype_info\tinput_file")
    );
}

/// Scenario F (spec.md §8): the `verilator_config` prologue is stripped
/// before any reduction pass runs, keeping the terminating
/// `` `begin_keywords `` line.
#[test]
fn scenario_f_verilator_config_is_pre_stripped() {
    let tmp = tempdir().expect("tempdir");
    let work_dir = tmp.path().join("work");
    let oracle = tmp.path().join("check.sh");
    write_executable(
        &oracle,
        "#!/bin/sh\ngrep -v verilator_config \"$1\" | grep -q begin_keywords\n",
    );

    let input = tmp.path().join("top.sv");
    fs::write(
        &input,
        "\
`verilator_config
lint_off -rule WIDTH
`begin_keywords \"1800-2017\"
module m; endmodule
",
    )
    .expect("write input");

    Command::cargo_bin("sv-bugpoint")
        .expect("binary should build")
        .arg(&work_dir)
        .arg(&oracle)
        .arg(&input)
        .arg("--force")
        .assert()
        .success();

    let minimized = work_dir.join("minimized").join("top.sv");
    let result = fs::read_to_string(&minimized).expect("read minimized file");
    assert!(!result.contains("verilator_config"));
    assert!(result.contains("begin_keywords"));

    let trace = fs::read_to_string(work_dir.join("debug").join("trace")).expect("read trace");
    assert!(trace.contains("verilatorConfigRemover"));
}

/// spec.md §7 "Fatal-oracle": a dry-run rejection on the unmodified input
/// is fatal, not treated as "already minimal".
#[test]
fn dry_run_rejection_is_fatal() {
    let tmp = tempdir().expect("tempdir");
    let work_dir = tmp.path().join("work");
    let oracle = tmp.path().join("check.sh");
    write_executable(&oracle, "#!/bin/sh\nexit 1\n");

    let input = tmp.path().join("top.sv");
    fs::write(&input, "module m; endmodule\n").expect("write input");

    Command::cargo_bin("sv-bugpoint")
        .expect("binary should build")
        .arg(&work_dir)
        .arg(&oracle)
        .arg(&input)
        .arg("--force")
        .assert()
        .failure();
}

/// `--save-intermediates` archives every attempt's scratch file under
/// `debug/attempts/` (spec.md §6).
#[test]
fn save_intermediates_archives_attempts() {
    let tmp = tempdir().expect("tempdir");
    let work_dir = tmp.path().join("work");
    let oracle = tmp.path().join("check.sh");
    write_executable(&oracle, "#!/bin/sh\nexit 0\n");

    let input = tmp.path().join("top.sv");
    fs::write(
        &input,
        "\
module m;
  assign a = 1;
endmodule
",
    )
    .expect("write input");

    Command::cargo_bin("sv-bugpoint")
        .expect("binary should build")
        .arg(&work_dir)
        .arg(&oracle)
        .arg(&input)
        .arg("--force")
        .arg("--save-intermediates")
        .assert()
        .success();

    let attempts_dir = work_dir.join("debug").join("attempts");
    assert!(attempts_dir.exists());
    let has_attempt_file = fs::read_dir(&attempts_dir)
        .expect("read attempts dir")
        .any(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .contains("attempt")
        });
    assert!(has_attempt_file);
}
