//! Attempt records and the TSV trace (spec.md §4.2, §6 "Trace TSV columns").

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

/// Process-wide monotonic attempt index (spec.md §5, "Global monotonic
/// attempt index"). `AttemptTracker::begin` reads it, `end` bumps it.
static NEXT_ATTEMPT_IDX: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub pass: u32,
    pub stage: &'static str,
    pub lines_before: u32,
    pub lines_after: u32,
    pub committed: bool,
    pub wall_ms: u128,
    pub idx: u64,
    pub type_info: String,
    pub input_file: String,
}

impl AttemptRecord {
    fn to_tsv_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            self.pass,
            self.stage,
            self.lines_before.saturating_sub(self.lines_after),
            self.committed,
            self.wall_ms,
            self.idx,
            self.type_info,
            self.input_file,
        )
    }
}

/// Tracks a single attempt from `begin` to `end`, and owns the open trace
/// file it appends completed records to.
pub struct AttemptTracker {
    trace: File,
    header_written: bool,
}

pub struct InProgressAttempt {
    pass: u32,
    stage: &'static str,
    lines_before: u32,
    input_file: String,
    started: Instant,
}

impl AttemptTracker {
    /// Opens (creating/truncating) `trace_path` for append, per input file.
    pub fn new(trace_path: &Path) -> io::Result<Self> {
        let trace = OpenOptions::new()
            .create(true)
            .append(true)
            .open(trace_path)?;
        Ok(AttemptTracker {
            trace,
            header_written: false,
        })
    }

    pub fn begin(&mut self, pass: u32, stage: &'static str, lines_before: u32, input_file: &str) -> InProgressAttempt {
        InProgressAttempt {
            pass,
            stage,
            lines_before,
            input_file: input_file.to_string(),
            started: Instant::now(),
        }
    }

    /// Finishes an attempt, writes its trace line, and returns the record
    /// (callers that need `type_info` separately should set
    /// `record.type_info` after construction via [`Self::finish`]).
    pub fn end(
        &mut self,
        attempt: InProgressAttempt,
        lines_after: u32,
        committed: bool,
        type_info: String,
    ) -> io::Result<AttemptRecord> {
        let idx = NEXT_ATTEMPT_IDX.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let record = AttemptRecord {
            pass: attempt.pass,
            stage: attempt.stage,
            lines_before: attempt.lines_before,
            lines_after,
            committed,
            wall_ms: attempt.started.elapsed().as_millis(),
            idx,
            type_info,
            input_file: attempt.input_file,
        };
        self.report(&record)?;
        Ok(record)
    }

    fn report(&mut self, record: &AttemptRecord) -> io::Result<()> {
        if !self.header_written {
            writeln!(
                self.trace,
                "pass\tstage\tlines_removed\tcommitted\ttime(ms)\tidx\ttype_info\tinput_file"
            )?;
            self.header_written = true;
        }
        self.trace.write_all(record.to_tsv_line().as_bytes())?;
        self.trace.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn header_written_once_then_records_appended_in_order() {
        let dir = tempdir().expect("tempdir");
        let trace_path = dir.path().join("trace");
        let mut tracker = AttemptTracker::new(&trace_path).expect("open trace");

        let a = tracker.begin(1, "bodyRemover", 100, "a.sv");
        tracker
            .end(a, 90, true, "module_declaration".to_string())
            .expect("end a");
        let b = tracker.begin(1, "bodyRemover", 90, "a.sv");
        tracker.end(b, 90, false, String::new()).expect("end b");

        let contents = std::fs::read_to_string(&trace_path).expect("read trace");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("pass\tstage"));
        assert!(lines[1].contains("\ttrue\t"));
        assert!(lines[2].contains("\tfalse\t"));
    }
}
