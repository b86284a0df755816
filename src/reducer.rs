//! The reducer loop (spec.md §4.6): drive one rewriter stage to traversal
//! completion, committing accepted candidates and rolling back rejected
//! ones.

use std::path::PathBuf;

use crate::attempt::AttemptTracker;
use crate::oracle::{OracleInput, OracleOutcome, OracleRunner};
use crate::rewriter::{OneTimeRewriter, SetRewriter};
use crate::tree::SyntaxTree;

/// Everything a reducer loop needs to test and record one attempt, besides
/// the candidate tree itself.
pub struct ReducerContext<'a> {
    pub oracle: &'a OracleRunner,
    pub tracker: &'a mut AttemptTracker,
    pub pass: u32,
    pub committed_path: &'a std::path::Path,
    pub scratch_path: &'a std::path::Path,
    pub other_committed: &'a [PathBuf],
    pub input_file: &'a str,
    pub save_intermediates: bool,
    pub initial_sieve_lower: u32,
}

/// `true` iff at least one attempt in this stage was accepted.
pub fn run_one_time_stage(
    rewriter: &mut OneTimeRewriter,
    mut tree: SyntaxTree,
    ctx: &mut ReducerContext<'_>,
) -> Result<(SyntaxTree, bool), String> {
    let stage = rewriter.stage_name();
    let mut committed_any = false;
    let mut attempt_idx = 0u64;

    loop {
        let lines_before = tree.line_count() as u32;
        let attempt = ctx.tracker.begin(ctx.pass, stage, lines_before, ctx.input_file);

        let (candidate, traversal_done) = rewriter.transform(&tree)?;
        if traversal_done && tree.is_unchanged_from(&candidate) {
            break;
        }

        let idx_for_archive = ctx.save_intermediates.then_some(attempt_idx);
        attempt_idx += 1;

        let input = OracleInput {
            committed_path: ctx.committed_path,
            scratch_path: ctx.scratch_path,
        };
        let outcome = ctx
            .oracle
            .test(candidate.source(), &input, ctx.other_committed, idx_for_archive)?;

        match outcome {
            OracleOutcome::Accepted => {
                let type_tag = rewriter.removed_type_tag().unwrap_or_default().to_string();
                log::debug!("{stage}: committed removal of `{type_tag}` ({} -> {} lines)", lines_before, candidate.line_count());
                let lines_after = candidate.line_count() as u32;
                tree = candidate;
                rewriter.advance_on_commit();
                committed_any = true;
                ctx.tracker.end(attempt, lines_after, true, type_tag).map_err(|e| e.to_string())?;
            }
            OracleOutcome::Rejected => {
                log::debug!("{stage}: rejected candidate, rolling back");
                rewriter.advance_on_rollback();
                let lines_after = tree.line_count() as u32;
                ctx.tracker
                    .end(attempt, lines_after, false, String::new())
                    .map_err(|e| e.to_string())?;
            }
        }

        if traversal_done {
            break;
        }
    }

    Ok((tree, committed_any))
}

pub fn run_set_stage(
    rewriter: &mut SetRewriter,
    mut tree: SyntaxTree,
    ctx: &mut ReducerContext<'_>,
) -> Result<(SyntaxTree, bool), String> {
    let stage = rewriter.stage_name();
    let mut committed_any = false;
    let mut attempt_idx = 0u64;

    while !rewriter.traversal_done() {
        let lines_before = tree.line_count() as u32;
        let attempt = ctx.tracker.begin(ctx.pass, stage, lines_before, ctx.input_file);

        let (candidate, done) = rewriter.transform(&tree)?;
        if done && tree.is_unchanged_from(&candidate) {
            break;
        }

        let idx_for_archive = ctx.save_intermediates.then_some(attempt_idx);
        attempt_idx += 1;

        let input = OracleInput {
            committed_path: ctx.committed_path,
            scratch_path: ctx.scratch_path,
        };
        let outcome = ctx
            .oracle
            .test(candidate.source(), &input, ctx.other_committed, idx_for_archive)?;

        match outcome {
            OracleOutcome::Accepted => {
                log::debug!("{stage}: committed a removal set ({} -> {} lines)", lines_before, candidate.line_count());
                let lines_after = candidate.line_count() as u32;
                tree = candidate;
                committed_any = true;
                ctx.tracker
                    .end(attempt, lines_after, true, stage.to_string())
                    .map_err(|e| e.to_string())?;
            }
            OracleOutcome::Rejected => {
                log::debug!("{stage}: rejected candidate, moving to next removal set");
                let lines_after = tree.line_count() as u32;
                ctx.tracker
                    .end(attempt, lines_after, false, String::new())
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    Ok((tree, committed_any))
}
