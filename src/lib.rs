//! `sv-bugpoint`: a syntax-aware test-case minimizer ("bugpoint") for
//! SystemVerilog.
//!
//! Given a set of input source files and an external interestingness
//! oracle (a user-supplied script exiting 0 iff a candidate file set still
//! exhibits the behavior under investigation), this crate produces a
//! smaller, still-interesting file set by repeatedly proposing syntax-node
//! removals over a parse tree and asking the oracle whether the result is
//! still interesting.
//!
//! The engine is a pipeline of specialized reducers (see [`rewriter`],
//! [`mapper`]) driven by a [`reducer`] loop and orchestrated by a fixed
//! per-file [`pass`] sequence, itself repeated to a multi-file fixed point
//! by [`outer`]. [`oracle`] and [`attempt`] are the two points where the
//! engine touches the outside world: spawning the check script, and
//! appending to the trace file.
//!
//! Not designed to be used as a general-purpose library: the public API
//! surface exists so the binary crate and the integration tests can drive
//! it, not as a stable interface for other programs.

pub mod attempt;
pub mod cli;
pub mod config;
pub mod dump;
pub mod mapper;
pub mod oracle;
pub mod outer;
pub mod pass;
pub mod reducer;
pub mod rewriter;
pub mod source_range;
pub mod sv_kinds;
pub mod tree;
pub mod workdir;
