//! Wrappers around the external aligners.
//!
//! Every tool runs as a child process with an explicit timeout. A tool that cannot be
//! started, exits non-zero, or runs out of time yields an [`ExternalToolError`], which
//! batch callers treat as a per-item failure.

pub mod blast;
pub mod clustalw;
pub mod tool;

pub use blast::{Blastn, PairwiseAligner};
pub use clustalw::{ClustalW, MultipleAligner};
pub use tool::{run_tool, ToolConfig};

use std::process::ExitStatus;

use thiserror::Error;

use crate::parsing::ParseError;

#[derive(Error, Debug)]
pub enum ExternalToolError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {seconds} s")]
    Timeout { program: String, seconds: u64 },

    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to set up tool run: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
