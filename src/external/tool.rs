use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::external::ExternalToolError;

/// Default time allowed for a single external tool run
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(600);

/// How to invoke one external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl ToolConfig {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Run `config.program` with `args` and return its standard output.
///
/// The child is killed if it outlives `config.timeout`.
///
/// # Errors
///
/// Returns `ExternalToolError::Spawn` if the program cannot be started,
/// `Timeout` if it does not finish in time and `NonZeroExit` if it fails.
pub fn run_tool<I, S>(config: &ToolConfig, args: I) -> Result<String, ExternalToolError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // Each call owns a small runtime so tools can be run from plain worker threads
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(config, args))
}

async fn run_async(config: &ToolConfig, args: Vec<OsString>) -> Result<String, ExternalToolError> {
    let program = config.name();
    info!(
        "Running {} {}",
        program,
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let child = Command::new(&config.program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExternalToolError::Spawn {
            program: program.clone(),
            source,
        })?;

    // Dropping the pending future drops the child, which kills it
    let output = match tokio::time::timeout(config.timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ExternalToolError::Spawn {
            program: program.clone(),
            source,
        })?,
        Err(_) => {
            return Err(ExternalToolError::Timeout {
                program,
                seconds: config.timeout.as_secs(),
            })
        }
    };

    if !output.status.success() {
        return Err(ExternalToolError::NonZeroExit {
            program,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!("{} finished ({} bytes of output)", program, output.stdout.len());
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
