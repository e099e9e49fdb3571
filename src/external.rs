//! # External Encoder Module
//!
//! WebP output is produced by external command-line encoders. The optimizer
//! talks to them through the `ExternalEncoder` trait; `CommandEncoder` is the
//! real implementation, spawning the tool with `tokio::process::Command`.
//!
//! Invocation: `<tool> <options...> <input> -o <output>`. Options are passed as
//! separate arguments, never through a shell. The tool inherits stdout/stderr
//! so its own diagnostics reach the console.

use crate::error::BatchError;
use crate::tool_resolver::ToolPathResolver;
use std::ffi::OsString;
use std::future::Future;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// External encoding capability
pub trait ExternalEncoder {
    /// Run `tool` to encode `input` into `output`.
    ///
    /// `Ok` means the tool reported success; it does not prove `output` exists.
    fn encode(
        &self,
        tool: &str,
        options: &[String],
        input: &Path,
        output: &Path,
    ) -> impl Future<Output = Result<(), BatchError>>;

    /// Preflight check used to warn before a batch starts
    fn is_available(&self, _tool: &str) -> bool {
        true
    }
}

/// `ExternalEncoder` that spawns real processes
#[derive(Debug, Clone, Default)]
pub struct CommandEncoder {
    resolver: ToolPathResolver,
}

impl CommandEncoder {
    pub fn new(resolver: ToolPathResolver) -> Self {
        Self { resolver }
    }
}

/// Argument vector for `<tool> <options...> <input> -o <output>`
pub fn encoder_args(options: &[String], input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = options.iter().map(OsString::from).collect();
    args.push(input.as_os_str().to_os_string());
    args.push(OsString::from("-o"));
    args.push(output.as_os_str().to_os_string());
    args
}

impl ExternalEncoder for CommandEncoder {
    async fn encode(
        &self,
        tool: &str,
        options: &[String],
        input: &Path,
        output: &Path,
    ) -> Result<(), BatchError> {
        let tool_path = self
            .resolver
            .check_tool_with_instructions(tool)
            .map_err(BatchError::MissingDependency)?;

        let args = encoder_args(options, input, output);
        debug!("Running {:?} {:?}", tool_path, args);

        let start_time = std::time::Instant::now();
        let status = Command::new(&tool_path).args(&args).status().await?;
        let elapsed = start_time.elapsed();

        if status.success() {
            debug!("{} finished {} in {:?}", tool, input.display(), elapsed);
            Ok(())
        } else {
            warn!("{} failed on {} after {:?}", tool, input.display(), elapsed);
            Err(BatchError::ToolFailed {
                tool: tool.to_string(),
                input: input.to_path_buf(),
                status: status.to_string(),
            })
        }
    }

    fn is_available(&self, tool: &str) -> bool {
        self.resolver.is_tool_available(tool)
    }
}
