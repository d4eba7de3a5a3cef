// External command execution
//
// Every pipeline stage is one external tool invocation. Stages build a
// `ToolCommand` and hand it to a `CommandRunner`:
// - SystemRunner: spawns the real binary
// - test doubles: record commands and simulate success or failure

pub mod command;
pub mod system;

use async_trait::async_trait;

pub use command::*;
pub use system::*;

use crate::error::Result;

/// Executes a fully formed command and returns its standard output.
///
/// A non-zero exit is an error carrying the captured standard error. There is no retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand) -> Result<String>;
}
