// Narrow interfaces over the three external tools.
//
// Each tool turns its configuration and the stage inputs into a `ToolCommand`
// and executes it through the shared `CommandRunner`, so a test double can
// stand in for the real binaries.

pub mod muxer;
pub mod transcriber;
pub mod trimmer;

pub use muxer::*;
pub use transcriber::*;
pub use trimmer::*;

use crate::runner::ToolCommand;

/// Common surface used by the availability check
pub trait ExternalTool {
    /// Human readable tool name
    fn name(&self) -> &'static str;

    /// Cheap invocation that succeeds when the tool is installed
    fn probe_command(&self) -> ToolCommand;
}
