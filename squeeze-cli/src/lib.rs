// squeeze-cli/src/lib.rs
//
// Library portion of the Squeeze CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, CompareArgs, ConvertArgs, EncoderOverrides, PlanArgs};
pub use commands::{run_compare, run_convert, run_plan};
pub use error::{CliErrorContext, CliResult};
