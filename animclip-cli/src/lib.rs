// animclip-cli/src/lib.rs
//
// Library portion of the animclip CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{CleanupArgs, Cli, Commands, ConvertArgs, InfoArgs, parse_cli};
pub use commands::{run_cleanup, run_convert, run_info};
pub use error::{CliErrorContext, CliResult};
