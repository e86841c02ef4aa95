//! Line-oriented shell for adjusting a Flow allocation from a terminal.

pub mod output;
mod shell;
pub mod shell_context;

pub use shell::run_cli;
pub use shell_context::{CliError, CliMode, CommandError, LoopControl, ShellContext};

/// When set, commands are read from stdin without line editing.
pub const SCRIPT_ENV: &str = "FLOW_CORE_CLI_SCRIPT";
