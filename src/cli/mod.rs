pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, HealthArgs, OutputFormatArg, ServeArgs};
pub use output::{HealthStatus, OutputFormat, OutputFormatter};
