use clap::{Parser, Subcommand, ValueEnum};

/// Network-accessible stack store with a plaintext line protocol
#[derive(Parser, Debug)]
#[command(
    name = "stackd",
    about = "Network-accessible stack store with a plaintext line protocol",
    version,
    long_about = "stackd serves independent stack instances over a newline-delimited \
                  plaintext protocol. Clients CREATE a stack, receive an unforgeable \
                  identifier, and PUSH/POP/PEEK/SIZE/DELETE against it. Configuration \
                  comes from STACKD_* environment variables, overridable per flag."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output (debug level)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the stack store server",
        long_about = "Binds the configured address and serves the line protocol until \
                      interrupted.\n\n\
                      Examples:\n  \
                      stackd serve\n  \
                      stackd serve --port 9000\n  \
                      stackd serve --max-stacks 50 --ttl 0"
    )]
    Serve(ServeArgs),

    #[command(
        about = "Check a running server",
        long_about = "Connects to a running stackd, sends PING, and reports whether it \
                      answered.\n\n\
                      Examples:\n  \
                      stackd health\n  \
                      stackd health --port 9000 --format json"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, value_name = "ADDR", help = "Listen address (overrides STACKD_HOST)")]
    pub host: Option<String>,

    #[arg(
        short = 'p',
        long,
        value_name = "PORT",
        help = "Listen port (overrides STACKD_PORT)"
    )]
    pub port: Option<u16>,

    #[arg(long, value_name = "N", help = "Maximum number of live stacks")]
    pub max_stacks: Option<usize>,

    #[arg(long, value_name = "N", help = "Maximum elements per stack")]
    pub max_depth: Option<usize>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Idle expiry TTL in seconds, 0 disables (overrides STACKD_TTL_SECS)"
    )]
    pub ttl: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(long, value_name = "ADDR", help = "Server address (defaults to STACKD_HOST)")]
    pub host: Option<String>,

    #[arg(
        short = 'p',
        long,
        value_name = "PORT",
        help = "Server port (defaults to STACKD_PORT)"
    )]
    pub port: Option<u16>,

    #[arg(
        long,
        value_name = "SECONDS",
        default_value = "5",
        help = "Connect timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
