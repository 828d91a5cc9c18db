use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xrate::cli::query::Query;
use xrate::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Server address (host:port) to query, overriding the configuration
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the conversion service
    Serve,
    /// Convert an amount between two currencies
    Convert {
        from: String,
        to: String,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    /// Show the exchange rate between two currencies
    Rate { from: String, to: String },
    /// List the currencies known to the service
    Currencies,
}

impl Commands {
    fn into_app_command(self, server: Option<String>) -> xrate::AppCommand {
        let query = match self {
            Commands::Serve => return xrate::AppCommand::Serve,
            Commands::Convert { from, to, amount } => Query::Convert { from, to, amount },
            Commands::Rate { from, to } => Query::Rate { from, to },
            Commands::Currencies => Query::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        };
        xrate::AppCommand::Query { query, server }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrate::cli::setup::setup(),
        Some(cmd) => {
            let command = cmd.into_app_command(cli.server);
            xrate::run_command(command, cli.config_path.as_deref()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
