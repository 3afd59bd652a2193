pub mod args;
pub mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Citizens registry browser
#[derive(Parser, Debug)]
#[command(
    name = "citizens",
    about = "Citizens registry CLI - Filter and page through citizen records from the terminal",
    version,
    author,
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide progress spinners
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Markdown format
    Markdown,
    /// CSV format
    Csv,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one filtered page of citizens
    #[command(alias = "l")]
    List(args::ListArgs),

    /// Interactive filtering session reading commands from stdin
    #[command(alias = "b")]
    Browse(args::BrowseArgs),

    /// List the cities offered by the city filters
    Cities(args::CitiesArgs),

    /// Manage configuration
    #[command(alias = "c")]
    Config(args::ConfigArgs),

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Generate shell completion scripts
    fn generate_completions(shell: Shell) {
        use clap::CommandFactory;
        use clap_complete::generate;
        use std::io;

        let mut cmd = Self::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
    }

    /// Run the CLI application
    pub async fn run() -> crate::error::Result<()> {
        let cli = Self::parse();

        // Set up logging
        if cli.verbose {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
                .init();
        } else {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
                .init();
        }

        let result = match cli.command {
            Commands::List(args) => commands::list::execute(args, cli.format, cli.quiet, cli.verbose).await,
            Commands::Browse(args) => commands::browse::execute(args, cli.format).await,
            Commands::Cities(args) => commands::cities::execute(args, cli.quiet, cli.verbose).await,
            Commands::Config(args) => commands::config::execute(args).await,
            Commands::Version => {
                commands::version::execute();
                Ok(())
            }
            Commands::Completions { shell } => {
                Self::generate_completions(shell);
                Ok(())
            }
        };

        // Handle errors with better messaging
        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                use crate::error::CitizensError;
                match &e {
                    CitizensError::ApiError { code, message, .. } => {
                        eprintln!("Error: {}", message);
                        if cli.verbose {
                            eprintln!("Code: {}", code);
                        }
                    }
                    CitizensError::Network(err) => {
                        eprintln!("Network error: {}", err);
                    }
                    CitizensError::MalformedResponse(msg) => {
                        eprintln!("Error parsing response: {}", msg);
                        if !cli.verbose {
                            eprintln!("\nRun with --verbose for more details.");
                        }
                    }
                    _ => {
                        eprintln!("Error: {}", e);
                    }
                }
                if let Some(hint) = e.hint() {
                    eprintln!("\nHint: {}", hint);
                }
                Err(e)
            }
        }
    }
}
