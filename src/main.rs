use clap::{Parser, Subcommand};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;
use transmute::cli::{self, ApplyOptions, CliError};

#[derive(Parser)]
#[command(name = "transmute")]
#[command(about = "Transmute - reshape JSON with declarative expression templates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a template to JSON input
    Apply {
        /// Template JSON, a bare expression, or @file
        template: String,

        /// JSON input or @file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Pin the clock used by `now` (RFC 3339)
        #[arg(long)]
        now: Option<String>,
    },

    /// List filters, or describe one group of them
    Filters {
        /// Filter group (use 'transmute filters' to list groups)
        group: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Apply {
            template,
            input,
            pretty,
            now,
        } => run_apply(template, input, pretty, now),
        Commands::Filters { group: None } => {
            print!("{}", cli::filters_overview());
            Ok(())
        }
        Commands::Filters { group: Some(group) } => cli::filter_group_docs(&group).map(|docs| print!("{}", docs)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_apply(
    template: String,
    input: Option<String>,
    pretty: bool,
    now: Option<String>,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = ApplyOptions {
        template,
        input,
        pretty,
        now,
    };

    println!("{}", cli::execute_apply(&options)?);
    Ok(())
}
