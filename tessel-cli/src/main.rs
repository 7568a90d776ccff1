use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessel", version, about = "Tessel template tool")]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a template file.
    Tokens {
        /// Template file, placeholders written as `{}`
        input: PathBuf,
    },
    /// Print the parsed node tree.
    Tree { input: PathBuf },
    /// Print the compiled binding tables.
    Bindings { input: PathBuf },
    /// Render the template with the given values and print the HTML.
    Render {
        input: PathBuf,
        /// Placeholder value, in order; repeat for each placeholder
        #[arg(long = "value")]
        values: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = match cli.command {
        Commands::Tokens { input } => tessel_cli::tokens_cmd(&input)?,
        Commands::Tree { input } => tessel_cli::tree_cmd(&input)?,
        Commands::Bindings { input } => tessel_cli::bindings_cmd(&input)?,
        Commands::Render { input, values } => tessel_cli::render_cmd(&input, &values)?,
    };
    print!("{output}");
    Ok(())
}
