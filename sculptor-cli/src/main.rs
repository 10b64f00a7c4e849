use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod recipe_args;

use crate::recipe_args::RecipeArgs;

#[derive(Parser, Debug)]
#[command(name = "sculptor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verilog-A Sculptor - assemble analog blocks into a model prompt")]
struct Args {
    /// Settings file to use instead of ~/.sculptor/settings.toml
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the block library by category
    Catalog,

    /// List the models sessions can be opened with
    Models,

    /// Show the local code snippets for the environment settings
    Preview(RecipeArgs),

    /// Print the system instruction and user turn without sending them
    Prompt(RecipeArgs),

    /// Send the recipe to the configured provider and print the model
    Generate {
        #[command(flatten)]
        recipe: RecipeArgs,

        /// Provider name from settings to use instead of the active one
        #[arg(long)]
        provider: Option<String>,

        /// Model name, e.g. gemini-3-pro-preview
        #[arg(long)]
        model: Option<String>,

        /// Write the generated code to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    setup_tracing()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = Args::parse();
    info!(command = ?args.command, settings = ?args.settings, "CLI startup");

    match args.command {
        Command::Catalog => commands::catalog(),
        Command::Models => commands::models(),
        Command::Preview(recipe) => commands::preview(&recipe),
        Command::Prompt(recipe) => commands::prompt(&recipe),
        Command::Generate {
            recipe,
            provider,
            model,
            output,
        } => {
            commands::generate(commands::GenerateOptions {
                recipe,
                settings: args.settings,
                provider,
                model,
                output,
            })
            .await
        }
    }
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    let trace_dir = home.join(".sculptor").join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("sculptor.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
