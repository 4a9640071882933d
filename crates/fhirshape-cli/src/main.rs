use clap::Parser;
use eyre::Result;

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            dir,
            placeholder,
            output,
            fail_fast,
            last_write_wins,
        } => {
            let args = commands::BuildArgs {
                dir,
                placeholder,
                output,
                fail_fast,
                last_write_wins,
            };
            commands::build(&config, args, cli.json).await
        }
        Commands::Project {
            models,
            type_name,
            record,
            default,
        } => commands::project_file(&config, &models, &type_name, &record, default).await,
        Commands::Keys { file } => commands::keys(&file, cli.json).await,
        Commands::Render { file, output } => {
            commands::render(&config, &file, output.as_deref()).await
        }
    }
}
