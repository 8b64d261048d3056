use std::process::ExitCode;

use actormap_cli::{commands, logging, Cli, Command};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.log_json) {
        eprintln!("failed to initialize logging: {err}");
    }

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Inspect { path } => {
            let document = commands::load_document(&path)?;
            print!("{}", commands::inspect(&document));
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate { path } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let document = commands::load_document(&path)?;
            let problems = commands::validate(&document, &config);
            if problems.is_empty() {
                println!("{}: ok", path.display());
                return Ok(ExitCode::SUCCESS);
            }
            for problem in &problems {
                println!("{problem}");
            }
            println!("{}: {} problem(s)", path.display(), problems.len());
            Ok(ExitCode::FAILURE)
        }
        Command::Demo { json } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let steps = commands::run_demo(config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&steps)?);
            } else {
                print!("{}", commands::render_steps(&steps));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
