//! chaparral - organization skill linker and marketplace publisher

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use chaparral::{ChaparralError, Result};
use chaparral::app::AppContext;
use chaparral::cli::Cli;
use chaparral::cli::output::robot_error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.robot {
                // partial results were already emitted as the response body
                if matches!(e, ChaparralError::Partial(_)) {
                    return ExitCode::FAILURE;
                }
                println!(
                    "{}",
                    serde_json::to_string(&robot_error(&e)).unwrap_or_default()
                );
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    chaparral::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,chaparral=info",
        1 => "info,chaparral=debug",
        2 => "debug,chaparral=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
