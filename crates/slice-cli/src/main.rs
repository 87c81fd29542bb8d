//! logslice binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use slice_cli::cli::{Cli, Commands};
use slice_cli::commands::{ResolveCommand, RunCommand, ScanCommand};
use slice_cli::output::OutputFormat;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), slice_cli::CliError> {
    let format = OutputFormat::new(cli.format);
    let config = cli.config.as_deref();
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Run(args) => {
            let cmd = RunCommand::new(config);
            cmd.execute(&mut stdout, &format, args).await?;
        }
        Commands::Resolve(args) => {
            let cmd = ResolveCommand::new(config);
            cmd.execute(&mut stdout, &format, args)?;
        }
        Commands::Scan(args) => {
            let cmd = ScanCommand::new(config);
            cmd.execute(&mut stdout, &format, args)?;
        }
    }

    Ok(())
}
