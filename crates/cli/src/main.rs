use clap::Parser;
use envlift_core::Error;

mod commands;
mod context;
mod formatters;

use commands::Commands;
use context::{Context, GlobalArgs};

#[derive(Parser)]
#[command(name = "envlift")]
#[command(about = "Run commands with secrets injected into their environment", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = envlift_utils::tracing::init(cli.global.debug) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    let result = match Context::new(cli.global) {
        Ok(ctx) => cli.command.execute(&ctx).await,
        Err(e) => Err(e),
    };

    if let Err(err) = result {
        report(&err);
        std::process::exit(err.exit_code());
    }
}

/// Print a fatal error and its causes to stderr
fn report(err: &Error) {
    // The child has already reported its own failure
    if let Error::CommandExecution {
        exit_code: Some(code),
        ..
    } = err
    {
        tracing::debug!(code, "command exited unsuccessfully");
        return;
    }

    eprintln!("error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = std::error::Error::source(cause);
    }
    if let Some(hint) = err.recovery_hint() {
        eprintln!("hint: {hint}");
    }
}
