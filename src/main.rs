//! locsync CLI entry point.

use clap::Parser;
use locsync::cli::commands;
use locsync::cli::{Cli, Commands};
use locsync::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.silent {
        locsync::SILENT.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    match &cli.command {
        Commands::Init(args) => commands::init::execute(args, json),
        Commands::Version => commands::version::execute(json),

        Commands::Status => commands::status::execute(cli.db.as_ref(), cli.actor.as_deref(), json),

        Commands::Document { command } => {
            commands::document::execute(command, cli.db.as_ref(), cli.actor.as_deref(), json)
        }

        Commands::Target { command } => {
            commands::target::execute(command, cli.db.as_ref(), cli.actor.as_deref(), json)
        }

        Commands::Profile { command } => {
            commands::profile::execute(command, cli.db.as_ref(), cli.actor.as_deref(), json)
        }

        Commands::Job { command } => {
            commands::job::execute(command, cli.db.as_ref(), cli.actor.as_deref(), json)
        }

        Commands::Webhook(args) => {
            commands::webhook::execute(args, cli.db.as_ref(), cli.actor.as_deref(), json)
        }

        Commands::Completions { shell } => commands::completions::execute(*shell),
    }
}
