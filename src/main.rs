//! `dconf-snapshot` binary: parses arguments and dispatches subcommands.
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use dconf_snapshot::{cli, commands, logging};

fn main() -> Result<ExitCode> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Backup(opts) => {
            logging::init_subscriber(args.verbose, "backup");
            let log = logging::Logger::new("backup");
            commands::backup::run(&args.global, &opts, &log)
        }
        cli::Command::List => {
            logging::init_subscriber(args.verbose, "list");
            let log = logging::Logger::new("list");
            commands::list::run(&args.global, &log).map(|()| ExitCode::SUCCESS)
        }
        cli::Command::Completions(opts) => {
            commands::completions::run(&opts, &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
        cli::Command::Version => {
            // Plain value for scripts, without the logger's indentation.
            #[allow(clippy::print_stdout)]
            println!("dconf-snapshot {}", env!("DCONF_SNAPSHOT_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}
