//! kipanel CLI entry point.

use std::process;

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use kipanel_cli::{Args, error_adapter, usage_exit_code};

fn main() {
    miette::set_panic_hook();

    let args = Args::try_parse().unwrap_or_else(|err| {
        let code = usage_exit_code(&err);
        let _ = err.print();
        process::exit(code);
    });

    let log_level = args.log_filter().unwrap_or_else(|| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting kipanel");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = kipanel_cli::run(&args) {
        for report in error_adapter::render(&err) {
            error!("{report}");
        }
        process::exit(err.exit_code());
    }

    info!("Completed successfully");
}
