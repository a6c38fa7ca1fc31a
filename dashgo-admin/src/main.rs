use std::process::ExitCode;

use clap::Parser;
use dashgo_admin::app::AppConfig;
use dashgo_admin::cli::{self, Cli};
use env_logger::{Builder, Target};
use log::LevelFilter;

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("dashgo_admin", LevelFilter::Debug)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();

    let config = match AppConfig::from_environment() {
        Ok(config) => config,
        Err(error) => {
            log::error!("Invalid configuration: {}", error);
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    match cli::run(cli, config).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
