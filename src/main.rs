//! The `notifyserv` binary.

use clap::Parser;
use notifyserv::config::Config;
use notifyserv::run::{self, Outcome};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = Config::parse();
    if let Err(e) = config.validate() {
        eprintln!("notifyserv: {e}");
        return ExitCode::FAILURE;
    }
    if let Err(e) = init_logging(&config) {
        eprintln!("notifyserv: unable to open log: {e}");
        return ExitCode::FAILURE;
    }
    tracing::info!("{} started", notifyserv::VERSION_STRING);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(run::run(&config)) {
        Ok(Outcome::Exit(0)) => ExitCode::SUCCESS,
        Ok(Outcome::Exit(_)) => ExitCode::FAILURE,
        Ok(Outcome::Restart) => restart(),
        Err(e) => {
            tracing::error!("startup failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Replaces the process image with a fresh copy of ourselves, keeping the
/// original arguments. Only reached after all owned resources are released.
fn restart() -> ExitCode {
    use std::os::unix::process::CommandExt;
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            tracing::error!("cannot restart, no path to own executable: {e}");
            return ExitCode::FAILURE;
        }
    };
    let args: Vec<String> = std::env::args().skip(1).collect();
    let err = std::process::Command::new(exe).args(args).exec();
    tracing::error!("failed to restart: {err}");
    ExitCode::FAILURE
}

fn init_logging(config: &Config) -> std::io::Result<()> {
    let level = match config.verbosity {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    if config.foreground {
        tracing_subscriber::fmt().with_max_level(level).compact().init();
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("notifyserv.log")?;
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    }
    Ok(())
}
