use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod app;
pub mod board;
pub mod cli;
pub mod config;
pub mod hotkey;
pub mod i18n;
pub mod instance;
pub mod platform;
pub mod render;
pub mod update;

pub use cli::{Cli, Command, ConfigCommand};
pub use config::{Settings, SettingsHandle, load_config, resolve_config_path};

const LOG_FILE_PREFIX: &str = "arcsight.log";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("another instance is already running (lock {})", .0.display())]
    AlreadyRunning(PathBuf),
}

/// Console logging for every command; the agent also passes a directory for
/// a daily rolling log file. Keep the returned guard alive to flush it.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let mut guard = None;
    let file_layer = log_dir.map(|dir| {
        let (writer, g) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
            dir,
            LOG_FILE_PREFIX,
        ));
        guard = Some(g);
        fmt::layer().with_ansi(false).with_writer(writer)
    });
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
    guard
}

pub fn log_dir() -> Option<PathBuf> {
    config::project_dirs().map(|pd| pd.data_local_dir().join("logs"))
}

pub async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        None => {
            let _guard = init_tracing(log_dir().as_deref());
            app::agent::run(cli.config).await
        }
        Some(cmd) => {
            init_tracing(None);
            match cmd {
                Command::Status => app::status::run(cli.config).await,
                Command::Config(ConfigCommand::Show) => app::config_show(cli.config),
                Command::Config(ConfigCommand::Set { key, value }) => {
                    app::config_set(cli.config, &key, &value)
                }
                Command::Languages => app::languages(cli.config),
            }
        }
    }
}
