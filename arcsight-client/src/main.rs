use arcsight_client::{AppError, Cli, run};
use clap::Parser;

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    // touches the process environment, so it must run before worker threads exist
    #[cfg(not(target_os = "windows"))]
    arcsight_client::platform::linux::ensure_console_dbus_env();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
