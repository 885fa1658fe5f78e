pub mod notify;

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::Platform;

/// Linux (and other unix) implementation backed by the freedesktop
/// notification service.
pub struct LinuxPlatform {
    notifier: Mutex<notify::Notifier>,
}

impl LinuxPlatform {
    pub fn new() -> Self {
        Self {
            notifier: Mutex::new(notify::Notifier::new()),
        }
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

pub fn ensure_console_dbus_env() {
    if std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some() {
        return;
    }

    let Some(runtime_dir) = find_runtime_dir_with_bus() else {
        return;
    };

    export_runtime_dir(&runtime_dir);
    if let Some(addr) = build_bus_address(&runtime_dir) {
        // SAFETY: called from `main` before the tokio runtime is built, while the
        // process is still single-threaded.
        unsafe {
            std::env::set_var("DBUS_SESSION_BUS_ADDRESS", addr);
        }
    }
}

fn find_runtime_dir_with_bus() -> Option<PathBuf> {
    runtime_dir_from_env()
        .and_then(runtime_dir_if_bus_exists)
        .or_else(|| runtime_dir_if_bus_exists(default_runtime_dir()))
}

fn runtime_dir_if_bus_exists(dir: PathBuf) -> Option<PathBuf> {
    dir.join("bus").exists().then_some(dir)
}

fn runtime_dir_from_env() -> Option<PathBuf> {
    std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from)
}

fn default_runtime_dir() -> PathBuf {
    let uid = nix::unistd::geteuid().as_raw();
    PathBuf::from(format!("/run/user/{uid}"))
}

fn export_runtime_dir(runtime: &Path) {
    if std::env::var_os("XDG_RUNTIME_DIR").is_none() {
        // SAFETY: see ensure_console_dbus_env.
        unsafe {
            std::env::set_var("XDG_RUNTIME_DIR", runtime.as_os_str());
        }
    }
}

fn build_bus_address(runtime: &Path) -> Option<String> {
    let bus = runtime.join("bus");
    bus.exists().then(|| format!("unix:path={}", bus.display()))
}

#[async_trait::async_trait]
impl Platform for LinuxPlatform {
    fn initialize_process(&self) {
        match std::env::var_os("DBUS_SESSION_BUS_ADDRESS") {
            Some(addr) => tracing::debug!(?addr, "session bus"),
            None => tracing::warn!("no session bus found; notifications will go to the log"),
        }
    }

    async fn notify(&self, title: &str, body: &str, sound: bool) {
        self.notifier.lock().await.show(title, body, sound).await;
    }
}
