#[cfg(not(target_os = "windows"))]
pub mod linux;
#[cfg(target_os = "windows")]
pub mod windows;

use async_trait::async_trait;
use std::sync::Arc;

pub const APP_NAME: &str = "ARC-Sight";

/// Cross-platform interface for OS-level actions we need.
#[async_trait]
pub trait Platform: Send + Sync {
    /// One-time check before any notification is shown. Environment fixes
    /// that need a single-threaded process happen in `main` instead.
    fn initialize_process(&self) {}

    /// Shows a desktop notification. Failures are logged, never returned.
    async fn notify(&self, title: &str, body: &str, sound: bool);
}

/// Detect the current platform and return an implementation.
pub fn detect() -> Arc<dyn Platform> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsPlatform::new())
    }
    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(linux::LinuxPlatform::new())
    }
}
