pub mod notify;

use super::Platform;

/// Windows implementation using WinRT toast notifications.
#[derive(Debug, Default)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Platform for WindowsPlatform {
    async fn notify(&self, title: &str, body: &str, sound: bool) {
        notify::show_toast(title, body, sound).await;
    }
}
