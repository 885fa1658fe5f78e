use tracing::{debug, info, warn};

use crate::platform::APP_NAME;

const SOUND_NAME: &str = "message-new-instant";

/// Desktop notifier. Drops to log-only output after the notification
/// service fails once, so a headless session does not retry every alert.
#[derive(Debug, Default)]
pub struct Notifier {
    log_only: bool,
}

impl Notifier {
    pub fn new() -> Self {
        debug!("Linux Notifier created");
        Self::default()
    }

    pub async fn show(&mut self, title: &str, body: &str, sound: bool) {
        if self.log_only {
            info!("[ALERT] {title}: {body}");
            return;
        }
        let mut n = notify_rust::Notification::new();
        n.appname(APP_NAME)
            .summary(title)
            .body(body)
            .urgency(notify_rust::Urgency::Normal);
        if sound {
            n.sound_name(SOUND_NAME);
        }
        match n.show_async().await {
            Ok(_handle) => debug!(title, "notification shown"),
            Err(e) => {
                warn!(error=%e, "notify-rust failed; falling back to log output");
                self.log_only = true;
                info!("[ALERT] {title}: {body}");
            }
        }
    }
}
