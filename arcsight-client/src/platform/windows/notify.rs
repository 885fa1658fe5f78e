use tauri_winrt_notification::{Duration, Sound, Toast};
use tracing::{debug, info, warn};

/// Shows a toast on a blocking thread; WinRT calls must not run on the
/// async executor.
pub async fn show_toast(title: &str, body: &str, sound: bool) {
    let (title, body) = (title.to_string(), body.to_string());
    let res = tokio::task::spawn_blocking(move || {
        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(&title)
            .text1(&body)
            .sound(sound.then_some(Sound::Default))
            .duration(Duration::Short)
            .show()
            .map_err(|e| (e.to_string(), title, body))
    })
    .await;
    match res {
        Ok(Ok(())) => debug!("toast shown"),
        Ok(Err((e, title, body))) => {
            warn!(error=%e, "toast failed");
            info!("[ALERT] {title}: {body}");
        }
        Err(e) => warn!(error=%e, "toast task panicked"),
    }
}
