use arcsight_shared::api::{ReleaseDto, endpoints, rest};
use semver::Version;
use tracing::{debug, info};

use crate::AppError;

/// A release newer than the running binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableUpdate {
    pub version: Version,
    pub page_url: String,
    pub installer_url: Option<String>,
}

pub fn current_version() -> Version {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}

fn parse_tag(tag: &str) -> Option<Version> {
    Version::parse(tag.trim().trim_start_matches(['v', 'V'])).ok()
}

/// Returns the update offered by `release`, if it is a stable release newer
/// than `current`.
pub fn select_update(release: &ReleaseDto, current: &Version) -> Option<AvailableUpdate> {
    if release.draft || release.prerelease {
        debug!(tag = %release.tag_name, "update: skipping draft or prerelease");
        return None;
    }
    let version = parse_tag(&release.tag_name)?;
    if !version.pre.is_empty() || version <= *current {
        return None;
    }
    let installer_url = release
        .assets
        .iter()
        .find(|a| a.name.to_lowercase().ends_with(".exe"))
        .map(|a| a.browser_download_url.clone());
    let page_url = release
        .html_url
        .clone()
        .unwrap_or_else(|| endpoints::release_page(endpoints::RELEASE_REPO));
    Some(AvailableUpdate {
        version,
        page_url,
        installer_url,
    })
}

pub async fn check_for_update(api_base: &str) -> Result<Option<AvailableUpdate>, AppError> {
    let url = endpoints::latest_release(api_base, endpoints::RELEASE_REPO);
    let release = rest::latest_release(&url)
        .await
        .map_err(|e| AppError::Http(format!("release check: {e}")))?;
    let current = current_version();
    let update = select_update(&release, &current);
    match &update {
        Some(u) => info!(%current, new_version=%u.version, "update: newer release available"),
        None => debug!(%current, tag=%release.tag_name, "update: up to date"),
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcsight_shared::api::ReleaseAssetDto;

    fn release(tag: &str) -> ReleaseDto {
        ReleaseDto {
            tag_name: tag.to_string(),
            html_url: Some(format!("https://github.com/rodafux/ARC-Sight/releases/tag/{tag}")),
            draft: false,
            prerelease: false,
            assets: vec![
                ReleaseAssetDto {
                    name: "checksums.txt".into(),
                    browser_download_url: "https://example.invalid/checksums.txt".into(),
                },
                ReleaseAssetDto {
                    name: "ARC-Sight-Setup.EXE".into(),
                    browser_download_url: "https://example.invalid/setup.exe".into(),
                },
            ],
        }
    }

    #[test]
    fn offers_newer_stable_release() {
        let current = Version::new(1, 2, 1);
        let u = select_update(&release("v1.3.0"), &current).unwrap();
        assert_eq!(u.version, Version::new(1, 3, 0));
        assert_eq!(u.installer_url.as_deref(), Some("https://example.invalid/setup.exe"));
        assert!(u.page_url.ends_with("/tag/v1.3.0"));
    }

    #[test]
    fn ignores_old_unparseable_and_prereleases() {
        let current = Version::new(1, 2, 1);
        assert!(select_update(&release("v1.2.1"), &current).is_none());
        assert!(select_update(&release("1.0.0"), &current).is_none());
        assert!(select_update(&release("latest"), &current).is_none());
        assert!(select_update(&release("v2.0.0-beta.1"), &current).is_none());

        let mut pre = release("v9.0.0");
        pre.prerelease = true;
        assert!(select_update(&pre, &current).is_none());
    }

    #[test]
    fn falls_back_to_releases_page() {
        let mut r = release("V1.4.0");
        r.html_url = None;
        r.assets.clear();
        let u = select_update(&r, &Version::new(1, 2, 1)).unwrap();
        assert_eq!(u.page_url, "https://github.com/rodafux/ARC-Sight/releases");
        assert_eq!(u.installer_url, None);
    }
}
