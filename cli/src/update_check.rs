//! Release update check
//!
//! Fire-and-forget: the check runs as a background task and reports back over
//! a channel, so a slow or failing network never stalls the tick loop.

use ffradar_types::UpdateConfig;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("ffradar/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    Available { version: String, url: String },
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("update request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("release tag `{0}` is not a version")]
    BadTag(String),
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    html_url: String,
}

/// Parse `v1.2.3` / `1.2` style versions into comparable parts
fn parse_version(text: &str) -> Option<(u64, u64, u64)> {
    let text = text.trim().trim_start_matches(['v', 'V']);
    let core = text.split(['-', '+']).next()?;
    let mut parts = core.split('.').map(|p| p.parse::<u64>());

    let major = parts.next()?.ok()?;
    let minor = parts.next().transpose().ok()?.unwrap_or(0);
    let patch = parts.next().transpose().ok()?.unwrap_or(0);
    Some((major, minor, patch))
}

/// Whether release tag `latest` is newer than `current`
pub fn is_newer(latest: &str, current: &str) -> Result<bool, UpdateError> {
    let latest_version = parse_version(latest).ok_or_else(|| UpdateError::BadTag(latest.to_string()))?;
    let current_version =
        parse_version(current).ok_or_else(|| UpdateError::BadTag(current.to_string()))?;
    Ok(latest_version > current_version)
}

pub async fn check_latest(repository: &str) -> Result<UpdateStatus, UpdateError> {
    let url = format!("https://api.github.com/repos/{repository}/releases/latest");
    let release: Release = reqwest::Client::new()
        .get(&url)
        .header("User-Agent", USER_AGENT)
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    debug!(tag = %release.tag_name, "Fetched latest release");

    if is_newer(&release.tag_name, env!("CARGO_PKG_VERSION"))? {
        Ok(UpdateStatus::Available {
            version: release.tag_name,
            url: release.html_url,
        })
    } else {
        Ok(UpdateStatus::UpToDate)
    }
}

/// Start the background check. The receiver yields at most one status and
/// closes without one when the check is disabled or fails.
pub fn spawn(config: &UpdateConfig) -> mpsc::Receiver<UpdateStatus> {
    let (tx, rx) = mpsc::channel(1);
    if !config.enabled {
        return rx;
    }

    let repository = config.repository.clone();
    tokio::spawn(async move {
        match check_latest(&repository).await {
            Ok(status) => {
                let _ = tx.send(status).await;
            }
            Err(e) => warn!(error = %e, "Update check failed"),
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("v1.2.3"), Some((1, 2, 3)));
        assert_eq!(parse_version("2.0"), Some((2, 0, 0)));
        assert_eq!(parse_version("3"), Some((3, 0, 0)));
        assert_eq!(parse_version("1.4.0-beta.1"), Some((1, 4, 0)));
        assert_eq!(parse_version("release"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("v0.2.0", "0.1.9").unwrap());
        assert!(is_newer("1.0", "0.9.9").unwrap());
        assert!(!is_newer("v0.1.0", "0.1.0").unwrap());
        assert!(!is_newer("0.0.9", "0.1.0").unwrap());
        assert!(matches!(is_newer("nightly", "0.1.0"), Err(UpdateError::BadTag(_))));
    }

    #[tokio::test]
    async fn test_disabled_check_closes_channel() {
        let config = UpdateConfig {
            enabled: false,
            ..Default::default()
        };
        let mut rx = spawn(&config);
        assert_eq!(rx.recv().await, None);
    }
}
