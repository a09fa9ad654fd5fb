//! Throttled remote license validation.
//!
//! Add-ons phone home at most once per ping window. The remote endpoint
//! answers with a status; anything noteworthy is turned into a banner the
//! admin UI shows inline. Transport or parse failures never lock a site out:
//! the check fails open to [`LicenseStatus::Valid`] and the failure is
//! logged.

use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};

use crate::error::Result;
use crate::ping::Ping;

/// Connect timeout for the license endpoint.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of a remote license check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseStatus {
    Valid,
    Invalid,
    UpdateAvailable,
    Expired,
    ExpiringSoon,
}

impl LicenseStatus {
    /// Parse the remote status string. Unknown statuses read as valid.
    pub fn parse(status: &str) -> Self {
        match status {
            "invalid" => LicenseStatus::Invalid,
            "update_available" => LicenseStatus::UpdateAvailable,
            "expired" => LicenseStatus::Expired,
            "expiring_soon" => LicenseStatus::ExpiringSoon,
            _ => LicenseStatus::Valid,
        }
    }

    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            LicenseStatus::Valid => "valid",
            LicenseStatus::Invalid => "invalid",
            LicenseStatus::UpdateAvailable => "update_available",
            LicenseStatus::Expired => "expired",
            LicenseStatus::ExpiringSoon => "expiring_soon",
        }
    }

    /// Whether this status warrants a banner in the admin UI.
    pub fn is_noteworthy(self) -> bool {
        self != LicenseStatus::Valid
    }
}

/// Banner markup for a noteworthy status, `None` for a valid license.
pub fn render_banner(status: LicenseStatus) -> Option<String> {
    let (title, body) = match status {
        LicenseStatus::Valid => return None,
        LicenseStatus::Invalid => (
            "Invalid license",
            "The license for this add-on is invalid. Please purchase a license or update the license key.",
        ),
        LicenseStatus::UpdateAvailable => (
            "Update available",
            "A newer version of this add-on is available to download.",
        ),
        LicenseStatus::Expired => (
            "License expired",
            "The license for this add-on has expired. Renew it to keep receiving updates.",
        ),
        LicenseStatus::ExpiringSoon => (
            "License expiring soon",
            "The license for this add-on expires soon. Renew it to keep receiving updates.",
        ),
    };

    Some(format!(
        "<div class=\"alert inline warn\"><h3>{}</h3><p>{}</p></div>",
        title, body
    ))
}

/// Remote license check gated by a [`Ping`] window.
pub struct License {
    url: String,
    ping: Ping,
    debug: bool,
}

impl License {
    /// Create a check against `url`, throttled by `ping`.
    pub fn new(url: impl Into<String>, ping: Ping) -> Self {
        Self {
            url: url.into(),
            ping,
            debug: false,
        }
    }

    /// Force every [`validate`](Self::validate) call to hit the endpoint.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Perform one remote check, failing open to valid.
    pub fn check_license(&self, payload: &Value) -> LicenseStatus {
        match self.request(payload) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("License check failed, treating as valid: {:#}", e);
                LicenseStatus::Valid
            }
        }
    }

    /// Validate the license if a check is due and return banner markup.
    ///
    /// When the window has not elapsed, the banner for the last known
    /// noteworthy status is re-rendered so the UI stays consistent between
    /// remote checks.
    pub fn validate(&self, payload: &Value) -> Result<Option<String>> {
        if !self.debug && !self.ping.should_ping()? {
            return Ok(self
                .ping
                .last_ping_status()?
                .map(|status| LicenseStatus::parse(&status))
                .and_then(render_banner));
        }

        let status = self.check_license(payload);
        self.ping.update_last_ping(status.as_str())?;

        Ok(render_banner(status))
    }

    fn request(&self, payload: &Value) -> anyhow::Result<LicenseStatus> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        let response: Value = client
            .post(&self.url)
            .header("Cache-Control", "no-cache")
            .json(&json!({ "payload": payload }))
            .send()
            .with_context(|| format!("Failed to reach license endpoint {}", self.url))?
            .json()
            .context("Failed to parse license response")?;

        let status = response["status"]
            .as_str()
            .context("No status in license response")?;

        Ok(LicenseStatus::parse(status))
    }
}
