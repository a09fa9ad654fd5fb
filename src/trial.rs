//! Trial-period gate.
//!
//! Some add-ons install in a trial mode that expires 30 days after the
//! recorded install date. Expiry only ever changes messaging; nothing is
//! disabled here.

use chrono::{DateTime, Duration, Utc};

use crate::controller::Alert;

/// Days a trial install keeps working without nagging.
const TRIAL_DAYS: i64 = 30;

/// Trial state for one install.
#[derive(Debug, Clone)]
pub struct Trial {
    installed_date: Option<DateTime<Utc>>,
    enabled: bool,
    message_title: String,
    message_body: String,
}

impl Trial {
    /// A disabled trial with no message.
    pub fn new() -> Self {
        Self {
            installed_date: None,
            enabled: false,
            message_title: String::new(),
            message_body: String::new(),
        }
    }

    /// Record when the add-on was installed.
    pub fn with_installed_date(mut self, installed_date: DateTime<Utc>) -> Self {
        self.installed_date = Some(installed_date);
        self
    }

    /// Turn trial behavior on.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Message shown once the trial expires.
    pub fn with_message(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.message_title = title.into();
        self.message_body = body.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the trial window has lapsed.
    ///
    /// Disabled trials and installs with no recorded date never expire.
    pub fn is_expired(&self) -> bool {
        if !self.enabled {
            return false;
        }

        match self.installed_date {
            Some(installed) => installed < Utc::now() - Duration::days(TRIAL_DAYS),
            None => false,
        }
    }

    /// Alert data for the admin control panel.
    pub fn expired_alert(&self) -> Alert {
        Alert::issue(
            self.message_title.clone(),
            vec![self.message_body.clone()],
        )
    }

    /// Inline markup for front-end rendering.
    pub fn expired_markup(&self) -> String {
        format!(
            "<div class=\"alert inline warn\"><h3>{}</h3><p>{}</p></div>",
            self.message_title, self.message_body
        )
    }
}

impl Default for Trial {
    fn default() -> Self {
        Self::new()
    }
}
