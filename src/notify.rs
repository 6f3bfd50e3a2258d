//! Completion notifications
//!
//! Delivery is best effort. A [`Notifier`] never returns an error to the
//! pipeline; failures are printed as warnings and the run carries on.
//!
//! ## Pushover
//!
//! Enable with `PUTIO_NOTIFY=1` and provide the application token and user
//! key:
//! ```bash
//! export PUSHOVER_TOKEN="azGDORePK8gMaC0QOYAMyEEuzJnyUi"
//! export PUSHOVER_USER="uQiRzpo4DXghDmr9QzzfQu27cmVRsG"
//! ```

use crate::core::output;
use crate::error::NotifyError;
use serde::Deserialize;

/// Default Pushover API base URL
const PUSHOVER_API_BASE: &str = "https://api.pushover.net";

/// Sends a short title and message somewhere the operator will see it.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Used when notifications are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _title: &str, _message: &str) {}
}

#[derive(Debug, Deserialize)]
struct PushoverResponse {
    status: i64,
    #[serde(default)]
    errors: Vec<String>,
}

/// Pushover message API client.
#[derive(Debug, Clone)]
pub struct PushoverNotifier {
    token: Option<String>,
    user: Option<String>,
    base_url: String,
    agent: ureq::Agent,
}

impl PushoverNotifier {
    pub fn new(token: Option<String>, user: Option<String>) -> Self {
        Self::with_base(token, user, PUSHOVER_API_BASE)
    }

    /// Credentials from `PUSHOVER_TOKEN` and `PUSHOVER_USER`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("PUSHOVER_TOKEN").ok(),
            std::env::var("PUSHOVER_USER").ok(),
        )
    }

    /// Internal: configurable base URL (for testing)
    fn with_base(token: Option<String>, user: Option<String>, base_url: &str) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            user: user.filter(|u| !u.is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// Deliver one message, reporting why it failed.
    pub fn send(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(user)) = (&self.token, &self.user) else {
            return Err(NotifyError::MissingCredentials);
        };

        let url = format!("{}/1/messages.json", self.base_url);
        let response = self
            .agent
            .post(&url)
            .send_form(&[
                ("token", token.as_str()),
                ("user", user.as_str()),
                ("title", title),
                ("message", message),
            ])
            .map_err(|e| match e {
                // Pushover answers 4xx with a JSON body listing what was wrong
                ureq::Error::Status(code, response) => {
                    match response.into_json::<PushoverResponse>() {
                        Ok(body) if !body.errors.is_empty() => {
                            NotifyError::Rejected(body.errors.join(", "))
                        }
                        _ => NotifyError::Rejected(format!("HTTP {}", code)),
                    }
                }
                ureq::Error::Transport(t) => NotifyError::Transport(t.to_string()),
            })?;

        let body: PushoverResponse = response
            .into_json()
            .map_err(|e| NotifyError::Transport(format!("unreadable response: {}", e)))?;

        if body.status != 1 {
            return Err(NotifyError::Rejected(if body.errors.is_empty() {
                format!("status {}", body.status)
            } else {
                body.errors.join(", ")
            }));
        }

        Ok(())
    }
}

impl Notifier for PushoverNotifier {
    fn notify(&self, title: &str, message: &str) {
        match self.send(title, message) {
            Ok(()) => output::detail("Pushover notification sent successfully"),
            Err(e) => output::warning(&format!("Failed to send Pushover notification: {}", e)),
        }
    }
}

/// Pick the notifier for a run.
pub fn for_run(enabled: bool) -> Box<dyn Notifier> {
    if enabled {
        Box::new(PushoverNotifier::from_env())
    } else {
        Box::new(Silent)
    }
}
