//! User-facing notifications.
//!
//! Screens never show errors themselves; they push one alert per failed action
//! and leave their state as it was. The front end drains the receiver.

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub text: String,
}

pub type AlertReceiver = mpsc::UnboundedReceiver<Alert>;

#[derive(Clone, Debug)]
pub struct Alerts {
    tx: mpsc::UnboundedSender<Alert>,
}

impl Alerts {
    pub fn channel() -> (Self, AlertReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn success(&self, title: impl Into<String>, text: impl Into<String>) {
        self.push(AlertKind::Success, title.into(), text.into());
    }

    pub fn warning(&self, title: impl Into<String>, text: impl Into<String>) {
        self.push(AlertKind::Warning, title.into(), text.into());
    }

    /// An error alert for a check made before any request.
    pub fn rejected(&self, title: impl Into<String>, text: impl Into<String>) {
        self.push(AlertKind::Error, title.into(), text.into());
    }

    pub fn error(&self, err: &Error) {
        self.push(AlertKind::Error, err.kind().to_string(), err.to_string());
    }

    /// Passes `result` through, raising an error alert when it failed.
    pub fn surface<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.error(err);
        }
        result
    }

    fn push(&self, kind: AlertKind, title: String, text: String) {
        debug!(?kind, %title, %text, "alert");
        // Nobody listening is fine: alerts are advisory.
        let _ = self.tx.send(Alert { kind, title, text });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_results_raise_one_alert() {
        let (alerts, mut rx) = Alerts::channel();
        assert_eq!(alerts.surface(Ok::<_, Error>(3)).unwrap(), 3);
        assert!(rx.try_recv().is_err());

        assert!(alerts.surface::<()>(Err(Error::api("Invalid user"))).is_err());
        let alert = rx.try_recv().unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.title, "Error");
        assert_eq!(alert.text, "Invalid user");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn alerts_without_a_receiver_are_dropped() {
        let (alerts, rx) = Alerts::channel();
        drop(rx);
        alerts.success("Success", "still fine");
    }
}
