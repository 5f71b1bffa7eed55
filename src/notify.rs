// Harmonia Portal - Notifications
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single-slot transient message. Newer messages replace older ones.
// Status = non-urgent outcome, Alert = failure (announced urgently).

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Status,
    Alert,
}

impl NoticeKind {
    /// Accessibility role the message is announced with
    pub fn aria_role(&self) -> &'static str {
        match self {
            NoticeKind::Status => "status",
            NoticeKind::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Notifier {
    slot: Option<Notice>,
    visible_for: Duration,
}

impl Notifier {
    pub fn new(visible_ms: i64) -> Self {
        Self {
            slot: None,
            visible_for: Duration::milliseconds(visible_ms),
        }
    }

    pub fn status(&mut self, message: impl Into<String>) {
        self.show_at(NoticeKind::Status, message.into(), Utc::now());
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.show_at(NoticeKind::Alert, message.into(), Utc::now());
    }

    pub fn show_at(&mut self, kind: NoticeKind, message: String, now: DateTime<Utc>) {
        match kind {
            NoticeKind::Status => log::debug!("status: {}", message),
            NoticeKind::Alert => log::debug!("alert: {}", message),
        }
        self.slot = Some(Notice { kind, message, shown_at: now });
    }

    /// Latest notice regardless of age
    pub fn latest(&self) -> Option<&Notice> {
        self.slot.as_ref()
    }

    /// Latest notice if still inside its display window
    pub fn visible_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.slot
            .as_ref()
            .filter(|n| now < n.shown_at + self.visible_for)
    }

    pub fn visible(&self) -> Option<&Notice> {
        self.visible_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_message_wins() {
        let mut notifier = Notifier::new(2500);
        notifier.status("Login successful");
        notifier.alert("Invalid username or password");
        let notice = notifier.latest().unwrap();
        assert_eq!(notice.kind, NoticeKind::Alert);
        assert_eq!(notice.kind.aria_role(), "alert");
        assert_eq!(notice.message, "Invalid username or password");
    }

    #[test]
    fn hides_after_window() {
        let mut notifier = Notifier::new(2500);
        let t0 = Utc::now();
        notifier.show_at(NoticeKind::Status, "Session ended".into(), t0);
        assert!(notifier.visible_at(t0 + Duration::milliseconds(2499)).is_some());
        assert!(notifier.visible_at(t0 + Duration::milliseconds(2500)).is_none());
        assert!(notifier.latest().is_some());
    }
}
