//! Transient user-facing messages.

use chrono::{DateTime, Utc};

pub const DEFAULT_TTL_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    /// Zero keeps the notification until it is dismissed.
    pub ttl_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.ttl_ms == 0 {
            return false;
        }
        let elapsed = now.signed_duration_since(self.created_at).num_milliseconds();
        u64::try_from(elapsed).is_ok_and(|elapsed| elapsed >= self.ttl_ms)
    }
}

/// Queue of notifications with per-entry expiry.
#[derive(Debug)]
pub struct NotificationCenter {
    entries: Vec<Notification>,
    next_id: u64,
    default_ttl_ms: u64,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_MS)
    }
}

impl NotificationCenter {
    #[must_use]
    pub const fn new(default_ttl_ms: u64) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            default_ttl_ms,
        }
    }

    /// Queue a notification and return its id (`notification-<n>`).
    pub fn push(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: Option<String>,
        ttl_ms: Option<u64>,
    ) -> String {
        self.push_at(kind, title, message, ttl_ms, Utc::now())
    }

    fn push_at(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: Option<String>,
        ttl_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> String {
        self.next_id += 1;
        let id = format!("notification-{}", self.next_id);
        self.entries.push(Notification {
            id: id.clone(),
            kind,
            title: title.into(),
            message,
            ttl_ms: ttl_ms.unwrap_or(self.default_ttl_ms),
            created_at: now,
        });
        id
    }

    pub fn success(&mut self, title: impl Into<String>, message: Option<String>) -> String {
        self.push(NotificationKind::Success, title, message, None)
    }

    pub fn error(&mut self, title: impl Into<String>, message: Option<String>) -> String {
        self.push(NotificationKind::Error, title, message, None)
    }

    pub fn warning(&mut self, title: impl Into<String>, message: Option<String>) -> String {
        self.push(NotificationKind::Warning, title, message, None)
    }

    pub fn info(&mut self, title: impl Into<String>, message: Option<String>) -> String {
        self.push(NotificationKind::Info, title, message, None)
    }

    /// Remove one notification. Returns `false` if the id is unknown.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() < before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop expired entries and return the rest in insertion order.
    pub fn active(&mut self, now: DateTime<Utc>) -> &[Notification] {
        self.entries.retain(|n| !n.is_expired(now));
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn ids_are_sequential_per_center() {
        let mut center = NotificationCenter::default();
        assert_eq!(center.success("Uploaded", None), "notification-1");
        assert_eq!(center.error("Upload failed", None), "notification-2");

        let mut other = NotificationCenter::default();
        assert_eq!(other.info("Hello", None), "notification-1");
    }

    #[test]
    fn expired_entries_are_pruned() {
        let mut center = NotificationCenter::new(1_000);
        let t0 = Utc::now();
        center.push_at(NotificationKind::Info, "short", None, None, t0);
        center.push_at(NotificationKind::Warning, "sticky", None, Some(0), t0);
        center.push_at(NotificationKind::Error, "long", None, Some(10_000), t0);

        let titles = |c: &mut NotificationCenter, at| {
            c.active(at)
                .iter()
                .map(|n| n.title.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&mut center, t0), vec!["short", "sticky", "long"]);
        assert_eq!(
            titles(&mut center, t0 + Duration::milliseconds(1_000)),
            vec!["sticky", "long"]
        );
        assert_eq!(
            titles(&mut center, t0 + Duration::hours(1)),
            vec!["sticky"]
        );
    }

    #[test]
    fn dismiss_and_clear() {
        let mut center = NotificationCenter::default();
        let first = center.warning("Low quota", Some("1 analysis left".into()));
        center.info("Tip", None);

        assert!(center.dismiss(&first));
        assert!(!center.dismiss(&first));
        assert_eq!(center.active(Utc::now()).len(), 1);

        center.clear();
        assert!(center.active(Utc::now()).is_empty());
    }

    #[test]
    fn default_ttl_applies() {
        let mut center = NotificationCenter::default();
        center.success("Saved", None);
        let now = Utc::now();
        assert_eq!(center.active(now)[0].ttl_ms, DEFAULT_TTL_MS);
        assert_eq!(center.active(now)[0].kind.as_str(), "success");
    }
}
