use anyhow::Context;
use chrono::{DateTime, Utc};
use legally_api::ApiClient;
use legally_auth::{KeyringStore, SessionStore};
use legally_client::{AnalysisSession, ContractLibrary, NotificationCenter, NotificationKind};
use legally_config::LegallyConfig;

use crate::cli::GlobalFlags;
use crate::ui;

/// Everything a command handler needs, built once per invocation.
pub struct AppContext {
    pub config: LegallyConfig,
    pub session: SessionStore<ApiClient, KeyringStore>,
    pub notifications: NotificationCenter,
    api: ApiClient,
}

impl AppContext {
    pub fn init(config: LegallyConfig) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api).context("failed to build HTTP client")?;
        let storage = KeyringStore::from_config(&config.auth);
        let session = SessionStore::new(api.clone(), storage);
        let notifications = NotificationCenter::new(config.general.notification_ttl_ms);

        tracing::debug!(base_url = api.base_url(), "application context ready");

        Ok(Self {
            config,
            session,
            notifications,
            api,
        })
    }

    /// Restore the stored credential and fail unless it still validates.
    pub async fn require_session(&mut self) -> anyhow::Result<()> {
        let restored = self.session.restore_from_storage().await;
        match restored {
            Ok(true) => Ok(()),
            Ok(false) => anyhow::bail!("not authenticated; run `legally auth login`"),
            Err(error) => Err(anyhow::Error::new(error).context("stored credential was rejected")),
        }
    }

    /// Upload manager bound to the session's credential.
    #[must_use]
    pub fn contracts(&self) -> ContractLibrary<ApiClient> {
        ContractLibrary::new(
            self.api.clone(),
            self.session.token_handle(),
            self.config.general.page_size,
        )
    }

    /// A fresh analysis session bound to the session's credential.
    #[must_use]
    pub fn analysis(&self) -> AnalysisSession<ApiClient> {
        AnalysisSession::new(self.api.clone(), self.session.token_handle())
    }

    /// Print active notifications to stderr and drain the queue.
    ///
    /// Long-running commands call this before they block so entries are
    /// shown while their TTL still holds.
    pub fn flush_notifications(&mut self, flags: &GlobalFlags) {
        let lines = self.take_notification_lines(Utc::now());
        if ui::prefs().notifications && !flags.quiet {
            for line in lines {
                eprintln!("{line}");
            }
        }
    }

    /// Render the entries still active at `now` and empty the queue.
    fn take_notification_lines(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let lines = self
            .notifications
            .active(now)
            .iter()
            .map(|notification| {
                let label = match notification.kind {
                    NotificationKind::Success => "ok",
                    NotificationKind::Error => "error",
                    NotificationKind::Warning => "warning",
                    NotificationKind::Info => "info",
                };
                match &notification.message {
                    Some(message) => format!("[{label}] {}: {message}", notification.title),
                    None => format!("[{label}] {}", notification.title),
                }
            })
            .collect();
        self.notifications.clear();
        lines
    }
}
