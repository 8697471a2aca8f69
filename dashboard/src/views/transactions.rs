use std::sync::{Arc, Mutex, MutexGuard};

use agentic_core::audit::{AuditLogEntry, AuditStats, OutcomeFilter};

use crate::Context;
use crate::error::ClientError;
use crate::poll::PollHandle;
use crate::session::Session;
use crate::state::Synced;

type SharedEntries = Arc<Mutex<Synced<Vec<AuditLogEntry>>>>;

fn lock(entries: &SharedEntries) -> MutexGuard<'_, Synced<Vec<AuditLogEntry>>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fetch one page into the shared snapshot. Only a failed first load is toasted;
/// later poll failures keep the last page on screen.
async fn fetch_page(
    ctx: &Context,
    entries: &SharedEntries,
    session: &Session,
) -> Result<(), ClientError> {
    let ticket = lock(entries).begin();
    let result = ctx
        .client
        .audit_logs(session, ctx.config.audit_page_size)
        .await;
    let mut guard = lock(entries);
    match result {
        Ok(page) => {
            guard.apply(ticket, page);
            Ok(())
        }
        Err(e) => {
            if guard.fail(ticket) {
                ctx.toaster.failed(&e, "Failed to load transactions");
            } else {
                tracing::warn!(error = %e, "audit log refresh failed, keeping last page");
            }
            Err(e)
        }
    }
}

/// Audit log browser. Polls while mounted; filtering never touches the network.
pub struct TransactionsView {
    ctx: Context,
    entries: SharedEntries,
    filter: OutcomeFilter,
    poll: Option<PollHandle>,
}

impl TransactionsView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            entries: Arc::new(Mutex::new(Synced::new())),
            filter: OutcomeFilter::All,
            poll: None,
        }
    }

    /// Fetch now, then keep polling until `unmount`. A second mount re-fetches but
    /// keeps the existing poll. Each tick uses the context's current session.
    pub async fn mount(&mut self, session: &Session) -> Result<(), ClientError> {
        let result = fetch_page(&self.ctx, &self.entries, session).await;
        if !self.is_polling() {
            let (ctx, entries) = (self.ctx.clone(), self.entries.clone());
            let period = self.ctx.config.audit_poll_interval;
            tracing::debug!(period_secs = period.as_secs(), "starting audit log poll");
            self.poll = Some(PollHandle::spawn(period, move || {
                let (ctx, entries) = (ctx.clone(), entries.clone());
                async move {
                    tracing::debug!("audit log poll tick");
                    let session = ctx.session.current();
                    if let Err(e) = fetch_page(&ctx, &entries, &session).await {
                        tracing::debug!(error = %e, "audit log poll tick failed");
                    }
                }
            }));
        }
        result
    }

    /// Stop polling. Returns false if nothing was running.
    pub fn unmount(&mut self) -> bool {
        match self.poll.take() {
            Some(mut poll) => poll.cancel(),
            None => false,
        }
    }

    pub async fn refresh(&self, session: &Session) -> Result<(), ClientError> {
        fetch_page(&self.ctx, &self.entries, session).await
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(PollHandle::is_active)
    }

    pub fn set_filter(&mut self, filter: OutcomeFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> OutcomeFilter {
        self.filter
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.entries).is_loading()
    }

    /// Changes whenever a new page is applied.
    pub fn revision(&self) -> u64 {
        lock(&self.entries).revision()
    }

    /// The full fetched page.
    pub fn entries(&self) -> Vec<AuditLogEntry> {
        lock(&self.entries).get().cloned().unwrap_or_default()
    }

    /// The fetched page under the current filter.
    pub fn visible(&self) -> Vec<AuditLogEntry> {
        let guard = lock(&self.entries);
        let page = guard.get().map(Vec::as_slice).unwrap_or(&[]);
        self.filter.apply(page).into_iter().cloned().collect()
    }

    pub fn stats(&self) -> AuditStats {
        let guard = lock(&self.entries);
        AuditStats::from_entries(guard.get().map(Vec::as_slice).unwrap_or(&[]))
    }
}

impl Drop for TransactionsView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, audit_json, context};
    use serde_json::json;
    use std::time::Duration;

    fn page() -> serde_json::Value {
        json!([
            audit_json("airdrop", true, 1),
            audit_json("transfer", false, 2),
            audit_json("swap", true, 3)
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn poll_stops_after_unmount() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "audit/logs", 200, page());
        let mut view = TransactionsView::new(context(&transport));

        view.mount(&Session::Anonymous).await.unwrap();
        assert_eq!(transport.count("GET", "audit/logs"), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(transport.count("GET", "audit/logs"), 3);

        assert!(view.unmount());
        assert!(!view.unmount());
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.count("GET", "audit/logs"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn mounting_twice_keeps_a_single_poll() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "audit/logs", 200, page());
        let mut view = TransactionsView::new(context(&transport));
        view.mount(&Session::Anonymous).await.unwrap();
        view.mount(&Session::Anonymous).await.unwrap();
        assert_eq!(transport.count("GET", "audit/logs"), 2);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(transport.count("GET", "audit/logs"), 3);
    }

    #[tokio::test]
    async fn filtering_is_client_side() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "audit/logs", 200, page());
        let mut view = TransactionsView::new(context(&transport));
        view.mount(&Session::Anonymous).await.unwrap();
        let before = transport.request_count();

        view.set_filter(OutcomeFilter::Failed);
        assert_eq!(view.visible().len(), 1);
        view.set_filter(OutcomeFilter::All);
        assert_eq!(view.visible().len(), 3);
        assert_eq!(transport.request_count(), before);

        let stats = view.stats();
        assert_eq!((stats.total, stats.successful, stats.failed), (3, 2, 1));
        assert!(transport.requests()[0].url.as_str().ends_with("/api/audit/logs?limit=50"));
        view.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn only_first_load_failure_is_toasted() {
        let transport = ScriptedTransport::new();
        transport.fail("GET", "audit/logs", ClientError::Connection("refused".into()));
        let ctx = context(&transport);
        let mut view = TransactionsView::new(ctx.clone());

        assert!(view.mount(&Session::Anonymous).await.is_err());
        assert!(!view.is_loading());
        assert!(view.entries().is_empty());
        tokio::time::sleep(Duration::from_secs(11)).await;

        let toasts = ctx.toaster.drain();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Failed to load transactions");
        view.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn poll_keeps_last_page_when_backend_drops() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "audit/logs", 200, page());
        transport.reply("GET", "audit/logs", 502, json!({"detail": "Bad Gateway"}));
        let mut view = TransactionsView::new(context(&transport));
        view.mount(&Session::Anonymous).await.unwrap();
        let revision = view.revision();

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(view.entries().len(), 3);
        assert_eq!(view.revision(), revision);
        view.unmount();
    }
}
