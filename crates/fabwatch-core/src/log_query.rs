//! Historical alert log querying.
//!
//! Filtering happens server-side: [`AlertLog::search`] sends only the
//! non-empty filter fields, so the gateway's match-all default applies
//! per criterion. Paging happens client-side as a pure slice over the
//! fetched result -- `page` never refetches.
//!
//! Overlapping searches are resolved with a monotonically increasing
//! request token: only the response matching the latest issued token is
//! applied, so a slow superseded response can never clobber newer
//! results.

use std::sync::Arc;

use fabwatch_api::GatewayClient;
use fabwatch_api::types::AlertRecord as WireAlertRecord;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{AlertFilter, AlertRecord, FilterUpdate};

/// Alert rows shown per page.
pub const DEFAULT_LOG_PAGE_SIZE: usize = 10;

/// Filtered, paginated view over the historical alert store.
pub struct AlertLog {
    client: Arc<GatewayClient>,
    filter: AlertFilter,
    records: Vec<AlertRecord>,
    page: usize,
    page_size: usize,
    loading: bool,
    latest_token: u64,
}

impl AlertLog {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self::with_page_size(client, DEFAULT_LOG_PAGE_SIZE)
    }

    pub fn with_page_size(client: Arc<GatewayClient>, page_size: usize) -> Self {
        Self {
            client,
            filter: AlertFilter::default(),
            records: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            loading: false,
            latest_token: 0,
        }
    }

    // ── Filter ───────────────────────────────────────────────────────

    pub fn filter(&self) -> &AlertFilter {
        &self.filter
    }

    /// Partial update of the query criteria. Takes effect on the next
    /// [`search`](Self::search).
    pub fn set_filter(&mut self, update: FilterUpdate) {
        self.filter.apply(update);
    }

    // ── Searching ────────────────────────────────────────────────────

    /// Run the filtered query against the historical store.
    ///
    /// On success the result set is replaced and the page resets to 1.
    /// On failure the visible result is emptied, the failure logged, and
    /// the loading flag cleared -- the view must never stay stuck.
    pub async fn search(&mut self) -> Result<(), CoreError> {
        let token = self.begin_search();
        let query = self.filter.to_query();
        let result = self.client.filter_alerts(&query).await;
        self.apply_search(token, result)
    }

    /// Issue a new request token and mark the query as loading.
    fn begin_search(&mut self) -> u64 {
        self.latest_token += 1;
        self.loading = true;
        self.latest_token
    }

    /// Apply a query response, dropping it if a newer search was issued
    /// in the meantime.
    fn apply_search(
        &mut self,
        token: u64,
        result: Result<Vec<WireAlertRecord>, fabwatch_api::Error>,
    ) -> Result<(), CoreError> {
        if token != self.latest_token {
            debug!(token, latest = self.latest_token, "dropping superseded query response");
            return Ok(());
        }

        self.loading = false;
        match result {
            Ok(rows) => {
                self.records = rows.into_iter().map(AlertRecord::from).collect();
                self.page = 1;
                debug!(records = self.records.len(), "alert log updated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "alert log query failed");
                self.records.clear();
                self.page = 1;
                Err(CoreError::Query {
                    message: e.to_string(),
                })
            }
        }
    }

    /// `true` while a query is outstanding.
    pub fn loading(&self) -> bool {
        self.loading
    }

    // ── Paging ───────────────────────────────────────────────────────

    /// The full fetched result set.
    pub fn records(&self) -> &[AlertRecord] {
        &self.records
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Total pages; an empty result still reports one (empty) page.
    pub fn total_pages(&self) -> usize {
        self.records.len().div_ceil(self.page_size).max(1)
    }

    /// Jump to a page, clamping into the valid range. Pure local slice
    /// bookkeeping -- never triggers a fetch.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// The records visible on the current page.
    pub fn page_records(&self) -> &[AlertRecord] {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.records.len());
        self.records.get(start..end).unwrap_or(&[])
    }
}
