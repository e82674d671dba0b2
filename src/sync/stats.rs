// src/sync/stats.rs
use crate::connectors::traits::DashboardApi;
use crate::sync::state::ViewState;
use crate::types::normalize_symbol;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsOutcome {
    Applied,
    /// A newer symbol change was issued before this response arrived.
    Stale,
    /// The read failed; the previous stats stay on screen.
    Failed,
}

/// Keeps the stats slice in step with the symbol filter.
///
/// Each change takes a ticket before its request goes out. A response is applied only while
/// its ticket is still the newest, so out-of-order completions never overwrite fresher stats.
#[derive(Clone)]
pub struct StatsRefresher {
    api: Arc<dyn DashboardApi>,
    state: ViewState,
}

impl StatsRefresher {
    pub fn new(api: Arc<dyn DashboardApi>, state: ViewState) -> Self {
        Self { api, state }
    }

    /// Spawns the stats read for a new filter value.
    pub fn on_symbol_change(&self, symbol: &str) -> JoinHandle<StatsOutcome> {
        tokio::spawn(self.request(symbol))
    }

    /// Takes the ticket now; the returned future performs the read and the guarded write.
    pub fn request(&self, symbol: &str) -> impl Future<Output = StatsOutcome> + Send + 'static {
        let ticket = self.state.issue_stats_ticket();
        let symbol = normalize_symbol(symbol);
        let api = Arc::clone(&self.api);
        let state = self.state.clone();

        async move {
            match api.fetch_trade_stats(&symbol).await {
                Ok(stats) => {
                    if state.commit_stats(ticket, stats) {
                        debug!(symbol = %symbol, "stats updated");
                        StatsOutcome::Applied
                    } else {
                        debug!(symbol = %symbol, "stale stats response discarded");
                        StatsOutcome::Stale
                    }
                }
                Err(e) => {
                    // Usually a half-typed ticker.
                    debug!(symbol = %symbol, error = %e, "stats read failed; ignored");
                    StatsOutcome::Failed
                }
            }
        }
    }
}
