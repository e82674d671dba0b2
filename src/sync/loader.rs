// src/sync/loader.rs
use crate::config::RefreshOrdering;
use crate::connectors::traits::DashboardApi;
use crate::sync::state::{AccountData, ViewState};
use crate::error::{DashboardError, Result};
use crate::types::{normalize_symbol, AccountBalance, Order, Position, TradeStats};
use futures::future::join4;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied,
    Failed(DashboardError),
    /// A newer refresh was issued while this one was in flight; nothing was written.
    Superseded,
}

/// Refreshes balance, positions, orders and stats together.
///
/// The four reads run concurrently and are all awaited before anything is decided, so the
/// snapshot changes either in full or not at all.
#[derive(Clone)]
pub struct AggregateLoader {
    api: Arc<dyn DashboardApi>,
    state: ViewState,
    ordering: RefreshOrdering,
}

impl AggregateLoader {
    pub fn new(api: Arc<dyn DashboardApi>, state: ViewState, ordering: RefreshOrdering) -> Self {
        Self {
            api,
            state,
            ordering,
        }
    }

    pub async fn refresh(&self, symbol: &str) -> RefreshOutcome {
        let symbol = normalize_symbol(symbol);
        let refresh_ticket = match self.ordering {
            RefreshOrdering::Issue => Some(self.state.issue_refresh_ticket()),
            RefreshOrdering::Completion => None,
        };
        // Observed, not issued: a refresh must not invalidate an in-flight symbol change.
        let stats_ticket = self.state.current_stats_ticket();

        info!(symbol = %symbol, "refreshing account view");
        self.state.begin_refresh();

        let (balance, positions, orders, stats) = join4(
            self.api.fetch_balance(),
            self.api.fetch_open_positions(),
            self.api.fetch_open_orders(),
            self.api.fetch_trade_stats(&symbol),
        )
        .await;

        match gather(balance, positions, orders, stats) {
            Ok(data) => {
                let (positions, orders) = (data.positions.len(), data.orders.len());
                if !self.state.commit_refresh(refresh_ticket, stats_ticket, Ok(data)) {
                    return self.superseded(&symbol);
                }
                info!(positions, orders, "account view refreshed");
                RefreshOutcome::Applied
            }
            Err(e) => {
                if !self
                    .state
                    .commit_refresh(refresh_ticket, stats_ticket, Err(e.to_string()))
                {
                    return self.superseded(&symbol);
                }
                warn!(error = %e, "account refresh failed; keeping previous view");
                RefreshOutcome::Failed(e)
            }
        }
    }

    fn superseded(&self, symbol: &str) -> RefreshOutcome {
        info!(symbol, "refresh superseded by a newer one; result dropped");
        RefreshOutcome::Superseded
    }
}

/// Combines four settled reads. The first failure in read order is the one reported.
fn gather(
    balance: Result<AccountBalance>,
    positions: Result<Vec<Position>>,
    orders: Result<Vec<Order>>,
    stats: Result<TradeStats>,
) -> Result<AccountData> {
    Ok(AccountData {
        balance: balance?,
        positions: positions?,
        orders: orders?,
        stats: stats?,
    })
}
