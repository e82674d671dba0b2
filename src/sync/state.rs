// src/sync/state.rs
use crate::types::{AccountBalance, Order, Position, TradeStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Everything the dashboard currently shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub balance: Option<AccountBalance>,
    pub positions: Vec<Position>,
    pub orders: Vec<Order>,
    pub stats: Option<TradeStats>,
    pub loading: bool,
    pub error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Result of one successful aggregate load, applied as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountData {
    pub balance: AccountBalance,
    pub positions: Vec<Position>,
    pub orders: Vec<Order>,
    pub stats: TradeStats,
}

/// Position of a request in its generation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct Generation(AtomicU64);

impl Generation {
    fn issue(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn current(&self) -> Ticket {
        Ticket(self.0.load(Ordering::SeqCst))
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.0.load(Ordering::SeqCst) == ticket.0
    }
}

/// Owner of the single snapshot of a session.
///
/// Readers go through [`ViewState::snapshot`] or [`ViewState::subscribe`]. Writes are
/// crate-private and reserved for the aggregate loader and the stats refresher. Every
/// write replaces its fields inside one `send_modify`, so a reader never sees a half
/// applied refresh.
#[derive(Clone)]
pub struct ViewState {
    tx: Arc<watch::Sender<ViewSnapshot>>,
    refreshes: Arc<Generation>,
    stats: Arc<Generation>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewSnapshot::default());
        Self {
            tx: Arc::new(tx),
            refreshes: Arc::new(Generation::default()),
            stats: Arc::new(Generation::default()),
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.tx.subscribe()
    }

    pub(crate) fn issue_refresh_ticket(&self) -> Ticket {
        self.refreshes.issue()
    }

    /// Reserved for symbol changes; only they make earlier stats requests stale.
    pub(crate) fn issue_stats_ticket(&self) -> Ticket {
        self.stats.issue()
    }

    /// The newest stats request so far, without superseding it.
    pub(crate) fn current_stats_ticket(&self) -> Ticket {
        self.stats.current()
    }

    pub(crate) fn begin_refresh(&self) {
        self.tx.send_modify(|snap| {
            snap.loading = true;
            snap.error = None;
        });
    }

    /// Applies the outcome of an aggregate load.
    ///
    /// When `refresh` is given, the outcome is dropped unless it is still the newest refresh.
    /// The stats field is only replaced while no symbol change was issued after
    /// `stats_ticket` was observed.
    /// Returns whether anything was written.
    pub(crate) fn commit_refresh(
        &self,
        refresh: Option<Ticket>,
        stats_ticket: Ticket,
        outcome: Result<AccountData, String>,
    ) -> bool {
        let refreshes = &self.refreshes;
        let stats = &self.stats;
        self.tx.send_if_modified(|snap| {
            if let Some(ticket) = refresh {
                if !refreshes.is_current(ticket) {
                    return false;
                }
            }
            snap.loading = false;
            match outcome {
                Ok(data) => {
                    snap.balance = Some(data.balance);
                    snap.positions = data.positions;
                    snap.orders = data.orders;
                    if stats.is_current(stats_ticket) {
                        snap.stats = Some(data.stats);
                    }
                    snap.error = None;
                    snap.refreshed_at = Some(Utc::now());
                }
                Err(message) => {
                    snap.error = Some(message);
                }
            }
            true
        })
    }

    /// Replaces the stats slice if `ticket` is still the newest stats request.
    pub(crate) fn commit_stats(&self, ticket: Ticket, value: TradeStats) -> bool {
        let stats = &self.stats;
        self.tx.send_if_modified(|snap| {
            if !stats.is_current(ticket) {
                return false;
            }
            snap.stats = Some(value);
            true
        })
    }
}
