//! Account dashboard: concurrent reads of a trading backend merged into one view.
//!
//! - [`connectors`]: the HTTP endpoint client and the [`DashboardApi`] seam
//! - [`sync`]: the view state, the aggregate loader and the symbol-scoped stats refresher
//! - [`tui`]: terminal presentation of the current snapshot

pub mod config;
pub mod connectors;
pub mod error;
pub mod sync;
pub mod tui;
pub mod types;
pub mod utils;

pub use connectors::{BackendClient, DashboardApi};
pub use error::DashboardError;
pub use sync::{
    AggregateLoader, RefreshOutcome, StatsOutcome, StatsRefresher, ViewSnapshot, ViewState,
};
pub use types::{AccountBalance, Order, Position, TradeStats};
