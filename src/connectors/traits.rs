use crate::error::Result;
use crate::types::{AccountBalance, Order, Position, TradeStats};
use async_trait::async_trait;

/// Read-only view of the trading backend.
///
/// Every call is a single request: no retry, no caching.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_balance(&self) -> Result<AccountBalance>;

    async fn fetch_open_positions(&self) -> Result<Vec<Position>>;

    async fn fetch_open_orders(&self) -> Result<Vec<Order>>;

    /// Stats for `symbol` over the configured window. An empty symbol is passed through.
    async fn fetch_trade_stats(&self, symbol: &str) -> Result<TradeStats>;

    async fn fetch_order(&self, order_id: &str) -> Result<Order>;
}
