//! Shared fixtures: a scripted `DashboardApi` and a minimal HTTP responder.
#![allow(dead_code)]

use account_dashboard::error::{DashboardError, Result};
use account_dashboard::types::{
    AccountBalance, Order, OrderStatus, OrderType, Position, PositionSide, Side, TimeInForce,
    TradeStats,
};
use account_dashboard::DashboardApi;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// =============================================================================
// Fixtures
// =============================================================================

pub fn balance(cash: Decimal) -> AccountBalance {
    AccountBalance {
        currency: "USD".into(),
        cash,
        equity: dec!(100000),
        buying_power: dec!(200000),
        timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    }
}

pub fn positions() -> Vec<Position> {
    vec![
        Position {
            symbol: "AAPL".into(),
            qty: dec!(50),
            avg_price: dec!(190),
            side: PositionSide::Long,
        },
        Position {
            symbol: "TSLA".into(),
            qty: dec!(10),
            avg_price: dec!(240),
            side: PositionSide::Short,
        },
    ]
}

pub fn orders() -> Vec<Order> {
    vec![Order {
        id: "ord-1".into(),
        symbol: "AAPL".into(),
        side: Side::Buy,
        qty: dec!(5),
        order_type: OrderType::Limit,
        limit_price: Some(dec!(185.25)),
        tif: TimeInForce::Gtc,
        status: OrderStatus::PartiallyFilled,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
        avg_fill_price: Some(dec!(185.20)),
        filled_qty: dec!(2),
    }]
}

pub fn stats(symbol: &str) -> TradeStats {
    TradeStats {
        symbol: symbol.to_string(),
        window: "30d".into(),
        trades: 42,
        win_rate: 0.57,
        pnl: dec!(1234.56),
        avg_return: 0.0123,
        sharpe: Some(1.4),
        last_updated: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    }
}

pub fn failure(what: &str) -> DashboardError {
    DashboardError::Transport {
        message: format!("GET {}", what),
        status: Some(503),
        status_text: Some("Service Unavailable".into()),
    }
}

// =============================================================================
// Scripted API
// =============================================================================

#[derive(Clone)]
pub struct Reply<T> {
    pub delay: Duration,
    pub result: Result<T>,
}

impl<T> Reply<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(value),
        }
    }

    pub fn err(error: DashboardError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn after(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }
}

/// Replies handed out in order; the last one repeats.
struct Script<T>(Mutex<VecDeque<Reply<T>>>);

impl<T: Clone> Script<T> {
    fn new(reply: Reply<T>) -> Self {
        Self(Mutex::new(VecDeque::from([reply])))
    }

    fn push(&self, reply: Reply<T>) {
        self.0.lock().unwrap().push_back(reply);
    }

    fn replace(&self, reply: Reply<T>) {
        let mut queue = self.0.lock().unwrap();
        queue.clear();
        queue.push_back(reply);
    }

    fn next(&self) -> Reply<T> {
        let mut queue = self.0.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }
}

async fn play<T>(reply: Reply<T>) -> Result<T> {
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    reply.result
}

pub struct MockApi {
    balance: Script<AccountBalance>,
    positions: Script<Vec<Position>>,
    orders: Script<Vec<Order>>,
    stats_by_symbol: Mutex<HashMap<String, Reply<TradeStats>>>,
    stats_default: Script<TradeStats>,
    pub stats_requests: Mutex<Vec<String>>,
}

impl MockApi {
    /// Every read succeeds immediately with the standard fixtures.
    pub fn healthy() -> Self {
        Self {
            balance: Script::new(Reply::ok(balance(dec!(100001)))),
            positions: Script::new(Reply::ok(positions())),
            orders: Script::new(Reply::ok(orders())),
            stats_by_symbol: Mutex::new(HashMap::new()),
            stats_default: Script::new(Reply::ok(stats("AAPL"))),
            stats_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_balance(&self, reply: Reply<AccountBalance>) {
        self.balance.replace(reply);
    }

    pub fn queue_balance(&self, reply: Reply<AccountBalance>) {
        self.balance.push(reply);
    }

    pub fn set_positions(&self, reply: Reply<Vec<Position>>) {
        self.positions.replace(reply);
    }

    pub fn set_orders(&self, reply: Reply<Vec<Order>>) {
        self.orders.replace(reply);
    }

    pub fn set_stats(&self, reply: Reply<TradeStats>) {
        self.stats_default.replace(reply);
    }

    pub fn set_stats_for(&self, symbol: &str, reply: Reply<TradeStats>) {
        self.stats_by_symbol
            .lock()
            .unwrap()
            .insert(symbol.to_string(), reply);
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        self.stats_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn fetch_balance(&self) -> Result<AccountBalance> {
        play(self.balance.next()).await
    }

    async fn fetch_open_positions(&self) -> Result<Vec<Position>> {
        play(self.positions.next()).await
    }

    async fn fetch_open_orders(&self) -> Result<Vec<Order>> {
        play(self.orders.next()).await
    }

    async fn fetch_trade_stats(&self, symbol: &str) -> Result<TradeStats> {
        self.stats_requests.lock().unwrap().push(symbol.to_string());
        let scripted = self.stats_by_symbol.lock().unwrap().get(symbol).cloned();
        play(scripted.unwrap_or_else(|| self.stats_default.next())).await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Order> {
        orders()
            .into_iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| failure(order_id))
    }
}

// =============================================================================
// HTTP responder
// =============================================================================

#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Canned {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }
}

pub struct TestServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<String>>>,
}

/// Serves `routes` (keyed by path without query) over plain HTTP/1.1, one response per
/// connection. Unknown paths get a 404. Request targets are recorded in arrival order.
pub async fn serve(routes: Vec<(&str, Canned)>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<String, Canned>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, canned)| (path.to_string(), canned))
            .collect(),
    );
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = Arc::clone(&routes);
            let recorded = Arc::clone(&recorded);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                let target = head
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                recorded.lock().unwrap().push(target.clone());

                let path = target.split('?').next().unwrap_or("/");
                let canned = routes
                    .get(path)
                    .cloned()
                    .unwrap_or_else(|| Canned::status(404, r#"{"detail":"Not Found"}"#));
                if !canned.delay.is_zero() {
                    tokio::time::sleep(canned.delay).await;
                }
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    canned.status,
                    canned.body.len(),
                    canned.body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{}", addr),
        requests,
    }
}
