// src/connectors/backend.rs
use crate::config::BackendConfig;
use crate::connectors::messages::{
    StatsQuery, BALANCE_PATH, ORDERS_PATH, ORDER_PATH, POSITIONS_PATH, STATS_PATH,
};
use crate::connectors::traits::DashboardApi;
use crate::error::{DashboardError, Result};
use crate::types::{AccountBalance, Order, Position, TradeStats, ValidationError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::{Host, Url};

pub struct BackendClient {
    http_client: Client,
    base_url: Url,
    stats_window: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            DashboardError::Config(format!("invalid backend base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "backend base_url '{}' cannot be used as a base",
                config.base_url
            )));
        }

        let mut builder = Client::builder().timeout(Duration::from_millis(config.timeout_ms));
        if is_loopback(&base_url) {
            builder = builder.no_proxy();
        }
        let http_client = builder
            .build()
            .map_err(|e| DashboardError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            stats_window: config.stats_window.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base address, keeping any path prefix the base carries.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str, url: Url) -> Result<T> {
        debug!(%url, resource, "GET");

        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "backend returned failure status");
            return Err(DashboardError::Transport {
                message: format!("GET {}", url.path()),
                status: Some(status.as_u16()),
                status_text: status.canonical_reason().map(str::to_string),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| DashboardError::decode(resource, e.to_string()))
    }
}

/// A local development backend is never reached through a system proxy.
fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn checked<T>(
    resource: &str,
    value: T,
    validate: impl Fn(&T) -> std::result::Result<(), ValidationError>,
) -> Result<T> {
    validate(&value).map_err(|source| DashboardError::Invalid {
        resource: resource.to_string(),
        source,
    })?;
    Ok(value)
}

#[async_trait]
impl DashboardApi for BackendClient {
    async fn fetch_balance(&self) -> Result<AccountBalance> {
        let url = self.endpoint(&split_path(BALANCE_PATH));
        self.get_json("balance", url).await
    }

    async fn fetch_open_positions(&self) -> Result<Vec<Position>> {
        let url = self.endpoint(&split_path(POSITIONS_PATH));
        let positions: Vec<Position> = self.get_json("positions", url).await?;
        checked("positions", positions, |all: &Vec<Position>| {
            all.iter().try_for_each(Position::validate)
        })
    }

    async fn fetch_open_orders(&self) -> Result<Vec<Order>> {
        let url = self.endpoint(&split_path(ORDERS_PATH));
        let orders: Vec<Order> = self.get_json("orders", url).await?;
        checked("orders", orders, |all: &Vec<Order>| {
            all.iter().try_for_each(Order::validate)
        })
    }

    async fn fetch_trade_stats(&self, symbol: &str) -> Result<TradeStats> {
        let mut url = self.endpoint(&split_path(STATS_PATH));
        let query = serde_urlencoded::to_string(StatsQuery {
            symbol,
            window: &self.stats_window,
        })
        .map_err(|e| DashboardError::transport(format!("failed to encode stats query: {}", e)))?;
        url.set_query(Some(&query));

        let stats: TradeStats = self.get_json("stats", url).await?;
        checked("stats", stats, TradeStats::validate)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Order> {
        let mut segments = split_path(ORDER_PATH);
        segments.push(order_id);
        let url = self.endpoint(&segments);

        let order: Order = self.get_json("order", url).await?;
        checked("order", order, Order::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: base_url.to_string(),
            ..BackendConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_joins_onto_bare_host() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.endpoint(&split_path(BALANCE_PATH)).as_str(),
            "http://localhost:8000/api/v1/account/balance"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let c = client("https://example.test/trading/");
        assert_eq!(
            c.endpoint(&split_path(POSITIONS_PATH)).as_str(),
            "https://example.test/trading/api/v1/positions/open"
        );
    }

    #[test]
    fn order_id_is_escaped_as_one_segment() {
        let c = client("http://localhost:8000");
        let mut segments = split_path(ORDER_PATH);
        segments.push("a/b c");
        assert_eq!(
            c.endpoint(&segments).as_str(),
            "http://localhost:8000/api/v1/orders/a%2Fb%20c"
        );
    }

    #[test]
    fn loopback_hosts_are_detected() {
        assert!(is_loopback(&Url::parse("http://localhost:8000").unwrap()));
        assert!(is_loopback(&Url::parse("http://127.0.0.1:9").unwrap()));
        assert!(is_loopback(&Url::parse("http://[::1]:80").unwrap()));
        assert!(!is_loopback(&Url::parse("https://api.example.test").unwrap()));
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let result = BackendClient::new(&BackendConfig {
            base_url: "not a url".to_string(),
            ..BackendConfig::default()
        });
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }
}
