// src/connectors/messages.rs
use serde::Serialize;

/// Backend resource paths.
pub const BALANCE_PATH: &str = "/api/v1/account/balance";
pub const POSITIONS_PATH: &str = "/api/v1/positions/open";
pub const ORDERS_PATH: &str = "/api/v1/orders/open";
pub const ORDER_PATH: &str = "/api/v1/orders";
pub const STATS_PATH: &str = "/api/v1/trades/stats";

/// Trailing window the stats endpoint aggregates over.
pub const DEFAULT_STATS_WINDOW: &str = "30d";

/// Query string of `GET /api/v1/trades/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsQuery<'a> {
    pub symbol: &'a str,
    pub window: &'a str,
}

/// Timestamps as the backend emits them.
///
/// RFC 3339 values are taken as-is. Naive ISO-8601 values (no offset) are read as UTC.
/// Serialization always writes RFC 3339.
pub mod lenient_timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}
