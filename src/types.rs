// src/types.rs
use crate::connectors::messages::lenient_timestamp;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    Day,
    Gtc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
}

impl OrderStatus {
    /// Statuses under which a non-zero fill is legal.
    pub fn allows_fill(self) -> bool {
        matches!(self, OrderStatus::PartiallyFilled | OrderStatus::Filled)
    }
}

/// Invariant violations found in a decoded backend record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("order {id}: qty ({qty}) must be > 0")]
    NonPositiveOrderQty { id: String, qty: Decimal },

    #[error("order {id}: filled_qty ({filled}) exceeds qty ({qty})")]
    OverFilled {
        id: String,
        filled: Decimal,
        qty: Decimal,
    },

    #[error("order {id}: filled_qty ({filled}) > 0 with status {status:?}")]
    FillWithoutFillStatus {
        id: String,
        filled: Decimal,
        status: OrderStatus,
    },

    #[error("order {id}: limit_price is required for LIMIT orders")]
    MissingLimitPrice { id: String },

    #[error("order {id}: limit_price is only allowed on LIMIT orders")]
    UnexpectedLimitPrice { id: String },

    #[error("position {symbol}: qty must be non-zero")]
    ZeroPositionQty { symbol: String },

    #[error("position {symbol}: negative qty ({qty}) on a LONG position")]
    SideMismatch { symbol: String, qty: Decimal },

    #[error("stats {symbol}: {field} ({value}) out of range")]
    StatOutOfRange {
        symbol: String,
        field: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub cash: Decimal,
    pub equity: Decimal,
    pub buying_power: Decimal,
    #[serde(with = "lenient_timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub qty: Decimal,
    pub avg_price: Decimal,
    pub side: PositionSide,
}

impl Position {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.qty.is_zero() {
            return Err(ValidationError::ZeroPositionQty {
                symbol: self.symbol.clone(),
            });
        }
        // A signed qty must agree with the stated side; positive magnitudes are accepted for both.
        if self.qty.is_sign_negative() && self.side == PositionSide::Long {
            return Err(ValidationError::SideMismatch {
                symbol: self.symbol.clone(),
                qty: self.qty,
            });
        }
        Ok(())
    }

    pub fn market_value(&self) -> Decimal {
        self.qty.abs() * self.avg_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: Side,
    pub qty: Decimal,
    pub order_type: OrderType,
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    pub tif: TimeInForce,
    pub status: OrderStatus,
    #[serde(with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub avg_fill_price: Option<Decimal>,
    #[serde(default)]
    pub filled_qty: Decimal,
}

impl Order {
    /// Checks the record before it is allowed into a snapshot.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.qty <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveOrderQty {
                id: self.id.clone(),
                qty: self.qty,
            });
        }
        if self.filled_qty > self.qty {
            return Err(ValidationError::OverFilled {
                id: self.id.clone(),
                filled: self.filled_qty,
                qty: self.qty,
            });
        }
        if self.filled_qty > Decimal::ZERO && !self.status.allows_fill() {
            return Err(ValidationError::FillWithoutFillStatus {
                id: self.id.clone(),
                filled: self.filled_qty,
                status: self.status,
            });
        }
        match (self.order_type, self.limit_price) {
            (OrderType::Limit, None) => Err(ValidationError::MissingLimitPrice {
                id: self.id.clone(),
            }),
            (OrderType::Market, Some(_)) => Err(ValidationError::UnexpectedLimitPrice {
                id: self.id.clone(),
            }),
            _ => Ok(()),
        }
    }

    pub fn remaining_qty(&self) -> Decimal {
        self.qty - self.filled_qty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub symbol: String,
    pub window: String,
    pub trades: u64,
    /// Fraction in [0, 1], not a percentage.
    pub win_rate: f64,
    pub pnl: Decimal,
    /// Fractional return per trade.
    pub avg_return: f64,
    #[serde(default)]
    pub sharpe: Option<f64>,
    #[serde(with = "lenient_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl TradeStats {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.win_rate.is_finite() || !(0.0..=1.0).contains(&self.win_rate) {
            return Err(ValidationError::StatOutOfRange {
                symbol: self.symbol.clone(),
                field: "win_rate",
                value: self.win_rate,
            });
        }
        if !self.avg_return.is_finite() {
            return Err(ValidationError::StatOutOfRange {
                symbol: self.symbol.clone(),
                field: "avg_return",
                value: self.avg_return,
            });
        }
        Ok(())
    }
}

/// Normalizes a user-typed symbol filter: trimmed, uppercase, possibly empty.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}
