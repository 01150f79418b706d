use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned by a [`StoreDataProvider`] when a backend call fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct DataFetchError(pub String);

impl DataFetchError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Tri-state result of an asynchronous fetch: loading, data, or error.
/// Widgets render exactly one body state derived from this.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

impl<T> From<Result<T, DataFetchError>> for FetchState<T> {
    fn from(result: Result<T, DataFetchError>) -> Self {
        match result {
            Ok(data) => FetchState::Ready(data),
            Err(e) => FetchState::Failed(e.0),
        }
    }
}

/// Aggregate counts shown by the stat widgets. Fetched once per refresh
/// pass and shared read-only by every stat widget on the dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSummary {
    pub products: u64,
    pub orders: u64,
    pub users: u64,
    pub reviews: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub customer: String,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub product: String,
    pub rating: u8,
    pub excerpt: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Answered,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: String,
    pub subject: String,
    pub status: TicketStatus,
    pub opened_at: DateTime<Utc>,
}

/// Data-access seam to the storefront REST backend. The dashboard core
/// only depends on this contract; how the data is fetched is up to the
/// host application. The `limit` arguments are hints: renderers still
/// truncate to their configured limit regardless of how many records a
/// provider returns.
pub trait StoreDataProvider: Send + Sync {
    fn summary(&self) -> Result<StoreSummary, DataFetchError>;
    fn products(&self, limit: usize) -> Result<Vec<Product>, DataFetchError>;
    fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, DataFetchError>;
    fn recent_reviews(&self, limit: usize) -> Result<Vec<Review>, DataFetchError>;
    fn open_tickets(&self, limit: usize) -> Result<Vec<Ticket>, DataFetchError>;
}

pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}${}.{:02}", cents / 100, cents % 100)
}
