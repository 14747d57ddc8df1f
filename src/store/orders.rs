//! Customer orders

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{is_positive, Draft, Record, REQUIRED_FIELDS_MESSAGE};
use crate::util::time::now_rfc3339;

/// Order lifecycle status.
///
/// Stored as text remotely; unrecognized values are kept verbatim in
/// `Other` so that matching stays exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => OrderStatus::Pending,
            "in-progress" => OrderStatus::InProgress,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub order_date: String,
    pub total_price: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub description: Option<String>,
}

impl Record for Order {
    const TABLE: &'static str = "orders";
    const NOUN: &'static str = "order";

    fn id(&self) -> &str {
        &self.id
    }
}

/// New order as entered in the add form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDraft {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub total_price: f64,
    pub status: OrderStatus,
    pub description: String,
}

#[derive(Serialize)]
struct NewOrder<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    draft: &'a OrderDraft,
    order_date: String,
}

impl Draft for OrderDraft {
    type Row = Order;

    fn validate(&self) -> Result<(), &'static str> {
        if self.customer_name.trim().is_empty() || !is_positive(self.total_price) {
            return Err(REQUIRED_FIELDS_MESSAGE);
        }
        Ok(())
    }

    fn payload(&self, user_id: &str) -> serde_json::Result<Value> {
        serde_json::to_value(NewOrder {
            user_id,
            draft: self,
            order_date: now_rfc3339(),
        })
    }
}
