//! Supplier purchases

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{is_positive, Draft, Record, REQUIRED_FIELDS_MESSAGE};
use crate::util::time::now_rfc3339;

/// Statuses offered when recording a purchase
pub const STATUSES: [&str; 4] = ["pending", "shipped", "delivered", "cancelled"];

/// Purchase row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub supplier_name: String,
    pub quantity: f64,
    pub cost: f64,
    pub purchase_date: String,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Purchase {
    /// Cost per unit, absent when nothing was bought
    pub fn unit_cost(&self) -> Option<f64> {
        if self.quantity == 0.0 {
            None
        } else {
            Some(self.cost / self.quantity)
        }
    }
}

impl Record for Purchase {
    const TABLE: &'static str = "purchases";
    const NOUN: &'static str = "purchase";

    fn id(&self) -> &str {
        &self.id
    }
}

/// New purchase as entered in the add form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseDraft {
    pub supplier_name: String,
    pub quantity: f64,
    pub cost: f64,
    pub status: String,
    pub notes: String,
}

impl Default for PurchaseDraft {
    fn default() -> Self {
        Self {
            supplier_name: String::new(),
            quantity: 0.0,
            cost: 0.0,
            status: "pending".to_string(),
            notes: String::new(),
        }
    }
}

#[derive(Serialize)]
struct NewPurchase<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    draft: &'a PurchaseDraft,
    purchase_date: String,
}

impl Draft for PurchaseDraft {
    type Row = Purchase;

    fn validate(&self) -> Result<(), &'static str> {
        if self.supplier_name.trim().is_empty()
            || !is_positive(self.quantity)
            || !is_positive(self.cost)
        {
            return Err(REQUIRED_FIELDS_MESSAGE);
        }
        Ok(())
    }

    fn payload(&self, user_id: &str) -> serde_json::Result<Value> {
        serde_json::to_value(NewPurchase {
            user_id,
            draft: self,
            purchase_date: now_rfc3339(),
        })
    }
}
