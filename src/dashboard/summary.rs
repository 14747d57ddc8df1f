//! Summary figures for the dashboard home page

use serde::Serialize;

use crate::store::{InventoryItem, Order, OrderStatus, Purchase};

/// How many records the "recent" panels show
pub const RECENT_LIMIT: usize = 5;

/// First `RECENT_LIMIT` records in fetched order.
///
/// No date sort happens here; "recent" means whatever the store returned first.
pub fn recent<T>(records: &[T]) -> &[T] {
    &records[..records.len().min(RECENT_LIMIT)]
}

/// Amount in the shop's display currency, e.g. `Rp12500.00`
pub fn format_amount(value: f64) -> String {
    format!("Rp{:.2}", value)
}

/// Totals across the loaded collections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_inventory_value: f64,
    pub total_purchase_cost: f64,
    pub total_order_revenue: f64,
    pub pending_order_count: usize,
    pub inventory_item_count: usize,
}

impl DashboardSummary {
    pub fn compute(inventory: &[InventoryItem], purchases: &[Purchase], orders: &[Order]) -> Self {
        Self {
            total_inventory_value: inventory.iter().map(InventoryItem::value).sum(),
            total_purchase_cost: purchases.iter().map(|p| p.cost).sum(),
            total_order_revenue: orders.iter().map(|o| o.total_price).sum(),
            pending_order_count: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
            inventory_item_count: inventory.len(),
        }
    }

    /// The four headline cards, formatted for display
    pub fn stat_cards(&self) -> Vec<StatCard> {
        vec![
            StatCard {
                title: "Total Inventory Value",
                value: format_amount(self.total_inventory_value),
            },
            StatCard {
                title: "Total Purchases",
                value: format_amount(self.total_purchase_cost),
            },
            StatCard {
                title: "Order Revenue",
                value: format_amount(self.total_order_revenue),
            },
            StatCard {
                title: "Pending Orders",
                value: self.pending_order_count.to_string(),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}
