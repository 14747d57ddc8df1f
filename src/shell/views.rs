//! JSON views handed to the presentation layer

use serde::Serialize;

use super::Page;
use crate::dashboard::{format_amount, DashboardSummary, StatCard, Workspace};
use crate::store::{InventoryItem, Order, Purchase};

/// Whole screen: sidebar plus the selected page
#[derive(Debug, Serialize)]
pub struct ShellView {
    pub business_name: String,
    pub current_page: Page,
    pub nav: Vec<NavItem>,
    pub view: View,
}

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub id: Page,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "page", rename_all = "lowercase")]
pub enum View {
    Dashboard(DashboardView),
    Inventory { items: Vec<InventoryRow> },
    Purchases { purchases: Vec<PurchaseRow> },
    Orders { orders: Vec<Order> },
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub summary: DashboardSummary,
    pub stats: Vec<StatCard>,
    pub recent_orders: Vec<Order>,
    pub recent_inventory: Vec<InventoryRow>,
}

#[derive(Debug, Serialize)]
pub struct InventoryRow {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub value: f64,
    pub value_display: String,
}

impl From<&InventoryItem> for InventoryRow {
    fn from(item: &InventoryItem) -> Self {
        let value = item.value();
        Self {
            item: item.clone(),
            value,
            value_display: format_amount(value),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PurchaseRow {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub unit_cost: Option<f64>,
    pub unit_cost_display: Option<String>,
}

impl From<&Purchase> for PurchaseRow {
    fn from(purchase: &Purchase) -> Self {
        let unit_cost = purchase.unit_cost();
        Self {
            purchase: purchase.clone(),
            unit_cost,
            unit_cost_display: unit_cost.map(format_amount),
        }
    }
}

impl ShellView {
    pub fn new(page: Page, workspace: &Workspace) -> Self {
        let nav = Page::ALL
            .into_iter()
            .map(|p| NavItem {
                id: p,
                label: p.label(),
                active: p == page,
            })
            .collect();

        Self {
            business_name: workspace.business_name().to_string(),
            current_page: page,
            nav,
            view: View::for_page(page, workspace),
        }
    }
}

impl View {
    pub fn for_page(page: Page, workspace: &Workspace) -> Self {
        match page {
            Page::Dashboard => {
                let summary = workspace.summary();
                View::Dashboard(DashboardView {
                    stats: summary.stat_cards(),
                    summary,
                    recent_orders: workspace.orders.recent().to_vec(),
                    recent_inventory: workspace
                        .inventory
                        .recent()
                        .iter()
                        .map(InventoryRow::from)
                        .collect(),
                })
            }
            Page::Inventory => View::Inventory {
                items: workspace
                    .inventory
                    .records()
                    .iter()
                    .map(InventoryRow::from)
                    .collect(),
            },
            Page::Purchases => View::Purchases {
                purchases: workspace
                    .purchases
                    .records()
                    .iter()
                    .map(PurchaseRow::from)
                    .collect(),
            },
            Page::Orders => View::Orders {
                orders: workspace.orders.records().to_vec(),
            },
        }
    }
}
