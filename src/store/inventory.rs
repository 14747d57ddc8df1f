//! Shop inventory: flowers, greenery, vases and supplies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{is_positive, Draft, Record, REQUIRED_FIELDS_MESSAGE};

/// Categories offered when adding an item; any text is accepted
pub const CATEGORIES: [&str; 4] = ["Flowers", "Greenery", "Vases", "Supplies"];

/// Inventory row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub cost_per_unit: f64,
    #[serde(default)]
    pub supplier: Option<String>,
}

impl InventoryItem {
    /// Stock value: quantity times unit cost
    pub fn value(&self) -> f64 {
        self.quantity * self.cost_per_unit
    }
}

impl Record for InventoryItem {
    const TABLE: &'static str = "inventory";
    const NOUN: &'static str = "item";

    fn id(&self) -> &str {
        &self.id
    }
}

/// New inventory item as entered in the add form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryDraft {
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub cost_per_unit: f64,
    pub supplier: String,
}

impl Default for InventoryDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: "Flowers".to_string(),
            quantity: 0.0,
            unit: "stems".to_string(),
            cost_per_unit: 0.0,
            supplier: String::new(),
        }
    }
}

#[derive(Serialize)]
struct NewInventoryItem<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    draft: &'a InventoryDraft,
}

impl Draft for InventoryDraft {
    type Row = InventoryItem;

    fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty()
            || !is_positive(self.quantity)
            || !is_positive(self.cost_per_unit)
        {
            return Err(REQUIRED_FIELDS_MESSAGE);
        }
        Ok(())
    }

    fn payload(&self, user_id: &str) -> serde_json::Result<Value> {
        serde_json::to_value(NewInventoryItem {
            user_id,
            draft: self,
        })
    }
}
