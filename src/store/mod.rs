//! Data store modules for Supabase integration

pub mod gateway;
pub mod inventory;
pub mod orders;
pub mod profiles;
pub mod purchases;
pub mod supabase;

#[cfg(test)]
pub mod mock;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub use gateway::{error_message, Filter, Gateway, GatewayError};
pub use inventory::{InventoryDraft, InventoryItem};
pub use orders::{Order, OrderDraft, OrderStatus};
pub use profiles::Profile;
pub use purchases::{Purchase, PurchaseDraft};
pub use supabase::SupabaseClient;

/// Message shown when a draft is missing a required field
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// A row of a remote table, keyed by a remotely assigned id
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: &'static str;
    /// Singular noun used in user-facing messages
    const NOUN: &'static str;

    fn id(&self) -> &str;
}

/// User-entered fields for a new row, checked before any request is issued
pub trait Draft: DeserializeOwned + Send + Sync + 'static {
    type Row: Record;

    /// Rejects drafts with a missing name or a non-positive amount
    fn validate(&self) -> Result<(), &'static str>;

    /// Insert body for the remote table, owned by `user_id`
    fn payload(&self, user_id: &str) -> serde_json::Result<Value>;
}

/// `true` only for finite values above zero
pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
