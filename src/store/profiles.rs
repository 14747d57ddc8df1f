//! Business profile, one per account

use serde::{Deserialize, Serialize};

use super::gateway::Filter;

/// Business profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub business_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Profile {
    pub const TABLE: &'static str = "profiles";

    /// Filter selecting the profile owned by a user
    pub fn filter_for(user_id: &str) -> Filter {
        Filter::eq("id", user_id)
    }
}
