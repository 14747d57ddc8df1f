//! Aggregation and view state for the dashboard
//!
//! Loads the profile and the three collections for a session, derives the
//! summary figures and keeps the in-memory collections in step with add and
//! delete calls against the gateway.

pub mod collection;
pub mod summary;
pub mod workspace;

use crate::store::GatewayError;

pub use collection::{decode_rows, Collection};
pub use summary::{format_amount, recent, DashboardSummary, StatCard, RECENT_LIMIT};
pub use workspace::{fetch_workspace, load, LoadOutcome, Tracked, Workspace};

/// Kind of local mutation, used to phrase failure messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Add,
    Delete,
}

impl Mutation {
    fn verb(self) -> &'static str {
        match self {
            Mutation::Add => "adding",
            Mutation::Delete => "deleting",
        }
    }
}

/// Dashboard errors
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Malformed {table} response: {source}")]
    Shape {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{table} request rejected: {message}")]
    Rejected { table: &'static str, message: String },

    #[error("No row returned from {table} insert")]
    NoRowReturned { table: &'static str },

    #[error("Failed to encode {table} row: {source}")]
    Encode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DashboardError {
    /// Message for the person at the dashboard, e.g. "Error adding item: ..."
    pub fn user_message(&self, mutation: Mutation, noun: &str) -> String {
        match self {
            DashboardError::Validation(message) => message.to_string(),
            other => format!("Error {} {}: {}", mutation.verb(), noun, other),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DashboardError::Validation(_))
    }
}
