//! Loaded dashboard data for one session

use tracing::{info, warn};

use super::collection::{decode_rows, Collection};
use super::summary::DashboardSummary;
use super::DashboardError;
use crate::session::{Session, SessionHolder, SessionUser};
use crate::store::{Filter, Gateway, InventoryItem, Order, Profile, Purchase, Record};

/// Sidebar title when the account has no profile row
pub const DEFAULT_BUSINESS_NAME: &str = "Business Dashboard";

/// Profile plus the three collections, fetched once per load
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    pub user: SessionUser,
    pub profile: Option<Profile>,
    pub inventory: Collection<InventoryItem>,
    pub purchases: Collection<Purchase>,
    pub orders: Collection<Order>,
}

impl Workspace {
    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::compute(
            self.inventory.records(),
            self.purchases.records(),
            self.orders.records(),
        )
    }

    pub fn business_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.business_name.as_str())
            .unwrap_or(DEFAULT_BUSINESS_NAME)
    }
}

/// Records that live in one of the workspace collections
pub trait Tracked: Record {
    fn collection(workspace: &Workspace) -> &Collection<Self>;
    fn collection_mut(workspace: &mut Workspace) -> &mut Collection<Self>;
}

impl Tracked for InventoryItem {
    fn collection(workspace: &Workspace) -> &Collection<Self> {
        &workspace.inventory
    }

    fn collection_mut(workspace: &mut Workspace) -> &mut Collection<Self> {
        &mut workspace.inventory
    }
}

impl Tracked for Purchase {
    fn collection(workspace: &Workspace) -> &Collection<Self> {
        &workspace.purchases
    }

    fn collection_mut(workspace: &mut Workspace) -> &mut Collection<Self> {
        &mut workspace.purchases
    }
}

impl Tracked for Order {
    fn collection(workspace: &Workspace) -> &Collection<Self> {
        &workspace.orders
    }

    fn collection_mut(workspace: &mut Workspace) -> &mut Collection<Self> {
        &mut workspace.orders
    }
}

/// Result of a dashboard load
#[derive(Debug)]
pub enum LoadOutcome {
    Ready(Workspace),
    RedirectToLogin,
}

/// Load the dashboard for the stored session.
///
/// Without a session this returns straight away, before any gateway call.
/// If any of the four fetches fails nothing is kept, the session is dropped
/// and the caller is sent back to login.
pub async fn load(sessions: &SessionHolder, gateway: &dyn Gateway) -> LoadOutcome {
    let session = match sessions.read() {
        Ok(Some(session)) => session,
        Ok(None) => return LoadOutcome::RedirectToLogin,
        Err(e) => {
            warn!(error = %e, "Could not read stored session");
            return LoadOutcome::RedirectToLogin;
        }
    };

    match fetch_workspace(&session, gateway).await {
        Ok(workspace) => {
            info!(
                user_id = %workspace.user.id,
                inventory = workspace.inventory.len(),
                purchases = workspace.purchases.len(),
                orders = workspace.orders.len(),
                "Dashboard loaded"
            );
            LoadOutcome::Ready(workspace)
        }
        Err(e) => {
            warn!(error = %e, "Error loading dashboard data");
            if let Err(e) = sessions.clear() {
                warn!(error = %e, "Failed to clear session after load failure");
            }
            LoadOutcome::RedirectToLogin
        }
    }
}

/// Fetch profile, inventory, purchases and orders concurrently.
///
/// All four must succeed.
pub async fn fetch_workspace(
    session: &Session,
    gateway: &dyn Gateway,
) -> Result<Workspace, DashboardError> {
    let user_id = &session.user.id;
    let owner_filter = Filter::eq("user_id", user_id.as_str());
    let profile_filter = Profile::filter_for(user_id);

    let (profiles, inventory, purchases, orders) = futures::try_join!(
        fetch::<Profile>(gateway, session, Profile::TABLE, &profile_filter),
        fetch::<InventoryItem>(gateway, session, InventoryItem::TABLE, &owner_filter),
        fetch::<Purchase>(gateway, session, Purchase::TABLE, &owner_filter),
        fetch::<Order>(gateway, session, Order::TABLE, &owner_filter),
    )?;

    Ok(Workspace {
        user: session.user.clone(),
        profile: profiles.into_iter().next(),
        inventory: Collection::new(inventory),
        purchases: Collection::new(purchases),
        orders: Collection::new(orders),
    })
}

async fn fetch<T: serde::de::DeserializeOwned>(
    gateway: &dyn Gateway,
    session: &Session,
    table: &'static str,
    filter: &Filter,
) -> Result<Vec<T>, DashboardError> {
    let body = gateway.query_rows(table, session, filter).await?;
    decode_rows(table, body)
}
