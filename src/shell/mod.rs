//! Page shell: which dashboard page is showing

pub mod views;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dashboard::Workspace;

pub use views::{NavItem, ShellView, View};

/// Pages reachable from the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Dashboard,
    Inventory,
    Purchases,
    Orders,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Dashboard, Page::Inventory, Page::Purchases, Page::Orders];

    pub fn id(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Inventory => "inventory",
            Page::Purchases => "purchases",
            Page::Orders => "orders",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Inventory => "Inventory",
            Page::Purchases => "Purchases",
            Page::Orders => "Orders",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.id() == s)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown page: {0}")]
pub struct UnknownPage(pub String);

/// Current page selection. No guards, no history.
#[derive(Debug, Clone, Default)]
pub struct Shell {
    current: Page,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Page {
        self.current
    }

    pub fn select(&mut self, page: Page) {
        self.current = page;
    }

    /// Render the current page against the loaded workspace
    pub fn render(&self, workspace: &Workspace) -> ShellView {
        ShellView::new(self.current, workspace)
    }
}
