//! Farmer dashboard route handler.
//!
//! The dashboard is a shell: the overview shows fixed sample figures and
//! the other tabs are placeholders.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::{CurrentShopper, OptionalFarmer};
use crate::state::AppState;

/// A dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardTab {
    #[default]
    Overview,
    Inventory,
    Orders,
    Messages,
    Insights,
    Settings,
}

impl DashboardTab {
    /// Every tab in sidebar order.
    pub const ALL: [Self; 6] = [
        Self::Overview,
        Self::Inventory,
        Self::Orders,
        Self::Messages,
        Self::Insights,
        Self::Settings,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Inventory => "inventory",
            Self::Orders => "orders",
            Self::Messages => "messages",
            Self::Insights => "insights",
            Self::Settings => "settings",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Inventory => "Inventory",
            Self::Orders => "Orders",
            Self::Messages => "Messages",
            Self::Insights => "Sales Insights",
            Self::Settings => "Settings",
        }
    }

    /// The tab named in the query string; anything unknown is the overview.
    #[must_use]
    pub fn from_query(tab: Option<&str>) -> Self {
        tab.and_then(|tab| tab.parse().ok()).unwrap_or_default()
    }
}

/// Error for an unrecognised tab name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dashboard tab: {0}")]
pub struct UnknownTab(String);

impl FromStr for DashboardTab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

/// Dashboard query parameters.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
}

/// Sidebar link.
#[derive(Clone)]
pub struct TabLink {
    pub slug: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Quick-stat card on the overview.
#[derive(Clone)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub change: &'static str,
    pub period: &'static str,
}

/// Entry in the recent-activity feed.
#[derive(Clone)]
pub struct ActivityItem {
    pub kind: &'static str,
    pub message: &'static str,
    pub time: &'static str,
}

/// What the main panel shows.
#[derive(Clone)]
pub struct Panel {
    pub heading: &'static str,
    pub stats: Vec<StatCard>,
    pub activity: Vec<ActivityItem>,
    pub placeholder: Option<&'static str>,
}

impl Panel {
    fn for_tab(tab: DashboardTab, listed_products: usize) -> Self {
        match tab {
            DashboardTab::Overview => Self {
                heading: tab.label(),
                stats: overview_stats(listed_products),
                activity: recent_activity(),
                placeholder: None,
            },
            DashboardTab::Inventory => Self::placeholder(tab, "Stock levels for your products."),
            DashboardTab::Orders => Self::placeholder(tab, "Incoming and fulfilled orders."),
            DashboardTab::Messages => Self::placeholder(tab, "Questions from your customers."),
            DashboardTab::Insights => Self::placeholder(tab, "Sales trends over time."),
            DashboardTab::Settings => Self::placeholder(tab, "Your farm profile and payouts."),
        }
    }

    const fn placeholder(tab: DashboardTab, text: &'static str) -> Self {
        Self {
            heading: tab.label(),
            stats: Vec::new(),
            activity: Vec::new(),
            placeholder: Some(text),
        }
    }
}

fn overview_stats(listed_products: usize) -> Vec<StatCard> {
    vec![
        StatCard {
            title: "Today's Sales",
            value: "$1,234".to_string(),
            change: "+15%",
            period: "vs yesterday",
        },
        StatCard {
            title: "New Orders",
            value: "12".to_string(),
            change: "+5",
            period: "since last hour",
        },
        StatCard {
            title: "Active Customers",
            value: "48".to_string(),
            change: "+12%",
            period: "this week",
        },
        StatCard {
            title: "Listed Products",
            value: listed_products.to_string(),
            change: "",
            period: "in the catalog",
        },
    ]
}

fn recent_activity() -> Vec<ActivityItem> {
    vec![
        ActivityItem {
            kind: "order",
            message: "New order #1234 received",
            time: "5 minutes ago",
        },
        ActivityItem {
            kind: "message",
            message: "Customer inquiry about organic tomatoes",
            time: "15 minutes ago",
        },
        ActivityItem {
            kind: "inventory",
            message: "Low stock alert: Fresh Eggs",
            time: "1 hour ago",
        },
    ]
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/show.html")]
pub struct DashboardTemplate {
    pub tabs: Vec<TabLink>,
    pub panel: Panel,
    pub farmer_email: Option<String>,
    pub cart_count: u64,
}

/// Display the dashboard at the requested tab.
#[instrument(skip(state, shopper, farmer))]
pub async fn show(
    State(state): State<AppState>,
    shopper: CurrentShopper,
    OptionalFarmer(farmer): OptionalFarmer,
    Query(query): Query<DashboardQuery>,
) -> DashboardTemplate {
    let active = DashboardTab::from_query(query.tab.as_deref());

    DashboardTemplate {
        tabs: DashboardTab::ALL
            .into_iter()
            .map(|tab| TabLink {
                slug: tab.as_str(),
                label: tab.label(),
                active: tab == active,
            })
            .collect(),
        panel: Panel::for_tab(active, state.catalog().products().len()),
        farmer_email: farmer.map(|f| f.email),
        cart_count: shopper.shopper.lock().await.cart().item_count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_parses_case_insensitively() {
        assert_eq!("Orders".parse::<DashboardTab>().unwrap(), DashboardTab::Orders);
        assert_eq!(" insights ".parse::<DashboardTab>().unwrap(), DashboardTab::Insights);
    }

    #[test]
    fn test_unknown_or_missing_tab_is_overview() {
        assert_eq!(DashboardTab::from_query(None), DashboardTab::Overview);
        assert_eq!(DashboardTab::from_query(Some("barn")), DashboardTab::Overview);
    }

    #[test]
    fn test_every_tab_round_trips_through_its_slug() {
        for tab in DashboardTab::ALL {
            assert_eq!(tab.as_str().parse::<DashboardTab>().unwrap(), tab);
        }
    }

    #[test]
    fn test_overview_has_stats_and_feed() {
        let panel = Panel::for_tab(DashboardTab::Overview, 6);
        assert_eq!(panel.stats.len(), 4);
        assert_eq!(panel.activity.len(), 3);
        assert!(panel.placeholder.is_none());

        let panel = Panel::for_tab(DashboardTab::Settings, 6);
        assert!(panel.stats.is_empty());
        assert!(panel.placeholder.is_some());
    }
}
