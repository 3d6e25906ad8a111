use std::cmp::Ordering;

use chrono::{Local, Timelike};
use serde::Serialize;
use uuid::Uuid;

use super::documents::RestaurantDocument;
use crate::domain::restaurant::{RestaurantState, SubscriptionType};

// ============================================================================
// Catalog Query - filtering, ordering and paging of restaurant documents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestaurantSortKey {
    #[default]
    DocumentId,
    Name,
    RestaurantId,
    Category,
    Locality,
    State,
    Subscription,
}

impl RestaurantSortKey {
    /// Case-insensitive; anything unknown falls back to the document id
    pub fn from_order_by(order_by: Option<&str>) -> Self {
        let Some(key) = order_by.map(str::trim).filter(|k| !k.is_empty()) else {
            return RestaurantSortKey::DocumentId;
        };

        match key.to_lowercase().as_str() {
            "name" => RestaurantSortKey::Name,
            "id" => RestaurantSortKey::RestaurantId,
            "category" => RestaurantSortKey::Category,
            "locality" => RestaurantSortKey::Locality,
            "state" => RestaurantSortKey::State,
            "subscription" => RestaurantSortKey::Subscription,
            _ => RestaurantSortKey::DocumentId,
        }
    }

    fn compare(self, a: &RestaurantDocument, b: &RestaurantDocument) -> Ordering {
        match self {
            RestaurantSortKey::DocumentId => a.document_id.cmp(&b.document_id),
            RestaurantSortKey::Name => a.name.cmp(&b.name),
            RestaurantSortKey::RestaurantId => a.restaurant_id.cmp(&b.restaurant_id),
            RestaurantSortKey::Category => a.category_id.cmp(&b.category_id),
            RestaurantSortKey::Locality => a.locality_id.cmp(&b.locality_id),
            RestaurantSortKey::State => state_name(a.state).cmp(state_name(b.state)),
            RestaurantSortKey::Subscription => subscription_name(a.subscription).cmp(subscription_name(b.subscription)),
        }
    }
}

// Stored as text in the document, so state and subscription sort by name
fn state_name(state: RestaurantState) -> &'static str {
    match state {
        RestaurantState::Open => "Open",
        RestaurantState::Closed => "Closed",
    }
}

fn subscription_name(subscription: SubscriptionType) -> &'static str {
    match subscription {
        SubscriptionType::Free => "Free",
        SubscriptionType::Basic => "Basic",
        SubscriptionType::Premium => "Premium",
    }
}

#[derive(Debug, Clone)]
pub struct RestaurantQuery {
    pub category_id: Option<Uuid>,
    /// Keep only restaurants open by `get_state` at query time
    pub open_only: bool,
    pub order_by: Option<String>,
    /// Zero-based
    pub page: usize,
    pub page_size: usize,
}

impl Default for RestaurantQuery {
    fn default() -> Self {
        Self {
            category_id: None,
            open_only: false,
            order_by: None,
            page: 0,
            page_size: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl RestaurantQuery {
    pub fn sort_key(&self) -> RestaurantSortKey {
        RestaurantSortKey::from_order_by(self.order_by.as_deref())
    }

    pub fn apply(&self, documents: Vec<RestaurantDocument>) -> Page<RestaurantDocument> {
        self.apply_at(documents, Local::now().hour())
    }

    /// Same as `apply` with an explicit hour for the open-only filter
    pub fn apply_at(&self, documents: Vec<RestaurantDocument>, hour: u32) -> Page<RestaurantDocument> {
        let mut matching: Vec<RestaurantDocument> = documents
            .into_iter()
            .filter(|d| self.category_id.map_or(true, |c| d.category_id == c))
            .filter(|d| !self.open_only || d.state_at(hour) == RestaurantState::Open)
            .collect();

        let key = self.sort_key();
        matching.sort_by(|a, b| key.compare(a, b));

        let total = matching.len();
        let page_size = self.page_size.max(1);
        let items = matching
            .into_iter()
            .skip(self.page.saturating_mul(page_size))
            .take(page_size)
            .collect();

        Page {
            items,
            total,
            page: self.page,
            page_size,
        }
    }
}
