use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::restaurant::{
    ContractStatus, Menu, PricingPolicy, RestaurantRegistered, RestaurantState, SubscriptionType,
};

// ============================================================================
// Catalog Documents - Denormalised read model
// ============================================================================
//
// Stored as JSON and replaced whole on every change. `document_id` is the
// store's own key; `restaurant_id` is the aggregate id.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDocument {
    pub document_id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: String,
    pub phone_number: String,
    pub locality_id: Uuid,
    pub state: RestaurantState,
    pub opening_hour: i32,
    pub closing_hour: i32,
    pub subscription: SubscriptionType,
    pub contract_status: ContractStatus,
    pub image_url: String,
    pub rating: f64,
    pub total_ratings_count: i32,
    pub manager_id: Uuid,
    pub pricing_policy: Option<PricingPolicy>,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub menus: Vec<MenuRecord>,
    pub updated_at: DateTime<Utc>,
    /// Most recent outbox event ids folded into this document, oldest first
    #[serde(default)]
    pub applied_event_ids: Vec<Uuid>,
}

/// Redelivery only ever repeats the tail of a stream, so a short window is enough
const APPLIED_EVENTS_WINDOW: usize = 32;

impl RestaurantDocument {
    pub fn registered(
        restaurant_id: Uuid,
        event: &RestaurantRegistered,
        category_name: Option<String>,
    ) -> Self {
        Self {
            document_id: Uuid::new_v4(),
            restaurant_id,
            name: event.name.clone(),
            description: event.description.clone(),
            phone_number: event.phone_number.complete_number(),
            locality_id: event.locality_id,
            state: RestaurantState::Closed,
            opening_hour: event.opening_hour,
            closing_hour: event.closing_hour,
            subscription: event.subscription,
            contract_status: ContractStatus::Unsigned,
            image_url: event.image_url.clone(),
            rating: 0.0,
            total_ratings_count: 0,
            manager_id: event.manager_id,
            pricing_policy: None,
            category_id: event.category_id,
            category_name,
            expiration_date: None,
            menus: Vec::new(),
            updated_at: event.registered_at,
            applied_event_ids: Vec::new(),
        }
    }

    pub fn has_applied(&self, event_id: Uuid) -> bool {
        self.applied_event_ids.contains(&event_id)
    }

    pub fn mark_applied(&mut self, event_id: Uuid) {
        self.applied_event_ids.push(event_id);
        if self.applied_event_ids.len() > APPLIED_EVENTS_WINDOW {
            let excess = self.applied_event_ids.len() - APPLIED_EVENTS_WINDOW;
            self.applied_event_ids.drain(..excess);
        }
    }

    /// State as a customer sees it now, by the local wall clock
    pub fn get_state(&self) -> RestaurantState {
        self.state_at(Local::now().hour())
    }

    pub fn state_at(&self, hour: u32) -> RestaurantState {
        self.state.at_hour(self.opening_hour, self.closing_hour, hour)
    }

    /// Fold one more review into the running average
    pub fn add_rating(&mut self, star_rate: i32) {
        let total = self.rating * f64::from(self.total_ratings_count) + f64::from(star_rate);
        self.total_ratings_count += 1;
        self.rating = total / f64::from(self.total_ratings_count);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub menu_id: Uuid,
    pub name: String,
    pub name_eng: String,
    pub image_url: String,
}

impl From<&Menu> for MenuRecord {
    fn from(menu: &Menu) -> Self {
        Self {
            menu_id: menu.menu_id,
            name: menu.name.clone(),
            name_eng: menu.name_eng.clone(),
            image_url: menu.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDocument {
    pub category_id: Uuid,
    pub image_url: String,
    pub name: String,
    pub name_eng: String,
    /// Free-form grouping tag, e.g. "cuisine" or "dish"
    pub categorize: String,
    pub similar_categories: Vec<Uuid>,
}

impl CategoryDocument {
    pub fn new(category_id: Uuid, name: &str, name_eng: &str, categorize: &str, image_url: &str) -> Self {
        Self {
            category_id,
            image_url: image_url.to_string(),
            name: name.to_string(),
            name_eng: name_eng.to_string(),
            categorize: categorize.to_string(),
            similar_categories: Vec::new(),
        }
    }

    pub fn has_similar_categories(&self) -> bool {
        !self.similar_categories.is_empty()
    }

    /// Ignores itself and duplicates
    pub fn add_similar_category(&mut self, category_id: Uuid) {
        if category_id != self.category_id && !self.similar_categories.contains(&category_id) {
            self.similar_categories.push(category_id);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::shared::{PhoneNumber, SupportedCountryCode};

    pub(crate) fn registered_event(name: &str) -> RestaurantRegistered {
        RestaurantRegistered {
            name: name.to_string(),
            description: "Forno a legna".to_string(),
            phone_number: PhoneNumber::of(SupportedCountryCode::Italy, "0298765432").unwrap(),
            locality_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            opening_hour: 22,
            closing_hour: 10,
            subscription: SubscriptionType::Basic,
            image_url: String::new(),
            manager_id: Uuid::new_v4(),
            registered_at: Utc::now(),
        }
    }

    fn open_document(opening_hour: i32, closing_hour: i32) -> RestaurantDocument {
        let mut doc = RestaurantDocument::registered(Uuid::new_v4(), &registered_event("Da Gino"), None);
        doc.state = RestaurantState::Open;
        doc.opening_hour = opening_hour;
        doc.closing_hour = closing_hour;
        doc
    }

    #[test]
    fn test_registered_document_starts_closed() {
        let doc = RestaurantDocument::registered(Uuid::new_v4(), &registered_event("Da Gino"), None);
        assert_eq!(doc.state, RestaurantState::Closed);
        assert_eq!(doc.phone_number, "+390298765432");
        assert!(doc.menus.is_empty());
    }

    #[test]
    fn test_open_document_closed_outside_hours() {
        let doc = open_document(9, 22);
        assert_eq!(doc.state_at(8), RestaurantState::Closed);
        assert_eq!(doc.state_at(23), RestaurantState::Closed);
        assert_eq!(doc.state_at(9), RestaurantState::Open);
        assert_eq!(doc.state_at(22), RestaurantState::Open);
    }

    #[test]
    fn test_closed_document_stays_closed() {
        let mut doc = open_document(0, 23);
        doc.state = RestaurantState::Closed;
        assert_eq!(doc.state_at(12), RestaurantState::Closed);
        assert_eq!(doc.get_state(), RestaurantState::Closed);
    }

    #[test]
    fn test_get_state_open_all_day() {
        let doc = open_document(0, 24);
        assert_eq!(doc.get_state(), RestaurantState::Open);
    }

    #[test]
    fn test_running_average_rating() {
        let mut doc = open_document(0, 24);
        doc.add_rating(5);
        doc.add_rating(4);
        doc.add_rating(3);
        assert_eq!(doc.total_ratings_count, 3);
        assert!((doc.rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_applied_event_window_keeps_latest() {
        let mut doc = open_document(0, 24);
        let first = Uuid::new_v4();
        doc.mark_applied(first);
        assert!(doc.has_applied(first));

        let ids: Vec<Uuid> = (0..APPLIED_EVENTS_WINDOW).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            doc.mark_applied(*id);
        }

        assert_eq!(doc.applied_event_ids.len(), APPLIED_EVENTS_WINDOW);
        assert!(!doc.has_applied(first));
        assert!(ids.iter().all(|id| doc.has_applied(*id)));
    }

    #[test]
    fn test_similar_categories() {
        let pizza = Uuid::new_v4();
        let mut category = CategoryDocument::new(pizza, "Pizzeria", "Pizza place", "cuisine", "");
        assert!(!category.has_similar_categories());

        let italian = Uuid::new_v4();
        category.add_similar_category(italian);
        category.add_similar_category(italian);
        category.add_similar_category(pizza);

        assert!(category.has_similar_categories());
        assert_eq!(category.similar_categories, vec![italian]);
    }
}
