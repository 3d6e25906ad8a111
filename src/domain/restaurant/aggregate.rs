use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::shared::{
    check_rule, check_rules, ConditionMustBeTrueRule, MoneyValue, PhoneNumber, SupportedCountryCode,
};
use crate::event_sourcing::core::Aggregate;
use super::commands::RestaurantCommand;
use super::errors::RestaurantError;
use super::events::*;
use super::rules::OpeningAndClosingHoursAreValid;
use super::value_objects::*;

// ============================================================================
// Restaurant Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone)]
pub struct RestaurantAggregate {
    // Identity
    pub id: Uuid,
    pub version: i64,

    // Profile
    pub name: String,
    pub description: String,
    pub phone_number: PhoneNumber,
    pub locality_id: Uuid,
    pub category_id: Uuid,
    pub image_url: String,
    pub manager_id: Uuid,

    // Operations
    pub opening_hour: i32,
    pub closing_hour: i32,
    pub state: RestaurantState,
    pub subscription: SubscriptionType,
    pub contract: Contract,
    pub pricing_policy: Option<PricingPolicy>,

    // Catalog
    pub menus: Vec<Menu>,
    pub foods: Vec<Food>,
    pub rating: Rating,

    // Audit Trail
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RestaurantAggregate {
    pub fn menu(&self, menu_id: Uuid) -> Option<&Menu> {
        self.menus.iter().find(|m| m.menu_id == menu_id)
    }

    pub fn food(&self, food_id: Uuid) -> Option<&Food> {
        self.foods.iter().find(|f| f.food_id == food_id)
    }

    fn food_mut(&mut self, food_id: Uuid) -> Option<&mut Food> {
        self.foods.iter_mut().find(|f| f.food_id == food_id)
    }

    fn require_food(&self, food_id: Uuid) -> Result<&Food, RestaurantError> {
        self.food(food_id).ok_or(RestaurantError::FoodNotFound(food_id))
    }

    /// Stored state corrected by the current wall-clock hour
    pub fn effective_state(&self, hour: u32) -> RestaurantState {
        self.state.at_hour(self.opening_hour, self.closing_hour, hour)
    }

    pub fn accepts_orders(&self) -> bool {
        self.state == RestaurantState::Open
            && self.contract.status_at(Utc::now()) == ContractStatus::Active
    }

    fn validate_price(price: Decimal, what: &str) -> Result<(), RestaurantError> {
        check_rule(&ConditionMustBeTrueRule::new(
            price > Decimal::ZERO,
            format!("{} price must be greater than zero", what),
        ))?;
        Ok(())
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for RestaurantAggregate {
    type Event = RestaurantEvent;
    type Command = RestaurantCommand;
    type Error = RestaurantError;

    const AGGREGATE_TYPE: &'static str = "Restaurant";

    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            RestaurantEvent::Registered(e) => Ok(Self {
                id: aggregate_id,
                version: 0,
                name: e.name.clone(),
                description: e.description.clone(),
                phone_number: e.phone_number.clone(),
                locality_id: e.locality_id,
                category_id: e.category_id,
                image_url: e.image_url.clone(),
                manager_id: e.manager_id,
                opening_hour: e.opening_hour,
                closing_hour: e.closing_hour,
                state: RestaurantState::Closed,
                subscription: e.subscription,
                contract: Contract::unsigned(),
                pricing_policy: None,
                menus: Vec::new(),
                foods: Vec::new(),
                rating: Rating::default(),
                registered_at: e.registered_at,
                updated_at: e.registered_at,
            }),
            _ => Err(RestaurantError::NotRegistered),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        self.updated_at = Utc::now();

        match event {
            RestaurantEvent::Registered(_) => Err(RestaurantError::AlreadyRegistered),
            RestaurantEvent::HoursUpdated(e) => {
                self.opening_hour = e.opening_hour;
                self.closing_hour = e.closing_hour;
                Ok(())
            }
            RestaurantEvent::CategoryChanged(e) => {
                self.category_id = e.category_id;
                Ok(())
            }
            RestaurantEvent::Opened(_) => {
                self.state = RestaurantState::Open;
                Ok(())
            }
            RestaurantEvent::Closed(_) => {
                self.state = RestaurantState::Closed;
                Ok(())
            }
            RestaurantEvent::SubscriptionChanged(e) => {
                self.subscription = e.subscription;
                Ok(())
            }
            RestaurantEvent::ContractSigned(e) => {
                self.contract = Contract {
                    status: ContractStatus::Active,
                    expiration_date: Some(e.expiration_date),
                };
                Ok(())
            }
            RestaurantEvent::PricingPolicySet(e) => {
                self.pricing_policy = Some(e.policy.clone());
                Ok(())
            }
            RestaurantEvent::MenuAdded(e) => {
                self.menus.push(e.menu.clone());
                Ok(())
            }
            RestaurantEvent::FoodAdded(e) => {
                let price = MoneyValue::of(e.unit_price);
                self.foods.push(Food {
                    food_id: e.food_id,
                    menu_id: e.menu_id,
                    name: e.name.clone(),
                    description: e.description.clone(),
                    unit_price: price,
                    old_unit_price: price,
                    is_veg: e.is_veg,
                    is_non_veg: e.is_non_veg,
                    is_gluten_free: e.is_gluten_free,
                    image_url: e.image_url.clone(),
                    food_type: e.food_type,
                    status: FoodStatus::Available,
                    variants: Vec::new(),
                    add_ons: Vec::new(),
                });
                Ok(())
            }
            RestaurantEvent::VariantAdded(e) => {
                let food = self.food_mut(e.food_id).ok_or(RestaurantError::FoodNotFound(e.food_id))?;
                food.variants.push(Variant {
                    variant_id: e.variant_id,
                    name: e.name.clone(),
                    name_eng: e.name_eng.clone(),
                    price: MoneyValue::of(e.price),
                });
                Ok(())
            }
            RestaurantEvent::AddOnAdded(e) => {
                let food = self.food_mut(e.food_id).ok_or(RestaurantError::FoodNotFound(e.food_id))?;
                food.add_ons.push(AddOn {
                    add_on_id: e.add_on_id,
                    name: e.name.clone(),
                    name_eng: e.name_eng.clone(),
                    description: e.description.clone(),
                    price: MoneyValue::of(e.price),
                });
                Ok(())
            }
            RestaurantEvent::FoodPriceChanged(e) => {
                let food = self.food_mut(e.food_id).ok_or(RestaurantError::FoodNotFound(e.food_id))?;
                food.old_unit_price = MoneyValue::of(e.old_price);
                food.unit_price = MoneyValue::of(e.new_price);
                Ok(())
            }
            RestaurantEvent::FoodStatusChanged(e) => {
                let food = self.food_mut(e.food_id).ok_or(RestaurantError::FoodNotFound(e.food_id))?;
                food.status = e.status;
                Ok(())
            }
            RestaurantEvent::Reviewed(e) => {
                self.rating.record(e.star_rate);
                Ok(())
            }
        }
    }

    fn handle_creation(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        let RestaurantCommand::RegisterRestaurant {
            name,
            description,
            phone_number,
            locality_id,
            category_id,
            opening_hour,
            closing_hour,
            subscription,
            image_url,
            manager_id,
        } = command
        else {
            return Err(RestaurantError::NotRegistered);
        };

        let name_given = ConditionMustBeTrueRule::new(!name.trim().is_empty(), "restaurant name is required");
        let hours = OpeningAndClosingHoursAreValid::new(*opening_hour, *closing_hour);
        check_rules(&[&name_given, &hours])?;

        let phone_number = PhoneNumber::of(SupportedCountryCode::Italy, phone_number)?;

        Ok(RestaurantEvent::Registered(RestaurantRegistered {
            name: name.trim().to_string(),
            description: description.clone(),
            phone_number,
            locality_id: *locality_id,
            category_id: *category_id,
            opening_hour: *opening_hour,
            closing_hour: *closing_hour,
            subscription: *subscription,
            image_url: image_url.clone(),
            manager_id: *manager_id,
            registered_at: Utc::now(),
        }))
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RestaurantCommand::RegisterRestaurant { .. } => Err(RestaurantError::AlreadyRegistered),

            RestaurantCommand::UpdateHours { opening_hour, closing_hour } => {
                check_rule(&OpeningAndClosingHoursAreValid::new(*opening_hour, *closing_hour))?;

                Ok(vec![RestaurantEvent::HoursUpdated(HoursUpdated {
                    opening_hour: *opening_hour,
                    closing_hour: *closing_hour,
                })])
            }

            RestaurantCommand::UpdateCategory { category_id } => {
                if *category_id == self.category_id {
                    return Ok(vec![]);
                }

                Ok(vec![RestaurantEvent::CategoryChanged(CategoryChanged {
                    category_id: *category_id,
                })])
            }

            RestaurantCommand::Open => {
                if self.state == RestaurantState::Open {
                    return Err(RestaurantError::AlreadyOpen);
                }

                let contract_status = self.contract.status_at(Utc::now());
                if contract_status != ContractStatus::Active {
                    return Err(RestaurantError::ContractNotActive(contract_status));
                }

                Ok(vec![RestaurantEvent::Opened(RestaurantOpened {
                    opened_at: Utc::now(),
                })])
            }

            RestaurantCommand::Close => {
                if self.state == RestaurantState::Closed {
                    return Err(RestaurantError::AlreadyClosed);
                }

                Ok(vec![RestaurantEvent::Closed(RestaurantClosed {
                    closed_at: Utc::now(),
                })])
            }

            RestaurantCommand::ChangeSubscription { subscription } => {
                if *subscription == self.subscription {
                    return Ok(vec![]);
                }

                Ok(vec![RestaurantEvent::SubscriptionChanged(SubscriptionChanged {
                    subscription: *subscription,
                })])
            }

            RestaurantCommand::SignContract { expiration_date } => {
                check_rule(&ConditionMustBeTrueRule::new(
                    *expiration_date > Utc::now(),
                    "contract expiration date must be in the future",
                ))?;

                Ok(vec![RestaurantEvent::ContractSigned(ContractSigned {
                    expiration_date: *expiration_date,
                })])
            }

            RestaurantCommand::SetPricingPolicy { policy } => {
                let non_negative = ConditionMustBeTrueRule::new(
                    policy.minimum_charge >= Decimal::ZERO
                        && policy.fixed_charge >= Decimal::ZERO
                        && policy.additional_price.map_or(true, |p| p >= Decimal::ZERO),
                    "pricing policy amounts cannot be negative",
                );
                let cap_non_negative = ConditionMustBeTrueRule::new(
                    policy.maximum_charge.map_or(true, |cap| cap >= Decimal::ZERO),
                    "maximum charge cannot be negative",
                );
                check_rules(&[&non_negative, &cap_non_negative])?;

                Ok(vec![RestaurantEvent::PricingPolicySet(PricingPolicySet {
                    policy: policy.clone(),
                })])
            }

            RestaurantCommand::AddMenu { menu_id, name, name_eng, image_url } => {
                let name_given = ConditionMustBeTrueRule::new(!name.trim().is_empty(), "menu name is required");
                let unique = ConditionMustBeTrueRule::new(
                    !self.menus.iter().any(|m| m.name.eq_ignore_ascii_case(name.trim())),
                    format!("menu '{}' already exists", name.trim()),
                );
                check_rules(&[&name_given, &unique])?;

                Ok(vec![RestaurantEvent::MenuAdded(MenuAdded {
                    menu: Menu {
                        menu_id: *menu_id,
                        name: name.trim().to_string(),
                        name_eng: name_eng.clone(),
                        image_url: image_url.clone(),
                    },
                })])
            }

            RestaurantCommand::AddFood {
                food_id,
                menu_id,
                name,
                description,
                unit_price,
                is_veg,
                is_non_veg,
                is_gluten_free,
                image_url,
                food_type,
            } => {
                if self.menu(*menu_id).is_none() {
                    return Err(RestaurantError::MenuNotFound(*menu_id));
                }

                let positive = ConditionMustBeTrueRule::new(
                    *unit_price > Decimal::ZERO,
                    "food price must be greater than zero",
                );
                let exclusive = ConditionMustBeTrueRule::new(
                    !(*is_veg && *is_non_veg),
                    "food cannot be both veg and non-veg",
                );
                let unique = ConditionMustBeTrueRule::new(
                    !self
                        .foods
                        .iter()
                        .any(|f| f.menu_id == *menu_id && f.name.eq_ignore_ascii_case(name.trim())),
                    format!("food '{}' already exists in this menu", name.trim()),
                );
                check_rules(&[&positive, &exclusive, &unique])?;

                Ok(vec![RestaurantEvent::FoodAdded(FoodAdded {
                    food_id: *food_id,
                    menu_id: *menu_id,
                    name: name.trim().to_string(),
                    description: description.clone(),
                    unit_price: *unit_price,
                    is_veg: *is_veg,
                    is_non_veg: *is_non_veg,
                    is_gluten_free: *is_gluten_free,
                    image_url: image_url.clone(),
                    food_type: *food_type,
                })])
            }

            RestaurantCommand::AddVariant { food_id, variant_id, name, name_eng, price } => {
                let food = self.require_food(*food_id)?;
                Self::validate_price(*price, "variant")?;
                check_rule(&ConditionMustBeTrueRule::new(
                    !food.variants.iter().any(|v| v.name.eq_ignore_ascii_case(name)),
                    format!("variant '{}' already exists", name),
                ))?;

                Ok(vec![RestaurantEvent::VariantAdded(VariantAdded {
                    food_id: *food_id,
                    variant_id: *variant_id,
                    name: name.clone(),
                    name_eng: name_eng.clone(),
                    price: *price,
                })])
            }

            RestaurantCommand::AddAddOn { food_id, add_on_id, name, name_eng, description, price } => {
                let food = self.require_food(*food_id)?;
                Self::validate_price(*price, "add-on")?;
                check_rule(&ConditionMustBeTrueRule::new(
                    !food.add_ons.iter().any(|a| a.name.eq_ignore_ascii_case(name)),
                    format!("add-on '{}' already exists", name),
                ))?;

                Ok(vec![RestaurantEvent::AddOnAdded(AddOnAdded {
                    food_id: *food_id,
                    add_on_id: *add_on_id,
                    name: name.clone(),
                    name_eng: name_eng.clone(),
                    description: description.clone(),
                    price: *price,
                })])
            }

            RestaurantCommand::ChangeFoodPrice { food_id, new_price } => {
                let food = self.require_food(*food_id)?;
                Self::validate_price(*new_price, "food")?;

                if food.unit_price.value() == *new_price {
                    return Ok(vec![]);
                }

                Ok(vec![RestaurantEvent::FoodPriceChanged(FoodPriceChanged {
                    food_id: *food_id,
                    old_price: food.unit_price.value(),
                    new_price: *new_price,
                })])
            }

            RestaurantCommand::ChangeFoodStatus { food_id, status } => {
                let food = self.require_food(*food_id)?;

                if food.status == *status {
                    return Ok(vec![]);
                }

                Ok(vec![RestaurantEvent::FoodStatusChanged(FoodStatusChanged {
                    food_id: *food_id,
                    status: *status,
                })])
            }

            RestaurantCommand::Review { customer_id, star_rate, comment } => {
                check_rule(&ConditionMustBeTrueRule::new(
                    (1..=5).contains(star_rate),
                    "star rate must be between 1 and 5",
                ))?;

                Ok(vec![RestaurantEvent::Reviewed(RestaurantReviewed {
                    customer_id: *customer_id,
                    star_rate: *star_rate,
                    comment: comment.clone(),
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn register_command(opening_hour: i32, closing_hour: i32) -> RestaurantCommand {
        RestaurantCommand::RegisterRestaurant {
            name: "Trattoria da Mario".to_string(),
            description: "Wood oven pizza".to_string(),
            phone_number: "333 123 4567".to_string(),
            locality_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            opening_hour,
            closing_hour,
            subscription: SubscriptionType::Basic,
            image_url: "https://img/mario.png".to_string(),
            manager_id: Uuid::new_v4(),
        }
    }

    fn registered() -> RestaurantAggregate {
        let (restaurant, _) = RestaurantAggregate::create(Uuid::new_v4(), &register_command(22, 10)).unwrap();
        restaurant
    }

    fn with_menu_and_food() -> (RestaurantAggregate, Uuid, Uuid) {
        let mut restaurant = registered();
        let menu_id = Uuid::new_v4();
        let food_id = Uuid::new_v4();

        restaurant
            .execute(&RestaurantCommand::AddMenu {
                menu_id,
                name: "Pizze".to_string(),
                name_eng: "Pizzas".to_string(),
                image_url: String::new(),
            })
            .unwrap();
        restaurant
            .execute(&RestaurantCommand::AddFood {
                food_id,
                menu_id,
                name: "Margherita".to_string(),
                description: "Tomato, mozzarella".to_string(),
                unit_price: dec!(6.50),
                is_veg: true,
                is_non_veg: false,
                is_gluten_free: false,
                image_url: String::new(),
                food_type: FoodType::Pizza,
            })
            .unwrap();

        (restaurant, menu_id, food_id)
    }

    #[test]
    fn test_register_restaurant() {
        let id = Uuid::new_v4();
        let (restaurant, event) = RestaurantAggregate::create(id, &register_command(22, 10)).unwrap();

        assert!(matches!(event, RestaurantEvent::Registered(_)));
        assert_eq!(restaurant.id, id);
        assert_eq!(restaurant.version, 1);
        assert_eq!(restaurant.state, RestaurantState::Closed);
        assert_eq!(restaurant.phone_number.complete_number(), "+393331234567");
        assert_eq!(restaurant.contract.status, ContractStatus::Unsigned);
    }

    #[test]
    fn test_register_rejects_daytime_hours() {
        let result = RestaurantAggregate::create(Uuid::new_v4(), &register_command(9, 22));

        match result {
            Err(RestaurantError::RuleViolation(v)) => {
                assert_eq!(v.first_message(), "opening and closing hours must be valid");
            }
            other => panic!("expected rule violation, got {:?}", other.map(|(r, _)| r.id)),
        }
    }

    #[test]
    fn test_register_collects_all_broken_rules() {
        let mut command = register_command(30, 10);
        if let RestaurantCommand::RegisterRestaurant { name, .. } = &mut command {
            *name = "  ".to_string();
        }

        let Err(RestaurantError::RuleViolation(v)) = RestaurantAggregate::create(Uuid::new_v4(), &command) else {
            panic!("expected rule violation");
        };
        assert_eq!(v.messages.len(), 2);
    }

    #[test]
    fn test_register_rejects_bad_phone() {
        let mut command = register_command(22, 10);
        if let RestaurantCommand::RegisterRestaurant { phone_number, .. } = &mut command {
            *phone_number = "not a phone".to_string();
        }

        assert!(matches!(
            RestaurantAggregate::create(Uuid::new_v4(), &command),
            Err(RestaurantError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_non_registration_command_cannot_create() {
        assert!(matches!(
            RestaurantAggregate::create(Uuid::new_v4(), &RestaurantCommand::Open),
            Err(RestaurantError::NotRegistered)
        ));
    }

    #[test]
    fn test_update_hours_uses_hours_rule() {
        let mut restaurant = registered();

        assert!(restaurant
            .execute(&RestaurantCommand::UpdateHours { opening_hour: 8, closing_hour: 20 })
            .is_err());

        restaurant
            .execute(&RestaurantCommand::UpdateHours { opening_hour: 23, closing_hour: 11 })
            .unwrap();
        assert_eq!(restaurant.opening_hour, 23);
        assert_eq!(restaurant.closing_hour, 11);
        assert_eq!(restaurant.version, 2);
    }

    #[test]
    fn test_open_requires_active_contract() {
        let mut restaurant = registered();

        assert!(matches!(
            restaurant.execute(&RestaurantCommand::Open),
            Err(RestaurantError::ContractNotActive(ContractStatus::Unsigned))
        ));

        restaurant
            .execute(&RestaurantCommand::SignContract {
                expiration_date: Utc::now() + Duration::days(365),
            })
            .unwrap();
        restaurant.execute(&RestaurantCommand::Open).unwrap();

        assert_eq!(restaurant.state, RestaurantState::Open);
        assert!(restaurant.accepts_orders());
        assert!(matches!(
            restaurant.execute(&RestaurantCommand::Open),
            Err(RestaurantError::AlreadyOpen)
        ));

        restaurant.execute(&RestaurantCommand::Close).unwrap();
        assert_eq!(restaurant.state, RestaurantState::Closed);
        assert!(!restaurant.accepts_orders());
    }

    #[test]
    fn test_effective_state_follows_the_clock() {
        let mut restaurant = registered();
        restaurant.state = RestaurantState::Open;
        restaurant.opening_hour = 12;
        restaurant.closing_hour = 12;

        assert_eq!(restaurant.effective_state(12), RestaurantState::Open);
        assert_eq!(restaurant.effective_state(13), RestaurantState::Closed);
    }

    #[test]
    fn test_menu_names_are_unique() {
        let (mut restaurant, _, _) = with_menu_and_food();

        let result = restaurant.execute(&RestaurantCommand::AddMenu {
            menu_id: Uuid::new_v4(),
            name: "pizze".to_string(),
            name_eng: "Pizzas".to_string(),
            image_url: String::new(),
        });

        assert!(matches!(result, Err(RestaurantError::RuleViolation(_))));
        assert_eq!(restaurant.menus.len(), 1);
    }

    #[test]
    fn test_add_food_rules() {
        let (mut restaurant, menu_id, _) = with_menu_and_food();

        let missing_menu = restaurant.execute(&RestaurantCommand::AddFood {
            food_id: Uuid::new_v4(),
            menu_id: Uuid::new_v4(),
            name: "Calzone".to_string(),
            description: String::new(),
            unit_price: dec!(8),
            is_veg: false,
            is_non_veg: true,
            is_gluten_free: false,
            image_url: String::new(),
            food_type: FoodType::Pizza,
        });
        assert!(matches!(missing_menu, Err(RestaurantError::MenuNotFound(_))));

        let Err(RestaurantError::RuleViolation(v)) = restaurant.execute(&RestaurantCommand::AddFood {
            food_id: Uuid::new_v4(),
            menu_id,
            name: "Strange".to_string(),
            description: String::new(),
            unit_price: dec!(0),
            is_veg: true,
            is_non_veg: true,
            is_gluten_free: false,
            image_url: String::new(),
            food_type: FoodType::Pizza,
        }) else {
            panic!("expected rule violation");
        };
        assert_eq!(v.messages.len(), 2);
    }

    #[test]
    fn test_variants_and_add_ons() {
        let (mut restaurant, _, food_id) = with_menu_and_food();
        let variant_id = Uuid::new_v4();
        let add_on_id = Uuid::new_v4();

        restaurant
            .execute(&RestaurantCommand::AddVariant {
                food_id,
                variant_id,
                name: "Maxi".to_string(),
                name_eng: "Large".to_string(),
                price: dec!(9),
            })
            .unwrap();
        restaurant
            .execute(&RestaurantCommand::AddAddOn {
                food_id,
                add_on_id,
                name: "Bufala".to_string(),
                name_eng: "Buffalo mozzarella".to_string(),
                description: String::new(),
                price: dec!(0.50),
            })
            .unwrap();

        let food = restaurant.food(food_id).unwrap();
        assert_eq!(food.variant(variant_id).unwrap().price, MoneyValue::of(dec!(9)));
        assert_eq!(food.add_on(add_on_id).unwrap().price.value(), dec!(0.50));

        let unknown_food = restaurant.execute(&RestaurantCommand::AddVariant {
            food_id: Uuid::new_v4(),
            variant_id: Uuid::new_v4(),
            name: "Mini".to_string(),
            name_eng: "Small".to_string(),
            price: dec!(4),
        });
        assert!(matches!(unknown_food, Err(RestaurantError::FoodNotFound(_))));
    }

    #[test]
    fn test_price_change_keeps_old_price() {
        let (mut restaurant, _, food_id) = with_menu_and_food();

        restaurant
            .execute(&RestaurantCommand::ChangeFoodPrice { food_id, new_price: dec!(7) })
            .unwrap();

        let food = restaurant.food(food_id).unwrap();
        assert_eq!(food.unit_price.value(), dec!(7));
        assert_eq!(food.old_unit_price.value(), dec!(6.50));

        let unchanged = restaurant
            .execute(&RestaurantCommand::ChangeFoodPrice { food_id, new_price: dec!(7) })
            .unwrap();
        assert!(unchanged.is_empty());
    }

    #[test]
    fn test_food_status() {
        let (mut restaurant, _, food_id) = with_menu_and_food();

        restaurant
            .execute(&RestaurantCommand::ChangeFoodStatus { food_id, status: FoodStatus::OutOfStock })
            .unwrap();

        assert!(!restaurant.food(food_id).unwrap().is_available());
    }

    #[test]
    fn test_reviews() {
        let mut restaurant = registered();

        for star_rate in [5, 3] {
            restaurant
                .execute(&RestaurantCommand::Review {
                    customer_id: Uuid::new_v4(),
                    star_rate,
                    comment: None,
                })
                .unwrap();
        }

        assert_eq!(restaurant.rating.count, 2);
        assert_eq!(restaurant.rating.average(), 4.0);

        let out_of_range = restaurant.execute(&RestaurantCommand::Review {
            customer_id: Uuid::new_v4(),
            star_rate: 6,
            comment: None,
        });
        assert!(out_of_range.is_err());
    }

    #[test]
    fn test_pricing_policy() {
        let mut restaurant = registered();

        let negative = restaurant.execute(&RestaurantCommand::SetPricingPolicy {
            policy: PricingPolicy {
                minimum_charge: dec!(-1),
                ..PricingPolicy::default()
            },
        });
        assert!(negative.is_err());

        restaurant
            .execute(&RestaurantCommand::SetPricingPolicy {
                policy: PricingPolicy {
                    minimum_charge: dec!(10),
                    maximum_charge: Some(dec!(4)),
                    fixed_charge: dec!(2),
                    additional_price: Some(dec!(1)),
                },
            })
            .unwrap();

        assert_eq!(restaurant.pricing_policy.unwrap().delivery_charge(), dec!(3));
    }
}
