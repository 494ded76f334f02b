//! Listing filter engine.
//!
//! Filtering is a pure function of a listing slice and a [`Criteria`] set:
//! every active criterion must hold (logical AND) and surviving items keep
//! their original relative order. Records are never mutated.

mod criteria;
mod price_range;

pub use criteria::Criteria;
pub use price_range::{
    find_price_range, price_ranges, PriceRange, CAR_PRICE_RANGES, TOUR_PRICE_RANGES,
};

use crate::models::{FilterKey, Listing, ListingKind, TOUR_CATEGORIES, TOUR_DIFFICULTIES};

/// Return the items of `items` satisfying every active criterion, in order.
pub fn apply<T: Listing>(items: &[T], criteria: &Criteria) -> Vec<T> {
    if criteria.is_default() {
        return items.to_vec();
    }
    let search = criteria.get(FilterKey::Search).to_lowercase();
    items
        .iter()
        .filter(|item| matches_prepared(*item, criteria, &search))
        .cloned()
        .collect()
}

fn matches_prepared<T: Listing>(item: &T, criteria: &Criteria, search: &str) -> bool {
    criteria.active().all(|(key, value)| match key {
        FilterKey::Search => text_matches(item, search),
        FilterKey::PriceRange => price_matches(item, value),
        FilterKey::Destination => item
            .field(key)
            .map(|field| field.to_lowercase().contains(&value.to_lowercase()))
            .unwrap_or(false),
        _ => item.field(key) == Some(value),
    })
}

fn text_matches<T: Listing>(item: &T, needle: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Unknown range labels impose no constraint.
fn price_matches<T: Listing>(item: &T, label: &str) -> bool {
    match find_price_range(T::KIND, label) {
        Some(range) => range.contains(item.price()),
        None => true,
    }
}

/// Selectable values for `key`, in display order.
///
/// Price bands come from the fixed per-kind tables, tour categories and
/// difficulties from the fixed tour lists; everything else is the set of
/// distinct values present in `items`, in first-seen order.
pub fn options<T: Listing>(key: FilterKey, items: &[T]) -> Vec<String> {
    match (T::KIND, key) {
        (_, FilterKey::PriceRange) => price_ranges(T::KIND)
            .iter()
            .map(|range| range.label.to_string())
            .collect(),
        (ListingKind::Tour, FilterKey::Category) => owned_list(TOUR_CATEGORIES),
        (ListingKind::Tour, FilterKey::Difficulty) => owned_list(TOUR_DIFFICULTIES),
        _ => distinct_values(items, key),
    }
}

/// Distinct present values of `key` across `items`, first-seen order.
pub fn distinct_values<T: Listing>(items: &[T], key: FilterKey) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in items.iter().filter_map(|item| item.field(key)) {
        if !values.iter().any(|seen| seen == value) {
            values.push(value.to_string());
        }
    }
    values
}

fn owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Car, Tour};

    fn car(id: &str, brand: &str, category: &str, transmission: &str, price: &str) -> Car {
        Car {
            id: id.to_string(),
            brand: brand.to_string(),
            model: format!("Model {id}"),
            year: Some(2022),
            category: Some(category.to_string()),
            seating_capacity: Some(5),
            fuel_type: Some("Petrol".to_string()),
            transmission: Some(transmission.to_string()),
            price_per_day: Some(price.to_string()),
            location: Some("Cebu City".to_string()),
            description: None,
            features: Vec::new(),
            image: None,
            available: Some(true),
        }
    }

    fn tour(id: &str, title: &str, destination: &str, price: &str) -> Tour {
        Tour {
            id: id.to_string(),
            title: title.to_string(),
            destination: Some(destination.to_string()),
            duration: Some("2 Days 1 Night".to_string()),
            price: Some(price.to_string()),
            category: Some("Adventure".to_string()),
            group_size: Some("10".to_string()),
            difficulty: Some("Easy".to_string()),
            rating: None,
            review_count: None,
            description: None,
            inclusions: Vec::new(),
            image: None,
            available: Some(true),
        }
    }

    fn fleet() -> Vec<Car> {
        vec![
            car("1", "Toyota", "Sedan", "Automatic", "2500"),
            car("2", "Honda", "SUV", "Manual", "3200"),
            car("3", "Toyota", "SUV", "Manual", "4000"),
            car("4", "Honda", "Sedan", "Automatic", "1800"),
            car("5", "Toyota", "Van", "Automatic", "6000"),
        ]
    }

    fn ids<T: Listing>(items: &[T]) -> Vec<&str> {
        items.iter().map(|item| item.id()).collect()
    }

    #[test]
    fn default_criteria_is_identity() {
        let cars = fleet();
        assert_eq!(apply(&cars, &Criteria::new()), cars);

        let mut criteria = Criteria::new().with(FilterKey::Brand, "Honda");
        criteria.reset(FilterKey::Brand);
        assert_eq!(apply(&cars, &criteria), cars);
    }

    #[test]
    fn brand_filter_keeps_matching_cars_in_order() {
        let cars = fleet();
        let result = apply(&cars, &Criteria::new().with(FilterKey::Brand, "Toyota"));
        assert_eq!(ids(&result), vec!["1", "3", "5"]);
    }

    #[test]
    fn categorical_filter_is_sound_and_complete() {
        let cars = fleet();
        for key in [FilterKey::Brand, FilterKey::Type, FilterKey::Transmission] {
            for value in distinct_values(&cars, key) {
                let result = apply(&cars, &Criteria::new().with(key, value.as_str()));
                assert!(result.iter().all(|car| car.field(key) == Some(value.as_str())));
                let expected = cars
                    .iter()
                    .filter(|car| car.field(key) == Some(value.as_str()))
                    .count();
                assert_eq!(result.len(), expected);
            }
        }
    }

    #[test]
    fn categorical_equality_is_case_sensitive() {
        let cars = fleet();
        assert!(apply(&cars, &Criteria::new().with(FilterKey::Brand, "toyota")).is_empty());
    }

    #[test]
    fn criteria_compose_as_conjunction() {
        let cars = fleet();
        let a = (FilterKey::Brand, "Toyota");
        let b = (FilterKey::Transmission, "Automatic");

        let both = apply(&cars, &Criteria::new().with(a.0, a.1).with(b.0, b.1));
        let chained = apply(
            &apply(&cars, &Criteria::new().with(a.0, a.1)),
            &Criteria::new().with(b.0, b.1),
        );
        let reversed = apply(
            &apply(&cars, &Criteria::new().with(b.0, b.1)),
            &Criteria::new().with(a.0, a.1),
        );
        assert_eq!(both, chained);
        assert_eq!(both, reversed);
        assert_eq!(ids(&both), vec!["1", "5"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let mut cars = fleet();
        cars[1].description = Some("Great for TOYOTA fans too".to_string());
        cars[3].features = vec!["Bluetooth".to_string()];

        let upper = apply(&cars, &Criteria::search("TOYOTA"));
        let lower = apply(&cars, &Criteria::search("toyota"));
        assert_eq!(upper, lower);
        assert_eq!(ids(&upper), vec!["1", "2", "3", "5"]);

        let by_feature = apply(&cars, &Criteria::search("bluetooth"));
        assert_eq!(ids(&by_feature), vec!["4"]);
    }

    #[test]
    fn missing_fields_never_match_active_filters() {
        let mut cars = fleet();
        cars[0].transmission = None;
        cars[0].description = None;
        let result = apply(&cars, &Criteria::new().with(FilterKey::Transmission, "Automatic"));
        assert_eq!(ids(&result), vec!["4", "5"]);

        // Cars have no difficulty, so any difficulty filter excludes them all.
        assert!(apply(&cars, &Criteria::new().with(FilterKey::Difficulty, "Easy")).is_empty());
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let cars = fleet();
        let result = apply(
            &cars,
            &Criteria::new().with(FilterKey::PriceRange, "₱2,000 - ₱4,000/day"),
        );
        assert_eq!(ids(&result), vec!["1", "2", "3"]);

        let above = apply(
            &cars,
            &Criteria::new().with(FilterKey::PriceRange, "Above ₱6,000/day"),
        );
        assert_eq!(ids(&above), vec!["5"]);
    }

    #[test]
    fn tour_price_band_selects_mid_range() {
        let tours: Vec<Tour> = ["1200", "3500", "8500", "12000", "18000"]
            .iter()
            .enumerate()
            .map(|(idx, price)| tour(&format!("t{idx}"), "Trip", "Bohol", price))
            .collect();

        let result = apply(
            &tours,
            &Criteria::new().with(FilterKey::PriceRange, "₱5,000 - ₱10,000"),
        );
        assert_eq!(
            result.iter().map(|tour| tour.price()).collect::<Vec<_>>(),
            vec![8500]
        );
    }

    #[test]
    fn unknown_price_label_is_ignored() {
        let cars = fleet();
        let result = apply(&cars, &Criteria::new().with(FilterKey::PriceRange, "Free"));
        assert_eq!(result, cars);
    }

    #[test]
    fn unparseable_price_counts_as_zero() {
        let mut cars = fleet();
        cars[2].price_per_day = Some("call us".to_string());
        cars[4].price_per_day = None;
        let result = apply(
            &cars,
            &Criteria::new().with(FilterKey::PriceRange, "Under ₱2,000/day"),
        );
        assert_eq!(ids(&result), vec!["3", "4", "5"]);
    }

    #[test]
    fn destination_is_case_insensitive_substring() {
        let tours = vec![
            tour("a", "Island Hopping", "El Nido, Palawan", "12000"),
            tour("b", "Heritage Walk", "Cebu City, Philippines", "1200"),
            tour("c", "Coron Package", "Coron, Palawan", "11000"),
        ];
        let result = apply(&tours, &Criteria::new().with(FilterKey::Destination, "PALAWAN"));
        assert_eq!(ids(&result), vec!["a", "c"]);
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let cars = fleet();
        let criteria = Criteria::search("honda").with(FilterKey::Type, "SUV");
        let first = apply(&cars, &criteria);
        let second = apply(&cars, &criteria);
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec!["2"]);
        assert_eq!(cars, fleet());
    }

    #[test]
    fn options_follow_kind_tables() {
        let cars = fleet();
        assert_eq!(options(FilterKey::Brand, &cars), vec!["Toyota", "Honda"]);
        assert_eq!(options(FilterKey::PriceRange, &cars).len(), CAR_PRICE_RANGES.len());

        let tours = vec![tour("a", "Trip", "Bohol", "1000")];
        assert_eq!(options(FilterKey::Difficulty, &tours), owned_list(TOUR_DIFFICULTIES));
        assert_eq!(options(FilterKey::Destination, &tours), vec!["Bohol"]);
    }
}
