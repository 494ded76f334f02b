//! Public car and tour catalog.

pub mod fixtures;
mod remote;

pub use remote::{CatalogEvent, CatalogSync};

use crate::models::{Car, Listing, ListingKind, Tour};

/// Every known car and tour, listed or not.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub cars: Vec<Car>,
    pub tours: Vec<Tour>,
}

/// Result of the navigation-bar search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    pub cars: Vec<Car>,
    pub tours: Vec<Tour>,
}

impl SearchHits {
    pub fn is_empty(&self) -> bool {
        self.cars.is_empty() && self.tours.is_empty()
    }

    /// Listing to open for these hits; cars win ties.
    pub fn preferred(&self) -> Option<ListingKind> {
        if self.is_empty() {
            None
        } else if self.cars.len() >= self.tours.len() {
            Some(ListingKind::Car)
        } else {
            Some(ListingKind::Tour)
        }
    }
}

impl Catalog {
    pub fn new(cars: Vec<Car>, tours: Vec<Tour>) -> Self {
        Self { cars, tours }
    }

    /// Catalog built from the bundled datasets.
    pub fn fixtures() -> Self {
        Self::new(fixtures::cars(), fixtures::tours())
    }

    /// Cars shown to the public.
    pub fn listed_cars(&self) -> Vec<Car> {
        listed(&self.cars)
    }

    /// Tours shown to the public.
    pub fn listed_tours(&self) -> Vec<Tour> {
        listed(&self.tours)
    }

    /// Case-insensitive search over the public listings. A blank query finds
    /// nothing.
    pub fn global_search(&self, query: &str) -> SearchHits {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return SearchHits::default();
        }
        let hit = |fields: &[Option<&str>]| {
            fields
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
        };
        let cars = self
            .cars
            .iter()
            .filter(|car| car.is_listed())
            .filter(|car| {
                hit(&[
                    Some(car.brand.as_str()),
                    Some(car.model.as_str()),
                    car.category.as_deref(),
                    car.location.as_deref(),
                ])
            })
            .cloned()
            .collect();
        let tours = self
            .tours
            .iter()
            .filter(|tour| tour.is_listed())
            .filter(|tour| {
                hit(&[
                    Some(tour.title.as_str()),
                    tour.destination.as_deref(),
                    tour.category.as_deref(),
                ])
            })
            .cloned()
            .collect();
        SearchHits { cars, tours }
    }
}

fn listed<T: Listing>(items: &[T]) -> Vec<T> {
    items.iter().filter(|item| item.is_listed()).cloned().collect()
}
