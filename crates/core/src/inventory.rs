//! Owner management of the fleet and tour packages.
//!
//! Changes are local to the running process; nothing is written back to the
//! catalog source.

use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::info;

use crate::models::{
    Car, Listing, Tour, CAR_CATEGORIES, FUEL_TYPES, SEATING_OPTIONS, TOUR_GROUP_SIZES,
    TOUR_PACKAGE_CATEGORIES, TOUR_PACKAGE_DIFFICULTIES, TRANSMISSIONS,
};

/// Category filter value that means "every category".
pub const ALL_CATEGORIES: &str = "All";

const EARLIEST_MODEL_YEAR: i32 = 1990;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("no listing with id '{0}'")]
    NotFound(String),
    #[error("a listing with id '{0}' already exists")]
    DuplicateId(String),
}

/// A rejected add-form field.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct DraftError {
    pub field: &'static str,
    pub message: String,
}

impl DraftError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Mutable collection of cars or tours.
#[derive(Debug, Clone, Default)]
pub struct Inventory<T> {
    items: Vec<T>,
}

impl<T: Listing> Inventory<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Replace every record, e.g. after a remote refresh.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Remove and return the record with `id`.
    pub fn remove(&mut self, id: &str) -> Result<T, InventoryError> {
        let index = self
            .position(id)
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))?;
        let removed = self.items.remove(index);
        info!(kind = ?T::KIND, listing_id = %id, "Listing removed");
        Ok(removed)
    }

    /// Flip availability of `id`, returning the new state.
    pub fn toggle_availability(&mut self, id: &str) -> Result<bool, InventoryError> {
        let index = self
            .position(id)
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))?;
        let item = &mut self.items[index];
        let available = !item.is_available();
        item.set_available(available);
        info!(kind = ?T::KIND, listing_id = %id, available, "Availability toggled");
        Ok(available)
    }

    /// Append `item`; ids must be unique.
    pub fn add(&mut self, item: T) -> Result<(), InventoryError> {
        if self.position(item.id()).is_some() {
            return Err(InventoryError::DuplicateId(item.id().to_string()));
        }
        info!(kind = ?T::KIND, listing_id = %item.id(), "Listing added");
        self.items.push(item);
        Ok(())
    }

    /// First `{prefix}-{n}` id not already taken, counting from `len + 1`.
    pub fn next_id(&self, prefix: &str) -> String {
        let mut n = self.items.len() + 1;
        loop {
            let candidate = format!("{prefix}-{n}");
            if self.position(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Records matching the management search `term` and `category`
    /// (`""` or [`ALL_CATEGORIES`] match everything).
    pub fn search(&self, term: &str, category: &str) -> Vec<&T> {
        let needle = term.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                needle.is_empty()
                    || item
                        .management_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .filter(|item| match category {
                "" | ALL_CATEGORIES => true,
                wanted => item.category() == Some(wanted),
            })
            .collect()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

/// Raw add-car form input.
#[derive(Debug, Clone, Default)]
pub struct CarDraft {
    pub brand: String,
    pub model: String,
    pub year: String,
    pub category: String,
    pub seating_capacity: String,
    pub fuel_type: String,
    pub transmission: String,
    pub price_per_day: String,
    pub location: String,
    pub description: String,
}

impl CarDraft {
    /// Validate into an available [`Car`] with the given id.
    pub fn validate(&self, id: String) -> Result<Car, DraftError> {
        let max_year = Utc::now().year() + 1;
        let year = parse_number::<i32>("year", &self.year)?;
        if !(EARLIEST_MODEL_YEAR..=max_year).contains(&year) {
            return Err(DraftError::new(
                "year",
                format!("must be between {EARLIEST_MODEL_YEAR} and {max_year}"),
            ));
        }
        let seating = parse_number::<u32>("seating capacity", &self.seating_capacity)?;
        if !SEATING_OPTIONS.contains(&seating) {
            return Err(DraftError::new("seating capacity", "is not an offered option"));
        }
        let price = positive_price("price per day", &self.price_per_day)?;

        Ok(Car {
            id,
            brand: required("brand", &self.brand)?,
            model: required("model", &self.model)?,
            year: Some(year as u32),
            category: Some(one_of("category", &self.category, CAR_CATEGORIES)?),
            seating_capacity: Some(seating),
            fuel_type: Some(one_of("fuel type", &self.fuel_type, FUEL_TYPES)?),
            transmission: Some(one_of("transmission", &self.transmission, TRANSMISSIONS)?),
            price_per_day: Some(price.to_string()),
            location: Some(required("location", &self.location)?),
            description: Some(required("description", &self.description)?),
            features: Vec::new(),
            image: None,
            available: Some(true),
        })
    }
}

/// Raw add-package form input.
#[derive(Debug, Clone, Default)]
pub struct TourDraft {
    pub title: String,
    pub destination: String,
    pub duration_days: String,
    pub price: String,
    pub category: String,
    pub max_group_size: String,
    pub difficulty: String,
    pub description: String,
    /// Comma-separated.
    pub inclusions: String,
}

impl TourDraft {
    /// Validate into an available [`Tour`] with the given id.
    pub fn validate(&self, id: String) -> Result<Tour, DraftError> {
        let title = required("title", &self.title)?;
        let destination = required("destination", &self.destination)?;
        let days = parse_number::<u32>("duration", &self.duration_days)?;
        if days < 1 {
            return Err(DraftError::new("duration", "must be at least one day"));
        }
        let price = positive_price("price", &self.price)?;
        let category = one_of("category", &self.category, TOUR_PACKAGE_CATEGORIES)?;
        let group_size = parse_number::<u32>("max group size", &self.max_group_size)?;
        if !TOUR_GROUP_SIZES.contains(&group_size) {
            return Err(DraftError::new("max group size", "is not an offered option"));
        }
        let difficulty = one_of("difficulty", &self.difficulty, TOUR_PACKAGE_DIFFICULTIES)?;
        let description = required("description", &self.description)?;
        let inclusions = self
            .inclusions
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Tour {
            id,
            title,
            destination: Some(destination),
            duration: Some(days.to_string()),
            price: Some(price.to_string()),
            category: Some(category),
            group_size: Some(group_size.to_string()),
            difficulty: Some(difficulty),
            rating: None,
            review_count: None,
            description: Some(description),
            inclusions,
            image: None,
            available: Some(true),
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, DraftError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DraftError::new(field, "is required"));
    }
    Ok(value.to_string())
}

fn parse_number<N: std::str::FromStr>(field: &'static str, value: &str) -> Result<N, DraftError> {
    let value = required(field, value)?;
    value
        .parse()
        .map_err(|_| DraftError::new(field, format!("'{value}' is not a number")))
}

fn positive_price(field: &'static str, value: &str) -> Result<i64, DraftError> {
    let price = parse_number::<i64>(field, value)?;
    if price <= 0 {
        return Err(DraftError::new(field, "must be greater than zero"));
    }
    Ok(price)
}

fn one_of(field: &'static str, value: &str, allowed: &[&str]) -> Result<String, DraftError> {
    let value = required(field, value)?;
    allowed
        .iter()
        .find(|option| **option == value)
        .map(|option| option.to_string())
        .ok_or_else(|| DraftError::new(field, format!("'{value}' is not an offered option")))
}
