use serde::{Deserialize, Serialize};

use super::listing::{lenient_string, FilterKey, Listing, ListingKind};

/// Categories offered by the public tour filters.
pub const TOUR_CATEGORIES: &[&str] = &[
    "Adventure",
    "Nature",
    "Cultural",
    "Water Sports",
    "Mountain",
    "Beach",
    "Wildlife",
    "City Tour",
    "Food & Culinary",
    "Religious",
];

/// Difficulties offered by the public tour filters.
pub const TOUR_DIFFICULTIES: &[&str] = &["Easy", "Moderate", "Challenging", "Extreme"];

/// Categories accepted by the add-package form.
pub const TOUR_PACKAGE_CATEGORIES: &[&str] = &[
    "Adventure",
    "Nature",
    "Cultural",
    "Water Sports",
    "City Tour",
    "Food Tour",
    "Historical",
];

/// Difficulties accepted by the add-package form.
pub const TOUR_PACKAGE_DIFFICULTIES: &[&str] = &["Easy", "Moderate", "Challenging", "Expert"];

/// Group sizes accepted by the add-package form.
pub const TOUR_GROUP_SIZES: &[u32] = &[1, 2, 4, 6, 8, 10, 12, 15, 20, 25];

/// A bookable tour package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub destination: Option<String>,
    /// Free-form length, e.g. `3 Days 2 Nights`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(
        default,
        alias = "groupSize",
        alias = "maxGroupSize",
        deserialize_with = "lenient_string"
    )]
    pub group_size: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default, alias = "reviewCount")]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "isAvailable")]
    pub available: Option<bool>,
}

impl Listing for Tour {
    const KIND: ListingKind = ListingKind::Tour;
    const FILTER_KEYS: &'static [FilterKey] = &[
        FilterKey::Category,
        FilterKey::Difficulty,
        FilterKey::Destination,
        FilterKey::PriceRange,
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.title.clone()
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.destination.as_deref());
        fields.extend(self.category.as_deref());
        fields.extend(self.description.as_deref());
        fields
    }

    fn field(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Category | FilterKey::Type => self.category.as_deref(),
            FilterKey::Difficulty => self.difficulty.as_deref(),
            FilterKey::Destination => self.destination.as_deref(),
            FilterKey::Search
            | FilterKey::Brand
            | FilterKey::Transmission
            | FilterKey::FuelType
            | FilterKey::PriceRange => None,
        }
    }

    fn price_text(&self) -> Option<&str> {
        self.price.as_deref()
    }

    /// Tours are only public once explicitly marked available.
    fn is_listed(&self) -> bool {
        self.available == Some(true)
    }

    fn is_available(&self) -> bool {
        self.is_listed()
    }

    fn set_available(&mut self, available: bool) {
        self.available = Some(available);
    }

    fn management_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.destination.as_deref());
        fields.extend(self.category.as_deref());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_and_text_fields_are_lenient() -> anyhow::Result<()> {
        let tour: Tour = serde_json::from_value(json!({
            "_id": "tour9",
            "title": "Coron Adventure Package",
            "destination": "Coron, Palawan",
            "duration": 3,
            "price": 11000,
            "maxGroupSize": 14,
            "difficulty": "Moderate",
            "isAvailable": true
        }))?;

        assert_eq!(tour.duration.as_deref(), Some("3"));
        assert_eq!(tour.group_size.as_deref(), Some("14"));
        assert_eq!(tour.price(), 11000);
        assert!(tour.is_listed());
        assert_eq!(tour.field(FilterKey::Brand), None);
        Ok(())
    }

    #[test]
    fn unknown_availability_is_not_listed() -> anyhow::Result<()> {
        let tour: Tour = serde_json::from_value(json!({ "id": "t", "title": "Walk" }))?;
        assert!(!tour.is_listed());
        assert_eq!(tour.search_fields(), vec!["Walk"]);
        Ok(())
    }
}
