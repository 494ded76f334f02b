use serde::Serialize;

use crate::models::ListingKind;

/// A named, inclusive price band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
}

impl PriceRange {
    const fn new(label: &'static str, min: i64, max: i64) -> Self {
        Self { label, min, max }
    }

    /// Whether `price` falls inside the band, bounds included.
    pub fn contains(&self, price: i64) -> bool {
        self.min <= price && price <= self.max
    }
}

/// Daily-rate bands for cars.
pub const CAR_PRICE_RANGES: &[PriceRange] = &[
    PriceRange::new("Under ₱2,000/day", 0, 2000),
    PriceRange::new("₱2,000 - ₱4,000/day", 2000, 4000),
    PriceRange::new("₱4,000 - ₱6,000/day", 4000, 6000),
    PriceRange::new("Above ₱6,000/day", 6000, 999_999),
];

/// Package-price bands for tours.
pub const TOUR_PRICE_RANGES: &[PriceRange] = &[
    PriceRange::new("Under ₱5,000", 0, 5000),
    PriceRange::new("₱5,000 - ₱10,000", 5000, 10000),
    PriceRange::new("₱10,000 - ₱15,000", 10000, 15000),
    PriceRange::new("Above ₱15,000", 15000, 999_999),
];

/// Ordered bands offered for `kind`.
pub fn price_ranges(kind: ListingKind) -> &'static [PriceRange] {
    match kind {
        ListingKind::Car => CAR_PRICE_RANGES,
        ListingKind::Tour => TOUR_PRICE_RANGES,
    }
}

/// Band labelled `label` for `kind`, if any.
pub fn find_price_range(kind: ListingKind, label: &str) -> Option<&'static PriceRange> {
    price_ranges(kind).iter().find(|range| range.label == label)
}
