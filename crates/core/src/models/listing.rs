use std::{fmt, str::FromStr};

use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which collection a listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Car,
    Tour,
}

impl ListingKind {
    /// Plural heading used by listing screens.
    pub fn label(self) -> &'static str {
        match self {
            ListingKind::Car => "Cars",
            ListingKind::Tour => "Tours",
        }
    }
}

/// Name of a single criterion in a [`Criteria`](crate::filter::Criteria) set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    Search,
    Brand,
    Type,
    Transmission,
    FuelType,
    Difficulty,
    Category,
    Destination,
    PriceRange,
}

impl FilterKey {
    /// Every key, in display order.
    pub const ALL: [FilterKey; 9] = [
        FilterKey::Search,
        FilterKey::Brand,
        FilterKey::Type,
        FilterKey::Transmission,
        FilterKey::FuelType,
        FilterKey::Difficulty,
        FilterKey::Category,
        FilterKey::Destination,
        FilterKey::PriceRange,
    ];

    /// Wire name of the key.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::Search => "search",
            FilterKey::Brand => "brand",
            FilterKey::Type => "type",
            FilterKey::Transmission => "transmission",
            FilterKey::FuelType => "fuelType",
            FilterKey::Difficulty => "difficulty",
            FilterKey::Category => "category",
            FilterKey::Destination => "destination",
            FilterKey::PriceRange => "priceRange",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FilterKey::Search => "Search",
            FilterKey::Brand => "Brand",
            FilterKey::Type => "Type",
            FilterKey::Transmission => "Transmission",
            FilterKey::FuelType => "Fuel",
            FilterKey::Difficulty => "Difficulty",
            FilterKey::Category => "Category",
            FilterKey::Destination => "Destination",
            FilterKey::PriceRange => "Price",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("unknown filter '{s}'"))
    }
}

/// A record that can be listed, searched and filtered.
pub trait Listing: Clone {
    /// Collection this record belongs to.
    const KIND: ListingKind;

    /// Categorical/range keys offered for this kind (search excluded).
    const FILTER_KEYS: &'static [FilterKey];

    fn id(&self) -> &str;

    /// Short title for list rows.
    fn display_name(&self) -> String;

    /// Present text fields consulted by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Value backing a categorical criterion, `None` when the record has no
    /// such field or it is absent.
    fn field(&self, key: FilterKey) -> Option<&str>;

    /// Raw text of the canonical price field.
    fn price_text(&self) -> Option<&str>;

    /// Best-effort integer price, 0 when absent or unparseable.
    fn price(&self) -> i64 {
        self.price_text().map(parse_price).unwrap_or(0)
    }

    /// Whether the record shows up in the public listing.
    fn is_listed(&self) -> bool;

    /// Owner-facing availability flag.
    fn is_available(&self) -> bool;

    fn set_available(&mut self, available: bool);

    /// Text fields consulted by the owner management search.
    fn management_fields(&self) -> Vec<&str>;

    /// Category used by the owner management select.
    fn category(&self) -> Option<&str> {
        self.field(FilterKey::Category)
    }
}

static LEADING_INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("failed to compile price regex"));

/// Parse the leading integer of `raw`, returning 0 when there is none.
///
/// `"8500"` → 8500, `" 1200.50"` → 1200, `"12k"` → 12, `"n/a"` → 0.
pub fn parse_price(raw: &str) -> i64 {
    LEADING_INT_RE
        .captures(raw)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().trim_start_matches('+').parse::<i64>().ok())
        .unwrap_or(0)
}

/// Accept a JSON string or number (or null) as an optional string.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(num)) => Some(num.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_integer() {
        assert_eq!(parse_price("8500"), 8500);
        assert_eq!(parse_price("  1200.75"), 1200);
        assert_eq!(parse_price("12k"), 12);
        assert_eq!(parse_price("+40"), 40);
        assert_eq!(parse_price("-5"), -5);
        assert_eq!(parse_price("n/a"), 0);
        assert_eq!(parse_price(""), 0);
        assert_eq!(parse_price("99999999999999999999999"), 0);
    }

    #[test]
    fn filter_keys_round_trip_through_names() {
        for key in FilterKey::ALL {
            assert_eq!(key.as_str().parse::<FilterKey>().ok(), Some(key));
        }
        assert_eq!("FUELTYPE".parse::<FilterKey>().ok(), Some(FilterKey::FuelType));
        assert!("colour".parse::<FilterKey>().is_err());
    }
}
