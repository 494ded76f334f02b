use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::FilterKey;

/// Currently selected filter values for one listing.
///
/// A key that is absent or mapped to an empty string imposes no
/// constraint; [`Criteria::set`] never stores empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<FilterKey, String>",
    into = "BTreeMap<FilterKey, String>"
)]
pub struct Criteria {
    values: BTreeMap<FilterKey, String>,
}

impl Criteria {
    /// Criteria with every key at its no-op default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Criteria::set`].
    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Criteria holding only a free-text query.
    pub fn search(query: impl Into<String>) -> Self {
        Self::new().with(FilterKey::Search, query)
    }

    /// Select `value` for `key`; an empty value resets the key.
    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    /// Reset `key` to its default.
    pub fn reset(&mut self, key: FilterKey) {
        self.values.remove(&key);
    }

    /// Reset every key.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Selected value for `key`, `""` when unconstrained.
    pub fn get(&self, key: FilterKey) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or("")
    }

    /// Whether `key` currently constrains results.
    pub fn is_active(&self, key: FilterKey) -> bool {
        self.values.contains_key(&key)
    }

    /// True when no key constrains results.
    pub fn is_default(&self) -> bool {
        self.values.is_empty()
    }

    /// Active `(key, value)` pairs in key order.
    pub fn active(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Number of active keys.
    pub fn active_count(&self) -> usize {
        self.values.len()
    }
}

impl<K: Into<String>> FromIterator<(FilterKey, K)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (FilterKey, K)>>(iter: I) -> Self {
        let mut criteria = Criteria::new();
        for (key, value) in iter {
            criteria.set(key, value);
        }
        criteria
    }
}

impl From<BTreeMap<FilterKey, String>> for Criteria {
    fn from(values: BTreeMap<FilterKey, String>) -> Self {
        values.into_iter().collect()
    }
}

impl From<Criteria> for BTreeMap<FilterKey, String> {
    fn from(criteria: Criteria) -> Self {
        criteria.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_reset_keys() {
        let mut criteria = Criteria::new().with(FilterKey::Brand, "Toyota");
        assert!(criteria.is_active(FilterKey::Brand));
        assert_eq!(criteria.get(FilterKey::Brand), "Toyota");

        criteria.set(FilterKey::Brand, "");
        assert!(criteria.is_default());
        assert_eq!(criteria.get(FilterKey::Brand), "");
    }

    #[test]
    fn serializes_as_plain_mapping() -> anyhow::Result<()> {
        let criteria: Criteria = [
            (FilterKey::FuelType, "Hybrid"),
            (FilterKey::PriceRange, ""),
            (FilterKey::Search, "camry"),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&criteria)?;
        assert_eq!(
            json,
            serde_json::json!({ "search": "camry", "fuelType": "Hybrid" })
        );
        assert_eq!(criteria.active_count(), 2);

        let parsed: Criteria =
            serde_json::from_value(serde_json::json!({ "brand": "", "type": "SUV" }))?;
        assert_eq!(parsed, Criteria::new().with(FilterKey::Type, "SUV"));
        Ok(())
    }
}
