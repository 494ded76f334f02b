use serde::{Deserialize, Serialize};

use super::listing::{lenient_string, parse_price, FilterKey, Listing, ListingKind};

/// Body styles accepted by the add-car form.
pub const CAR_CATEGORIES: &[&str] = &[
    "Sedan",
    "SUV",
    "Hatchback",
    "Coupe",
    "Convertible",
    "Pickup",
    "Van",
];

/// Fuel types accepted by the add-car form.
pub const FUEL_TYPES: &[&str] = &["Petrol", "Diesel", "Electric", "Hybrid"];

/// Transmissions accepted by the add-car form.
pub const TRANSMISSIONS: &[&str] = &["Manual", "Automatic", "Semi-Automatic"];

/// Seat counts accepted by the add-car form.
pub const SEATING_OPTIONS: &[u32] = &[2, 4, 5, 7, 8];

/// A rentable car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CarRecord")]
pub struct Car {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub year: Option<u32>,
    /// Body style; the public listing calls this the car "type".
    pub category: Option<String>,
    pub seating_capacity: Option<u32>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    /// Daily rate, kept as received (`"2500"` or `2500`).
    pub price_per_day: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub image: Option<String>,
    pub available: Option<bool>,
}

/// Wire shape of a car. Backends send the daily rate as `price`,
/// `pricePerDay` or both.
#[derive(Deserialize)]
struct CarRecord {
    #[serde(alias = "_id")]
    id: String,
    brand: String,
    model: String,
    #[serde(default)]
    year: Option<u32>,
    #[serde(default, alias = "type")]
    category: Option<String>,
    #[serde(default, alias = "seatingCapacity")]
    seating_capacity: Option<u32>,
    #[serde(default, alias = "fuelType")]
    fuel_type: Option<String>,
    #[serde(default)]
    transmission: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    price: Option<String>,
    #[serde(default, alias = "pricePerDay", deserialize_with = "lenient_string")]
    price_per_day: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, alias = "isAvailable", alias = "isAvaliable")]
    available: Option<bool>,
}

impl From<CarRecord> for Car {
    fn from(record: CarRecord) -> Self {
        // `price` wins unless it is missing or zero.
        let price_per_day = match record.price {
            Some(price) if parse_price(&price) != 0 => Some(price),
            price => record.price_per_day.or(price),
        };
        Self {
            id: record.id,
            brand: record.brand,
            model: record.model,
            year: record.year,
            category: record.category,
            seating_capacity: record.seating_capacity,
            fuel_type: record.fuel_type,
            transmission: record.transmission,
            price_per_day,
            location: record.location,
            description: record.description,
            features: record.features,
            image: record.image,
            available: record.available,
        }
    }
}

impl Listing for Car {
    const KIND: ListingKind = ListingKind::Car;
    const FILTER_KEYS: &'static [FilterKey] = &[
        FilterKey::Brand,
        FilterKey::Type,
        FilterKey::Transmission,
        FilterKey::FuelType,
        FilterKey::PriceRange,
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} {} ({year})", self.brand, self.model),
            None => format!("{} {}", self.brand, self.model),
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.brand.as_str(), self.model.as_str()];
        fields.extend(self.category.as_deref());
        fields.extend(self.features.iter().map(String::as_str));
        fields.extend(self.description.as_deref());
        fields
    }

    fn field(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Brand => Some(self.brand.as_str()),
            FilterKey::Type | FilterKey::Category => self.category.as_deref(),
            FilterKey::Transmission => self.transmission.as_deref(),
            FilterKey::FuelType => self.fuel_type.as_deref(),
            FilterKey::Destination => self.location.as_deref(),
            FilterKey::Search | FilterKey::Difficulty | FilterKey::PriceRange => None,
        }
    }

    fn price_text(&self) -> Option<&str> {
        self.price_per_day.as_deref()
    }

    fn is_listed(&self) -> bool {
        self.available != Some(false)
    }

    fn is_available(&self) -> bool {
        self.is_listed()
    }

    fn set_available(&mut self, available: bool) {
        self.available = Some(available);
    }

    fn management_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.brand.as_str(), self.model.as_str()];
        fields.extend(self.location.as_deref());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_backend_field_spellings() -> anyhow::Result<()> {
        let car: Car = serde_json::from_value(json!({
            "_id": "67ff5bc069c03d4e45f30b77",
            "brand": "BMW",
            "model": "X5",
            "type": "SUV",
            "fuelType": "Diesel",
            "pricePerDay": 300,
            "isAvaliable": false
        }))?;

        assert_eq!(car.id, "67ff5bc069c03d4e45f30b77");
        assert_eq!(car.field(FilterKey::Type), Some("SUV"));
        assert_eq!(car.field(FilterKey::FuelType), Some("Diesel"));
        assert_eq!(car.price(), 300);
        assert!(!car.is_listed());
        assert_eq!(car.field(FilterKey::Transmission), None);
        Ok(())
    }

    #[test]
    fn both_price_spellings_fold_into_daily_rate() -> anyhow::Result<()> {
        let car: Car = serde_json::from_value(json!({
            "_id": "c1",
            "brand": "Toyota",
            "model": "Vios",
            "price": 1800,
            "pricePerDay": 1700
        }))?;
        assert_eq!(car.price(), 1800);

        let car: Car = serde_json::from_value(json!({
            "_id": "c2",
            "brand": "Toyota",
            "model": "Vios",
            "price": 0,
            "pricePerDay": "1700"
        }))?;
        assert_eq!(car.price(), 1700);

        let stored = serde_json::to_value(&car)?;
        let restored: Car = serde_json::from_value(stored)?;
        assert_eq!(restored, car);
        Ok(())
    }

    #[test]
    fn missing_availability_still_lists() -> anyhow::Result<()> {
        let car: Car = serde_json::from_value(json!({
            "id": "c1",
            "brand": "Honda",
            "model": "Civic",
            "price": "not quoted"
        }))?;
        assert!(car.is_listed());
        assert_eq!(car.price(), 0);
        assert_eq!(car.display_name(), "Honda Civic");
        Ok(())
    }
}
