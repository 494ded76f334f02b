//! Owner-side booking management over car rentals and tour reservations.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use thiserror::Error;
use tracing::info;

use crate::models::{BookingStatus, CarBooking, TourBooking};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Status filter value that means "every status".
pub const ALL_STATUSES: &str = "All";

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("booking '{0}' not found")]
    NotFound(String),
}

/// A booking record the owner screens can search and update.
pub trait BookingRecord: Clone {
    fn id(&self) -> &str;

    fn status(&self) -> BookingStatus;

    fn set_status(&mut self, status: BookingStatus);

    /// Text consulted by the owner search. Empty when the embedded listing
    /// is missing.
    fn search_fields(&self) -> Vec<&str>;

    /// Records whose car or tour snapshot is gone are never shown.
    fn has_listing(&self) -> bool;
}

impl BookingRecord for CarBooking {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn set_status(&mut self, status: BookingStatus) {
        self.status = status;
    }

    fn search_fields(&self) -> Vec<&str> {
        match &self.car {
            Some(car) => vec![car.brand.as_str(), car.model.as_str(), self.id.as_str()],
            None => Vec::new(),
        }
    }

    fn has_listing(&self) -> bool {
        self.car.is_some()
    }
}

impl BookingRecord for TourBooking {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> BookingStatus {
        self.status
    }

    fn set_status(&mut self, status: BookingStatus) {
        self.status = status;
    }

    fn search_fields(&self) -> Vec<&str> {
        match &self.tour_package {
            Some(tour) => vec![
                tour.title.as_str(),
                self.customer_name.as_str(),
                self.id.as_str(),
            ],
            None => Vec::new(),
        }
    }

    fn has_listing(&self) -> bool {
        self.tour_package.is_some()
    }
}

/// In-memory list of bookings of one kind.
#[derive(Debug, Clone, Default)]
pub struct BookingLedger<B> {
    records: Vec<B>,
}

impl<B: BookingRecord> BookingLedger<B> {
    pub fn new(records: Vec<B>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[B] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&B> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Listable records matching `term` (case-insensitive substring) and
    /// `status` (`""` or [`ALL_STATUSES`] match everything).
    pub fn filtered(&self, term: &str, status: &str) -> Vec<&B> {
        let needle = term.trim().to_lowercase();
        let wanted = match status {
            "" | ALL_STATUSES => None,
            other => Some(other.parse::<BookingStatus>().ok()),
        };
        self.records
            .iter()
            .filter(|record| record.has_listing())
            .filter(|record| {
                needle.is_empty()
                    || record
                        .search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            })
            .filter(|record| wanted.map_or(true, |status| status == Some(record.status())))
            .collect()
    }

    /// Set the status of booking `id`. Any transition is accepted.
    pub fn update_status(&mut self, id: &str, status: BookingStatus) -> Result<(), BookingError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| BookingError::NotFound(id.to_string()))?;
        let previous = record.status();
        record.set_status(status);
        info!(booking_id = %id, from = %previous, to = %status, "Booking status updated");
        Ok(())
    }

    /// Number of records per status, in [`BookingStatus::ALL`] order.
    pub fn status_counts(&self) -> [(BookingStatus, usize); 4] {
        BookingStatus::ALL.map(|status| {
            let count = self
                .records
                .iter()
                .filter(|record| record.has_listing() && record.status() == status)
                .count();
            (status, count)
        })
    }
}

/// Whole rental days between pickup and return, rounded up; a same-day
/// rental counts as one day.
pub fn rental_days(pickup: DateTime<Utc>, return_at: DateTime<Utc>) -> i64 {
    let millis = (return_at - pickup).num_milliseconds().abs();
    let days = (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
    days.max(1)
}

/// Last eight characters of a booking id, for compact display.
pub fn short_ref(id: &str) -> &str {
    match id.char_indices().rev().nth(7) {
        Some((start, _)) => &id[start..],
        None => id,
    }
}

/// `Mon D, YYYY`, e.g. `Aug 5, 2024`.
pub fn format_date(date: NaiveDate) -> String {
    format!("{} {}, {}", date.format("%b"), date.day(), date.year())
}

/// `YYYY-MM-DD` of a timestamp.
pub fn format_iso_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CarSummary, PaymentStatus, TourSummary};
    use anyhow::Result;
    use chrono::TimeZone;

    fn car_booking(id: &str, brand: &str, status: BookingStatus) -> CarBooking {
        let pickup = Utc.with_ymd_and_hms(2025, 6, 13, 0, 0, 0).unwrap();
        CarBooking {
            id: id.to_string(),
            car: Some(CarSummary {
                id: format!("car-{id}"),
                brand: brand.to_string(),
                model: "Vios".to_string(),
                year: Some(2023),
                category: Some("Sedan".to_string()),
                location: None,
                image: None,
            }),
            status,
            pickup_date: pickup,
            return_date: pickup + chrono::Duration::days(3),
            price: 5400,
            created_at: pickup,
        }
    }

    fn tour_booking(id: &str, customer: &str, status: BookingStatus) -> TourBooking {
        TourBooking {
            id: id.to_string(),
            tour_package: Some(TourSummary {
                id: "tour1".to_string(),
                title: "Bohol Countryside Adventure".to_string(),
                destination: None,
                duration: Some(3),
                price: Some(8500),
                category: None,
                image: None,
            }),
            customer_name: customer.to_string(),
            customer_email: None,
            customer_phone: None,
            group_size: 2,
            booking_date: NaiveDate::from_ymd_opt(2024, 8, 10).unwrap(),
            tour_date: NaiveDate::from_ymd_opt(2024, 8, 25).unwrap(),
            total_price: 17000,
            status,
            special_requests: None,
            payment_status: PaymentStatus::Pending,
        }
    }

    #[test]
    fn filters_by_term_and_status() {
        let mut orphan = car_booking("00000000cafe0003", "Ford", BookingStatus::Pending);
        orphan.car = None;
        let ledger = BookingLedger::new(vec![
            car_booking("00000000cafe0001", "Toyota", BookingStatus::Pending),
            car_booking("00000000cafe0002", "Honda", BookingStatus::Confirmed),
            orphan,
        ]);

        assert_eq!(ledger.filtered("", "").len(), 2);
        assert_eq!(ledger.filtered("", ALL_STATUSES).len(), 2);
        assert_eq!(ledger.filtered("TOYOTA", "")[0].id, "00000000cafe0001");
        assert_eq!(ledger.filtered("cafe0002", "").len(), 1);
        assert_eq!(ledger.filtered("", "confirmed")[0].id, "00000000cafe0002");
        assert!(ledger.filtered("toyota", "confirmed").is_empty());
        assert!(ledger.filtered("ford", "").is_empty());
    }

    #[test]
    fn tour_bookings_search_customer_names() {
        let ledger = BookingLedger::new(vec![
            tour_booking("b1", "Maria Santos", BookingStatus::Confirmed),
            tour_booking("b2", "John Cruz", BookingStatus::Pending),
        ]);
        let hits = ledger.filtered("john", "");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b2");
        assert_eq!(ledger.filtered("bohol", "").len(), 2);
    }

    #[test]
    fn status_updates_are_unconditional() -> Result<()> {
        let mut ledger = BookingLedger::new(vec![tour_booking(
            "b1",
            "Lisa Wang",
            BookingStatus::Completed,
        )]);
        ledger.update_status("b1", BookingStatus::Pending)?;
        assert_eq!(ledger.records()[0].status, BookingStatus::Pending);
        assert!(matches!(
            ledger.update_status("missing", BookingStatus::Cancelled),
            Err(BookingError::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn next_actions_follow_lifecycle() {
        assert_eq!(
            BookingStatus::Pending.next_actions(),
            &[BookingStatus::Confirmed, BookingStatus::Cancelled]
        );
        assert_eq!(
            BookingStatus::Confirmed.next_actions(),
            &[BookingStatus::Completed]
        );
        assert!(BookingStatus::Cancelled.next_actions().is_empty());
    }

    #[test]
    fn rental_days_round_up_with_one_day_minimum() {
        let start = Utc.with_ymd_and_hms(2025, 6, 13, 10, 0, 0).unwrap();
        assert_eq!(rental_days(start, start), 1);
        assert_eq!(rental_days(start, start + chrono::Duration::hours(25)), 2);
        assert_eq!(rental_days(start, start + chrono::Duration::days(3)), 3);
        assert_eq!(rental_days(start + chrono::Duration::days(2), start), 2);
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(short_ref("68482b1e6c2a9f1d7c3e5a01"), "7c3e5a01");
        assert_eq!(short_ref("abc"), "abc");
        assert_eq!(
            format_date(NaiveDate::from_ymd_opt(2024, 8, 5).unwrap()),
            "Aug 5, 2024"
        );
        let at = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(format_iso_date(at), "2025-07-01");
    }

    #[test]
    fn status_filter_accepts_labels_and_rejects_unknowns() {
        let ledger = BookingLedger::new(vec![
            car_booking("a", "Toyota", BookingStatus::Pending),
            car_booking("b", "Honda", BookingStatus::Confirmed),
        ]);
        assert_eq!(ledger.filtered("", "Confirmed").len(), 1);
        assert_eq!(ledger.filtered("", " pending ").len(), 1);
        assert!(ledger.filtered("", "shipped").is_empty());
        assert_eq!(ledger.filtered("", ALL_STATUSES).len(), 2);
    }

    #[test]
    fn status_counts_skip_orphans() {
        let mut orphan = car_booking("x", "Ford", BookingStatus::Pending);
        orphan.car = None;
        let ledger = BookingLedger::new(vec![
            car_booking("a", "Toyota", BookingStatus::Pending),
            orphan,
        ]);
        assert_eq!(ledger.status_counts()[0], (BookingStatus::Pending, 1));
    }
}
