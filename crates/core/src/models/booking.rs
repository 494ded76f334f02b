use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Capitalised form for display.
    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    /// Status changes the owner screens offer from this state.
    pub fn next_actions(self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
            BookingStatus::Confirmed => &[BookingStatus::Completed],
            BookingStatus::Completed | BookingStatus::Cancelled => &[],
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("unknown booking status '{s}'"))
    }
}

/// Payment state of a tour booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// Snapshot of the car embedded in a booking record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A customer's car rental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarBooking {
    #[serde(alias = "_id")]
    pub id: String,
    /// Absent when the referenced car no longer exists.
    #[serde(default)]
    pub car: Option<CarSummary>,
    pub status: BookingStatus,
    #[serde(alias = "pickupDate")]
    pub pickup_date: DateTime<Utc>,
    #[serde(alias = "returnDate")]
    pub return_date: DateTime<Utc>,
    pub price: i64,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Snapshot of the tour package embedded in a booking record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub destination: Option<String>,
    /// Length in days.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A customer's tour reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourBooking {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "tourPackage")]
    pub tour_package: Option<TourSummary>,
    #[serde(alias = "customerName")]
    pub customer_name: String,
    #[serde(default, alias = "customerEmail")]
    pub customer_email: Option<String>,
    #[serde(default, alias = "customerPhone")]
    pub customer_phone: Option<String>,
    #[serde(alias = "groupSize")]
    pub group_size: u32,
    #[serde(alias = "bookingDate")]
    pub booking_date: NaiveDate,
    #[serde(alias = "tourDate")]
    pub tour_date: NaiveDate,
    #[serde(alias = "totalPrice")]
    pub total_price: i64,
    pub status: BookingStatus,
    #[serde(default, alias = "specialRequests")]
    pub special_requests: Option<String>,
    #[serde(alias = "paymentStatus")]
    pub payment_status: PaymentStatus,
}
