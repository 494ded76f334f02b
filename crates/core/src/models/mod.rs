//! Shared domain models.

mod booking;
mod car;
mod listing;
mod tour;

pub use booking::{
    BookingStatus, CarBooking, CarSummary, PaymentStatus, TourBooking, TourSummary,
};
pub use car::{Car, CAR_CATEGORIES, FUEL_TYPES, SEATING_OPTIONS, TRANSMISSIONS};
pub use listing::{parse_price, FilterKey, Listing, ListingKind};
pub use tour::{
    Tour, TOUR_CATEGORIES, TOUR_DIFFICULTIES, TOUR_GROUP_SIZES, TOUR_PACKAGE_CATEGORIES,
    TOUR_PACKAGE_DIFFICULTIES,
};
