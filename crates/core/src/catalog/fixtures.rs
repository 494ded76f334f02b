//! Datasets bundled into the library.

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;

use crate::models::{Car, CarBooking, Tour, TourBooking};

static CARS: Lazy<Vec<Car>> = Lazy::new(|| parse(include_str!("../../data/cars.json")));
static TOURS: Lazy<Vec<Tour>> = Lazy::new(|| parse(include_str!("../../data/tours.json")));
static CAR_BOOKINGS: Lazy<Vec<CarBooking>> =
    Lazy::new(|| parse(include_str!("../../data/car_bookings.json")));
static TOUR_BOOKINGS: Lazy<Vec<TourBooking>> =
    Lazy::new(|| parse(include_str!("../../data/tour_bookings.json")));

fn parse<T: DeserializeOwned>(raw: &str) -> Vec<T> {
    serde_json::from_str(raw).expect("bundled fixture is valid JSON")
}

pub fn cars() -> Vec<Car> {
    CARS.clone()
}

pub fn tours() -> Vec<Tour> {
    TOURS.clone()
}

pub fn car_bookings() -> Vec<CarBooking> {
    CAR_BOOKINGS.clone()
}

pub fn tour_bookings() -> Vec<TourBooking> {
    TOUR_BOOKINGS.clone()
}
