#![warn(clippy::all)]

//! Core domain logic for the Rentour car-rental and tour booking front end.
//!
//! This crate hosts the listing models, the filter engine, the owner
//! session gate, owner inventory and booking management, configuration
//! and durable storage used by the terminal UI.

pub mod bookings;
pub mod catalog;
pub mod config;
pub mod filter;
pub mod inventory;
pub mod models;
pub mod session;
pub mod storage;

pub use bookings::{BookingError, BookingLedger, BookingRecord};
pub use catalog::{Catalog, CatalogEvent, CatalogSync, SearchHits};
pub use config::AppConfig;
pub use filter::{Criteria, PriceRange};
pub use inventory::{CarDraft, DraftError, Inventory, InventoryError, TourDraft};
pub use models::{Car, FilterKey, Listing, ListingKind, Tour};
pub use session::{Access, Profile, RouteGuard, SessionContext, SessionError, SessionGate};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
