// src/store/mod.rs
pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{Booking, BookingStatus, Car, CarCategory, Driver, Passenger};

/// A driver claimed for a booking, together with the car resolved from the
/// driver's weak car reference at claim time.
#[derive(Debug, Clone)]
pub struct ClaimedDriver {
    pub driver: Driver,
    pub car: Option<Car>,
}

/// Storage abstraction for the booking engine and entity registry.
///
/// Constructed once per process and passed explicitly to every service; the
/// core never touches ambient global state. Compound operations (claiming a
/// driver, the status compare-and-swap) are single critical sections so that
/// check-then-mutate sequences stay atomic under concurrent callers.
#[async_trait]
pub trait Store: Send + Sync {
    // Passengers
    async fn insert_passenger(&self, passenger: Passenger) -> AppResult<()>;
    async fn get_passenger(&self, id: &str) -> AppResult<Option<Passenger>>;
    async fn update_passenger(&self, passenger: Passenger) -> AppResult<()>;
    async fn delete_passenger(&self, id: &str) -> AppResult<()>;
    /// Append a booking id to the passenger's history (creation order).
    async fn append_booking_history(&self, passenger_id: &str, booking_id: &str) -> AppResult<()>;

    // Drivers
    async fn insert_driver(&self, driver: Driver) -> AppResult<()>;
    async fn get_driver(&self, id: &str) -> AppResult<Option<Driver>>;
    async fn update_driver(&self, driver: Driver) -> AppResult<()>;
    async fn delete_driver(&self, id: &str) -> AppResult<()>;
    async fn assign_car_to_driver(&self, driver_id: &str, car_id: &str) -> AppResult<Driver>;
    async fn set_driver_availability(&self, id: &str, is_available: bool) -> AppResult<Driver>;
    async fn record_driver_rating(&self, id: &str, rating: f64) -> AppResult<Driver>;
    /// Atomic check-and-set: succeeds only if the driver is currently
    /// available, and flips the driver (and its assigned car, if any) to
    /// unavailable in the same critical section. Two concurrent claims of the
    /// same driver must not both succeed.
    async fn claim_driver(&self, driver_id: &str) -> AppResult<ClaimedDriver>;
    /// Unconditionally restore availability. Tolerates records deleted since
    /// the claim was taken.
    async fn release_assignment(&self, driver_id: &str, car_id: Option<&str>) -> AppResult<()>;

    // Cars
    async fn insert_car(&self, car: Car) -> AppResult<()>;
    async fn get_car(&self, id: &str) -> AppResult<Option<Car>>;
    async fn update_car(&self, car: Car) -> AppResult<()>;
    async fn delete_car(&self, id: &str) -> AppResult<()>;
    async fn set_car_availability(&self, id: &str, is_available: bool) -> AppResult<Car>;
    async fn update_car_location(&self, id: &str, location: String) -> AppResult<Car>;
    async fn available_cars(&self, category: Option<CarCategory>) -> AppResult<Vec<Car>>;

    // Bookings
    async fn insert_booking(&self, booking: Booking) -> AppResult<()>;
    async fn get_booking(&self, id: &str) -> AppResult<Option<Booking>>;
    /// Optimistic compare-and-swap: replaces the stored booking only if its
    /// current status equals `expected`. Returns false when the status moved
    /// underneath the caller.
    async fn update_booking_if(&self, booking: Booking, expected: BookingStatus) -> AppResult<bool>;
    async fn bookings_by_passenger(&self, passenger_id: &str) -> AppResult<Vec<Booking>>;
    async fn bookings_by_driver(&self, driver_id: &str) -> AppResult<Vec<Booking>>;
}
