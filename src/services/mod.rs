// src/services/mod.rs
pub mod booking_service;
pub mod car_service;
pub mod driver_service;
pub mod passenger_service;

pub use booking_service::{BookingOperations, BookingService};
pub use car_service::{CarOperations, CarService};
pub use driver_service::{DriverOperations, DriverService};
pub use passenger_service::{PassengerOperations, PassengerService};
