// src/models/mod.rs
pub mod booking;
pub mod car;
pub mod driver;
pub mod fare;
pub mod passenger;

pub use booking::*;
pub use car::*;
pub use driver::*;
pub use fare::*;
pub use passenger::*;
