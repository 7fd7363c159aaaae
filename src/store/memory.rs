// src/store/memory.rs
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::{AppError, AppResult};
use crate::models::{Booking, BookingStatus, Car, CarCategory, Driver, Passenger};
use crate::store::{ClaimedDriver, Store};

#[derive(Default)]
struct StoreInner {
    passengers: HashMap<String, Passenger>,
    drivers: HashMap<String, Driver>,
    cars: HashMap<String, Car>,
    bookings: HashMap<String, Booking>,
    booking_order: Vec<String>, // Insertion order for stable scans
}

/// In-memory store. A single lock over all entity maps, so every compound
/// operation is one critical section.
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_passenger(&self, passenger: Passenger) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.passengers.insert(passenger.id.clone(), passenger);
        Ok(())
    }

    async fn get_passenger(&self, id: &str) -> AppResult<Option<Passenger>> {
        let inner = self.inner.read().await;
        Ok(inner.passengers.get(id).cloned())
    }

    async fn update_passenger(&self, passenger: Passenger) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.passengers.get_mut(&passenger.id) {
            Some(existing) => {
                *existing = passenger;
                Ok(())
            }
            None => Err(AppError::passenger_not_found(passenger.id)),
        }
    }

    async fn delete_passenger(&self, id: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .passengers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::passenger_not_found(id))
    }

    async fn append_booking_history(&self, passenger_id: &str, booking_id: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.passengers.get_mut(passenger_id) {
            Some(passenger) => {
                passenger.add_to_booking_history(booking_id);
                Ok(())
            }
            None => Err(AppError::passenger_not_found(passenger_id)),
        }
    }

    async fn insert_driver(&self, driver: Driver) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.drivers.insert(driver.id.clone(), driver);
        Ok(())
    }

    async fn get_driver(&self, id: &str) -> AppResult<Option<Driver>> {
        let inner = self.inner.read().await;
        Ok(inner.drivers.get(id).cloned())
    }

    async fn update_driver(&self, driver: Driver) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.drivers.get_mut(&driver.id) {
            Some(existing) => {
                *existing = driver;
                Ok(())
            }
            None => Err(AppError::driver_not_found(driver.id)),
        }
    }

    async fn delete_driver(&self, id: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .drivers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::driver_not_found(id))
    }

    async fn assign_car_to_driver(&self, driver_id: &str, car_id: &str) -> AppResult<Driver> {
        let mut inner = self.inner.write().await;
        if !inner.cars.contains_key(car_id) {
            return Err(AppError::car_not_found(car_id));
        }
        match inner.drivers.get_mut(driver_id) {
            Some(driver) => {
                driver.assigned_car_id = Some(car_id.to_string());
                Ok(driver.clone())
            }
            None => Err(AppError::driver_not_found(driver_id)),
        }
    }

    async fn set_driver_availability(&self, id: &str, is_available: bool) -> AppResult<Driver> {
        let mut inner = self.inner.write().await;
        match inner.drivers.get_mut(id) {
            Some(driver) => {
                driver.is_available = is_available;
                Ok(driver.clone())
            }
            None => Err(AppError::driver_not_found(id)),
        }
    }

    async fn record_driver_rating(&self, id: &str, rating: f64) -> AppResult<Driver> {
        let mut inner = self.inner.write().await;
        match inner.drivers.get_mut(id) {
            Some(driver) => {
                driver.record_rating(rating);
                Ok(driver.clone())
            }
            None => Err(AppError::driver_not_found(id)),
        }
    }

    async fn claim_driver(&self, driver_id: &str) -> AppResult<ClaimedDriver> {
        let mut inner = self.inner.write().await;

        let (driver, car_id) = {
            let driver = inner
                .drivers
                .get_mut(driver_id)
                .ok_or_else(|| AppError::driver_not_found(driver_id))?;
            if !driver.is_available {
                return Err(AppError::DriverNotAvailable(driver_id.to_string()));
            }
            driver.is_available = false;
            (driver.clone(), driver.assigned_car_id.clone())
        };

        // The driver may have no car assigned; the claim still succeeds and
        // callers must cope with the missing car.
        let car = car_id.and_then(|car_id| {
            inner.cars.get_mut(&car_id).map(|car| {
                car.is_available = false;
                car.clone()
            })
        });

        Ok(ClaimedDriver { driver, car })
    }

    async fn release_assignment(&self, driver_id: &str, car_id: Option<&str>) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(driver) = inner.drivers.get_mut(driver_id) {
            driver.is_available = true;
        }
        if let Some(car_id) = car_id {
            if let Some(car) = inner.cars.get_mut(car_id) {
                car.is_available = true;
            }
        }
        Ok(())
    }

    async fn insert_car(&self, car: Car) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.cars.insert(car.id.clone(), car);
        Ok(())
    }

    async fn get_car(&self, id: &str) -> AppResult<Option<Car>> {
        let inner = self.inner.read().await;
        Ok(inner.cars.get(id).cloned())
    }

    async fn update_car(&self, car: Car) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.cars.get_mut(&car.id) {
            Some(existing) => {
                *existing = car;
                Ok(())
            }
            None => Err(AppError::car_not_found(car.id)),
        }
    }

    async fn delete_car(&self, id: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .cars
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AppError::car_not_found(id))
    }

    async fn set_car_availability(&self, id: &str, is_available: bool) -> AppResult<Car> {
        let mut inner = self.inner.write().await;
        match inner.cars.get_mut(id) {
            Some(car) => {
                car.is_available = is_available;
                Ok(car.clone())
            }
            None => Err(AppError::car_not_found(id)),
        }
    }

    async fn update_car_location(&self, id: &str, location: String) -> AppResult<Car> {
        let mut inner = self.inner.write().await;
        match inner.cars.get_mut(id) {
            Some(car) => {
                car.current_location = Some(location);
                Ok(car.clone())
            }
            None => Err(AppError::car_not_found(id)),
        }
    }

    async fn available_cars(&self, category: Option<CarCategory>) -> AppResult<Vec<Car>> {
        let inner = self.inner.read().await;
        let cars = inner
            .cars
            .values()
            .filter(|car| car.is_available)
            .filter(|car| category.map_or(true, |c| car.category == c))
            .cloned()
            .collect();
        Ok(cars)
    }

    async fn insert_booking(&self, booking: Booking) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.booking_order.push(booking.id.clone());
        inner.bookings.insert(booking.id.clone(), booking);
        Ok(())
    }

    async fn get_booking(&self, id: &str) -> AppResult<Option<Booking>> {
        let inner = self.inner.read().await;
        Ok(inner.bookings.get(id).cloned())
    }

    async fn update_booking_if(&self, booking: Booking, expected: BookingStatus) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.bookings.get_mut(&booking.id) {
            Some(existing) if existing.status == expected => {
                *existing = booking;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(AppError::booking_not_found(booking.id)),
        }
    }

    async fn bookings_by_passenger(&self, passenger_id: &str) -> AppResult<Vec<Booking>> {
        let inner = self.inner.read().await;
        let bookings = inner
            .booking_order
            .iter()
            .filter_map(|id| inner.bookings.get(id))
            .filter(|booking| booking.passenger_id == passenger_id)
            .cloned()
            .collect();
        Ok(bookings)
    }

    async fn bookings_by_driver(&self, driver_id: &str) -> AppResult<Vec<Booking>> {
        let inner = self.inner.read().await;
        let bookings = inner
            .booking_order
            .iter()
            .filter_map(|id| inner.bookings.get(id))
            .filter(|booking| booking.driver_id.as_deref() == Some(driver_id))
            .cloned()
            .collect();
        Ok(bookings)
    }
}
