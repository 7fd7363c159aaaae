// src/services/driver_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use crate::{
    errors::AppError,
    models::driver::{Driver, DriverRegistration, DriverResponse, DriverUpdate},
    store::Store,
    utils::id_generator::{IdGenerator, IdType},
};

#[async_trait]
pub trait DriverOperations: Send + Sync {
    async fn register_driver(&self, registration: DriverRegistration) -> Result<DriverResponse, AppError>;
    async fn get_driver(&self, driver_id: &str) -> Result<DriverResponse, AppError>;
    async fn update_driver(&self, driver_id: &str, update: DriverUpdate) -> Result<DriverResponse, AppError>;
    async fn delete_driver(&self, driver_id: &str) -> Result<(), AppError>;
    async fn assign_car(&self, driver_id: &str, car_id: &str) -> Result<DriverResponse, AppError>;
    async fn set_availability(&self, driver_id: &str, is_available: bool) -> Result<DriverResponse, AppError>;
    async fn rate_driver(&self, driver_id: &str, rating: f64) -> Result<DriverResponse, AppError>;
}

pub struct DriverService {
    store: Arc<dyn Store>,
}

impl DriverService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn to_response(&self, driver: Driver) -> DriverResponse {
        DriverResponse {
            id: driver.id,
            name: driver.name,
            phone: driver.phone,
            email: driver.email,
            license_number: driver.license_number,
            is_available: driver.is_available,
            rating: driver.rating,
            total_ratings: driver.total_ratings,
            assigned_car_id: driver.assigned_car_id,
            created_at: driver.created_at,
        }
    }

    fn validate_registration(registration: &DriverRegistration) -> Result<(), AppError> {
        if registration.name.trim().is_empty() {
            return Err(AppError::validation_error("name", "Name must not be empty"));
        }
        if registration.phone.trim().is_empty() {
            return Err(AppError::validation_error("phone", "Phone must not be empty"));
        }
        if registration.email.trim().is_empty() {
            return Err(AppError::validation_error("email", "Email must not be empty"));
        }
        if registration.license_number.trim().is_empty() {
            return Err(AppError::validation_error("license_number", "License number must not be empty"));
        }
        Ok(())
    }
}

#[async_trait]
impl DriverOperations for DriverService {
    async fn register_driver(&self, registration: DriverRegistration) -> Result<DriverResponse, AppError> {
        tracing::info!("Registering driver: {}", registration.name);

        Self::validate_registration(&registration)?;

        // Drivers are created without a car; assignment is a separate operation
        let driver = Driver {
            id: IdGenerator::generate(IdType::Driver),
            name: registration.name,
            phone: registration.phone,
            email: registration.email,
            license_number: registration.license_number,
            is_available: true,
            rating: 0.0,
            total_ratings: 0,
            assigned_car_id: None,
            created_at: Utc::now(),
        };

        self.store.insert_driver(driver.clone()).await?;

        tracing::info!("Driver registered: {}", driver.id);

        Ok(self.to_response(driver))
    }

    async fn get_driver(&self, driver_id: &str) -> Result<DriverResponse, AppError> {
        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            return Err(AppError::validation_error("driver_id", "Invalid driver ID format"));
        }

        tracing::debug!("Getting driver: {}", driver_id);

        let driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))?;

        Ok(self.to_response(driver))
    }

    async fn update_driver(&self, driver_id: &str, update: DriverUpdate) -> Result<DriverResponse, AppError> {
        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            return Err(AppError::validation_error("driver_id", "Invalid driver ID format"));
        }

        tracing::info!("Updating driver: {}", driver_id);

        let mut driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))?;

        if let Some(name) = update.name {
            driver.name = name;
        }
        if let Some(phone) = update.phone {
            driver.phone = phone;
        }
        if let Some(email) = update.email {
            driver.email = email;
        }
        if let Some(license_number) = update.license_number {
            driver.license_number = license_number;
        }

        self.store.update_driver(driver.clone()).await?;

        Ok(self.to_response(driver))
    }

    async fn delete_driver(&self, driver_id: &str) -> Result<(), AppError> {
        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            return Err(AppError::validation_error("driver_id", "Invalid driver ID format"));
        }

        tracing::info!("Deleting driver: {}", driver_id);
        self.store.delete_driver(driver_id).await
    }

    async fn assign_car(&self, driver_id: &str, car_id: &str) -> Result<DriverResponse, AppError> {
        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            return Err(AppError::validation_error("driver_id", "Invalid driver ID format"));
        }
        if !IdGenerator::validate_id(car_id, Some(IdType::Car)) {
            return Err(AppError::validation_error("car_id", "Invalid car ID format"));
        }

        tracing::info!("Assigning car {} to driver {}", car_id, driver_id);

        let driver = self.store.assign_car_to_driver(driver_id, car_id).await?;
        Ok(self.to_response(driver))
    }

    async fn set_availability(&self, driver_id: &str, is_available: bool) -> Result<DriverResponse, AppError> {
        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            return Err(AppError::validation_error("driver_id", "Invalid driver ID format"));
        }

        tracing::debug!("Setting driver {} availability to {}", driver_id, is_available);

        let driver = self.store.set_driver_availability(driver_id, is_available).await?;
        Ok(self.to_response(driver))
    }

    async fn rate_driver(&self, driver_id: &str, rating: f64) -> Result<DriverResponse, AppError> {
        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            return Err(AppError::validation_error("driver_id", "Invalid driver ID format"));
        }

        tracing::debug!("Recording rating {} for driver {}", rating, driver_id);

        if !(1.0..=5.0).contains(&rating) {
            return Err(AppError::validation_error("rating", "Rating must be between 1 and 5"));
        }

        let driver = self.store.record_driver_rating(driver_id, rating).await?;
        Ok(self.to_response(driver))
    }
}
