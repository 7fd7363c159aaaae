// src/services/car_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use crate::{
    errors::AppError,
    models::car::{Car, CarCategory, CarRegistration, CarResponse, CarUpdate},
    store::Store,
    utils::id_generator::{IdGenerator, IdType},
};

#[async_trait]
pub trait CarOperations: Send + Sync {
    async fn register_car(&self, registration: CarRegistration) -> Result<CarResponse, AppError>;
    async fn get_car(&self, car_id: &str) -> Result<CarResponse, AppError>;
    async fn update_car(&self, car_id: &str, update: CarUpdate) -> Result<CarResponse, AppError>;
    async fn delete_car(&self, car_id: &str) -> Result<(), AppError>;
    async fn set_availability(&self, car_id: &str, is_available: bool) -> Result<CarResponse, AppError>;
    async fn update_location(&self, car_id: &str, location: String) -> Result<CarResponse, AppError>;
    async fn available_cars(&self, category: Option<CarCategory>) -> Result<Vec<CarResponse>, AppError>;
}

pub struct CarService {
    store: Arc<dyn Store>,
}

impl CarService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn to_response(&self, car: Car) -> CarResponse {
        CarResponse {
            id: car.id,
            make: car.make,
            model: car.model,
            year: car.year,
            license_plate: car.license_plate,
            capacity: car.capacity,
            category: car.category,
            is_available: car.is_available,
            current_location: car.current_location,
            features: car.features,
            created_at: car.created_at,
        }
    }

    fn validate_registration(registration: &CarRegistration) -> Result<(), AppError> {
        if registration.make.trim().is_empty() {
            return Err(AppError::validation_error("make", "Make must not be empty"));
        }
        if registration.model.trim().is_empty() {
            return Err(AppError::validation_error("model", "Model must not be empty"));
        }
        if registration.license_plate.trim().is_empty() {
            return Err(AppError::validation_error("license_plate", "License plate must not be empty"));
        }
        if registration.capacity == 0 {
            return Err(AppError::validation_error("capacity", "Capacity must be at least 1"));
        }
        Ok(())
    }
}

#[async_trait]
impl CarOperations for CarService {
    async fn register_car(&self, registration: CarRegistration) -> Result<CarResponse, AppError> {
        tracing::info!("Registering car: {} {}", registration.make, registration.model);

        Self::validate_registration(&registration)?;

        let car = Car {
            id: IdGenerator::generate(IdType::Car),
            make: registration.make,
            model: registration.model,
            year: registration.year,
            license_plate: registration.license_plate,
            capacity: registration.capacity,
            category: registration.category,
            is_available: true,
            current_location: None,
            features: registration.features.unwrap_or_default(),
            created_at: Utc::now(),
        };

        self.store.insert_car(car.clone()).await?;

        tracing::info!("Car registered: {}", car.id);

        Ok(self.to_response(car))
    }

    async fn get_car(&self, car_id: &str) -> Result<CarResponse, AppError> {
        if !IdGenerator::validate_id(car_id, Some(IdType::Car)) {
            return Err(AppError::validation_error("car_id", "Invalid car ID format"));
        }

        tracing::debug!("Getting car: {}", car_id);

        let car = self
            .store
            .get_car(car_id)
            .await?
            .ok_or_else(|| AppError::car_not_found(car_id))?;

        Ok(self.to_response(car))
    }

    async fn update_car(&self, car_id: &str, update: CarUpdate) -> Result<CarResponse, AppError> {
        if !IdGenerator::validate_id(car_id, Some(IdType::Car)) {
            return Err(AppError::validation_error("car_id", "Invalid car ID format"));
        }

        tracing::info!("Updating car: {}", car_id);

        let mut car = self
            .store
            .get_car(car_id)
            .await?
            .ok_or_else(|| AppError::car_not_found(car_id))?;

        if let Some(make) = update.make {
            car.make = make;
        }
        if let Some(model) = update.model {
            car.model = model;
        }
        if let Some(year) = update.year {
            car.year = year;
        }
        if let Some(license_plate) = update.license_plate {
            car.license_plate = license_plate;
        }
        if let Some(capacity) = update.capacity {
            car.capacity = capacity;
        }
        if let Some(category) = update.category {
            car.category = category;
        }
        if let Some(features) = update.features {
            // Replace-on-update: the previous list is discarded, not merged
            car.features = features;
        }

        self.store.update_car(car.clone()).await?;

        Ok(self.to_response(car))
    }

    async fn delete_car(&self, car_id: &str) -> Result<(), AppError> {
        if !IdGenerator::validate_id(car_id, Some(IdType::Car)) {
            return Err(AppError::validation_error("car_id", "Invalid car ID format"));
        }

        tracing::info!("Deleting car: {}", car_id);
        self.store.delete_car(car_id).await
    }

    async fn set_availability(&self, car_id: &str, is_available: bool) -> Result<CarResponse, AppError> {
        if !IdGenerator::validate_id(car_id, Some(IdType::Car)) {
            return Err(AppError::validation_error("car_id", "Invalid car ID format"));
        }

        tracing::debug!("Setting car {} availability to {}", car_id, is_available);

        let car = self.store.set_car_availability(car_id, is_available).await?;
        Ok(self.to_response(car))
    }

    async fn update_location(&self, car_id: &str, location: String) -> Result<CarResponse, AppError> {
        if !IdGenerator::validate_id(car_id, Some(IdType::Car)) {
            return Err(AppError::validation_error("car_id", "Invalid car ID format"));
        }

        tracing::debug!("Updating car {} location", car_id);

        let car = self.store.update_car_location(car_id, location).await?;
        Ok(self.to_response(car))
    }

    async fn available_cars(&self, category: Option<CarCategory>) -> Result<Vec<CarResponse>, AppError> {
        tracing::debug!("Listing available cars (category: {:?})", category);

        let cars = self.store.available_cars(category).await?;
        Ok(cars.into_iter().map(|car| self.to_response(car)).collect())
    }
}
