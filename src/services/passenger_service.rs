// src/services/passenger_service.rs
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing;

use crate::{
    errors::AppError,
    models::passenger::{Passenger, PassengerRegistration, PassengerResponse, PassengerUpdate},
    store::Store,
    utils::id_generator::{IdGenerator, IdType},
};

#[async_trait]
pub trait PassengerOperations: Send + Sync {
    async fn register_passenger(&self, registration: PassengerRegistration) -> Result<PassengerResponse, AppError>;
    async fn get_passenger(&self, passenger_id: &str) -> Result<PassengerResponse, AppError>;
    async fn update_passenger(&self, passenger_id: &str, update: PassengerUpdate) -> Result<PassengerResponse, AppError>;
    async fn delete_passenger(&self, passenger_id: &str) -> Result<(), AppError>;
    async fn add_favorite_location(&self, passenger_id: &str, location: String) -> Result<PassengerResponse, AppError>;
    async fn add_payment_method(&self, passenger_id: &str, payment_method: String) -> Result<PassengerResponse, AppError>;
}

pub struct PassengerService {
    store: Arc<dyn Store>,
}

impl PassengerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn to_response(&self, passenger: Passenger) -> PassengerResponse {
        PassengerResponse {
            id: passenger.id,
            name: passenger.name,
            phone: passenger.phone,
            email: passenger.email,
            booking_history: passenger.booking_history,
            favorite_locations: passenger.favorite_locations,
            payment_methods: passenger.payment_methods,
            created_at: passenger.created_at,
        }
    }

    fn validate_registration(registration: &PassengerRegistration) -> Result<(), AppError> {
        if registration.name.trim().is_empty() {
            return Err(AppError::validation_error("name", "Name must not be empty"));
        }
        if registration.phone.trim().is_empty() {
            return Err(AppError::validation_error("phone", "Phone must not be empty"));
        }
        if registration.email.trim().is_empty() {
            return Err(AppError::validation_error("email", "Email must not be empty"));
        }
        Ok(())
    }
}

#[async_trait]
impl PassengerOperations for PassengerService {
    async fn register_passenger(&self, registration: PassengerRegistration) -> Result<PassengerResponse, AppError> {
        tracing::info!("Registering passenger: {}", registration.name);

        Self::validate_registration(&registration)?;

        let passenger = Passenger {
            id: IdGenerator::generate(IdType::Passenger),
            name: registration.name,
            phone: registration.phone,
            email: registration.email,
            booking_history: Vec::new(),
            favorite_locations: Vec::new(),
            payment_methods: Vec::new(),
            created_at: Utc::now(),
        };

        self.store.insert_passenger(passenger.clone()).await?;

        tracing::info!("Passenger registered: {}", passenger.id);

        Ok(self.to_response(passenger))
    }

    async fn get_passenger(&self, passenger_id: &str) -> Result<PassengerResponse, AppError> {
        if !IdGenerator::validate_id(passenger_id, Some(IdType::Passenger)) {
            return Err(AppError::validation_error("passenger_id", "Invalid passenger ID format"));
        }

        tracing::debug!("Getting passenger: {}", passenger_id);

        let passenger = self
            .store
            .get_passenger(passenger_id)
            .await?
            .ok_or_else(|| AppError::passenger_not_found(passenger_id))?;

        Ok(self.to_response(passenger))
    }

    async fn update_passenger(&self, passenger_id: &str, update: PassengerUpdate) -> Result<PassengerResponse, AppError> {
        if !IdGenerator::validate_id(passenger_id, Some(IdType::Passenger)) {
            return Err(AppError::validation_error("passenger_id", "Invalid passenger ID format"));
        }

        tracing::info!("Updating passenger: {}", passenger_id);

        let mut passenger = self
            .store
            .get_passenger(passenger_id)
            .await?
            .ok_or_else(|| AppError::passenger_not_found(passenger_id))?;

        if let Some(name) = update.name {
            passenger.name = name;
        }
        if let Some(phone) = update.phone {
            passenger.phone = phone;
        }
        if let Some(email) = update.email {
            passenger.email = email;
        }

        self.store.update_passenger(passenger.clone()).await?;

        Ok(self.to_response(passenger))
    }

    async fn delete_passenger(&self, passenger_id: &str) -> Result<(), AppError> {
        if !IdGenerator::validate_id(passenger_id, Some(IdType::Passenger)) {
            return Err(AppError::validation_error("passenger_id", "Invalid passenger ID format"));
        }

        tracing::info!("Deleting passenger: {}", passenger_id);
        self.store.delete_passenger(passenger_id).await
    }

    async fn add_favorite_location(&self, passenger_id: &str, location: String) -> Result<PassengerResponse, AppError> {
        if !IdGenerator::validate_id(passenger_id, Some(IdType::Passenger)) {
            return Err(AppError::validation_error("passenger_id", "Invalid passenger ID format"));
        }

        tracing::debug!("Adding favorite location for passenger: {}", passenger_id);

        if location.trim().is_empty() {
            return Err(AppError::validation_error("location", "Location must not be empty"));
        }

        let mut passenger = self
            .store
            .get_passenger(passenger_id)
            .await?
            .ok_or_else(|| AppError::passenger_not_found(passenger_id))?;

        passenger.add_favorite_location(location);
        self.store.update_passenger(passenger.clone()).await?;

        Ok(self.to_response(passenger))
    }

    async fn add_payment_method(&self, passenger_id: &str, payment_method: String) -> Result<PassengerResponse, AppError> {
        if !IdGenerator::validate_id(passenger_id, Some(IdType::Passenger)) {
            return Err(AppError::validation_error("passenger_id", "Invalid passenger ID format"));
        }

        tracing::debug!("Adding payment method for passenger: {}", passenger_id);

        if payment_method.trim().is_empty() {
            return Err(AppError::validation_error("payment_method", "Payment method must not be empty"));
        }

        let mut passenger = self
            .store
            .get_passenger(passenger_id)
            .await?
            .ok_or_else(|| AppError::passenger_not_found(passenger_id))?;

        passenger.add_payment_method(payment_method);
        self.store.update_passenger(passenger.clone()).await?;

        Ok(self.to_response(passenger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> PassengerService {
        PassengerService::new(Arc::new(MemoryStore::new()))
    }

    fn registration() -> PassengerRegistration {
        PassengerRegistration {
            name: "Ama Mensah".to_string(),
            phone: "+233201234567".to_string(),
            email: "ama@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let service = service();
        let created = service.register_passenger(registration()).await.unwrap();
        assert!(created.id.starts_with("pas-"));
        assert!(created.booking_history.is_empty());

        let fetched = service.get_passenger(&created.id).await.unwrap();
        assert_eq!(fetched.name, "Ama Mensah");
    }

    #[tokio::test]
    async fn test_register_rejects_missing_fields() {
        let service = service();
        let mut bad = registration();
        bad.name = "  ".to_string();

        let err = service.register_passenger(bad).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_get_unknown_passenger() {
        let service = service();
        let err = service.get_passenger("pas-260830-zzzzz").await.unwrap_err();
        assert!(matches!(err, AppError::PassengerNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let service = service();
        let created = service.register_passenger(registration()).await.unwrap();

        let updated = service
            .update_passenger(
                &created.id,
                PassengerUpdate {
                    name: None,
                    phone: Some("+233555000111".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ama Mensah");
        assert_eq!(updated.phone, "+233555000111");
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let service = service();
        let created = service.register_passenger(registration()).await.unwrap();

        service.delete_passenger(&created.id).await.unwrap();
        assert!(service.get_passenger(&created.id).await.is_err());
        assert!(service.delete_passenger(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_favorite_locations() {
        let service = service();
        let created = service.register_passenger(registration()).await.unwrap();

        let updated = service
            .add_favorite_location(&created.id, "Kotoka Airport".to_string())
            .await
            .unwrap();
        assert_eq!(updated.favorite_locations, vec!["Kotoka Airport"]);
    }

    #[tokio::test]
    async fn test_payment_methods() {
        let service = service();
        let created = service.register_passenger(registration()).await.unwrap();
        assert!(created.payment_methods.is_empty());

        service
            .add_payment_method(&created.id, "mobile_money".to_string())
            .await
            .unwrap();
        let updated = service
            .add_payment_method(&created.id, "card".to_string())
            .await
            .unwrap();
        assert_eq!(updated.payment_methods, vec!["mobile_money", "card"]);

        let err = service
            .add_payment_method(&created.id, "  ".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected() {
        let service = service();
        let err = service.get_passenger("not-an-id").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
        let err = service.delete_passenger("passenger_42").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
    }
}
