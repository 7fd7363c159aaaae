// src/state.rs
use std::net::SocketAddr;
use std::sync::Arc;

use crate::services::booking_service::BookingService;
use crate::services::car_service::CarService;
use crate::services::driver_service::DriverService;
use crate::services::passenger_service::PassengerService;
use crate::store::{MemoryStore, Store};

pub struct AppState {
    pub passenger_service: Arc<PassengerService>,
    pub driver_service: Arc<DriverService>,
    pub car_service: Arc<CarService>,
    pub booking_service: Arc<BookingService>,
    pub store: Arc<dyn Store>,
    pub config: AppConfig,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address '{0}'")]
    InvalidBindAddr(String),
}

impl AppConfig {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3000";

    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("CAB_BOOKING_ADDR")
            .unwrap_or_else(|_| Self::DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(raw))?;
        Ok(Self { bind_addr })
    }
}

impl AppState {
    /// Build the full service stack over one shared store. The store is the
    /// single storage authority; services never reach for global state.
    pub fn new(config: AppConfig) -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        Self::with_store(config, store)
    }

    /// Wire the services against any storage implementation.
    pub fn with_store(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let passenger_service = Arc::new(PassengerService::new(store.clone()));
        let driver_service = Arc::new(DriverService::new(store.clone()));
        let car_service = Arc::new(CarService::new(store.clone()));
        let booking_service = Arc::new(BookingService::new(store.clone()));

        Self {
            passenger_service,
            driver_service,
            car_service,
            booking_service,
            store,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let addr: Result<SocketAddr, _> = AppConfig::DEFAULT_BIND_ADDR.parse();
        assert!(addr.is_ok());
    }
}
