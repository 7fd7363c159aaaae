// src/models/car.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CarCategory {
    Economy,
    Premium,
    Suv,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Car {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub license_plate: String,
    pub capacity: u8,
    pub category: CarCategory,
    pub is_available: bool,
    pub current_location: Option<String>,
    pub features: Vec<String>, // Ordered, replaced wholesale on update
    pub created_at: DateTime<Utc>,
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct CarRegistration {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub license_plate: String,
    pub capacity: u8,
    pub category: CarCategory,
    pub features: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarUpdate {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<u16>,
    pub license_plate: Option<String>,
    pub capacity: Option<u8>,
    pub category: Option<CarCategory>,
    pub features: Option<Vec<String>>, // Replaces the previous list entirely
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarLocationUpdate {
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarAvailabilityUpdate {
    pub is_available: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarResponse {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub license_plate: String,
    pub capacity: u8,
    pub category: CarCategory,
    pub is_available: bool,
    pub current_location: Option<String>,
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
}
