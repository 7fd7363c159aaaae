// src/models/passenger.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Passenger {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub booking_history: Vec<String>, // Booking ids, creation order, append-only
    pub favorite_locations: Vec<String>,
    pub payment_methods: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Passenger {
    pub fn add_to_booking_history(&mut self, booking_id: impl Into<String>) {
        self.booking_history.push(booking_id.into());
    }

    pub fn add_favorite_location(&mut self, location: impl Into<String>) {
        self.favorite_locations.push(location.into());
    }

    pub fn add_payment_method(&mut self, method: impl Into<String>) {
        self.payment_methods.push(method.into());
    }
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct PassengerRegistration {
    pub name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PassengerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteLocationRequest {
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentMethodRequest {
    pub payment_method: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PassengerResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub booking_history: Vec<String>,
    pub favorite_locations: Vec<String>,
    pub payment_methods: Vec<String>,
    pub created_at: DateTime<Utc>,
}
