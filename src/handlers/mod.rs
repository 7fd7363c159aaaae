// src/handlers/mod.rs
pub mod booking_handler;
pub mod car_handler;
pub mod driver_handler;
pub mod passenger_handler;

use axum::Json;
use serde_json::{json, Value};

pub async fn status() -> Json<Value> {
    Json(json!({
        "status": "online",
        "message": "Cab booking API is running"
    }))
}
