// src/models/fare.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Fixed rate per kilometre travelled.
pub const RATE_PER_KM: f64 = 10.0;
/// Fixed rate per minute of trip time.
pub const RATE_PER_MINUTE: f64 = 2.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Priced outcome of a completed trip. Exactly one fare exists per completed
/// booking; its id is derived from the booking id.
///
/// `total_amount` is recomputed in place whenever the discount or surge
/// multiplier changes, so a reader never observes a total that does not match
/// the stored parameters.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Fare {
    pub id: String,
    pub booking_id: String,
    pub base_fare: f64,
    pub distance_km: f64,
    pub time_minutes: f64,
    pub discount_percent: f64,  // [0, 100]
    pub surge_multiplier: f64,  // >= 1.0
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Fare {
    pub fn new(booking_id: &str, base_fare: f64, distance_km: f64, time_minutes: f64) -> Self {
        let mut fare = Self {
            id: format!("fare-{}", booking_id),
            booking_id: booking_id.to_string(),
            base_fare,
            distance_km,
            time_minutes,
            discount_percent: 0.0,
            surge_multiplier: 1.0,
            total_amount: 0.0,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            created_at: Utc::now(),
        };
        fare.recalculate();
        fare
    }

    /// Recompute the total from the currently stored parameters.
    /// Non-negative by construction from non-negative inputs and discount <= 100.
    pub fn recalculate(&mut self) -> f64 {
        let distance_cost = self.distance_km * RATE_PER_KM;
        let time_cost = self.time_minutes * RATE_PER_MINUTE;
        let subtotal = self.base_fare + distance_cost + time_cost;
        let surge_amount = subtotal * (self.surge_multiplier - 1.0);
        self.total_amount = (subtotal + surge_amount) * (1.0 - self.discount_percent / 100.0);
        self.total_amount
    }

    pub fn apply_discount(&mut self, discount_percent: f64) {
        self.discount_percent = discount_percent;
        self.recalculate();
    }

    pub fn apply_surge(&mut self, multiplier: f64) {
        self.surge_multiplier = multiplier;
        self.recalculate();
    }

    // No reversal exists once paid; there is no markFailed/refund operation.
    pub fn mark_paid(&mut self, payment_method: impl Into<String>) {
        self.payment_status = PaymentStatus::Paid;
        self.payment_method = Some(payment_method.into());
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DiscountRequest {
    pub discount_percent: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SurgeRequest {
    pub surge_multiplier: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_method: String,
}
