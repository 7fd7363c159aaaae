// src/models/booking.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::models::fare::Fare;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Requested,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Completed and Cancelled admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Requested => "REQUESTED",
            BookingStatus::Accepted => "ACCEPTED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A single requested trip and its full lifecycle record.
///
/// Preconditions for each transition live in the booking service; the methods
/// here apply the field effects only. Each lifecycle timestamp is set exactly
/// once and never cleared.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    pub id: String,
    pub passenger_id: String,            // Required at creation, immutable
    pub driver_id: Option<String>,       // Set together with car_id at assignment
    pub car_id: Option<String>,
    pub from_location: String,
    pub to_location: String,
    pub status: BookingStatus,
    pub request_time: DateTime<Utc>,
    pub pickup_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
    pub cancellation_time: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub estimated_distance_km: f64,
    pub estimated_duration_minutes: f64,
    pub actual_distance_km: f64,
    pub actual_duration_minutes: f64,
    pub fare: Option<Fare>,              // Created exactly once, at completion
}

impl Booking {
    pub fn new(
        id: impl Into<String>,
        passenger_id: impl Into<String>,
        from_location: impl Into<String>,
        to_location: impl Into<String>,
        estimated_distance_km: f64,
        estimated_duration_minutes: f64,
    ) -> Self {
        Self {
            id: id.into(),
            passenger_id: passenger_id.into(),
            driver_id: None,
            car_id: None,
            from_location: from_location.into(),
            to_location: to_location.into(),
            status: BookingStatus::Requested,
            request_time: Utc::now(),
            pickup_time: None,
            completion_time: None,
            cancellation_time: None,
            cancellation_reason: None,
            estimated_distance_km,
            estimated_duration_minutes,
            actual_distance_km: 0.0,
            actual_duration_minutes: 0.0,
            fare: None,
        }
    }

    pub fn assign(&mut self, driver_id: impl Into<String>, car_id: Option<String>) {
        self.driver_id = Some(driver_id.into());
        self.car_id = car_id;
        self.status = BookingStatus::Accepted;
    }

    pub fn start(&mut self) {
        self.status = BookingStatus::InProgress;
        self.pickup_time = Some(Utc::now());
    }

    pub fn complete(&mut self, actual_distance_km: f64, actual_duration_minutes: f64) {
        self.status = BookingStatus::Completed;
        self.completion_time = Some(Utc::now());
        self.actual_distance_km = actual_distance_km;
        self.actual_duration_minutes = actual_duration_minutes;
    }

    pub fn cancel(&mut self, reason: Option<String>) {
        self.status = BookingStatus::Cancelled;
        self.cancellation_time = Some(Utc::now());
        self.cancellation_reason = reason;
    }

    /// Create the fare once. A booking already carrying a fare keeps it.
    pub fn price(&mut self, base_fare: f64) -> &mut Fare {
        let (id, distance, duration) = (
            &self.id,
            self.actual_distance_km,
            self.actual_duration_minutes,
        );
        self.fare
            .get_or_insert_with(|| Fare::new(id, base_fare, distance, duration))
    }
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingRequest {
    pub passenger_id: String,
    pub from_location: String,
    pub to_location: String,
    pub estimated_distance_km: f64,
    pub estimated_duration_minutes: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverAssignment {
    pub driver_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TripCompletion {
    pub actual_distance_km: f64,
    pub actual_duration_minutes: f64,
    pub base_fare: f64,
    pub surge_multiplier: Option<f64>,
    pub discount_percent: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TripCancellation {
    pub reason: Option<String>,
}

/// Read-only snapshot of a booking plus its fare receipt if present.
#[derive(Debug, Serialize, Deserialize)]
pub struct TripDetails {
    pub booking_id: String,
    pub passenger_id: String,
    pub driver_id: Option<String>,
    pub car_id: Option<String>,
    pub from_location: String,
    pub to_location: String,
    pub status: BookingStatus,
    pub request_time: DateTime<Utc>,
    pub pickup_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
    pub cancellation_time: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub estimated_distance_km: f64,
    pub estimated_duration_minutes: f64,
    pub actual_distance_km: f64,
    pub actual_duration_minutes: f64,
    pub fare: Option<Fare>,
}

impl From<Booking> for TripDetails {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: booking.id,
            passenger_id: booking.passenger_id,
            driver_id: booking.driver_id,
            car_id: booking.car_id,
            from_location: booking.from_location,
            to_location: booking.to_location,
            status: booking.status,
            request_time: booking.request_time,
            pickup_time: booking.pickup_time,
            completion_time: booking.completion_time,
            cancellation_time: booking.cancellation_time,
            cancellation_reason: booking.cancellation_reason,
            estimated_distance_km: booking.estimated_distance_km,
            estimated_duration_minutes: booking.estimated_duration_minutes,
            actual_distance_km: booking.actual_distance_km,
            actual_duration_minutes: booking.actual_duration_minutes,
            fare: booking.fare,
        }
    }
}
