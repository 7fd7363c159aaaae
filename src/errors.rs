use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for the cab-booking service
#[derive(Debug)]
pub enum AppError {
    // Unknown-id errors
    PassengerNotFound(String),
    DriverNotFound(String),
    CarNotFound(String),
    BookingNotFound(String),
    NotFound(String),

    // Booking lifecycle errors
    InvalidTransition(String),
    DriverNotAvailable(String),

    // Validation errors
    ValidationFailed(Vec<ValidationError>),
    MissingRequiredField(String),

    // Everything else
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::PassengerNotFound(id) => write!(f, "Passenger not found: {}", id),
            AppError::DriverNotFound(id) => write!(f, "Driver not found: {}", id),
            AppError::CarNotFound(id) => write!(f, "Car not found: {}", id),
            AppError::BookingNotFound(id) => write!(f, "Booking not found: {}", id),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),

            AppError::InvalidTransition(msg) => write!(f, "Invalid transition: {}", msg),
            AppError::DriverNotAvailable(id) => write!(f, "Driver is not available: {}", id),

            AppError::ValidationFailed(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            AppError::MissingRequiredField(field) => {
                write!(f, "Missing required field: {}", field)
            }

            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            AppError::PassengerNotFound(id) => {
                (StatusCode::NOT_FOUND, "passenger_not_found", format!("Passenger not found: {}", id), None)
            }
            AppError::DriverNotFound(id) => {
                (StatusCode::NOT_FOUND, "driver_not_found", format!("Driver not found: {}", id), None)
            }
            AppError::CarNotFound(id) => {
                (StatusCode::NOT_FOUND, "car_not_found", format!("Car not found: {}", id), None)
            }
            AppError::BookingNotFound(id) => {
                (StatusCode::NOT_FOUND, "booking_not_found", format!("Booking not found: {}", id), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),

            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "invalid_transition", msg, None)
            }
            AppError::DriverNotAvailable(id) => {
                (StatusCode::CONFLICT, "driver_not_available", format!("Driver is not available: {}", id), None)
            }

            AppError::ValidationFailed(errors) => {
                let details = serde_json::to_value(&errors).ok();
                (StatusCode::BAD_REQUEST, "validation_failed", "Validation errors occurred".to_string(), details)
            }
            AppError::MissingRequiredField(field) => {
                (StatusCode::BAD_REQUEST, "missing_field", format!("Missing required field: {}", field), None)
            }

            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None),
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, axum::Json(error_response)).into_response()
    }
}

// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

// Helper functions for creating common errors
impl AppError {
    pub fn passenger_not_found(id: impl Into<String>) -> Self {
        AppError::PassengerNotFound(id.into())
    }

    pub fn driver_not_found(id: impl Into<String>) -> Self {
        AppError::DriverNotFound(id.into())
    }

    pub fn car_not_found(id: impl Into<String>) -> Self {
        AppError::CarNotFound(id.into())
    }

    pub fn booking_not_found(id: impl Into<String>) -> Self {
        AppError::BookingNotFound(id.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        AppError::InvalidTransition(msg.into())
    }

    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ValidationFailed(vec![ValidationError {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::BookingNotFound("bok-123".to_string());
        assert_eq!(error.to_string(), "Booking not found: bok-123");

        let error = AppError::InvalidTransition("cannot start without a driver".to_string());
        assert_eq!(error.to_string(), "Invalid transition: cannot start without a driver");
    }

    #[test]
    fn test_validation_error() {
        let error = AppError::validation_error("name", "Name must not be empty");
        match error {
            AppError::ValidationFailed(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
                assert_eq!(errors[0].message, "Name must not be empty");
            }
            _ => panic!("Expected ValidationFailed error"),
        }
    }

    #[test]
    fn test_helper_functions() {
        assert!(matches!(AppError::passenger_not_found("x"), AppError::PassengerNotFound(_)));
        assert!(matches!(AppError::driver_not_found("x"), AppError::DriverNotFound(_)));
        assert!(matches!(AppError::invalid_transition("x"), AppError::InvalidTransition(_)));
        assert!(matches!(AppError::internal("x"), AppError::Internal(_)));
    }
}
