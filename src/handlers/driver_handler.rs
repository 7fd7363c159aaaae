// src/handlers/driver_handler.rs
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::{
    errors::AppError,
    models::booking::TripDetails,
    models::driver::{
        CarAssignment, DriverAvailabilityUpdate, DriverRating, DriverRegistration, DriverResponse,
        DriverUpdate,
    },
    services::booking_service::BookingOperations,
    services::driver_service::DriverOperations,
    state::AppState,
};

pub async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<DriverRegistration>,
) -> Result<(StatusCode, Json<DriverResponse>), AppError> {
    let driver = state.driver_service.register_driver(registration).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = state.driver_service.get_driver(&driver_id).await?;
    Ok(Json(driver))
}

pub async fn update_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(update): Json<DriverUpdate>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = state.driver_service.update_driver(&driver_id, update).await?;
    Ok(Json(driver))
}

pub async fn delete_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.driver_service.delete_driver(&driver_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_car(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(assignment): Json<CarAssignment>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = state.driver_service.assign_car(&driver_id, &assignment.car_id).await?;
    Ok(Json(driver))
}

pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(update): Json<DriverAvailabilityUpdate>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = state
        .driver_service
        .set_availability(&driver_id, update.is_available)
        .await?;
    Ok(Json(driver))
}

pub async fn rate_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(rating): Json<DriverRating>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = state.driver_service.rate_driver(&driver_id, rating.rating).await?;
    Ok(Json(driver))
}

pub async fn driver_bookings(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> Result<Json<Vec<TripDetails>>, AppError> {
    let bookings = state.booking_service.bookings_by_driver(&driver_id).await?;
    Ok(Json(bookings))
}
