// src/handlers/passenger_handler.rs
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::{
    errors::AppError,
    models::booking::TripDetails,
    models::passenger::{
        FavoriteLocationRequest, PassengerRegistration, PassengerResponse, PassengerUpdate,
        PaymentMethodRequest,
    },
    services::booking_service::BookingOperations,
    services::passenger_service::PassengerOperations,
    state::AppState,
};

pub async fn create_passenger(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<PassengerRegistration>,
) -> Result<(StatusCode, Json<PassengerResponse>), AppError> {
    let passenger = state.passenger_service.register_passenger(registration).await?;
    Ok((StatusCode::CREATED, Json(passenger)))
}

pub async fn get_passenger(
    State(state): State<Arc<AppState>>,
    Path(passenger_id): Path<String>,
) -> Result<Json<PassengerResponse>, AppError> {
    let passenger = state.passenger_service.get_passenger(&passenger_id).await?;
    Ok(Json(passenger))
}

pub async fn update_passenger(
    State(state): State<Arc<AppState>>,
    Path(passenger_id): Path<String>,
    Json(update): Json<PassengerUpdate>,
) -> Result<Json<PassengerResponse>, AppError> {
    let passenger = state.passenger_service.update_passenger(&passenger_id, update).await?;
    Ok(Json(passenger))
}

pub async fn delete_passenger(
    State(state): State<Arc<AppState>>,
    Path(passenger_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.passenger_service.delete_passenger(&passenger_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite_location(
    State(state): State<Arc<AppState>>,
    Path(passenger_id): Path<String>,
    Json(request): Json<FavoriteLocationRequest>,
) -> Result<Json<PassengerResponse>, AppError> {
    let passenger = state
        .passenger_service
        .add_favorite_location(&passenger_id, request.location)
        .await?;
    Ok(Json(passenger))
}

pub async fn add_payment_method(
    State(state): State<Arc<AppState>>,
    Path(passenger_id): Path<String>,
    Json(request): Json<PaymentMethodRequest>,
) -> Result<Json<PassengerResponse>, AppError> {
    let passenger = state
        .passenger_service
        .add_payment_method(&passenger_id, request.payment_method)
        .await?;
    Ok(Json(passenger))
}

pub async fn passenger_bookings(
    State(state): State<Arc<AppState>>,
    Path(passenger_id): Path<String>,
) -> Result<Json<Vec<TripDetails>>, AppError> {
    let bookings = state.booking_service.bookings_by_passenger(&passenger_id).await?;
    Ok(Json(bookings))
}
