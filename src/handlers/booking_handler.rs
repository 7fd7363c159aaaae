// src/handlers/booking_handler.rs
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::{
    errors::AppError,
    models::booking::{BookingRequest, DriverAssignment, TripCancellation, TripCompletion, TripDetails},
    models::fare::{DiscountRequest, Fare, PaymentRequest, SurgeRequest},
    services::booking_service::BookingOperations,
    state::AppState,
};

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<TripDetails>), AppError> {
    let booking = state.booking_service.create_booking(request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<TripDetails>, AppError> {
    let details = state.booking_service.get_trip_details(&booking_id).await?;
    Ok(Json(details))
}

pub async fn assign_driver(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(assignment): Json<DriverAssignment>,
) -> Result<Json<TripDetails>, AppError> {
    let booking = state
        .booking_service
        .assign_driver(&booking_id, &assignment.driver_id)
        .await?;
    Ok(Json(booking))
}

pub async fn start_trip(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<TripDetails>, AppError> {
    let booking = state.booking_service.start_trip(&booking_id).await?;
    Ok(Json(booking))
}

pub async fn complete_trip(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(completion): Json<TripCompletion>,
) -> Result<Json<TripDetails>, AppError> {
    let booking = state.booking_service.complete_trip(&booking_id, completion).await?;
    Ok(Json(booking))
}

pub async fn cancel_trip(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(cancellation): Json<TripCancellation>,
) -> Result<Json<TripDetails>, AppError> {
    let booking = state
        .booking_service
        .cancel_trip(&booking_id, cancellation.reason)
        .await?;
    Ok(Json(booking))
}

pub async fn apply_discount(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(request): Json<DiscountRequest>,
) -> Result<Json<Fare>, AppError> {
    let fare = state
        .booking_service
        .apply_discount(&booking_id, request.discount_percent)
        .await?;
    Ok(Json(fare))
}

pub async fn apply_surge(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(request): Json<SurgeRequest>,
) -> Result<Json<Fare>, AppError> {
    let fare = state
        .booking_service
        .apply_surge(&booking_id, request.surge_multiplier)
        .await?;
    Ok(Json(fare))
}

pub async fn mark_fare_paid(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Fare>, AppError> {
    let fare = state
        .booking_service
        .mark_fare_paid(&booking_id, request.payment_method)
        .await?;
    Ok(Json(fare))
}
