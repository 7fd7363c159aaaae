// src/handlers/car_handler.rs
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    errors::AppError,
    models::car::{
        CarAvailabilityUpdate, CarCategory, CarLocationUpdate, CarRegistration, CarResponse,
        CarUpdate,
    },
    services::car_service::CarOperations,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AvailableCarsQuery {
    pub category: Option<CarCategory>,
}

pub async fn create_car(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<CarRegistration>,
) -> Result<(StatusCode, Json<CarResponse>), AppError> {
    let car = state.car_service.register_car(registration).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

pub async fn get_car(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<String>,
) -> Result<Json<CarResponse>, AppError> {
    let car = state.car_service.get_car(&car_id).await?;
    Ok(Json(car))
}

pub async fn update_car(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<String>,
    Json(update): Json<CarUpdate>,
) -> Result<Json<CarResponse>, AppError> {
    let car = state.car_service.update_car(&car_id, update).await?;
    Ok(Json(car))
}

pub async fn delete_car(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.car_service.delete_car(&car_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_availability(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<String>,
    Json(update): Json<CarAvailabilityUpdate>,
) -> Result<Json<CarResponse>, AppError> {
    let car = state.car_service.set_availability(&car_id, update.is_available).await?;
    Ok(Json(car))
}

pub async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<String>,
    Json(update): Json<CarLocationUpdate>,
) -> Result<Json<CarResponse>, AppError> {
    let car = state.car_service.update_location(&car_id, update.location).await?;
    Ok(Json(car))
}

pub async fn available_cars(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableCarsQuery>,
) -> Result<Json<Vec<CarResponse>>, AppError> {
    let cars = state.car_service.available_cars(query.category).await?;
    Ok(Json(cars))
}
