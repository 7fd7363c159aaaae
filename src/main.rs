use std::sync::Arc;
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use cab_booking::{
    handlers::{self, booking_handler, car_handler, driver_handler, passenger_handler},
    state::{AppConfig, AppState},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let bind_addr = config.bind_addr;

    let app_state = Arc::new(AppState::new(config));

    let app = Router::new()
        .route("/status", get(handlers::status))
        .route("/passengers", post(passenger_handler::create_passenger))
        .route(
            "/passengers/:id",
            get(passenger_handler::get_passenger)
                .put(passenger_handler::update_passenger)
                .delete(passenger_handler::delete_passenger),
        )
        .route(
            "/passengers/:id/favorite-locations",
            post(passenger_handler::add_favorite_location),
        )
        .route(
            "/passengers/:id/payment-methods",
            post(passenger_handler::add_payment_method),
        )
        .route("/passengers/:id/bookings", get(passenger_handler::passenger_bookings))
        .route("/drivers", post(driver_handler::create_driver))
        .route(
            "/drivers/:id",
            get(driver_handler::get_driver)
                .put(driver_handler::update_driver)
                .delete(driver_handler::delete_driver),
        )
        .route("/drivers/:id/car", put(driver_handler::assign_car))
        .route("/drivers/:id/availability", put(driver_handler::set_availability))
        .route("/drivers/:id/rating", put(driver_handler::rate_driver))
        .route("/drivers/:id/bookings", get(driver_handler::driver_bookings))
        .route("/cars", post(car_handler::create_car))
        .route("/cars/available", get(car_handler::available_cars))
        .route(
            "/cars/:id",
            get(car_handler::get_car)
                .put(car_handler::update_car)
                .delete(car_handler::delete_car),
        )
        .route("/cars/:id/availability", put(car_handler::set_availability))
        .route("/cars/:id/location", put(car_handler::update_location))
        .route("/bookings", post(booking_handler::create_booking))
        .route("/bookings/:id", get(booking_handler::get_booking))
        .route("/bookings/:id/assign-driver", post(booking_handler::assign_driver))
        .route("/bookings/:id/start", put(booking_handler::start_trip))
        .route("/bookings/:id/complete", put(booking_handler::complete_trip))
        .route("/bookings/:id/cancel", put(booking_handler::cancel_trip))
        .route("/bookings/:id/fare/discount", put(booking_handler::apply_discount))
        .route("/bookings/:id/fare/surge", put(booking_handler::apply_surge))
        .route("/bookings/:id/fare/payment", put(booking_handler::mark_fare_paid))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Listening on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
