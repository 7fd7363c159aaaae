// src/services/booking_service.rs
use async_trait::async_trait;
use std::sync::Arc;
use tracing;

use crate::{
    errors::AppError,
    models::booking::{Booking, BookingRequest, BookingStatus, TripCompletion, TripDetails},
    models::fare::{Fare, PaymentStatus},
    store::Store,
    utils::id_generator::{IdGenerator, IdType},
};

#[async_trait]
pub trait BookingOperations: Send + Sync {
    async fn create_booking(&self, request: BookingRequest) -> Result<TripDetails, AppError>;
    async fn assign_driver(&self, booking_id: &str, driver_id: &str) -> Result<TripDetails, AppError>;
    async fn start_trip(&self, booking_id: &str) -> Result<TripDetails, AppError>;
    async fn complete_trip(&self, booking_id: &str, completion: TripCompletion) -> Result<TripDetails, AppError>;
    async fn cancel_trip(&self, booking_id: &str, reason: Option<String>) -> Result<TripDetails, AppError>;
    async fn get_trip_details(&self, booking_id: &str) -> Result<TripDetails, AppError>;
    async fn bookings_by_passenger(&self, passenger_id: &str) -> Result<Vec<TripDetails>, AppError>;
    async fn bookings_by_driver(&self, driver_id: &str) -> Result<Vec<TripDetails>, AppError>;
    async fn apply_discount(&self, booking_id: &str, discount_percent: f64) -> Result<Fare, AppError>;
    async fn apply_surge(&self, booking_id: &str, multiplier: f64) -> Result<Fare, AppError>;
    async fn mark_fare_paid(&self, booking_id: &str, payment_method: String) -> Result<Fare, AppError>;
}

/// The booking lifecycle engine.
///
/// Transitions go Requested -> Accepted -> InProgress -> Completed, with
/// Cancelled reachable from any non-terminal state. Each transition is a
/// status compare-and-swap against the store, so concurrent callers race on
/// the status check instead of clobbering each other's side effects.
pub struct BookingService {
    store: Arc<dyn Store>,
}

impl BookingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn fetch_booking(&self, booking_id: &str) -> Result<Booking, AppError> {
        if !IdGenerator::validate_id(booking_id, Some(IdType::Booking)) {
            return Err(AppError::validation_error("booking_id", "Invalid booking ID format"));
        }
        self.store
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::booking_not_found(booking_id))
    }

    fn validate_request(request: &BookingRequest) -> Result<(), AppError> {
        if request.from_location.trim().is_empty() {
            return Err(AppError::validation_error("from_location", "Origin must not be empty"));
        }
        if request.to_location.trim().is_empty() {
            return Err(AppError::validation_error("to_location", "Destination must not be empty"));
        }
        if request.estimated_distance_km < 0.0 {
            return Err(AppError::validation_error(
                "estimated_distance_km",
                "Estimated distance must not be negative",
            ));
        }
        if request.estimated_duration_minutes < 0.0 {
            return Err(AppError::validation_error(
                "estimated_duration_minutes",
                "Estimated duration must not be negative",
            ));
        }
        Ok(())
    }

    fn validate_completion(completion: &TripCompletion) -> Result<(), AppError> {
        if completion.actual_distance_km < 0.0 {
            return Err(AppError::validation_error(
                "actual_distance_km",
                "Actual distance must not be negative",
            ));
        }
        if completion.actual_duration_minutes < 0.0 {
            return Err(AppError::validation_error(
                "actual_duration_minutes",
                "Actual duration must not be negative",
            ));
        }
        if completion.base_fare < 0.0 {
            return Err(AppError::validation_error("base_fare", "Base fare must not be negative"));
        }
        if let Some(surge) = completion.surge_multiplier {
            Self::validate_surge(surge)?;
        }
        if let Some(discount) = completion.discount_percent {
            Self::validate_discount(discount)?;
        }
        Ok(())
    }

    fn validate_surge(multiplier: f64) -> Result<(), AppError> {
        if multiplier < 1.0 {
            return Err(AppError::validation_error(
                "surge_multiplier",
                "Surge multiplier must be at least 1.0",
            ));
        }
        Ok(())
    }

    fn validate_discount(percent: f64) -> Result<(), AppError> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(AppError::validation_error(
                "discount_percent",
                "Discount must be between 0 and 100",
            ));
        }
        Ok(())
    }

    /// Apply a fare mutation to a completed booking and persist it. The
    /// status CAS keeps the total consistent with the stored parameters even
    /// under concurrent callers.
    async fn with_fare<F>(&self, booking_id: &str, mutate: F) -> Result<Fare, AppError>
    where
        F: FnOnce(&mut Fare) -> Result<(), AppError>,
    {
        let mut booking = self.fetch_booking(booking_id).await?;
        let status = booking.status;

        let fare = booking.fare.as_mut().ok_or_else(|| {
            AppError::invalid_transition(format!(
                "booking {} has no fare (status {})",
                booking_id, status
            ))
        })?;

        mutate(fare)?;
        let updated = fare.clone();

        if !self.store.update_booking_if(booking, status).await? {
            return Err(AppError::invalid_transition(format!(
                "booking {} was modified concurrently",
                booking_id
            )));
        }

        Ok(updated)
    }
}

#[async_trait]
impl BookingOperations for BookingService {
    async fn create_booking(&self, request: BookingRequest) -> Result<TripDetails, AppError> {
        tracing::info!("Creating booking for passenger: {}", request.passenger_id);

        Self::validate_request(&request)?;
        if !IdGenerator::validate_id(&request.passenger_id, Some(IdType::Passenger)) {
            return Err(AppError::validation_error("passenger_id", "Invalid passenger ID format"));
        }

        // Passenger must exist before anything is recorded
        if self.store.get_passenger(&request.passenger_id).await?.is_none() {
            return Err(AppError::passenger_not_found(&request.passenger_id));
        }

        let booking = Booking::new(
            IdGenerator::generate(IdType::Booking),
            request.passenger_id,
            request.from_location,
            request.to_location,
            request.estimated_distance_km,
            request.estimated_duration_minutes,
        );

        self.store.insert_booking(booking.clone()).await?;
        self.store
            .append_booking_history(&booking.passenger_id, &booking.id)
            .await?;

        tracing::info!("Booking created: {}", booking.id);

        Ok(booking.into())
    }

    async fn assign_driver(&self, booking_id: &str, driver_id: &str) -> Result<TripDetails, AppError> {
        tracing::info!("Assigning driver {} to booking {}", driver_id, booking_id);

        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            return Err(AppError::validation_error("driver_id", "Invalid driver ID format"));
        }

        let mut booking = self.fetch_booking(booking_id).await?;
        if booking.status.is_terminal() {
            return Err(AppError::invalid_transition(format!(
                "cannot assign a driver to a {} booking",
                booking.status
            )));
        }

        // Atomic check-and-set on the driver's availability: two concurrent
        // assignments of the same driver cannot both get here.
        let claimed = self.store.claim_driver(driver_id).await?;

        let previous = booking
            .driver_id
            .clone()
            .map(|driver| (driver, booking.car_id.clone()));

        let expected = booking.status;
        let car_id = claimed.car.map(|car| car.id);
        if car_id.is_none() {
            // Tolerated: the booking proceeds with driver only, and every
            // release path guards against the missing car
            tracing::warn!("Driver {} has no assigned car", driver_id);
        }
        booking.assign(driver_id, car_id.clone());

        if !self.store.update_booking_if(booking.clone(), expected).await? {
            // Lost the race on the booking; undo the fresh claim. The previous
            // holder keeps its claim since the stored booking still names it.
            self.store.release_assignment(driver_id, car_id.as_deref()).await?;
            return Err(AppError::invalid_transition(format!(
                "booking {} was modified concurrently",
                booking_id
            )));
        }

        // The swap committed, so no booking references the previous holder
        // any more; releasing only now keeps losing reassignments harmless.
        if let Some((previous_driver, previous_car)) = previous {
            tracing::debug!(
                "Booking {} reassigned from driver {}, releasing previous claim",
                booking_id,
                previous_driver
            );
            self.store
                .release_assignment(&previous_driver, previous_car.as_deref())
                .await?;
        }

        tracing::info!("Driver {} assigned to booking {}", driver_id, booking_id);

        Ok(booking.into())
    }

    async fn start_trip(&self, booking_id: &str) -> Result<TripDetails, AppError> {
        tracing::info!("Starting trip: {}", booking_id);

        let mut booking = self.fetch_booking(booking_id).await?;

        if booking.driver_id.is_none() {
            return Err(AppError::invalid_transition(format!(
                "booking {} has no assigned driver",
                booking_id
            )));
        }
        if booking.status != BookingStatus::Accepted {
            return Err(AppError::invalid_transition(format!(
                "cannot start a {} booking",
                booking.status
            )));
        }

        let expected = booking.status;
        booking.start();

        if !self.store.update_booking_if(booking.clone(), expected).await? {
            return Err(AppError::invalid_transition(format!(
                "booking {} was modified concurrently",
                booking_id
            )));
        }

        Ok(booking.into())
    }

    async fn complete_trip(&self, booking_id: &str, completion: TripCompletion) -> Result<TripDetails, AppError> {
        tracing::info!("Completing trip: {}", booking_id);

        Self::validate_completion(&completion)?;

        let mut booking = self.fetch_booking(booking_id).await?;
        if booking.status != BookingStatus::InProgress {
            return Err(AppError::invalid_transition(format!(
                "only in-progress trips can be completed (booking {} is {})",
                booking_id, booking.status
            )));
        }

        let expected = booking.status;
        booking.complete(completion.actual_distance_km, completion.actual_duration_minutes);

        // Price exactly once; an already-present fare is kept, not rebuilt
        let fare = booking.price(completion.base_fare);
        if let Some(surge) = completion.surge_multiplier {
            fare.apply_surge(surge);
        }
        if let Some(discount) = completion.discount_percent {
            fare.apply_discount(discount);
        }

        if !self.store.update_booking_if(booking.clone(), expected).await? {
            return Err(AppError::invalid_transition(format!(
                "booking {} was modified concurrently",
                booking_id
            )));
        }

        // Unconditional release: one driver/car pairs with at most one active
        // booking, so nothing else can hold these
        if let Some(driver_id) = booking.driver_id.as_deref() {
            self.store
                .release_assignment(driver_id, booking.car_id.as_deref())
                .await?;
        }

        tracing::info!(
            "Trip completed: {} (total: {:.2})",
            booking_id,
            booking.fare.as_ref().map(|f| f.total_amount).unwrap_or_default()
        );

        Ok(booking.into())
    }

    async fn cancel_trip(&self, booking_id: &str, reason: Option<String>) -> Result<TripDetails, AppError> {
        tracing::info!("Cancelling booking: {}", booking_id);

        let mut booking = self.fetch_booking(booking_id).await?;
        if booking.status.is_terminal() {
            return Err(AppError::invalid_transition(format!(
                "cannot cancel a {} booking",
                booking.status
            )));
        }

        let expected = booking.status;
        booking.cancel(reason);

        if !self.store.update_booking_if(booking.clone(), expected).await? {
            return Err(AppError::invalid_transition(format!(
                "booking {} was modified concurrently",
                booking_id
            )));
        }

        if let Some(driver_id) = booking.driver_id.as_deref() {
            self.store
                .release_assignment(driver_id, booking.car_id.as_deref())
                .await?;
        }

        tracing::info!("Booking cancelled: {}", booking_id);

        Ok(booking.into())
    }

    async fn get_trip_details(&self, booking_id: &str) -> Result<TripDetails, AppError> {
        tracing::debug!("Getting trip details: {}", booking_id);
        Ok(self.fetch_booking(booking_id).await?.into())
    }

    async fn bookings_by_passenger(&self, passenger_id: &str) -> Result<Vec<TripDetails>, AppError> {
        tracing::debug!("Getting bookings for passenger: {}", passenger_id);

        if !IdGenerator::validate_id(passenger_id, Some(IdType::Passenger)) {
            return Err(AppError::validation_error("passenger_id", "Invalid passenger ID format"));
        }

        let bookings = self.store.bookings_by_passenger(passenger_id).await?;
        Ok(bookings.into_iter().map(Into::into).collect())
    }

    async fn bookings_by_driver(&self, driver_id: &str) -> Result<Vec<TripDetails>, AppError> {
        tracing::debug!("Getting bookings for driver: {}", driver_id);

        if !IdGenerator::validate_id(driver_id, Some(IdType::Driver)) {
            return Err(AppError::validation_error("driver_id", "Invalid driver ID format"));
        }

        let bookings = self.store.bookings_by_driver(driver_id).await?;
        Ok(bookings.into_iter().map(Into::into).collect())
    }

    async fn apply_discount(&self, booking_id: &str, discount_percent: f64) -> Result<Fare, AppError> {
        tracing::info!("Applying {}% discount to booking {}", discount_percent, booking_id);

        Self::validate_discount(discount_percent)?;
        self.with_fare(booking_id, |fare| {
            if fare.payment_status == PaymentStatus::Paid {
                return Err(AppError::invalid_transition("fare is already paid"));
            }
            fare.apply_discount(discount_percent);
            Ok(())
        })
        .await
    }

    async fn apply_surge(&self, booking_id: &str, multiplier: f64) -> Result<Fare, AppError> {
        tracing::info!("Applying surge {} to booking {}", multiplier, booking_id);

        Self::validate_surge(multiplier)?;
        self.with_fare(booking_id, |fare| {
            if fare.payment_status == PaymentStatus::Paid {
                return Err(AppError::invalid_transition("fare is already paid"));
            }
            fare.apply_surge(multiplier);
            Ok(())
        })
        .await
    }

    async fn mark_fare_paid(&self, booking_id: &str, payment_method: String) -> Result<Fare, AppError> {
        tracing::info!("Marking fare paid for booking {}", booking_id);

        if payment_method.trim().is_empty() {
            return Err(AppError::validation_error("payment_method", "Payment method must not be empty"));
        }

        self.with_fare(booking_id, |fare| {
            if fare.payment_status == PaymentStatus::Paid {
                return Err(AppError::invalid_transition("fare is already paid"));
            }
            fare.mark_paid(payment_method);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppResult;
    use crate::models::{BookingStatus, Car, CarCategory, Driver, Passenger, PaymentStatus};
    use crate::store::{ClaimedDriver, MemoryStore};
    use chrono::Utc;

    fn sample_passenger(id: &str) -> Passenger {
        Passenger {
            id: id.to_string(),
            name: "Ama Mensah".to_string(),
            phone: "+233201234567".to_string(),
            email: "ama@example.com".to_string(),
            booking_history: Vec::new(),
            favorite_locations: Vec::new(),
            payment_methods: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn sample_driver(id: &str, car_id: Option<&str>) -> Driver {
        Driver {
            id: id.to_string(),
            name: "Kofi Boateng".to_string(),
            phone: "+233209876543".to_string(),
            email: "kofi@example.com".to_string(),
            license_number: "GH-DL-44821".to_string(),
            is_available: true,
            rating: 0.0,
            total_ratings: 0,
            assigned_car_id: car_id.map(String::from),
            created_at: Utc::now(),
        }
    }

    fn sample_car(id: &str) -> Car {
        Car {
            id: id.to_string(),
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2021,
            license_plate: "GR-1234-21".to_string(),
            capacity: 4,
            category: CarCategory::Economy,
            is_available: true,
            current_location: None,
            features: Vec::new(),
            created_at: Utc::now(),
        }
    }

    struct Fixture {
        service: BookingService,
        store: Arc<MemoryStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            Self {
                service: BookingService::new(store.clone()),
                store,
            }
        }

        async fn seed_passenger(&self, id: &str) {
            self.store.insert_passenger(sample_passenger(id)).await.unwrap();
        }

        async fn seed_driver(&self, id: &str, car_id: Option<&str>) {
            self.store.insert_driver(sample_driver(id, car_id)).await.unwrap();
        }

        async fn seed_car(&self, id: &str) {
            self.store.insert_car(sample_car(id)).await.unwrap();
        }

        async fn create_booking(&self, passenger_id: &str) -> TripDetails {
            self.service
                .create_booking(BookingRequest {
                    passenger_id: passenger_id.to_string(),
                    from_location: "Osu".to_string(),
                    to_location: "Kotoka Airport".to_string(),
                    estimated_distance_km: 10.0,
                    estimated_duration_minutes: 20.0,
                })
                .await
                .unwrap()
        }

        async fn driver_available(&self, id: &str) -> bool {
            self.store.get_driver(id).await.unwrap().unwrap().is_available
        }

        async fn car_available(&self, id: &str) -> bool {
            self.store.get_car(id).await.unwrap().unwrap().is_available
        }
    }

    fn completion(distance: f64, duration: f64, base_fare: f64) -> TripCompletion {
        TripCompletion {
            actual_distance_km: distance,
            actual_duration_minutes: duration,
            base_fare,
            surge_multiplier: None,
            discount_percent: None,
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle_scenario() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_car("car-260830-ccccc").await;
        fx.seed_driver("drv-260830-aaaaa", Some("car-260830-ccccc")).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        assert_eq!(booking.status, BookingStatus::Requested);

        let accepted = fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        assert_eq!(accepted.status, BookingStatus::Accepted);
        assert_eq!(accepted.driver_id.as_deref(), Some("drv-260830-aaaaa"));
        assert_eq!(accepted.car_id.as_deref(), Some("car-260830-ccccc"));
        assert!(!fx.driver_available("drv-260830-aaaaa").await);
        assert!(!fx.car_available("car-260830-ccccc").await);

        let started = fx.service.start_trip(&booking.booking_id).await.unwrap();
        assert_eq!(started.status, BookingStatus::InProgress);
        assert!(started.pickup_time.is_some());

        let completed = fx
            .service
            .complete_trip(&booking.booking_id, completion(12.0, 25.0, 50.0))
            .await
            .unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert!(completed.completion_time.is_some());

        // (50 + 12*10 + 25*2) * 1 = 220.00
        let fare = completed.fare.unwrap();
        assert_eq!(fare.total_amount, 220.0);
        assert_eq!(fare.payment_status, PaymentStatus::Pending);

        assert!(fx.driver_available("drv-260830-aaaaa").await);
        assert!(fx.car_available("car-260830-ccccc").await);
    }

    #[tokio::test]
    async fn test_create_requires_existing_passenger() {
        let fx = Fixture::new();
        let err = fx
            .service
            .create_booking(BookingRequest {
                passenger_id: "pas-260830-yyyyy".to_string(),
                from_location: "Osu".to_string(),
                to_location: "Airport".to_string(),
                estimated_distance_km: 10.0,
                estimated_duration_minutes: 20.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PassengerNotFound(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;

        let err = fx
            .service
            .create_booking(BookingRequest {
                passenger_id: "pas-260830-aaaaa".to_string(),
                from_location: "".to_string(),
                to_location: "Airport".to_string(),
                estimated_distance_km: 10.0,
                estimated_duration_minutes: 20.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));

        let err = fx
            .service
            .create_booking(BookingRequest {
                passenger_id: "pas-260830-aaaaa".to_string(),
                from_location: "Osu".to_string(),
                to_location: "Airport".to_string(),
                estimated_distance_km: -1.0,
                estimated_duration_minutes: 20.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_create_appends_passenger_history_in_order() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;

        let first = fx.create_booking("pas-260830-aaaaa").await;
        let second = fx.create_booking("pas-260830-aaaaa").await;

        let passenger = fx.store.get_passenger("pas-260830-aaaaa").await.unwrap().unwrap();
        assert_eq!(
            passenger.booking_history,
            vec![first.booking_id.clone(), second.booking_id.clone()]
        );

        let bookings = fx.service.bookings_by_passenger("pas-260830-aaaaa").await.unwrap();
        let ids: Vec<&str> = bookings.iter().map(|b| b.booking_id.as_str()).collect();
        assert_eq!(ids, vec![first.booking_id.as_str(), second.booking_id.as_str()]);
    }

    #[tokio::test]
    async fn test_assign_unknown_booking_or_driver() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        let booking = fx.create_booking("pas-260830-aaaaa").await;

        assert!(matches!(
            fx.service.assign_driver("bok-260830-zzzzz", "drv-260830-aaaaa").await.unwrap_err(),
            AppError::BookingNotFound(_)
        ));
        assert!(matches!(
            fx.service.assign_driver(&booking.booking_id, "drv-260830-yyyyy").await.unwrap_err(),
            AppError::DriverNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_driver_cannot_be_claimed_twice() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let first = fx.create_booking("pas-260830-aaaaa").await;
        let second = fx.create_booking("pas-260830-aaaaa").await;

        fx.service.assign_driver(&first.booking_id, "drv-260830-aaaaa").await.unwrap();
        let err = fx.service.assign_driver(&second.booking_id, "drv-260830-aaaaa").await.unwrap_err();
        assert!(matches!(err, AppError::DriverNotAvailable(_)));
    }

    #[tokio::test]
    async fn test_assign_to_terminal_booking_fails() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.cancel_trip(&booking.booking_id, None).await.unwrap();

        let err = fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        // The driver was never claimed
        assert!(fx.driver_available("drv-260830-aaaaa").await);
    }

    #[tokio::test]
    async fn test_assign_driver_without_car() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        let accepted = fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();

        assert_eq!(accepted.driver_id.as_deref(), Some("drv-260830-aaaaa"));
        assert!(accepted.car_id.is_none());

        // Completion must still release the driver and cope with the absent car
        fx.service.start_trip(&booking.booking_id).await.unwrap();
        fx.service
            .complete_trip(&booking.booking_id, completion(12.0, 25.0, 50.0))
            .await
            .unwrap();
        assert!(fx.driver_available("drv-260830-aaaaa").await);
    }

    #[tokio::test]
    async fn test_reassignment_releases_previous_driver() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_car("car-260830-ccccc").await;
        fx.seed_driver("drv-260830-aaaaa", Some("car-260830-ccccc")).await;
        fx.seed_driver("drv-260830-bbbbb", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        assert!(!fx.driver_available("drv-260830-aaaaa").await);

        let reassigned = fx.service.assign_driver(&booking.booking_id, "drv-260830-bbbbb").await.unwrap();
        assert_eq!(reassigned.driver_id.as_deref(), Some("drv-260830-bbbbb"));
        assert!(reassigned.car_id.is_none());

        // Previous driver and car are free again; the new driver is held
        assert!(fx.driver_available("drv-260830-aaaaa").await);
        assert!(fx.car_available("car-260830-ccccc").await);
        assert!(!fx.driver_available("drv-260830-bbbbb").await);
    }

    #[tokio::test]
    async fn test_start_without_driver_fails_and_leaves_booking_unchanged() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        let booking = fx.create_booking("pas-260830-aaaaa").await;

        let err = fx.service.start_trip(&booking.booking_id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        let details = fx.service.get_trip_details(&booking.booking_id).await.unwrap();
        assert_eq!(details.status, BookingStatus::Requested);
        assert!(details.pickup_time.is_none());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        fx.service.start_trip(&booking.booking_id).await.unwrap();

        let err = fx.service.start_trip(&booking.booking_id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_complete_requires_in_progress() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;

        // Requested
        let err = fx
            .service
            .complete_trip(&booking.booking_id, completion(12.0, 25.0, 50.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        // Accepted
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        let err = fx
            .service
            .complete_trip(&booking.booking_id, completion(12.0, 25.0, 50.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        // Booking unchanged either way
        let details = fx.service.get_trip_details(&booking.booking_id).await.unwrap();
        assert_eq!(details.status, BookingStatus::Accepted);
        assert!(details.fare.is_none());
        assert!(details.completion_time.is_none());
    }

    #[tokio::test]
    async fn test_complete_twice_fails() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        fx.service.start_trip(&booking.booking_id).await.unwrap();
        fx.service
            .complete_trip(&booking.booking_id, completion(12.0, 25.0, 50.0))
            .await
            .unwrap();

        let err = fx
            .service
            .complete_trip(&booking.booking_id, completion(1.0, 1.0, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_complete_with_surge_and_discount() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        fx.service.start_trip(&booking.booking_id).await.unwrap();

        // subtotal 100, surge 1.5 -> 150, 10% discount -> 135.00
        let completed = fx
            .service
            .complete_trip(
                &booking.booking_id,
                TripCompletion {
                    actual_distance_km: 0.0,
                    actual_duration_minutes: 0.0,
                    base_fare: 100.0,
                    surge_multiplier: Some(1.5),
                    discount_percent: Some(10.0),
                },
            )
            .await
            .unwrap();

        assert_eq!(completed.fare.unwrap().total_amount, 135.0);
    }

    #[tokio::test]
    async fn test_complete_rejects_bad_metrics() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        fx.service.start_trip(&booking.booking_id).await.unwrap();

        let mut bad = completion(-1.0, 25.0, 50.0);
        assert!(matches!(
            fx.service.complete_trip(&booking.booking_id, bad).await.unwrap_err(),
            AppError::ValidationFailed(_)
        ));

        bad = completion(12.0, 25.0, 50.0);
        bad.surge_multiplier = Some(0.5);
        assert!(matches!(
            fx.service.complete_trip(&booking.booking_id, bad).await.unwrap_err(),
            AppError::ValidationFailed(_)
        ));

        bad = completion(12.0, 25.0, 50.0);
        bad.discount_percent = Some(120.0);
        assert!(matches!(
            fx.service.complete_trip(&booking.booking_id, bad).await.unwrap_err(),
            AppError::ValidationFailed(_)
        ));

        // Still in progress after all the rejections
        let details = fx.service.get_trip_details(&booking.booking_id).await.unwrap();
        assert_eq!(details.status, BookingStatus::InProgress);
    }

    #[tokio::test]
    async fn test_cancel_requested_booking_touches_no_resources() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_car("car-260830-ccccc").await;
        fx.seed_driver("drv-260830-aaaaa", Some("car-260830-ccccc")).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        let cancelled = fx
            .service
            .cancel_trip(&booking.booking_id, Some("changed my mind".to_string()))
            .await
            .unwrap();

        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("changed my mind"));
        assert!(cancelled.cancellation_time.is_some());

        // Unassigned resources untouched
        assert!(fx.driver_available("drv-260830-aaaaa").await);
        assert!(fx.car_available("car-260830-ccccc").await);
    }

    #[tokio::test]
    async fn test_cancel_releases_assigned_resources() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_car("car-260830-ccccc").await;
        fx.seed_driver("drv-260830-aaaaa", Some("car-260830-ccccc")).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        fx.service.start_trip(&booking.booking_id).await.unwrap();

        fx.service.cancel_trip(&booking.booking_id, None).await.unwrap();
        assert!(fx.driver_available("drv-260830-aaaaa").await);
        assert!(fx.car_available("car-260830-ccccc").await);
    }

    #[tokio::test]
    async fn test_cancel_terminal_booking_fails() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.cancel_trip(&booking.booking_id, None).await.unwrap();

        let err = fx.service.cancel_trip(&booking.booking_id, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_bookings_by_driver() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let first = fx.create_booking("pas-260830-aaaaa").await;
        fx.create_booking("pas-260830-aaaaa").await; // Never assigned
        fx.service.assign_driver(&first.booking_id, "drv-260830-aaaaa").await.unwrap();

        let bookings = fx.service.bookings_by_driver("drv-260830-aaaaa").await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].booking_id, first.booking_id);
    }

    #[tokio::test]
    async fn test_fare_followups_require_completed_booking() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        let err = fx.service.apply_discount(&booking.booking_id, 10.0).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_discount_after_completion_is_idempotent() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        fx.service.start_trip(&booking.booking_id).await.unwrap();
        fx.service
            .complete_trip(&booking.booking_id, completion(12.0, 25.0, 50.0))
            .await
            .unwrap();

        let once = fx.service.apply_discount(&booking.booking_id, 20.0).await.unwrap();
        let twice = fx.service.apply_discount(&booking.booking_id, 20.0).await.unwrap();
        assert_eq!(once.total_amount, twice.total_amount);
        assert_eq!(once.total_amount, 176.0); // 220 * 0.8
    }

    #[tokio::test]
    async fn test_paid_fare_is_frozen() {
        let fx = Fixture::new();
        fx.seed_passenger("pas-260830-aaaaa").await;
        fx.seed_driver("drv-260830-aaaaa", None).await;

        let booking = fx.create_booking("pas-260830-aaaaa").await;
        fx.service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();
        fx.service.start_trip(&booking.booking_id).await.unwrap();
        fx.service
            .complete_trip(&booking.booking_id, completion(12.0, 25.0, 50.0))
            .await
            .unwrap();

        let paid = fx
            .service
            .mark_fare_paid(&booking.booking_id, "mobile_money".to_string())
            .await
            .unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.payment_method.as_deref(), Some("mobile_money"));

        assert!(matches!(
            fx.service.apply_discount(&booking.booking_id, 10.0).await.unwrap_err(),
            AppError::InvalidTransition(_)
        ));
        assert!(matches!(
            fx.service
                .mark_fare_paid(&booking.booking_id, "cash".to_string())
                .await
                .unwrap_err(),
            AppError::InvalidTransition(_)
        ));
    }

    #[tokio::test]
    async fn test_get_trip_details_unknown_booking() {
        let fx = Fixture::new();
        let err = fx.service.get_trip_details("bok-260830-zzzzz").await.unwrap_err();
        assert!(matches!(err, AppError::BookingNotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_ids_are_rejected() {
        let fx = Fixture::new();
        assert!(matches!(
            fx.service.get_trip_details("booking-42").await.unwrap_err(),
            AppError::ValidationFailed(_)
        ));
        assert!(matches!(
            fx.service.bookings_by_passenger("alice").await.unwrap_err(),
            AppError::ValidationFailed(_)
        ));

        fx.seed_passenger("pas-260830-aaaaa").await;
        let booking = fx.create_booking("pas-260830-aaaaa").await;
        assert!(matches!(
            fx.service.assign_driver(&booking.booking_id, "driver_7").await.unwrap_err(),
            AppError::ValidationFailed(_)
        ));
    }

    /// Store wrapper that lets a test commit an interleaved transition right
    /// before a caller's compare-and-swap, forcing that caller to lose.
    struct ContestedStore {
        inner: Arc<MemoryStore>,
        start_before_swap: tokio::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl Store for ContestedStore {
        async fn insert_passenger(&self, passenger: Passenger) -> AppResult<()> {
            self.inner.insert_passenger(passenger).await
        }
        async fn get_passenger(&self, id: &str) -> AppResult<Option<Passenger>> {
            self.inner.get_passenger(id).await
        }
        async fn update_passenger(&self, passenger: Passenger) -> AppResult<()> {
            self.inner.update_passenger(passenger).await
        }
        async fn delete_passenger(&self, id: &str) -> AppResult<()> {
            self.inner.delete_passenger(id).await
        }
        async fn append_booking_history(&self, passenger_id: &str, booking_id: &str) -> AppResult<()> {
            self.inner.append_booking_history(passenger_id, booking_id).await
        }
        async fn insert_driver(&self, driver: Driver) -> AppResult<()> {
            self.inner.insert_driver(driver).await
        }
        async fn get_driver(&self, id: &str) -> AppResult<Option<Driver>> {
            self.inner.get_driver(id).await
        }
        async fn update_driver(&self, driver: Driver) -> AppResult<()> {
            self.inner.update_driver(driver).await
        }
        async fn delete_driver(&self, id: &str) -> AppResult<()> {
            self.inner.delete_driver(id).await
        }
        async fn assign_car_to_driver(&self, driver_id: &str, car_id: &str) -> AppResult<Driver> {
            self.inner.assign_car_to_driver(driver_id, car_id).await
        }
        async fn set_driver_availability(&self, id: &str, is_available: bool) -> AppResult<Driver> {
            self.inner.set_driver_availability(id, is_available).await
        }
        async fn record_driver_rating(&self, id: &str, rating: f64) -> AppResult<Driver> {
            self.inner.record_driver_rating(id, rating).await
        }
        async fn claim_driver(&self, driver_id: &str) -> AppResult<ClaimedDriver> {
            self.inner.claim_driver(driver_id).await
        }
        async fn release_assignment(&self, driver_id: &str, car_id: Option<&str>) -> AppResult<()> {
            self.inner.release_assignment(driver_id, car_id).await
        }
        async fn insert_car(&self, car: Car) -> AppResult<()> {
            self.inner.insert_car(car).await
        }
        async fn get_car(&self, id: &str) -> AppResult<Option<Car>> {
            self.inner.get_car(id).await
        }
        async fn update_car(&self, car: Car) -> AppResult<()> {
            self.inner.update_car(car).await
        }
        async fn delete_car(&self, id: &str) -> AppResult<()> {
            self.inner.delete_car(id).await
        }
        async fn set_car_availability(&self, id: &str, is_available: bool) -> AppResult<Car> {
            self.inner.set_car_availability(id, is_available).await
        }
        async fn update_car_location(&self, id: &str, location: String) -> AppResult<Car> {
            self.inner.update_car_location(id, location).await
        }
        async fn available_cars(&self, category: Option<CarCategory>) -> AppResult<Vec<Car>> {
            self.inner.available_cars(category).await
        }
        async fn insert_booking(&self, booking: Booking) -> AppResult<()> {
            self.inner.insert_booking(booking).await
        }
        async fn get_booking(&self, id: &str) -> AppResult<Option<Booking>> {
            self.inner.get_booking(id).await
        }
        async fn update_booking_if(&self, booking: Booking, expected: BookingStatus) -> AppResult<bool> {
            let pending = self.start_before_swap.lock().await.take();
            if pending.as_deref() == Some(booking.id.as_str()) {
                let mut current = self
                    .inner
                    .get_booking(&booking.id)
                    .await?
                    .expect("booking must exist");
                let status = current.status;
                current.start();
                self.inner.update_booking_if(current, status).await?;
            }
            self.inner.update_booking_if(booking, expected).await
        }
        async fn bookings_by_passenger(&self, passenger_id: &str) -> AppResult<Vec<Booking>> {
            self.inner.bookings_by_passenger(passenger_id).await
        }
        async fn bookings_by_driver(&self, driver_id: &str) -> AppResult<Vec<Booking>> {
            self.inner.bookings_by_driver(driver_id).await
        }
    }

    #[tokio::test]
    async fn test_losing_reassignment_keeps_previous_claim() {
        let inner = Arc::new(MemoryStore::new());
        let store = Arc::new(ContestedStore {
            inner: inner.clone(),
            start_before_swap: tokio::sync::Mutex::new(None),
        });
        let service = BookingService::new(store.clone());

        inner.insert_passenger(sample_passenger("pas-260830-aaaaa")).await.unwrap();
        inner.insert_driver(sample_driver("drv-260830-aaaaa", None)).await.unwrap();
        inner.insert_driver(sample_driver("drv-260830-bbbbb", None)).await.unwrap();

        let booking = service
            .create_booking(BookingRequest {
                passenger_id: "pas-260830-aaaaa".to_string(),
                from_location: "Osu".to_string(),
                to_location: "Kotoka Airport".to_string(),
                estimated_distance_km: 10.0,
                estimated_duration_minutes: 20.0,
            })
            .await
            .unwrap();
        service.assign_driver(&booking.booking_id, "drv-260830-aaaaa").await.unwrap();

        // A start commits between the reassignment's read and its swap
        *store.start_before_swap.lock().await = Some(booking.booking_id.clone());
        let err = service
            .assign_driver(&booking.booking_id, "drv-260830-bbbbb")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        // The booking went in progress still holding the first driver
        let details = service.get_trip_details(&booking.booking_id).await.unwrap();
        assert_eq!(details.status, BookingStatus::InProgress);
        assert_eq!(details.driver_id.as_deref(), Some("drv-260830-aaaaa"));

        // That driver must still be held; only the loser's claim is undone
        assert!(!inner.get_driver("drv-260830-aaaaa").await.unwrap().unwrap().is_available);
        assert!(inner.get_driver("drv-260830-bbbbb").await.unwrap().unwrap().is_available);
    }
}
