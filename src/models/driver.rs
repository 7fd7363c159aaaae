// src/models/driver.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub license_number: String,
    pub is_available: bool,
    pub rating: f64,            // Running average (0-5 by caller discipline)
    pub total_ratings: u32,
    pub assigned_car_id: Option<String>, // Weak reference, resolved through the store
    pub created_at: DateTime<Utc>,
}

impl Driver {
    /// Running-average rating update. The range is not validated here;
    /// callers are expected to pass sane values.
    pub fn record_rating(&mut self, value: f64) {
        let total = self.rating * self.total_ratings as f64;
        self.total_ratings += 1;
        self.rating = (total + value) / self.total_ratings as f64;
    }
}

// Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct DriverRegistration {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub license_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarAssignment {
    pub car_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverAvailabilityUpdate {
    pub is_available: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverRating {
    pub rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub license_number: String,
    pub is_available: bool,
    pub rating: f64,
    pub total_ratings: u32,
    pub assigned_car_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_running_average() {
        let mut driver = Driver {
            id: "drv-250830-a1b2c".to_string(),
            name: "Kofi Boateng".to_string(),
            phone: "+233209876543".to_string(),
            email: "kofi@example.com".to_string(),
            license_number: "GH-DL-44821".to_string(),
            is_available: true,
            rating: 0.0,
            total_ratings: 0,
            assigned_car_id: None,
            created_at: Utc::now(),
        };

        driver.record_rating(4.0);
        assert_eq!(driver.rating, 4.0);
        assert_eq!(driver.total_ratings, 1);

        driver.record_rating(5.0);
        assert_eq!(driver.rating, 4.5);
        assert_eq!(driver.total_ratings, 2);

        driver.record_rating(3.0);
        assert_eq!(driver.rating, 4.0);
        assert_eq!(driver.total_ratings, 3);
    }
}
