//! Rentals
//!
//! A rental records one inventory copy going out to a customer and, once
//! it comes back, its return date. Timestamps are `YYYY-MM-DD HH:MM:SS`
//! strings in UTC, the format SQLite's `datetime()` produces.

use crate::error::{ConciergeError, ConciergeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rental {
    pub id: i64,
    pub inventory_id: i64,
    pub customer_id: i64,
    pub staff_id: i64,
    pub rental_date: String,
    pub return_date: Option<String>,
    pub last_update: String,
}

/// Input for opening a rental; `rental_date` defaults to now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRental {
    pub inventory_id: i64,
    pub customer_id: i64,
    pub staff_id: i64,
    pub rental_date: Option<String>,
}

impl NewRental {
    pub fn new(inventory_id: i64, customer_id: i64, staff_id: i64) -> Self {
        Self {
            inventory_id,
            customer_id,
            staff_id,
            rental_date: None,
        }
    }

    pub fn with_rental_date(mut self, rental_date: impl Into<String>) -> Self {
        self.rental_date = Some(rental_date.into());
        self
    }

    pub fn validate(&self) -> ConciergeResult<()> {
        for (name, id) in [
            ("inventory_id", self.inventory_id),
            ("customer_id", self.customer_id),
            ("staff_id", self.staff_id),
        ] {
            if id <= 0 {
                return Err(ConciergeError::Catalog(format!(
                    "{} must be positive, got {}",
                    name, id
                )));
            }
        }
        Ok(())
    }
}

/// Only the return date of a rental can change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalUpdate {
    pub return_date: Option<String>,
}

impl RentalUpdate {
    pub fn returned_at(return_date: impl Into<String>) -> Self {
        Self {
            return_date: Some(return_date.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.return_date.is_none()
    }
}

#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn create_rental(&self, rental: NewRental) -> ConciergeResult<Rental>;

    async fn get_rental(&self, rental_id: i64) -> ConciergeResult<Option<Rental>>;

    /// Newest first when filtered by customer, oldest first otherwise
    async fn list_rentals(
        &self,
        skip: usize,
        limit: usize,
        customer_id: Option<i64>,
    ) -> ConciergeResult<Vec<Rental>>;

    /// An empty update returns the rental unchanged
    async fn update_rental(
        &self,
        rental_id: i64,
        update: RentalUpdate,
    ) -> ConciergeResult<Option<Rental>>;

    async fn delete_rental(&self, rental_id: i64) -> ConciergeResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rental_requires_positive_ids() {
        assert!(NewRental::new(1, 1, 1).validate().is_ok());

        let err = NewRental::new(1, 0, 1).validate().unwrap_err();
        assert!(err.to_string().contains("customer_id"));
        assert!(NewRental::new(-4, 1, 1).validate().is_err());
    }

    #[test]
    fn test_rental_update_emptiness() {
        assert!(RentalUpdate::default().is_empty());
        assert!(!RentalUpdate::returned_at("2022-05-27 10:00:00").is_empty());
    }
}
