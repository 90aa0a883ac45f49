use mongodb::error::{ErrorKind, WriteError, WriteFailure};
use mongodb::Client;
use std::sync::Arc;

use crate::models::booking::Booking;

#[derive(Debug, thiserror::Error)]
pub enum BookingWriteError {
    #[error("a booking for this submission already exists")]
    DuplicateSubmission,
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

/// Write seam for the checkout orchestrator; the unique index on
/// `idempotency_key` turns repeated submissions into `DuplicateSubmission`.
pub trait BookingWriter {
    async fn create(&self, booking: &Booking) -> Result<String, BookingWriteError>;
}

pub struct MongoBookingStore {
    client: Arc<Client>,
}

impl MongoBookingStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> mongodb::Collection<Booking> {
        self.client.database("Account").collection("Bookings")
    }
}

impl BookingWriter for MongoBookingStore {
    async fn create(&self, booking: &Booking) -> Result<String, BookingWriteError> {
        match self.collection().insert_one(booking).await {
            Ok(result) => Ok(result
                .inserted_id
                .as_object_id()
                .map(|id| id.to_hex())
                .unwrap_or_default()),
            Err(err) => {
                if let ErrorKind::Write(WriteFailure::WriteError(WriteError {
                    code: 11000, ..
                })) = *err.kind
                {
                    return Err(BookingWriteError::DuplicateSubmission);
                }
                Err(BookingWriteError::Database(err))
            }
        }
    }
}
