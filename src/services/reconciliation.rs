use mongodb::Client;
use std::sync::Arc;

use crate::models::booking::ReconciliationFailure;
use crate::services::pending_service::StoreError;

/// Durable record of paid-but-unrecorded bookings so support can resolve
/// them by hand.
pub trait ReconciliationLog {
    async fn record(&self, failure: &ReconciliationFailure) -> Result<(), StoreError>;
}

pub struct MongoReconciliationLog {
    client: Arc<Client>,
}

impl MongoReconciliationLog {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> mongodb::Collection<ReconciliationFailure> {
        self.client
            .database("Checkout")
            .collection("ReconciliationFailures")
    }
}

impl ReconciliationLog for MongoReconciliationLog {
    async fn record(&self, failure: &ReconciliationFailure) -> Result<(), StoreError> {
        self.collection().insert_one(failure).await?;
        Ok(())
    }
}
