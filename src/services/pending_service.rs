use mongodb::bson::{doc, oid::ObjectId};
use mongodb::Client;
use std::sync::Arc;

use crate::models::booking::{PendingBooking, ProductKind};

/// Abandoned redirects expire after two hours (enforced by the TTL index on
/// `expires_at`).
pub const PENDING_TTL_SECS: i64 = 2 * 60 * 60;

#[derive(Debug, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StoreError(#[from] pub mongodb::error::Error);

/// Single-slot durable mailbox bridging the pre-redirect and post-redirect
/// turns of a gateway checkout. One slot per (user, product kind); staging
/// overwrites, claiming deletes.
pub trait PendingBookingStore {
    async fn stage(&self, pending: &PendingBooking) -> Result<(), StoreError>;

    async fn load(
        &self,
        user_id: ObjectId,
        product: ProductKind,
    ) -> Result<Option<PendingBooking>, StoreError>;

    /// Claim-and-delete. Only removes the slot whose gateway order id
    /// matches, so a mismatched return leaves the staged entry intact.
    async fn claim(
        &self,
        user_id: ObjectId,
        product: ProductKind,
        order_id: &str,
    ) -> Result<Option<PendingBooking>, StoreError>;
}

pub struct MongoPendingStore {
    client: Arc<Client>,
}

impl MongoPendingStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> mongodb::Collection<PendingBooking> {
        self.client.database("Checkout").collection("PendingBookings")
    }
}

impl PendingBookingStore for MongoPendingStore {
    async fn stage(&self, pending: &PendingBooking) -> Result<(), StoreError> {
        let filter = doc! {
            "user_id": pending.user_id,
            "product": pending.product.as_str(),
        };
        self.collection()
            .replace_one(filter, pending)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn load(
        &self,
        user_id: ObjectId,
        product: ProductKind,
    ) -> Result<Option<PendingBooking>, StoreError> {
        let filter = doc! { "user_id": user_id, "product": product.as_str() };
        Ok(self.collection().find_one(filter).await?)
    }

    async fn claim(
        &self,
        user_id: ObjectId,
        product: ProductKind,
        order_id: &str,
    ) -> Result<Option<PendingBooking>, StoreError> {
        let filter = doc! {
            "user_id": user_id,
            "product": product.as_str(),
            "order_id": order_id,
        };
        Ok(self.collection().find_one_and_delete(filter).await?)
    }
}
