//! The single checkout path shared by tours, flights and activities. One
//! submission attempt walks Validating -> Pricing -> Dispatching; a gateway
//! return walks the verify-claim-create protocol in `finalize_return`.

use std::collections::HashSet;
use std::sync::Mutex;

use mongodb::bson::{oid::ObjectId, DateTime};
use sha2::{Digest, Sha256};

use crate::models::booking::{
    Booking, BookingStatus, PaymentMethod, PendingBooking, ProductKind, ReconciliationFailure,
};
use crate::models::discount::Discount;
use crate::models::participant::Participant;
use crate::services::booking_service::{BookingWriteError, BookingWriter};
use crate::services::discount_service::{DiscountError, DiscountService};
use crate::services::participant_service::{IdPolicy, ParticipantService, ValidationError};
use crate::services::payment::interface::{GatewayError, OrderRequest, PaymentGateway};
use crate::services::pending_service::{PendingBookingStore, StoreError, PENDING_TTL_SECS};
use crate::services::pricing_service::{AddOnCharge, FarePolicy, LineItem, PricingService};
use crate::services::reconciliation::ReconciliationLog;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("payment method is required")]
    PaymentMethodRequired,
    #[error("{0}")]
    Discount(#[from] DiscountError),
    #[error("another submission is already in progress")]
    SubmissionInProgress,
    #[error("this booking was already submitted")]
    DuplicateSubmission,
    #[error("could not start the payment: {0}")]
    GatewayInitiation(#[source] GatewayError),
    #[error("invalid payment information")]
    InvalidReturn,
    #[error("booking context lost")]
    ContextLost,
    #[error("payment does not match the pending booking")]
    OrderMismatch,
    #[error("could not verify the payment: {0}")]
    GatewayVerification(#[source] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BookingWriteError> for CheckoutError {
    fn from(err: BookingWriteError) -> Self {
        match err {
            BookingWriteError::DuplicateSubmission => CheckoutError::DuplicateSubmission,
            BookingWriteError::Database(err) => CheckoutError::Store(StoreError(err)),
        }
    }
}

/// Per-product-kind specialisation of the one generic checkout path.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
    pub product: ProductKind,
    pub id_policy: IdPolicy,
    pub fare_policy: FarePolicy,
}

impl CheckoutConfig {
    pub fn for_product(product: ProductKind) -> Self {
        match product {
            ProductKind::Flight => Self {
                product,
                id_policy: IdPolicy::flight(),
                fare_policy: FarePolicy::flight(),
            },
            ProductKind::Tour | ProductKind::Activity => Self {
                product,
                id_policy: IdPolicy::none(),
                fare_policy: FarePolicy::default(),
            },
        }
    }
}

/// What is being bought, resolved server-side from the catalog.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    pub user_id: ObjectId,
    pub product: ProductKind,
    pub item_id: ObjectId,
    pub item_title: String,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub participants: Vec<Participant>,
    pub payment_method: Option<PaymentMethod>,
    pub note: Option<String>,
    pub travel_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Cart {
    pub line_items: Vec<LineItem>,
    pub add_ons: Vec<AddOnCharge>,
    pub discount: Option<Discount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub subtotal: i64,
    pub discount_amount: i64,
    pub total: i64,
    pub discount_code: Option<String>,
}

/// Pricing step: pure, so the totals can be asserted without collaborators.
pub fn price(cart: &Cart) -> PricedCart {
    let subtotal = PricingService::subtotal(&cart.line_items, &cart.add_ons);
    let (discount_amount, total) = DiscountService::final_total(subtotal, cart.discount.as_ref());
    PricedCart {
        subtotal,
        discount_amount,
        total,
        discount_code: cart.discount.as_ref().map(|d| d.code.clone()),
    }
}

/// Deterministic submission key: the same user re-submitting the same cart
/// within a ten-minute bucket hashes identically, so the unique index on
/// bookings rejects the duplicate server-side.
pub fn idempotency_key(
    user_id: &ObjectId,
    product: ProductKind,
    item_id: &ObjectId,
    total: i64,
    participant_count: usize,
    discount_code: Option<&str>,
    now: DateTime,
) -> String {
    let bucket = now.timestamp_millis() / 600_000;
    let mut hasher = Sha256::new();
    hasher.update(user_id.to_hex());
    hasher.update(product.as_str());
    hasher.update(item_id.to_hex());
    hasher.update(total.to_le_bytes());
    hasher.update((participant_count as u64).to_le_bytes());
    hasher.update(discount_code.unwrap_or(""));
    hasher.update(bucket.to_le_bytes());
    hex::encode(hasher.finalize())
}

/// In-process re-entrancy guard: one submission in flight per (user,
/// product). Cross-tab and cross-device duplicates are caught by the
/// idempotency key instead.
pub struct SubmissionGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn acquire(&self, user_id: &ObjectId, product: ProductKind) -> Option<SubmissionPermit<'_>> {
        let key = format!("{}:{}", user_id.to_hex(), product.as_str());
        let mut set = self.in_flight.lock().unwrap();
        if !set.insert(key.clone()) {
            return None;
        }
        Some(SubmissionPermit { guard: self, key })
    }
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SubmissionPermit<'a> {
    guard: &'a SubmissionGuard,
    key: String,
}

impl Drop for SubmissionPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.lock().unwrap().remove(&self.key);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created { booking_id: String },
    RedirectToGateway { pay_url: String, order_id: String },
}

/// One submission attempt. Direct methods book synchronously; gateway
/// methods create the hosted order, stage the PendingBooking snapshot and
/// hand back the redirect URL. Nothing is persisted on a failed initiation.
pub async fn submit<B, P, G>(
    ctx: SubmissionContext,
    submission: Submission,
    cart: Cart,
    config: &CheckoutConfig,
    guard: &SubmissionGuard,
    bookings: &B,
    pending: &P,
    gateway: Option<&G>,
) -> Result<SubmitOutcome, CheckoutError>
where
    B: BookingWriter,
    P: PendingBookingStore,
    G: PaymentGateway,
{
    // Validating: every rejection happens before any collaborator call.
    let method = submission
        .payment_method
        .ok_or(CheckoutError::PaymentMethodRequired)?;
    ParticipantService::validate(&submission.participants, config.id_policy)?;

    let _permit = guard
        .acquire(&ctx.user_id, ctx.product)
        .ok_or(CheckoutError::SubmissionInProgress)?;

    // Pricing
    let priced = price(&cart);
    let now = DateTime::now();
    let key = idempotency_key(
        &ctx.user_id,
        ctx.product,
        &ctx.item_id,
        priced.total,
        submission.participants.len(),
        priced.discount_code.as_deref(),
        now,
    );

    // Dispatching
    if method.is_gateway() {
        let gateway = gateway.ok_or_else(|| {
            CheckoutError::GatewayInitiation(GatewayError::Config(format!(
                "no gateway configured for {}",
                method.as_str()
            )))
        })?;

        let extra_data = serde_json::json!({
            "product": ctx.product.as_str(),
            "itemId": ctx.item_id.to_hex(),
            "userId": ctx.user_id.to_hex(),
        })
        .to_string();
        let order = gateway
            .create_order(&OrderRequest {
                amount: priced.total,
                order_info: format!("vivu booking: {}", ctx.item_title),
                extra_data,
                customer_id: ctx.user_id.to_hex(),
            })
            .await
            .map_err(CheckoutError::GatewayInitiation)?;

        let staged = PendingBooking {
            id: None,
            user_id: ctx.user_id,
            product: ctx.product,
            item_id: ctx.item_id,
            item_title: ctx.item_title,
            participants: submission.participants,
            subtotal: priced.subtotal,
            discount_amount: priced.discount_amount,
            discount_code: priced.discount_code,
            total: priced.total,
            note: submission.note,
            payment_method: method,
            order_id: order.order_id.clone(),
            request_id: order.request_id,
            idempotency_key: key,
            travel_date: submission.travel_date,
            expires_at: DateTime::from_millis(now.timestamp_millis() + PENDING_TTL_SECS * 1000),
            created_at: Some(now),
        };
        pending.stage(&staged).await?;

        Ok(SubmitOutcome::RedirectToGateway {
            pay_url: order.pay_url,
            order_id: order.order_id,
        })
    } else {
        let booking = Booking {
            id: None,
            user_id: ctx.user_id,
            product: ctx.product,
            item_id: ctx.item_id,
            item_title: ctx.item_title,
            participants: submission.participants,
            subtotal: priced.subtotal,
            discount_amount: priced.discount_amount,
            discount_code: priced.discount_code,
            total: priced.total,
            note: submission.note,
            payment_method: method,
            gateway_order_id: None,
            transaction_id: None,
            idempotency_key: key,
            status: BookingStatus::Pending,
            travel_date: submission.travel_date,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let booking_id = bookings.create(&booking).await?;
        Ok(SubmitOutcome::Created { booking_id })
    }
}

/// Normalized browser-return data, after provider-specific signature
/// verification in the route layer.
#[derive(Debug, Clone)]
pub struct GatewayReturn {
    pub order_id: String,
    pub transaction_id: Option<String>,
    /// Result code from the URL parameters. A hint only; the authoritative
    /// answer comes from the status-check call.
    pub success_hint: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Confirmed {
        booking_id: String,
    },
    /// The idempotency key matched an existing booking; the payment was
    /// already recorded.
    AlreadyRecorded,
    /// Money captured, booking not recorded: escalated via the
    /// reconciliation log, never retried silently.
    ConfirmedUnrecorded {
        order_id: String,
        transaction_id: Option<String>,
    },
    Failed {
        message: String,
    },
}

/// Return-from-gateway protocol: load the staged snapshot, require the order
/// ids to match, ask the gateway for the authoritative status, then claim
/// the slot before writing the booking so a replayed return cannot
/// double-create.
pub async fn finalize_return<B, P, G, R>(
    user_id: ObjectId,
    product: ProductKind,
    ret: GatewayReturn,
    gateway: &G,
    bookings: &B,
    pending: &P,
    reconciliation: &R,
) -> Result<FinalizeOutcome, CheckoutError>
where
    B: BookingWriter,
    P: PendingBookingStore,
    G: PaymentGateway,
    R: ReconciliationLog,
{
    if ret.order_id.is_empty() {
        return Err(CheckoutError::InvalidReturn);
    }

    let staged = pending
        .load(user_id, product)
        .await?
        .ok_or(CheckoutError::ContextLost)?;
    if staged.order_id != ret.order_id {
        // Leave the slot untouched so a legitimate later return can still
        // succeed.
        return Err(CheckoutError::OrderMismatch);
    }

    let status = gateway
        .query_status(&staged.order_id, &staged.request_id)
        .await
        .map_err(CheckoutError::GatewayVerification)?;

    let claimed = pending
        .claim(user_id, product, &ret.order_id)
        .await?
        .ok_or(CheckoutError::ContextLost)?;

    if !(ret.success_hint && status.paid) {
        let message = if status.paid {
            ret.message
        } else {
            status.message
        };
        return Ok(FinalizeOutcome::Failed { message });
    }

    let transaction_id = status.transaction_id.or(ret.transaction_id);
    let now = DateTime::now();
    let mut note = claimed.note.clone().unwrap_or_default();
    if !note.is_empty() {
        note.push_str(" | ");
    }
    note.push_str(&format!(
        "Paid via {}, transaction {}",
        claimed.payment_method.as_str(),
        transaction_id.as_deref().unwrap_or("unknown")
    ));

    let booking = Booking {
        id: None,
        user_id: claimed.user_id,
        product: claimed.product,
        item_id: claimed.item_id,
        item_title: claimed.item_title.clone(),
        participants: claimed.participants.clone(),
        subtotal: claimed.subtotal,
        discount_amount: claimed.discount_amount,
        discount_code: claimed.discount_code.clone(),
        total: claimed.total,
        note: Some(note),
        payment_method: claimed.payment_method,
        gateway_order_id: Some(claimed.order_id.clone()),
        transaction_id: transaction_id.clone(),
        idempotency_key: claimed.idempotency_key.clone(),
        status: BookingStatus::Confirmed,
        travel_date: claimed.travel_date.clone(),
        created_at: Some(now),
        updated_at: Some(now),
    };

    match bookings.create(&booking).await {
        Ok(booking_id) => Ok(FinalizeOutcome::Confirmed { booking_id }),
        Err(BookingWriteError::DuplicateSubmission) => Ok(FinalizeOutcome::AlreadyRecorded),
        Err(err) => {
            eprintln!(
                "Payment captured but booking creation failed for order {}: {:?}",
                claimed.order_id, err
            );
            let failure = ReconciliationFailure {
                id: None,
                user_id,
                provider: claimed.payment_method,
                order_id: claimed.order_id.clone(),
                transaction_id: transaction_id.clone(),
                amount: claimed.total,
                reason: err.to_string(),
                created_at: Some(DateTime::now()),
            };
            if let Err(log_err) = reconciliation.record(&failure).await {
                eprintln!("Failed to record reconciliation failure: {:?}", log_err);
            }
            Ok(FinalizeOutcome::ConfirmedUnrecorded {
                order_id: claimed.order_id,
                transaction_id,
            })
        }
    }
}
