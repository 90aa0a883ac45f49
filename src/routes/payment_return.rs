use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::oid::ObjectId, Client};
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::booking::ProductKind;
use crate::routes::checkout::checkout_error_response;
use crate::services::booking_service::MongoBookingStore;
use crate::services::checkout_service::{self, FinalizeOutcome, GatewayReturn};
use crate::services::payment::interface::PaymentGateway;
use crate::services::payment::momo::{MomoGateway, MomoReturnParams};
use crate::services::payment::zalopay::{ZaloPayGateway, ZaloPayReturnParams};
use crate::services::pending_service::MongoPendingStore;
use crate::services::reconciliation::MongoReconciliationLog;

/// Return from the MoMo hosted page. The frontend relays the redirect query
/// parameters verbatim; the signature is checked here, server-side, and the
/// outcome is only trusted after the status-check call agrees.
pub async fn momo_return(
    data: web::Data<Arc<Client>>,
    momo: web::Data<MomoGateway>,
    path: web::Path<(String,)>,
    params: web::Json<MomoReturnParams>,
    user: AuthenticatedUser,
) -> impl Responder {
    let (kind,) = path.into_inner();
    let Some(product) = ProductKind::from_path(&kind) else {
        return HttpResponse::NotFound().body("Unknown product kind");
    };

    let params = params.into_inner();
    if momo.verify_return(&params).is_err() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "invalid payment information",
        }));
    }

    let ret = GatewayReturn {
        order_id: params.order_id,
        transaction_id: if params.trans_id.is_empty() {
            None
        } else {
            Some(params.trans_id)
        },
        success_hint: params.result_code == "0",
        message: params.message,
    };

    finalize(data, momo.get_ref(), product, ret, user).await
}

/// Return from the ZaloPay hosted page; checksum keyed with key2.
pub async fn zalopay_return(
    data: web::Data<Arc<Client>>,
    zalopay: web::Data<ZaloPayGateway>,
    path: web::Path<(String,)>,
    params: web::Json<ZaloPayReturnParams>,
    user: AuthenticatedUser,
) -> impl Responder {
    let (kind,) = path.into_inner();
    let Some(product) = ProductKind::from_path(&kind) else {
        return HttpResponse::NotFound().body("Unknown product kind");
    };

    let params = params.into_inner();
    if zalopay.verify_return(&params).is_err() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "invalid payment information",
        }));
    }

    let ret = GatewayReturn {
        order_id: params.apptransid,
        transaction_id: None,
        success_hint: params.status == "1",
        message: format!("gateway status {}", params.status),
    };

    finalize(data, zalopay.get_ref(), product, ret, user).await
}

async fn finalize<G: PaymentGateway>(
    data: web::Data<Arc<Client>>,
    gateway: &G,
    product: ProductKind,
    ret: GatewayReturn,
    user: AuthenticatedUser,
) -> HttpResponse {
    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let client = data.get_ref().clone();
    let bookings = MongoBookingStore::new(client.clone());
    let pending = MongoPendingStore::new(client.clone());
    let reconciliation = MongoReconciliationLog::new(client);

    match checkout_service::finalize_return(
        user_id,
        product,
        ret,
        gateway,
        &bookings,
        &pending,
        &reconciliation,
    )
    .await
    {
        Ok(FinalizeOutcome::Confirmed { booking_id }) => {
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Booking confirmed",
                "booking_id": booking_id,
            }))
        }
        Ok(FinalizeOutcome::AlreadyRecorded) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Booking already recorded",
        })),
        Ok(FinalizeOutcome::ConfirmedUnrecorded {
            order_id,
            transaction_id,
        }) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "warning": "Payment captured but the booking could not be recorded. \
                        Support has been notified; do not pay again.",
            "order_id": order_id,
            "transaction_id": transaction_id,
        })),
        Ok(FinalizeOutcome::Failed { message }) => HttpResponse::Ok().json(serde_json::json!({
            "success": false,
            "message": message,
        })),
        Err(err) => checkout_error_response(err),
    }
}
