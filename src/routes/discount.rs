use actix_web::{web, HttpResponse, Responder};
use mongodb::Client;
use std::sync::Arc;

use crate::services::discount_service::{DiscountError, DiscountLookup, MongoDiscountCatalog};

/// Validates a user-entered code. The checkout flow only ever applies codes
/// that pass this lookup.
pub async fn lookup_discount(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let (code,) = path.into_inner();
    let catalog = MongoDiscountCatalog::new(data.get_ref().clone());

    match catalog.find_valid(&code).await {
        Ok(discount) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "discount": {
                "code": discount.code,
                "kind": discount.kind,
                "value": discount.value,
            }
        })),
        Err(DiscountError::NotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "message": "discount code not found",
        })),
        Err(DiscountError::Database(err)) => {
            eprintln!("Failed to look up discount: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to look up discount.")
        }
        Err(err) => HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": err.to_string(),
        })),
    }
}
