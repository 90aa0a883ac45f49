use actix_web::{web, HttpResponse, Responder};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::activity::Activity;
use crate::models::booking::{PaymentMethod, ProductKind};
use crate::models::flight::Flight;
use crate::models::participant::{Participant, RoleCounts};
use crate::models::tour::{AddOn, Tour};
use crate::services::checkout_service::{
    self, Cart, CheckoutConfig, CheckoutError, SubmissionContext, SubmissionGuard, SubmitOutcome,
    Submission,
};
use crate::services::discount_service::{DiscountError, DiscountLookup, MongoDiscountCatalog};
use crate::services::participant_service::ParticipantService;
use crate::services::payment::momo::MomoGateway;
use crate::services::payment::zalopay::ZaloPayGateway;
use crate::services::pending_service::MongoPendingStore;
use crate::services::booking_service::MongoBookingStore;
use crate::services::pricing_service::{AddOnCharge, LineItem, PricingService};

#[derive(Debug, Deserialize)]
pub struct AddOnSelection {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutInput {
    pub item_id: String,
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub add_ons: Vec<AddOnSelection>,
    #[serde(default)]
    pub discount_code: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub travel_date: Option<String>,
}

/// Scaffold the participant form: one blank entry per requested unit, the
/// first flagged as the contact.
pub async fn init_participants(
    path: web::Path<(String,)>,
    counts: web::Json<RoleCounts>,
) -> impl Responder {
    let (kind,) = path.into_inner();
    if ProductKind::from_path(&kind).is_none() {
        return HttpResponse::NotFound().body("Unknown product kind");
    }
    HttpResponse::Ok().json(ParticipantService::initialize(&counts))
}

pub async fn submit_checkout(
    data: web::Data<Arc<Client>>,
    momo: web::Data<MomoGateway>,
    zalopay: web::Data<ZaloPayGateway>,
    guard: web::Data<SubmissionGuard>,
    path: web::Path<(String,)>,
    input: web::Json<CheckoutInput>,
    user: AuthenticatedUser,
) -> impl Responder {
    let (kind,) = path.into_inner();
    let Some(product) = ProductKind::from_path(&kind) else {
        return HttpResponse::NotFound().body("Unknown product kind");
    };

    let client = data.get_ref().clone();
    let input = input.into_inner();

    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };
    let item_id = match ObjectId::parse_str(&input.item_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid item ID format"),
    };

    let config = CheckoutConfig::for_product(product);
    let counts = role_counts(&input.participants);

    // Prices come from the catalog, never from the client.
    let (item_title, line_items, add_ons) = match load_priced_item(
        &client,
        product,
        &config,
        item_id,
        &counts,
        &input.add_ons,
    )
    .await
    {
        Ok(parts) => parts,
        Err(response) => return response,
    };

    let discount = match &input.discount_code {
        Some(code) if !code.trim().is_empty() => {
            let catalog = MongoDiscountCatalog::new(client.clone());
            match catalog.find_valid(code.trim()).await {
                Ok(discount) => Some(discount),
                Err(DiscountError::Database(err)) => {
                    eprintln!("Failed to look up discount: {:?}", err);
                    return HttpResponse::InternalServerError()
                        .body("Failed to look up discount.");
                }
                Err(err) => {
                    return HttpResponse::BadRequest().json(serde_json::json!({
                        "success": false,
                        "message": err.to_string(),
                    }))
                }
            }
        }
        _ => None,
    };

    let ctx = SubmissionContext {
        user_id,
        product,
        item_id,
        item_title,
    };
    let submission = Submission {
        participants: input.participants,
        payment_method: input.payment_method,
        note: input.note,
        travel_date: input.travel_date,
    };
    let cart = Cart {
        line_items,
        add_ons,
        discount,
    };

    let bookings = MongoBookingStore::new(client.clone());
    let pending = MongoPendingStore::new(client);

    let result = match input.payment_method {
        Some(PaymentMethod::Momo) => {
            checkout_service::submit(
                ctx,
                submission,
                cart,
                &config,
                &guard,
                &bookings,
                &pending,
                Some(momo.get_ref()),
            )
            .await
        }
        Some(PaymentMethod::Zalopay) => {
            checkout_service::submit(
                ctx,
                submission,
                cart,
                &config,
                &guard,
                &bookings,
                &pending,
                Some(zalopay.get_ref()),
            )
            .await
        }
        _ => {
            checkout_service::submit(
                ctx,
                submission,
                cart,
                &config,
                &guard,
                &bookings,
                &pending,
                None::<&MomoGateway>,
            )
            .await
        }
    };

    match result {
        Ok(SubmitOutcome::Created { booking_id }) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Booking created",
            "booking_id": booking_id,
        })),
        Ok(SubmitOutcome::RedirectToGateway { pay_url, order_id }) => {
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Redirect to payment gateway",
                "pay_url": pay_url,
                "order_id": order_id,
            }))
        }
        Err(err) => checkout_error_response(err),
    }
}

fn role_counts(participants: &[Participant]) -> RoleCounts {
    use crate::models::participant::ParticipantRole;
    let mut counts = RoleCounts::default();
    for participant in participants {
        match participant.role {
            ParticipantRole::Adult => counts.adults += 1,
            ParticipantRole::Child => counts.children += 1,
            ParticipantRole::Infant => counts.infants += 1,
            ParticipantRole::Senior => counts.seniors += 1,
        }
    }
    counts
}

async fn load_priced_item(
    client: &Arc<Client>,
    product: ProductKind,
    config: &CheckoutConfig,
    item_id: ObjectId,
    counts: &RoleCounts,
    selections: &[AddOnSelection],
) -> Result<(String, Vec<LineItem>, Vec<AddOnCharge>), HttpResponse> {
    match product {
        ProductKind::Tour => {
            let collection: mongodb::Collection<Tour> =
                client.database("Catalog").collection("Tours");
            let tour = fetch_item(&collection, item_id, "Tour").await?;
            let line_items = PricingService::line_items_from_role_prices(
                tour.adult_price,
                tour.child_price,
                tour.infant_price,
                tour.senior_price,
                counts,
            );
            let add_ons = resolve_add_ons(&tour.add_ons, selections)?;
            Ok((tour.title, line_items, add_ons))
        }
        ProductKind::Flight => {
            let collection: mongodb::Collection<Flight> =
                client.database("Catalog").collection("Flights");
            let flight = fetch_item(&collection, item_id, "Flight").await?;
            let line_items = PricingService::line_items_from_base_fare(
                flight.base_fare,
                &config.fare_policy,
                counts,
            );
            let add_ons = resolve_add_ons(&[], selections)?;
            let title = format!("{} {}", flight.airline, flight.flight_number);
            Ok((title, line_items, add_ons))
        }
        ProductKind::Activity => {
            let collection: mongodb::Collection<Activity> =
                client.database("Catalog").collection("Activities");
            let activity = fetch_item(&collection, item_id, "Activity").await?;
            let line_items =
                PricingService::line_items_per_person(activity.price_per_person, counts);
            let add_ons = resolve_add_ons(&activity.add_ons, selections)?;
            Ok((activity.title, line_items, add_ons))
        }
    }
}

async fn fetch_item<T>(
    collection: &mongodb::Collection<T>,
    item_id: ObjectId,
    label: &str,
) -> Result<T, HttpResponse>
where
    T: serde::de::DeserializeOwned + Send + Sync,
{
    match collection.find_one(doc! { "_id": item_id }).await {
        Ok(Some(item)) => Ok(item),
        Ok(None) => Err(HttpResponse::NotFound().body(format!("{} not found", label))),
        Err(err) => {
            eprintln!("Failed to fetch {}: {:?}", label.to_lowercase(), err);
            Err(HttpResponse::InternalServerError().body(format!("Failed to fetch {}.", label)))
        }
    }
}

fn resolve_add_ons(
    catalog: &[AddOn],
    selections: &[AddOnSelection],
) -> Result<Vec<AddOnCharge>, HttpResponse> {
    let mut charges = Vec::with_capacity(selections.len());
    for selection in selections {
        let Some(add_on) = catalog.iter().find(|a| a.name == selection.name) else {
            return Err(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": format!("unknown add-on: {}", selection.name),
            })));
        };
        charges.push(AddOnCharge {
            name: add_on.name.clone(),
            fee: add_on.fee,
            quantity: selection.quantity,
        });
    }
    Ok(charges)
}

pub fn checkout_error_response(err: CheckoutError) -> HttpResponse {
    let body = serde_json::json!({
        "success": false,
        "message": err.to_string(),
    });
    match err {
        CheckoutError::Validation(_)
        | CheckoutError::PaymentMethodRequired
        | CheckoutError::Discount(_)
        | CheckoutError::InvalidReturn => HttpResponse::BadRequest().json(body),
        CheckoutError::SubmissionInProgress
        | CheckoutError::DuplicateSubmission
        | CheckoutError::OrderMismatch => HttpResponse::Conflict().json(body),
        CheckoutError::ContextLost => HttpResponse::NotFound().json(body),
        CheckoutError::GatewayInitiation(err) => {
            eprintln!("Gateway initiation failed: {:?}", err);
            HttpResponse::BadGateway().json(serde_json::json!({
                "success": false,
                "message": "could not start the payment",
            }))
        }
        CheckoutError::GatewayVerification(err) => {
            eprintln!("Gateway verification failed: {:?}", err);
            HttpResponse::BadGateway().json(serde_json::json!({
                "success": false,
                "message": "could not verify the payment",
            }))
        }
        CheckoutError::Store(err) => {
            eprintln!("Checkout storage error: {:?}", err);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "message": "internal error",
            }))
        }
    }
}
