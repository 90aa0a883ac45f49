use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::RequireRole;
use crate::models::account::UserRole;
use crate::models::activity::Activity;
use crate::models::booking::{Booking, ReconciliationFailure};
use crate::models::destination::Destination;
use crate::models::discount::Discount;
use crate::models::flight::Flight;
use crate::models::tour::Tour;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(AuthMiddleware)
            .route("/tours", web::post().to(create_tour))
            .route("/tours/{id}", web::put().to(update_tour))
            .route("/tours/{id}", web::delete().to(delete_tour))
            .route("/flights", web::post().to(create_flight))
            .route("/flights/{id}", web::put().to(update_flight))
            .route("/flights/{id}", web::delete().to(delete_flight))
            .route("/activities", web::post().to(create_activity))
            .route("/activities/{id}", web::put().to(update_activity))
            .route("/activities/{id}", web::delete().to(delete_activity))
            .route("/destinations", web::post().to(create_destination))
            .route("/destinations/{id}", web::put().to(update_destination))
            .route("/destinations/{id}", web::delete().to(delete_destination))
            .route("/discounts", web::post().to(create_discount))
            .route("/discounts/{id}", web::put().to(update_discount))
            .route("/discounts/{id}", web::delete().to(delete_discount))
            .route("/bookings", web::get().to(list_bookings))
            .route(
                "/reconciliation-failures",
                web::get().to(list_reconciliation_failures),
            ),
    );
}

async fn insert_into<T>(collection: mongodb::Collection<T>, item: &T, label: &str) -> HttpResponse
where
    T: Serialize + Send + Sync,
{
    match collection.insert_one(item).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "id": result.inserted_id.as_object_id().map(|id| id.to_hex()),
        })),
        Err(err) => {
            eprintln!("Failed to insert {}: {:?}", label, err);
            HttpResponse::InternalServerError().body(format!("Failed to create {}.", label))
        }
    }
}

async fn replace_in<T>(
    collection: mongodb::Collection<T>,
    id: &str,
    item: &T,
    label: &str,
) -> HttpResponse
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    let object_id = match ObjectId::parse_str(id) {
        Ok(object_id) => object_id,
        Err(_) => return HttpResponse::BadRequest().body(format!("Invalid {} ID format", label)),
    };
    match collection.replace_one(doc! { "_id": object_id }, item).await {
        Ok(result) => {
            if result.matched_count == 0 {
                return HttpResponse::NotFound().body(format!("{} not found", label));
            }
            HttpResponse::Ok().json(serde_json::json!({ "success": true }))
        }
        Err(err) => {
            eprintln!("Failed to update {}: {:?}", label, err);
            HttpResponse::InternalServerError().body(format!("Failed to update {}.", label))
        }
    }
}

async fn delete_in<T>(collection: mongodb::Collection<T>, id: &str, label: &str) -> HttpResponse
where
    T: Send + Sync,
{
    let object_id = match ObjectId::parse_str(id) {
        Ok(object_id) => object_id,
        Err(_) => return HttpResponse::BadRequest().body(format!("Invalid {} ID format", label)),
    };
    match collection.delete_one(doc! { "_id": object_id }).await {
        Ok(result) => {
            if result.deleted_count == 0 {
                return HttpResponse::NotFound().body(format!("{} not found", label));
            }
            HttpResponse::Ok().json(serde_json::json!({ "success": true }))
        }
        Err(err) => {
            eprintln!("Failed to delete {}: {:?}", label, err);
            HttpResponse::InternalServerError().body(format!("Failed to delete {}.", label))
        }
    }
}

fn tours(client: &Client) -> mongodb::Collection<Tour> {
    client.database("Catalog").collection("Tours")
}

fn flights(client: &Client) -> mongodb::Collection<Flight> {
    client.database("Catalog").collection("Flights")
}

fn activities(client: &Client) -> mongodb::Collection<Activity> {
    client.database("Catalog").collection("Activities")
}

fn destinations(client: &Client) -> mongodb::Collection<Destination> {
    client.database("Catalog").collection("Destinations")
}

fn discounts(client: &Client) -> mongodb::Collection<Discount> {
    client.database("Catalog").collection("Discounts")
}

pub async fn create_tour(data: web::Data<Arc<Client>>, input: web::Json<Tour>) -> impl Responder {
    let mut tour = input.into_inner();
    let now = DateTime::now();
    tour.created_at = Some(now);
    tour.updated_at = Some(now);
    insert_into(tours(&data), &tour, "tour").await
}

pub async fn update_tour(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    input: web::Json<Tour>,
) -> impl Responder {
    let mut tour = input.into_inner();
    tour.updated_at = Some(DateTime::now());
    replace_in(tours(&data), &path.into_inner().0, &tour, "tour").await
}

pub async fn delete_tour(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    delete_in(tours(&data), &path.into_inner().0, "tour").await
}

pub async fn create_flight(
    data: web::Data<Arc<Client>>,
    input: web::Json<Flight>,
) -> impl Responder {
    let mut flight = input.into_inner();
    let now = DateTime::now();
    flight.created_at = Some(now);
    flight.updated_at = Some(now);
    insert_into(flights(&data), &flight, "flight").await
}

pub async fn update_flight(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    input: web::Json<Flight>,
) -> impl Responder {
    let mut flight = input.into_inner();
    flight.updated_at = Some(DateTime::now());
    replace_in(flights(&data), &path.into_inner().0, &flight, "flight").await
}

pub async fn delete_flight(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    delete_in(flights(&data), &path.into_inner().0, "flight").await
}

pub async fn create_activity(
    data: web::Data<Arc<Client>>,
    input: web::Json<Activity>,
) -> impl Responder {
    let mut activity = input.into_inner();
    let now = DateTime::now();
    activity.created_at = Some(now);
    activity.updated_at = Some(now);
    insert_into(activities(&data), &activity, "activity").await
}

pub async fn update_activity(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    input: web::Json<Activity>,
) -> impl Responder {
    let mut activity = input.into_inner();
    activity.updated_at = Some(DateTime::now());
    replace_in(activities(&data), &path.into_inner().0, &activity, "activity").await
}

pub async fn delete_activity(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    delete_in(activities(&data), &path.into_inner().0, "activity").await
}

pub async fn create_destination(
    data: web::Data<Arc<Client>>,
    input: web::Json<Destination>,
) -> impl Responder {
    let mut destination = input.into_inner();
    let now = DateTime::now();
    destination.created_at = Some(now);
    destination.updated_at = Some(now);
    insert_into(destinations(&data), &destination, "destination").await
}

pub async fn update_destination(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    input: web::Json<Destination>,
) -> impl Responder {
    let mut destination = input.into_inner();
    destination.updated_at = Some(DateTime::now());
    replace_in(
        destinations(&data),
        &path.into_inner().0,
        &destination,
        "destination",
    )
    .await
}

pub async fn delete_destination(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    delete_in(destinations(&data), &path.into_inner().0, "destination").await
}

pub async fn create_discount(
    data: web::Data<Arc<Client>>,
    input: web::Json<Discount>,
) -> impl Responder {
    let mut discount = input.into_inner();
    let now = DateTime::now();
    discount.created_at = Some(now);
    discount.updated_at = Some(now);
    insert_into(discounts(&data), &discount, "discount").await
}

pub async fn update_discount(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    input: web::Json<Discount>,
) -> impl Responder {
    let mut discount = input.into_inner();
    discount.updated_at = Some(DateTime::now());
    replace_in(discounts(&data), &path.into_inner().0, &discount, "discount").await
}

pub async fn delete_discount(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    delete_in(discounts(&data), &path.into_inner().0, "discount").await
}

pub async fn list_bookings(data: web::Data<Arc<Client>>) -> impl Responder {
    let collection: mongodb::Collection<Booking> =
        data.database("Account").collection("Bookings");
    match collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Booking>>().await {
            Ok(bookings) => HttpResponse::Ok().json(bookings),
            Err(err) => {
                eprintln!("Failed to collect bookings: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect bookings.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find bookings.")
        }
    }
}

/// The manual-support queue: payments captured without a booking record.
pub async fn list_reconciliation_failures(data: web::Data<Arc<Client>>) -> impl Responder {
    let collection: mongodb::Collection<ReconciliationFailure> =
        data.database("Checkout").collection("ReconciliationFailures");
    match collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<ReconciliationFailure>>().await {
            Ok(failures) => HttpResponse::Ok().json(failures),
            Err(err) => {
                eprintln!("Failed to collect reconciliation failures: {:?}", err);
                HttpResponse::InternalServerError()
                    .body("Failed to collect reconciliation failures.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find reconciliation failures: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find reconciliation failures.")
        }
    }
}
