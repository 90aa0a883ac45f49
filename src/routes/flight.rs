use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::flight::Flight;

#[derive(Debug, Deserialize)]
pub struct FlightQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn get_flights(
    data: web::Data<Arc<Client>>,
    query: web::Query<FlightQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Flight> =
        client.database("Catalog").collection("Flights");

    let mut filter = doc! {};
    if let Some(from) = &query.from {
        filter.insert("departure_airport", from.to_uppercase());
    }
    if let Some(to) = &query.to {
        filter.insert("arrival_airport", to.to_uppercase());
    }

    match collection.find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Flight>>().await {
            Ok(flights) => HttpResponse::Ok().json(flights),
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect flights.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find flights.")
        }
    }
}

pub async fn get_flight_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Flight> =
        client.database("Catalog").collection("Flights");

    let (id,) = path.into_inner();
    let object_id = match ObjectId::parse_str(&id) {
        Ok(object_id) => object_id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid flight ID format"),
    };

    match collection.find_one(doc! { "_id": object_id }).await {
        Ok(Some(flight)) => HttpResponse::Ok().json(flight),
        Ok(None) => HttpResponse::NotFound().body("Flight not found"),
        Err(err) => {
            eprintln!("Failed to fetch flight: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch flight.")
        }
    }
}
