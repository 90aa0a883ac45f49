use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client};
use serde::Deserialize;
use std::sync::Arc;

use crate::models::destination::Destination;

#[derive(Debug, Deserialize)]
pub struct DestinationQuery {
    pub search: Option<String>,
}

pub async fn get_destinations(
    data: web::Data<Arc<Client>>,
    query: web::Query<DestinationQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Destination> =
        client.database("Catalog").collection("Destinations");

    let filter = match &query.search {
        Some(search_text) if !search_text.trim().is_empty() => doc! {
            "name": {
                "$regex": format!("^{}", regex::escape(search_text.trim())),
                "$options": "i",
            }
        },
        _ => doc! {},
    };

    match collection.find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Destination>>().await {
            Ok(destinations) => HttpResponse::Ok().json(destinations),
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect destinations.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find destinations.")
        }
    }
}
