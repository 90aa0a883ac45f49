use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};
use std::sync::Arc;

use crate::models::tour::Tour;

pub async fn get_tours(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Tour> = client.database("Catalog").collection("Tours");

    match collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Tour>>().await {
            Ok(tours) => HttpResponse::Ok().json(tours),
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect tours.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find tours.")
        }
    }
}

pub async fn get_tour_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Tour> = client.database("Catalog").collection("Tours");

    let (id,) = path.into_inner();
    let object_id = match ObjectId::parse_str(&id) {
        Ok(object_id) => object_id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid tour ID format"),
    };

    match collection.find_one(doc! { "_id": object_id }).await {
        Ok(Some(tour)) => HttpResponse::Ok().json(tour),
        Ok(None) => HttpResponse::NotFound().body("Tour not found"),
        Err(err) => {
            eprintln!("Failed to fetch tour: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch tour.")
        }
    }
}
