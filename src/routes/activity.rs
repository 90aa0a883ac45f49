use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client,
};
use std::sync::Arc;

use crate::models::activity::Activity;

pub async fn get_activities(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Activity> =
        client.database("Catalog").collection("Activities");

    match collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Activity>>().await {
            Ok(activities) => HttpResponse::Ok().json(activities),
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect activities.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find activities.")
        }
    }
}

pub async fn get_activity_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Activity> =
        client.database("Catalog").collection("Activities");

    let (id,) = path.into_inner();
    let object_id = match ObjectId::parse_str(&id) {
        Ok(object_id) => object_id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid activity ID format"),
    };

    match collection.find_one(doc! { "_id": object_id }).await {
        Ok(Some(activity)) => HttpResponse::Ok().json(activity),
        Ok(None) => HttpResponse::NotFound().body("Activity not found"),
        Err(err) => {
            eprintln!("Failed to fetch activity: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch activity.")
        }
    }
}
