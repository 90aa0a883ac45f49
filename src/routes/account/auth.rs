use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::error::{ErrorKind, WriteError, WriteFailure};
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::models::account::{User, UserSession};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    auth_token: String,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

pub async fn signup(data: web::Data<Arc<Client>>, input: web::Json<Credentials>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let input = input.into_inner();
    if !is_valid_email(&input.email) {
        return HttpResponse::BadRequest().body("Invalid email address");
    }

    let hashed = match bcrypt::hash(&input.password, bcrypt::DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(err) => {
            eprintln!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create user");
        }
    };

    let now = DateTime::now();
    let user = User {
        id: None,
        email: input.email.clone(),
        password: hashed,
        full_name: input.full_name,
        phone: input.phone,
        role: None,
        last_signin: None,
        failed_signins: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match collection.insert_one(&user).await {
        Ok(result) => {
            let Some(user_id) = result.inserted_id.as_object_id() else {
                return HttpResponse::InternalServerError().body("Failed to create user");
            };
            match generate_token(&user.email, user_id, None) {
                Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
            }
        }
        Err(err) => {
            if let ErrorKind::Write(WriteFailure::WriteError(WriteError { code: 11000, .. })) =
                *err.kind
            {
                return HttpResponse::Conflict().body("User already exists");
            }
            eprintln!("Failed to create user: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create user")
        }
    }
}

pub async fn signin(data: web::Data<Arc<Client>>, input: web::Json<Credentials>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Account").collection("Users");

    let input = input.into_inner();
    let filter = doc! { "email": &input.email };

    match collection.find_one(filter).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
                let update = doc! {
                    "$set": {
                        "last_signin": Utc::now().to_string(),
                        "failed_signins": 0,
                    }
                };
                if let Err(err) = collection
                    .update_one(doc! { "email": &input.email }, update)
                    .await
                {
                    eprintln!("Failed to update document: {:?}", err);
                    return HttpResponse::InternalServerError().body("Failed to sign in.");
                }

                let Some(user_id) = user.id else {
                    return HttpResponse::InternalServerError().body("Unable to read user_id.");
                };
                let role = user.role.as_ref().map(|r| match r {
                    crate::models::account::UserRole::Admin => "admin".to_string(),
                    crate::models::account::UserRole::User => "user".to_string(),
                });
                match generate_token(&input.email, user_id, role) {
                    Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                    Err(_) => {
                        HttpResponse::InternalServerError().body("Token generation failed")
                    }
                }
            } else {
                let failed_signins = user.failed_signins.unwrap_or(0) + 1;
                let update = doc! { "$set": { "failed_signins": failed_signins } };
                match collection
                    .update_one(doc! { "email": &input.email }, update)
                    .await
                {
                    Ok(_) => HttpResponse::Unauthorized().body("Invalid credentials"),
                    Err(err) => {
                        eprintln!("Failed to update failed signins: {:?}", err);
                        HttpResponse::InternalServerError().body("Failed to process signin")
                    }
                }
            }
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to sign in.")
        }
    }
}

pub async fn user_session(claims: Claims) -> impl Responder {
    HttpResponse::Ok().json(UserSession {
        user_id: claims.user_id,
        email: claims.sub,
        role: claims.role,
    })
}

fn generate_token(
    email: &str,
    user_id: ObjectId,
    role: Option<String>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(7)).timestamp() as usize,
        user_id: user_id.to_hex(),
        role,
    };

    let key = std::env::var("JWT_SECRET").unwrap_or_else(|_| "default_secret".to_string());
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    re.is_match(email)
}
