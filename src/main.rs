use std::env;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use vivu_api::db;
use vivu_api::middleware::auth::AuthMiddleware;
use vivu_api::routes;
use vivu_api::services::checkout_service::SubmissionGuard;
use vivu_api::services::payment::momo::{MomoConfig, MomoGateway};
use vivu_api::services::payment::zalopay::{ZaloPayConfig, ZaloPayGateway};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    println!("Got MongoDB URI, attempting connection...");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    db::mongo::ensure_indexes(&client).await;
    println!("MongoDB connection established");

    let momo = web::Data::new(
        MomoGateway::new(MomoConfig::from_env()).expect("Invalid MoMo configuration"),
    );
    let zalopay = web::Data::new(
        ZaloPayGateway::new(ZaloPayConfig::from_env()).expect("Invalid ZaloPay configuration"),
    );
    let submission_guard = web::Data::new(SubmissionGuard::new());

    println!("Attempting to bind to {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(routes::health::health_check))
            .app_data(web::Data::new(client.clone()))
            .app_data(momo.clone())
            .app_data(zalopay.clone())
            .app_data(submission_guard.clone())
            .service(
                web::scope("/api")
                    // Public routes
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::account::auth::signup))
                            .route("/signin", web::post().to(routes::account::auth::signin))
                            .service(
                                web::scope("").wrap(AuthMiddleware).route(
                                    "/session",
                                    web::get().to(routes::account::auth::user_session),
                                ),
                            ),
                    )
                    .configure(routes::admin::config)
                    .service(
                        web::scope("")
                            .route(
                                "/destinations",
                                web::get().to(routes::destination::get_destinations),
                            )
                            .route("/tours", web::get().to(routes::tour::get_tours))
                            .route("/tours/{id}", web::get().to(routes::tour::get_tour_by_id))
                            .route("/flights", web::get().to(routes::flight::get_flights))
                            .route(
                                "/flights/{id}",
                                web::get().to(routes::flight::get_flight_by_id),
                            )
                            .route(
                                "/activities",
                                web::get().to(routes::activity::get_activities),
                            )
                            .route(
                                "/activities/{id}",
                                web::get().to(routes::activity::get_activity_by_id),
                            )
                            .route(
                                "/discounts/{code}",
                                web::get().to(routes::discount::lookup_discount),
                            )
                            // Protected routes
                            .service(
                                web::scope("")
                                    .wrap(AuthMiddleware)
                                    .service(
                                        web::scope("/checkout")
                                            .route(
                                                "/{kind}/participants",
                                                web::post()
                                                    .to(routes::checkout::init_participants),
                                            )
                                            .route(
                                                "/{kind}/return/momo",
                                                web::post()
                                                    .to(routes::payment_return::momo_return),
                                            )
                                            .route(
                                                "/{kind}/return/zalopay",
                                                web::post()
                                                    .to(routes::payment_return::zalopay_return),
                                            )
                                            .route(
                                                "/{kind}",
                                                web::post()
                                                    .to(routes::checkout::submit_checkout),
                                            ),
                                    )
                                    .service(
                                        web::scope("/account/{id}")
                                            .route(
                                                "/bookings",
                                                web::get().to(
                                                    routes::account::bookings::get_all_bookings,
                                                ),
                                            )
                                            .route(
                                                "/bookings/{booking_id}",
                                                web::get().to(
                                                    routes::account::bookings::get_booking_by_id,
                                                ),
                                            ),
                                    ),
                            ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
