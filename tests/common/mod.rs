use actix_web::{web, HttpResponse, Responder};

/// Mirror of the production route tree with handlers stubbed out, so route
/// shape, method handling and auth gating can be asserted without MongoDB or
/// gateway credentials.
pub struct TestApp;

impl TestApp {
    pub async fn new() -> Self {
        Self
    }

    pub fn create_app(
        &self,
    ) -> actix_web::App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        actix_web::App::new()
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(bad_request_handler))
                            .route("/signin", web::post().to(unauthorized_handler))
                            .route("/session", web::get().to(unauthorized_handler)),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/tours", web::post().to(unauthorized_handler))
                            .route("/tours/{id}", web::put().to(unauthorized_handler))
                            .route("/tours/{id}", web::delete().to(unauthorized_handler))
                            .route("/discounts", web::post().to(unauthorized_handler))
                            .route("/bookings", web::get().to(unauthorized_handler))
                            .route(
                                "/reconciliation-failures",
                                web::get().to(unauthorized_handler),
                            ),
                    )
                    .service(
                        web::scope("")
                            .route("/destinations", web::get().to(empty_list))
                            .route("/tours", web::get().to(empty_list))
                            .route("/tours/{id}", web::get().to(not_found_handler))
                            .route("/flights", web::get().to(empty_list))
                            .route("/flights/{id}", web::get().to(not_found_handler))
                            .route("/activities", web::get().to(empty_list))
                            .route("/activities/{id}", web::get().to(not_found_handler))
                            .route("/discounts/{code}", web::get().to(discount_not_found))
                            .service(
                                web::scope("/checkout")
                                    .route(
                                        "/{kind}/participants",
                                        web::post().to(unauthorized_handler),
                                    )
                                    .route(
                                        "/{kind}/return/momo",
                                        web::post().to(unauthorized_handler),
                                    )
                                    .route(
                                        "/{kind}/return/zalopay",
                                        web::post().to(unauthorized_handler),
                                    )
                                    .route("/{kind}", web::post().to(unauthorized_handler)),
                            )
                            .service(
                                web::scope("/account/{id}")
                                    .route("/bookings", web::get().to(unauthorized_handler))
                                    .route(
                                        "/bookings/{booking_id}",
                                        web::get().to(unauthorized_handler),
                                    ),
                            ),
                    ),
            )
    }
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "OK" }))
}

async fn empty_list() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!([]))
}

async fn not_found_handler() -> impl Responder {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Not found" }))
}

async fn discount_not_found() -> impl Responder {
    HttpResponse::NotFound().json(serde_json::json!({
        "success": false,
        "message": "discount code not found",
    }))
}

async fn unauthorized_handler() -> impl Responder {
    HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Unauthorized" }))
}

async fn bad_request_handler() -> impl Responder {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": "Invalid input" }))
}
