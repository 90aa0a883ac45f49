use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, IndexModel,
};
use std::sync::Arc;
use std::time::Duration;

use crate::models::booking::{Booking, PendingBooking};

pub async fn create_mongo_client(uri: &String) -> Arc<Client> {
    println!("Connecting to MongoDB: {}", uri);

    let mut client_options = ClientOptions::parse(uri)
        .await
        .expect("MongoDB URI may be incorrect! Failed to parse.");

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client =
        Client::with_options(client_options).expect("Failed to create MongoDB client with options");

    match client
        .database("Account")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => println!("Successfully connected to MongoDB and verified with ping command"),
        Err(e) => {
            eprintln!("WARNING: Connected to MongoDB but ping test failed: {}", e);
            eprintln!("The API may still work, but some functionality might be impaired");
        }
    }

    Arc::new(client)
}

/// Indexes the checkout flow depends on: abandoned gateway redirects expire
/// via the TTL on `expires_at`, and the unique key on bookings turns a
/// double-submission into a write error instead of a second record.
pub async fn ensure_indexes(client: &Client) {
    let pending: mongodb::Collection<PendingBooking> =
        client.database("Checkout").collection("PendingBookings");
    let ttl = IndexModel::builder()
        .keys(doc! { "expires_at": 1 })
        .options(
            IndexOptions::builder()
                .expire_after(Duration::from_secs(0))
                .build(),
        )
        .build();
    if let Err(e) = pending.create_index(ttl).await {
        eprintln!("WARNING: failed to create PendingBookings TTL index: {}", e);
    }

    let bookings: mongodb::Collection<Booking> =
        client.database("Account").collection("Bookings");
    let unique_key = IndexModel::builder()
        .keys(doc! { "idempotency_key": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    if let Err(e) = bookings.create_index(unique_key).await {
        eprintln!(
            "WARNING: failed to create Bookings idempotency index: {}",
            e
        );
    }
}
