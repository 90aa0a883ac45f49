pub mod account;
pub mod activity;
pub mod admin;
pub mod checkout;
pub mod destination;
pub mod discount;
pub mod flight;
pub mod health;
pub mod payment_return;
pub mod tour;
