//! # Offers Module
//!
//! Offers sent to candidates for an application. Creating an offer moves
//! the application to `offer_sent`; the candidate's answer moves it to
//! `hired` or `rejected`.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::offers_routes;
