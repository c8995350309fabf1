//! # Jobs Module
//!
//! Vacancies posted by recruiters, plus job-description upload and
//! AI-assisted parsing into vacancy fields.

pub mod handlers;
pub mod jd;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::jobs_routes;
pub use services::JobsService;
