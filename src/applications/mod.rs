//! # Applications Module
//!
//! Job applications, resume uploads (single, bulk and generic) and serving
//! of locally stored files.

pub mod bulk;
pub mod files;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::applications_routes;
pub use services::ApplicationsService;
