//! # Matching Module
//!
//! The resume/JD matching pipeline: text extraction, prompt construction,
//! the model call, normalization of its reply and ranking. A keyword
//! heuristic stands in for the model when it is unavailable.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod routes;
pub mod scoring;


pub use routes::matching_routes;
