//! # Candidates Module
//!
//! Candidate profiles. Candidates are rows in `profiles`; recruiters can
//! create them ahead of sign-up and the profile is linked on first login.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::candidates_routes;
pub use services::CandidatesService;
