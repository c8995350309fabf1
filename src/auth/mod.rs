//! # Auth Module
//!
//! Token verification and role resolution. Tokens are issued by the external
//! identity provider; this service only verifies them and maps the subject
//! onto a row in `profiles`.

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;


pub use extractors::{AuthedUser, OptionalUser};
pub use models::{Profile, Role};
pub use routes::auth_routes;
