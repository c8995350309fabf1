// src/admin/handlers/mod.rs

pub mod analytics;
pub mod settings;
pub mod users;
