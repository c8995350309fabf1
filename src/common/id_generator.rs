// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., J_K7NP3X for jobs)

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// Job posting (J_)
    Job,
    /// Application (A_)
    Application,
    /// Candidate profile created by a recruiter (P_)
    Profile,
    /// Offer (O_)
    Offer,
    /// Stored file (F_)
    File,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Job => "J",
            EntityPrefix::Application => "A",
            EntityPrefix::Profile => "P",
            EntityPrefix::Offer => "O",
            EntityPrefix::File => "F",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID, e.g. `generate_id(EntityPrefix::Job)` -> "J_K7NP3X"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

pub fn generate_job_id() -> String {
    generate_id(EntityPrefix::Job)
}

pub fn generate_application_id() -> String {
    generate_id(EntityPrefix::Application)
}

pub fn generate_profile_id() -> String {
    generate_id(EntityPrefix::Profile)
}

pub fn generate_offer_id() -> String {
    generate_id(EntityPrefix::Offer)
}

pub fn generate_file_id() -> String {
    generate_id(EntityPrefix::File)
}
