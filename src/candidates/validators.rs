use super::models::{CreateCandidateRequest, UpdateCandidateRequest};
use crate::common::validation::looks_like_email;
use crate::common::{ValidationResult, Validator};

pub struct CreateCandidateValidator;

impl Validator<CreateCandidateRequest> for CreateCandidateValidator {
    fn validate(&self, data: &CreateCandidateRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(name) = &data.name {
            if name.len() > 255 {
                result.add_error("name", "Name must not exceed 255 characters");
            }
        }
        if let Some(email) = &data.email {
            if !looks_like_email(email) {
                result.add_error("email", "Invalid email address");
            }
        }

        result
    }
}

pub struct UpdateCandidateValidator;

impl Validator<UpdateCandidateRequest> for UpdateCandidateValidator {
    fn validate(&self, data: &UpdateCandidateRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(name) = &data.full_name {
            if name.trim().is_empty() {
                result.add_error("full_name", "Name cannot be empty");
            } else if name.len() > 255 {
                result.add_error("full_name", "Name must not exceed 255 characters");
            }
        }

        result
    }
}
