use super::models::{UpdateOfferRequest, OFFER_STATUSES};
use crate::common::validation::is_one_of;
use crate::common::{ValidationResult, Validator};

pub struct UpdateOfferValidator;

impl Validator<UpdateOfferRequest> for UpdateOfferValidator {
    fn validate(&self, data: &UpdateOfferRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(status) = &data.status {
            if !is_one_of(status, OFFER_STATUSES) {
                result.add_error(
                    "status",
                    "Status must be one of: pending, accepted, rejected, withdrawn",
                );
            }
        }

        if let Some(response) = &data.candidate_response {
            if response.len() > 2000 {
                result.add_error(
                    "candidateResponse",
                    "Candidate response must be less than 2000 characters",
                );
            }
        }

        if let Some(notes) = &data.notes {
            if notes.len() > 5000 {
                result.add_error("notes", "Notes must be less than 5000 characters");
            }
        }

        result
    }
}
