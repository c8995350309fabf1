use super::models::{NewJob, UpdateJobRequest, JOB_STATUSES, JOB_TYPES};
use crate::common::validation::is_one_of;
use crate::common::{ValidationResult, Validator};

const MAX_TITLE_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 20_000;

fn check_title(result: &mut ValidationResult, title: &str) {
    if title.trim().is_empty() {
        result.add_error("title", "Job title is required");
    } else if title.len() > MAX_TITLE_LEN {
        result.add_error("title", "Job title must not exceed 255 characters");
    }
}

fn check_description(result: &mut ValidationResult, description: &str) {
    if description.len() > MAX_DESCRIPTION_LEN {
        result.add_error(
            "description",
            "Job description must not exceed 20000 characters",
        );
    }
}

fn check_job_type(result: &mut ValidationResult, job_type: &str) {
    if !is_one_of(job_type, JOB_TYPES) {
        result.add_error(
            "job_type",
            "Job type must be one of: Full-time, Part-time, Contract, Internship, Temporary",
        );
    }
}

fn check_status(result: &mut ValidationResult, status: &str) {
    if !is_one_of(status, JOB_STATUSES) {
        result.add_error("status", "Status must be one of: open, closed, draft");
    }
}

pub struct NewJobValidator;

impl Validator<NewJob> for NewJobValidator {
    fn validate(&self, data: &NewJob) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_title(&mut result, &data.title);
        check_description(&mut result, &data.description);
        check_job_type(&mut result, &data.job_type);
        check_status(&mut result, &data.status);
        result
    }
}

pub struct UpdateJobValidator;

impl Validator<UpdateJobRequest> for UpdateJobValidator {
    fn validate(&self, data: &UpdateJobRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(title) = &data.title {
            check_title(&mut result, title);
        }
        for (field, value) in [
            ("department", &data.department),
            ("location", &data.location),
            ("description", &data.description),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                result.add_error(field, "Field cannot be empty");
            }
        }
        if let Some(description) = &data.description {
            check_description(&mut result, description);
        }
        if let Some(job_type) = &data.job_type {
            check_job_type(&mut result, job_type);
        }
        if let Some(status) = &data.status {
            check_status(&mut result, status);
        }

        result
    }
}
