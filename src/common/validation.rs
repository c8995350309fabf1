// Common validation types and traits

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Converts into `Err(ApiError)` when any error was recorded.
    pub fn into_result(self) -> Result<(), super::ApiError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

/// Checks a value against a closed set of allowed strings.
pub fn is_one_of(value: &str, allowed: &[&str]) -> bool {
    allowed.iter().any(|a| *a == value)
}

/// Very small e-mail sanity check: one `@`, non-empty local part, dotted domain.
pub fn looks_like_email(value: &str) -> bool {
    let mut parts = value.trim().split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result() {
        assert!(ValidationResult::new().into_result().is_ok());

        let mut result = ValidationResult::new();
        result.add_error("email", "Email is required");
        assert!(result.into_result().is_err());
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("jane.doe@example.com"));
        assert!(!looks_like_email("jane.doe"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("jane@localhost"));
        assert!(!looks_like_email("a@b@c.com"));
    }
}
