// Field-level validation rules shared by the record layer.
// Each validator carries its configuration at construction and is applied
// per save attempt; failures are field-attributed, never panics.

// ============================================================================
// VALIDATION RESULT
// ============================================================================

/// A single field-attributed validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validation collects every failure instead of stopping at the first.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// DIGIT VALIDATOR
// ============================================================================

/// Digit-only string check with a minimum digit count.
///
/// Used for `rep_number` (d=3), `account_number` (d=8) and phone numbers
/// (d=8). Combined with the column caps this enforces "exactly N digits"
/// for the code fields.
#[derive(Debug, Clone, Copy)]
pub struct DigitValidator {
    min_digits: usize,
}

impl DigitValidator {
    pub fn new(min_digits: usize) -> Self {
        DigitValidator { min_digits }
    }

    pub fn validate(&self, field: &str, value: &str) -> Result<(), ValidationError> {
        if !value.chars().all(|c| c.is_ascii_digit()) || value.is_empty() {
            return Err(ValidationError::new(
                field,
                "This field must contain only digits",
            ));
        }
        if value.chars().count() < self.min_digits {
            return Err(ValidationError::new(
                field,
                format!("This field must contain at least {} digits", self.min_digits),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// PERCENT VALIDATOR
// ============================================================================

/// Bounds check for percentage fields, inclusive on both ends.
#[derive(Debug, Clone, Copy)]
pub struct PercentValidator {
    min: f64,
    max: f64,
}

impl PercentValidator {
    pub fn new() -> Self {
        PercentValidator { min: 0.0, max: 100.0 }
    }

    pub fn validate(&self, field: &str, value: f64) -> Result<(), ValidationError> {
        if value > self.max {
            return Err(ValidationError::new(
                field,
                format!("This field must be less than or equal to {}", self.max),
            ));
        }
        if value < self.min {
            return Err(ValidationError::new(
                field,
                format!("This field must be greater than or equal to {}", self.min),
            ));
        }
        Ok(())
    }
}

impl Default for PercentValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// INTEGER RANGE VALIDATOR
// ============================================================================

/// Inclusive integer bounds, used for `account_holders` (1..=5) and
/// `option_level` (0..=5).
#[derive(Debug, Clone, Copy)]
pub struct RangeValidator {
    min: i64,
    max: i64,
}

impl RangeValidator {
    pub fn new(min: i64, max: i64) -> Self {
        RangeValidator { min, max }
    }

    pub fn validate(&self, field: &str, value: i64) -> Result<(), ValidationError> {
        if value < self.min {
            return Err(ValidationError::new(
                field,
                format!("This field must be greater than or equal to {}", self.min),
            ));
        }
        if value > self.max {
            return Err(ValidationError::new(
                field,
                format!("This field must be less than or equal to {}", self.max),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// FREE-TEXT HELPERS
// ============================================================================

/// Column cap carried over from the persisted schema.
pub const MAX_TEXT_LEN: usize = 100;

pub fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }
    Ok(())
}

pub fn check_max_len(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::new(
            field,
            format!("This field must be at most {} characters", MAX_TEXT_LEN),
        ));
    }
    Ok(())
}

/// Minimal shape check for email fields. Blank is allowed for optional
/// emails; callers gate required-ness separately.
pub fn check_email(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let at = value.find('@');
    match at {
        Some(pos) if pos > 0 && pos + 1 < value.len() => Ok(()),
        _ => Err(ValidationError::new(field, "Enter a valid email address")),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_validator_accepts_all_digits() {
        let v = DigitValidator::new(3);
        assert!(v.validate("rep_number", "123").is_ok());
        assert!(v.validate("rep_number", "0007").is_ok());
    }

    #[test]
    fn test_digit_validator_rejects_non_digits() {
        let v = DigitValidator::new(3);
        let err = v.validate("rep_number", "12a").unwrap_err();
        assert_eq!(err.field, "rep_number");
        assert!(err.message.contains("only digits"));

        assert!(v.validate("rep_number", "1 3").is_err());
        assert!(v.validate("rep_number", "-12").is_err());
        assert!(v.validate("rep_number", "").is_err());
    }

    #[test]
    fn test_digit_validator_rejects_too_short() {
        let v = DigitValidator::new(8);
        let err = v.validate("account_number", "1234567").unwrap_err();
        assert!(err.message.contains("at least 8"));
        assert!(v.validate("account_number", "12345678").is_ok());
    }

    #[test]
    fn test_digit_validator_rejects_unicode_digits() {
        // Arabic-Indic digits are not valid account number content
        let v = DigitValidator::new(3);
        assert!(v.validate("rep_number", "١٢٣").is_err());
    }

    #[test]
    fn test_percent_validator_bounds() {
        let v = PercentValidator::new();
        assert!(v.validate("sharing_agreement", 0.0).is_ok());
        assert!(v.validate("sharing_agreement", 100.0).is_ok());
        assert!(v.validate("sharing_agreement", 55.5).is_ok());

        let over = v.validate("sharing_agreement", 100.01).unwrap_err();
        assert!(over.message.contains("less than or equal to 100"));

        let under = v.validate("sharing_agreement", -0.5).unwrap_err();
        assert!(under.message.contains("greater than or equal to 0"));
    }

    #[test]
    fn test_range_validator() {
        let holders = RangeValidator::new(1, 5);
        assert!(holders.validate("account_holders", 1).is_ok());
        assert!(holders.validate("account_holders", 5).is_ok());
        assert!(holders.validate("account_holders", 0).is_err());
        assert!(holders.validate("account_holders", 6).is_err());

        let levels = RangeValidator::new(0, 5);
        assert!(levels.validate("option_level", 0).is_ok());
        assert!(levels.validate("option_level", 6).is_err());
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("name", "Jane Doe").is_ok());
        assert!(require_non_empty("name", "").is_err());
        assert!(require_non_empty("name", "   ").is_err());
    }

    #[test]
    fn test_check_max_len() {
        assert!(check_max_len("city", "Springfield").is_ok());
        let long = "x".repeat(101);
        assert!(check_max_len("city", &long).is_err());
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("email_1", "jane@example.com").is_ok());
        assert!(check_email("email_2", "").is_ok());
        assert!(check_email("email_1", "not-an-email").is_err());
        assert!(check_email("email_1", "@example.com").is_err());
        assert!(check_email("email_1", "jane@").is_err());
    }
}
