// RepCode - brokerage representative record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Address, RepCategory, Status};
use crate::validators::{
    check_email, check_max_len, require_non_empty, DigitValidator, PercentValidator,
    ValidationError, ValidationResult,
};

/// Maximum stored length of `rep_number`; with the digit minimum this pins
/// the field to exactly three digits.
pub const REP_NUMBER_LEN: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepCode {
    /// Stable identity (UUID), never changes.
    pub id: String,

    /// Three-digit representative code, unique across all reps.
    pub rep_number: String,

    pub rep_category: RepCategory,
    pub name: String,
    pub email_1: String,
    /// Optional secondary contact email.
    #[serde(default)]
    pub email_2: String,
    pub status: Status,

    #[serde(flatten)]
    pub address: Address,

    /// Revenue sharing percentage, 0..=100.
    pub sharing_agreement: f64,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl RepCode {
    pub fn new(
        rep_number: impl Into<String>,
        rep_category: RepCategory,
        name: impl Into<String>,
        email_1: impl Into<String>,
        status: Status,
        address: Address,
    ) -> Self {
        let now = Utc::now();
        RepCode {
            id: uuid::Uuid::new_v4().to_string(),
            rep_number: rep_number.into(),
            rep_category,
            name: name.into(),
            email_1: email_1.into(),
            email_2: String::new(),
            status,
            address,
            sharing_agreement: 100.0,
            created: now,
            modified: now,
        }
    }

    /// Run every field-level constraint, collecting all failures.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if let Err(e) = DigitValidator::new(REP_NUMBER_LEN).validate("rep_number", &self.rep_number)
        {
            errors.push(e);
        }
        if self.rep_number.chars().count() > REP_NUMBER_LEN {
            errors.push(ValidationError::new(
                "rep_number",
                format!("This field must be at most {} digits", REP_NUMBER_LEN),
            ));
        }

        if let Err(e) = require_non_empty("name", &self.name) {
            errors.push(e);
        }
        if let Err(e) = check_max_len("name", &self.name) {
            errors.push(e);
        }

        if let Err(e) = require_non_empty("email_1", &self.email_1) {
            errors.push(e);
        } else if let Err(e) = check_email("email_1", &self.email_1) {
            errors.push(e);
        }
        if let Err(e) = check_email("email_2", &self.email_2) {
            errors.push(e);
        }

        self.address.validate_into(&mut errors);

        if let Err(e) =
            PercentValidator::new().validate("sharing_agreement", self.sharing_agreement)
        {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Bump the modification timestamp after an edit.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

impl std::fmt::Display for RepCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.rep_number)
    }
}

// ============================================================================
// TESTS
// ============================================================================
