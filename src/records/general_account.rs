// GeneralAccount - trading account record, weakly owned by a RepCode.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Address, Status};
use crate::validators::{
    check_max_len, require_non_empty, DigitValidator, RangeValidator, ValidationError,
    ValidationResult,
};

/// Maximum stored length of `account_number`; with the digit minimum this
/// pins the field to exactly eight digits.
pub const ACCOUNT_NUMBER_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralAccount {
    /// Stable identity (UUID), never changes.
    pub id: String,

    /// Eight-digit account number, unique across all accounts.
    pub account_number: String,

    pub account_name: String,

    /// Weak reference to a RepCode. Cleared (not cascaded) when the rep is
    /// deleted.
    pub rep_id: Option<String>,

    pub status: Status,
    pub open_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,

    /// Number of holders on the account, 1..=5.
    pub account_holders: u8,

    pub is_cash: bool,
    pub is_margin: bool,

    /// Options trading approval level, 0..=5.
    pub option_level: u8,

    #[serde(flatten)]
    pub address: Address,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl GeneralAccount {
    pub fn new(
        account_number: impl Into<String>,
        account_name: impl Into<String>,
        status: Status,
        address: Address,
    ) -> Self {
        let now = Utc::now();
        GeneralAccount {
            id: uuid::Uuid::new_v4().to_string(),
            account_number: account_number.into(),
            account_name: account_name.into(),
            rep_id: None,
            status,
            open_date: None,
            close_date: None,
            account_holders: 1,
            is_cash: false,
            is_margin: false,
            option_level: 0,
            address,
            created: now,
            modified: now,
        }
    }

    /// Builder: attach the rep this account books under.
    pub fn with_rep(mut self, rep_id: impl Into<String>) -> Self {
        self.rep_id = Some(rep_id.into());
        self
    }

    /// Run every field-level constraint, collecting all failures.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if let Err(e) =
            DigitValidator::new(ACCOUNT_NUMBER_LEN).validate("account_number", &self.account_number)
        {
            errors.push(e);
        }
        if self.account_number.chars().count() > ACCOUNT_NUMBER_LEN {
            errors.push(ValidationError::new(
                "account_number",
                format!("This field must be at most {} digits", ACCOUNT_NUMBER_LEN),
            ));
        }

        if let Err(e) = require_non_empty("account_name", &self.account_name) {
            errors.push(e);
        }
        if let Err(e) = check_max_len("account_name", &self.account_name) {
            errors.push(e);
        }

        if let Err(e) =
            RangeValidator::new(1, 5).validate("account_holders", i64::from(self.account_holders))
        {
            errors.push(e);
        }
        if let Err(e) =
            RangeValidator::new(0, 5).validate("option_level", i64::from(self.option_level))
        {
            errors.push(e);
        }

        self.address.validate_into(&mut errors);

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

impl std::fmt::Display for GeneralAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.account_name, self.account_number)
    }
}

// ============================================================================
// TESTS
// ============================================================================
