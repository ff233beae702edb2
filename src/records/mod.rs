// Record layer - RepCode, GeneralAccount, AccountHolder
//
// Each record has:
// - Stable identity (UUID) generated at construction, never changed
// - created/modified timestamps managed by the record itself
// - A validate() pass run by the store before any write

pub mod account_holder;
pub mod general_account;
pub mod rep_code;

use serde::{Deserialize, Serialize};

use crate::countries::validate_country;
use crate::validators::{check_max_len, DigitValidator, ValidationError};

pub use account_holder::AccountHolder;
pub use general_account::GeneralAccount;
pub use rep_code::RepCode;

// ============================================================================
// STATUS
// ============================================================================

/// Open/Closed label on reps and accounts. Any value may be set at any time;
/// there is no enforced Open -> Closed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl Status {
    /// Stable storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "OPEN" => Some(Status::Open),
            "CLOSED" => Some(Status::Closed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Closed => "Closed",
        }
    }
}

// ============================================================================
// REP CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepCategory {
    #[serde(rename = "FS")]
    FenixSecurities,
    #[serde(rename = "FF")]
    ForeignFinder,
    #[serde(rename = "FIADV")]
    ForeignInvestmentAdviser,
    #[serde(rename = "FA")]
    ForeignAssociate,
}

impl RepCategory {
    /// Stable storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepCategory::FenixSecurities => "FS",
            RepCategory::ForeignFinder => "FF",
            RepCategory::ForeignInvestmentAdviser => "FIADV",
            RepCategory::ForeignAssociate => "FA",
        }
    }

    pub fn parse(s: &str) -> Option<RepCategory> {
        match s {
            "FS" => Some(RepCategory::FenixSecurities),
            "FF" => Some(RepCategory::ForeignFinder),
            "FIADV" => Some(RepCategory::ForeignInvestmentAdviser),
            "FA" => Some(RepCategory::ForeignAssociate),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RepCategory::FenixSecurities => "Fenix Securities",
            RepCategory::ForeignFinder => "Foreign Finder",
            RepCategory::ForeignInvestmentAdviser => "Foreign Investment Adviser",
            RepCategory::ForeignAssociate => "Foreign Associate",
        }
    }
}

// ============================================================================
// ADDRESS
// ============================================================================

/// Address block shared by RepCode and GeneralAccount. Country is required
/// and must come from the fixed code set; the rest is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub address: String,
    /// Optional; when present must be numeric with at least 8 digits.
    #[serde(default)]
    pub phone_number: String,
}

impl Address {
    pub fn new(country: impl Into<String>) -> Self {
        Address {
            country: country.into(),
            ..Default::default()
        }
    }

    /// Collect every failure in this block into `errors`.
    pub fn validate_into(&self, errors: &mut Vec<ValidationError>) {
        if let Err(e) = validate_country("country", &self.country) {
            errors.push(e);
        }
        for (field, value) in [
            ("state", &self.state),
            ("city", &self.city),
            ("zip_code", &self.zip_code),
            ("address", &self.address),
        ] {
            if let Err(e) = check_max_len(field, value) {
                errors.push(e);
            }
        }
        if !self.phone_number.is_empty() {
            if let Err(e) = DigitValidator::new(8).validate("phone_number", &self.phone_number) {
                errors.push(e);
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(Status::parse("OPEN"), Some(Status::Open));
        assert_eq!(Status::parse("CLOSED"), Some(Status::Closed));
        assert_eq!(Status::parse("open"), None);
        assert_eq!(Status::Open.as_str(), "OPEN");
        assert_eq!(Status::Closed.label(), "Closed");
    }

    #[test]
    fn test_rep_category_tags_and_labels() {
        assert_eq!(RepCategory::FenixSecurities.as_str(), "FS");
        assert_eq!(RepCategory::ForeignInvestmentAdviser.as_str(), "FIADV");
        assert_eq!(
            RepCategory::parse("FA"),
            Some(RepCategory::ForeignAssociate)
        );
        assert_eq!(RepCategory::parse("XX"), None);
        assert_eq!(RepCategory::ForeignFinder.label(), "Foreign Finder");
    }

    #[test]
    fn test_address_requires_country() {
        let mut errors = Vec::new();
        Address::default().validate_into(&mut errors);
        assert!(errors.iter().any(|e| e.field == "country"));
    }

    #[test]
    fn test_address_phone_optional_but_checked() {
        let mut addr = Address::new("US");

        let mut errors = Vec::new();
        addr.validate_into(&mut errors);
        assert!(errors.is_empty());

        addr.phone_number = "12345".to_string();
        let mut errors = Vec::new();
        addr.validate_into(&mut errors);
        assert!(errors.iter().any(|e| e.field == "phone_number"));

        addr.phone_number = "12345678".to_string();
        let mut errors = Vec::new();
        addr.validate_into(&mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_address_free_text_caps() {
        let mut addr = Address::new("US");
        addr.city = "c".repeat(101);
        let mut errors = Vec::new();
        addr.validate_into(&mut errors);
        assert!(errors.iter().any(|e| e.field == "city"));
    }
}
