// AccountHolder - named holder of a GeneralAccount, cascade-deleted with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validators::{check_max_len, require_non_empty, ValidationResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountHolder {
    /// Stable identity (UUID), never changes.
    pub id: String,

    pub name: String,

    /// Strong reference to the owning GeneralAccount. Deleting the account
    /// deletes its holders.
    pub account_id: String,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl AccountHolder {
    pub fn new(name: impl Into<String>, account_id: impl Into<String>) -> Self {
        let now = Utc::now();
        AccountHolder {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            account_id: account_id.into(),
            created: now,
            modified: now,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if let Err(e) = require_non_empty("name", &self.name) {
            errors.push(e);
        }
        if let Err(e) = check_max_len("name", &self.name) {
            errors.push(e);
        }
        if let Err(e) = require_non_empty("account_id", &self.account_id) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

impl std::fmt::Display for AccountHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
