// Brokerage Back-Office - Core Library
// Record definitions, validation, SQLite store, and admin registry shared
// by the CLI, admin server, and tests.

pub mod admin;
pub mod countries;
pub mod records;
pub mod store;
pub mod validators;

// Re-export commonly used types
pub use admin::{AdminSite, Model, ModelAdmin};
pub use records::{
    AccountHolder, Address, GeneralAccount, RepCategory, RepCode, Status,
};
pub use store::{
    accounts_for_rep, count_account_holders, count_general_accounts, count_rep_codes,
    delete_account_holder, delete_general_account, delete_rep_code, get_account_holder,
    get_general_account, get_general_account_by_number, get_rep_code, get_rep_code_by_number,
    holders_for_account, insert_account_holder, insert_general_account, insert_rep_code,
    list_account_holders, list_general_accounts, search_rep_codes, setup_database,
    update_account_holder, update_general_account, update_rep_code, SaveError,
};
pub use validators::{
    DigitValidator, PercentValidator, RangeValidator, ValidationError, ValidationResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
