//! Mortgage account data structures and loading

mod data;
pub mod loader;
mod update;

pub use data::{LoanType, MortgageAccount, RateType, RepaymentMethod};
pub use loader::load_accounts_from_reader;
pub use update::{AccountField, FieldValue};
