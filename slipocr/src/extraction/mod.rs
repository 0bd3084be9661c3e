//! Pattern-based extraction of transaction fields from recognised slip text.
//!
//! Everything here is pure: the bank registry and pattern tables are
//! compiled once per process and `extract_all` has no hidden state.

mod banks;
mod extractor;
mod patterns;

pub use banks::{detect_bank, is_mobile_money, BankEntry, BANK_REGISTRY, MOBILE_MONEY};
pub use extractor::{
    extract_accounts, extract_all, extract_amount, extract_date, extract_reference,
    extract_time,
};
pub use patterns::{
    FieldPattern, ACCOUNT_PATTERNS, AMOUNT_PATTERNS, DATE_PATTERNS, REFERENCE_PATTERNS,
    TIME_PATTERNS,
};
