use serde::{Deserialize, Serialize};

/// Identity of the bank that issued a slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInfo {
    pub name: String,
    pub code: String,
}

impl BankInfo {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Transaction fields recognised on a slip.
///
/// Dates and times are kept exactly as printed; slips mix Buddhist-era
/// years, abbreviated Thai month names and ISO dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub amount: Option<f64>,
    pub transaction_date: Option<String>,
    pub transaction_time: Option<String>,
    pub reference_number: Option<String>,
    pub bank: Option<BankInfo>,
    pub sender_account: Option<String>,
    pub receiver_account: Option<String>,
    /// Reserved for name extraction. Never populated by pattern matching.
    pub sender_name: Option<String>,
    /// Reserved for name extraction. Never populated by pattern matching.
    pub receiver_name: Option<String>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
