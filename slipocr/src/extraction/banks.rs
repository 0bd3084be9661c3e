use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::BankInfo;

/// A bank known to the extractor and the strings that identify it on a slip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankEntry {
    pub name: &'static str,
    pub code: &'static str,
    /// Name as printed in Thai script. Matched exactly.
    pub native_name: &'static str,
}

impl BankEntry {
    /// Checks the English name, then the short code (both case-insensitive),
    /// then the native-script name.
    ///
    /// `lowered` must be `text.to_lowercase()`.
    fn matches(&self, text: &str, lowered: &str) -> bool {
        lowered.contains(&self.name.to_lowercase())
            || lowered.contains(&self.code.to_lowercase())
            || text.contains(self.native_name)
    }

    pub fn info(&self) -> BankInfo {
        BankInfo::new(self.name, self.code)
    }
}

/// Registry order is detection priority.
pub const BANK_REGISTRY: &[BankEntry] = &[
    BankEntry {
        name: "Bangkok Bank",
        code: "BBL",
        native_name: "ธนาคารกรุงเทพ",
    },
    BankEntry {
        name: "Kasikorn Bank",
        code: "KBANK",
        native_name: "ธนาคารกสิกรไทย",
    },
    BankEntry {
        name: "Siam Commercial Bank",
        code: "SCB",
        native_name: "ธนาคารไทยพาณิชย์",
    },
    BankEntry {
        name: "Krungthai Bank",
        code: "KTB",
        native_name: "ธนาคารกรุงไทย",
    },
    BankEntry {
        name: "TMB Thanachart Bank",
        code: "TTB",
        native_name: "ธนาคารทหารไทยธนชาต",
    },
    BankEntry {
        name: "Krungsri Bank",
        code: "BAY",
        native_name: "ธนาคารกรุงศรีอยุธยา",
    },
    BankEntry {
        name: "Government Savings Bank",
        code: "GSB",
        native_name: "ธนาคารออมสิน",
    },
    BankEntry {
        name: "Bank for Agriculture",
        code: "BAAC",
        native_name: "ธ.ก.ส.",
    },
    BankEntry {
        name: "UOB Thailand",
        code: "UOB",
        native_name: "ธนาคารยูโอบี",
    },
    BankEntry {
        name: "CIMB Thai Bank",
        code: "CIMB",
        native_name: "ธนาคารซีไอเอ็มบี",
    },
    BankEntry {
        name: "PromptPay",
        code: "PROMPTPAY",
        native_name: "พร้อมเพย์",
    },
];

/// Identity used for mobile-money transfers that name no bank.
pub const MOBILE_MONEY: BankEntry = BankEntry {
    name: "PromptPay",
    code: "PROMPTPAY",
    native_name: "พร้อมเพย์",
};

static MOBILE_MONEY_SIGNATURES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)พร้อมเพย์|promptpay",
        // Mobile number registered as a PromptPay proxy.
        r"0\d{9}",
        // National ID registered as a PromptPay proxy.
        r"\d{13}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("mobile-money signature is a valid regex"))
    .collect()
});

/// First registry entry found in `text`, if any.
pub fn detect_bank(text: &str) -> Option<&'static BankEntry> {
    let lowered = text.to_lowercase();
    BANK_REGISTRY
        .iter()
        .find(|entry| entry.matches(text, &lowered))
}

pub fn is_mobile_money(text: &str) -> bool {
    MOBILE_MONEY_SIGNATURES.iter().any(|re| re.is_match(text))
}
