use once_cell::sync::Lazy;
use regex::Regex;

/// A named extraction rule. The first capture group holds the value.
#[derive(Debug)]
pub struct FieldPattern {
    pub name: &'static str,
    pub regex: Regex,
}

impl FieldPattern {
    fn compile(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("field pattern is a valid regex"),
        }
    }

    /// Leftmost capture of this pattern in `text`.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Every capture of this pattern in `text`, left to right.
    pub fn captures_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect()
    }
}

fn table(patterns: &[(&'static str, &str)]) -> Vec<FieldPattern> {
    patterns
        .iter()
        .map(|(name, pattern)| FieldPattern::compile(name, pattern))
        .collect()
}

pub static AMOUNT_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    table(&[
        (
            "labeled_currency",
            r"(?i)(?:จำนวนเงิน|amount|total|รวม)\s*:?\s*฿?\s*([\d,]+\.?\d*)\s*(?:บาท|thb|baht)?",
        ),
        ("symbol_prefixed", r"(?i)฿\s*([\d,]+\.?\d*)"),
        ("currency_suffixed", r"(?i)([\d,]+\.?\d*)\s*(?:บาท|baht|thb)"),
        ("labeled_numeric", r"(?i)(?:total|amount)\s*:?\s*([\d,]+\.?\d*)"),
    ])
});

pub static DATE_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    table(&[
        ("day_month_year", r"(\d{1,2}[/-]\d{1,2}[/-]\d{4})"),
        (
            "thai_month_abbrev",
            r"(\d{1,2}\s+(?:ม\.ค\.|ก\.พ\.|มี\.ค\.|เม\.ย\.|พ\.ค\.|มิ\.ย\.|ก\.ค\.|ส\.ค\.|ก\.ย\.|ต\.ค\.|พ\.ย\.|ธ\.ค\.)\s+\d{4})",
        ),
        ("iso", r"(\d{4}-\d{2}-\d{2})"),
    ])
});

pub static TIME_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    table(&[
        ("hms", r"(?i)(\d{1,2}:\d{2}:\d{2})"),
        ("hm", r"(?i)(\d{1,2}:\d{2})"),
        ("labeled", r"(?i)(?:เวลา|time)\s*:?\s*(\d{1,2}:\d{2}(?::\d{2})?)"),
    ])
});

pub static REFERENCE_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    table(&[
        (
            "labeled",
            r"(?i)(?:เลขที่อ้างอิง|ref\.?|reference)\s*:?\s*([A-Z0-9]{8,})",
        ),
        (
            "transaction_id",
            r"(?i)(?:transaction\s*id|trans\s*id)\s*:?\s*([A-Z0-9]{8,})",
        ),
        ("bare", r"(?i)([A-Z0-9]{12,20})"),
    ])
});

pub static ACCOUNT_PATTERNS: Lazy<Vec<FieldPattern>> = Lazy::new(|| {
    table(&[
        ("hyphenated", r"(\d{3}-\d{1}-\d{5}-\d{1})"),
        ("bare_digits", r"(\d{10,12})"),
        (
            "labeled",
            r"(?:เลขที่บัญชี|account\s*no\.?)\s*:?\s*([\d-]+)",
        ),
    ])
});
