use std::collections::HashSet;

use super::banks::{detect_bank, is_mobile_money, MOBILE_MONEY};
use super::patterns::{
    FieldPattern, ACCOUNT_PATTERNS, AMOUNT_PATTERNS, DATE_PATTERNS, REFERENCE_PATTERNS,
    TIME_PATTERNS,
};
use crate::models::ExtractedFields;

fn first_capture(patterns: &[FieldPattern], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|p| p.capture(text))
        .map(str::to_string)
}

/// Amount in baht. A pattern whose capture does not parse (e.g. a lone
/// separator) is skipped in favour of the next one.
pub fn extract_amount(text: &str) -> Option<f64> {
    AMOUNT_PATTERNS.iter().find_map(|pattern| {
        let literal = pattern.capture(text)?.replace(',', "");
        match literal.parse::<f64>() {
            Ok(amount) => Some(amount),
            Err(_) => {
                tracing::trace!(
                    pattern = pattern.name,
                    literal = %literal,
                    "Unparsable amount, trying next pattern"
                );
                None
            }
        }
    })
}

pub fn extract_date(text: &str) -> Option<String> {
    first_capture(&DATE_PATTERNS, text)
}

pub fn extract_time(text: &str) -> Option<String> {
    first_capture(&TIME_PATTERNS, text)
}

pub fn extract_reference(text: &str) -> Option<String> {
    first_capture(&REFERENCE_PATTERNS, text)
}

/// Every distinct account number found by any account pattern.
///
/// Duplicates are dropped keeping discovery order (pattern priority, then
/// position). Which one is the sender is not derived from the slip layout.
pub fn extract_accounts(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    ACCOUNT_PATTERNS
        .iter()
        .flat_map(|p| p.captures_all(text))
        .filter(|account| seen.insert(*account))
        .map(str::to_string)
        .collect()
}

/// Extracts every supported field from recognised slip text.
pub fn extract_all(text: &str) -> ExtractedFields {
    let mut bank = detect_bank(text).map(|entry| entry.info());
    if bank.is_none() && is_mobile_money(text) {
        bank = Some(MOBILE_MONEY.info());
    }

    let mut accounts = extract_accounts(text).into_iter();

    ExtractedFields {
        amount: extract_amount(text),
        transaction_date: extract_date(text),
        transaction_time: extract_time(text),
        reference_number: extract_reference(text),
        bank,
        sender_account: accounts.next(),
        receiver_account: accounts.next(),
        sender_name: None,
        receiver_name: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labeled_thai_amount() {
        assert_eq!(extract_amount("จำนวนเงิน: 1,500.00 บาท"), Some(1500.0));
    }

    #[test]
    fn test_symbol_prefixed_amount() {
        assert_eq!(extract_amount("โอนเงิน ฿2,350.50"), Some(2350.5));
    }

    #[test]
    fn test_currency_suffixed_amount() {
        assert_eq!(extract_amount("ยอดโอน 899 THB"), Some(899.0));
    }

    #[test]
    fn test_unparsable_capture_falls_through() {
        // The labeled pattern captures a bare comma; the suffixed one parses.
        assert_eq!(extract_amount("Total , 120.25 baht"), Some(120.25));
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(extract_amount("โอนเงินสำเร็จ"), None);
    }

    #[test]
    fn test_date_priority() {
        assert_eq!(
            extract_date("2024-10-01 printed, paid 01/10/2024").as_deref(),
            Some("01/10/2024")
        );
        assert_eq!(extract_date("on 2024-10-01").as_deref(), Some("2024-10-01"));
        assert_eq!(extract_date("no date"), None);
    }

    #[test]
    fn test_time_prefers_seconds() {
        assert_eq!(
            extract_time("เวลา 14:30 น. (14:30:45)").as_deref(),
            Some("14:30:45")
        );
        assert_eq!(extract_time("เวลา 09:05 น.").as_deref(), Some("09:05"));
    }

    #[test]
    fn test_reference_patterns() {
        assert_eq!(
            extract_reference("เลขที่อ้างอิง: 2024100112345").as_deref(),
            Some("2024100112345")
        );
        assert_eq!(
            extract_reference("Transaction ID: ABCD1234").as_deref(),
            Some("ABCD1234")
        );
        assert_eq!(
            extract_reference("code X1Y2Z3A4B5C6D7").as_deref(),
            Some("X1Y2Z3A4B5C6D7")
        );
        assert_eq!(extract_reference("ref short"), None);
    }

    #[test]
    fn test_accounts_are_deduplicated() {
        let accounts = extract_accounts("จาก 123-4-56789-0\nถึง 987-6-54321-0\n123-4-56789-0");
        assert_eq!(accounts.len(), 2);
        assert!(accounts.contains(&"123-4-56789-0".to_string()));
        assert!(accounts.contains(&"987-6-54321-0".to_string()));
    }

    #[test]
    fn test_two_accounts_fill_sender_and_receiver() {
        let fields = extract_all("จาก 123-4-56789-0\nไปยัง 987-6-54321-0");
        let mut pair = vec![
            fields.sender_account.clone().unwrap(),
            fields.receiver_account.clone().unwrap(),
        ];
        pair.sort();
        assert_eq!(pair, vec!["123-4-56789-0", "987-6-54321-0"]);
    }

    #[test]
    fn test_single_account_fills_sender_only() {
        let fields = extract_all("ไปยัง 987-6-54321-0");
        assert_eq!(fields.sender_account.as_deref(), Some("987-6-54321-0"));
        assert_eq!(fields.receiver_account, None);
    }

    #[test]
    fn test_mobile_money_without_named_bank() {
        let fields = extract_all("โอนเงินไปยัง 081-234-5678 พร้อมเพย์");
        let bank = fields.bank.unwrap();
        assert_eq!(bank.code, "PROMPTPAY");
        assert_eq!(bank.name, "PromptPay");

        let by_phone = extract_all("to 0812345678");
        assert_eq!(by_phone.bank.map(|b| b.code), Some("PROMPTPAY".to_string()));
    }

    #[test]
    fn test_named_bank_wins_over_mobile_money() {
        let fields = extract_all("ธนาคารกสิกรไทย\nto 0812345678");
        assert_eq!(fields.bank.map(|b| b.code), Some("KBANK".to_string()));
    }

    #[test]
    fn test_full_slip() {
        let text = "ธนาคารกสิกรไทย\nโอนเงินสำเร็จ\n01/10/2024 14:30:45\n\
                    จำนวนเงิน: 1,500.00 บาท\nเลขที่อ้างอิง: REF123456789\n\
                    จาก 123-4-56789-0";
        let fields = extract_all(text);

        assert_eq!(fields.amount, Some(1500.0));
        assert_eq!(fields.transaction_date.as_deref(), Some("01/10/2024"));
        assert_eq!(fields.transaction_time.as_deref(), Some("14:30:45"));
        assert_eq!(fields.reference_number.as_deref(), Some("REF123456789"));
        assert_eq!(fields.bank.map(|b| b.code), Some("KBANK".to_string()));
        assert_eq!(fields.sender_account.as_deref(), Some("123-4-56789-0"));
        assert!(fields.sender_name.is_none());
        assert!(fields.receiver_name.is_none());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "SCB 123-4-56789-0 987-6-54321-0 1234567890 ฿99.00";
        assert_eq!(extract_all(text), extract_all(text));
    }

    #[test]
    fn test_empty_text_yields_empty_fields() {
        assert!(extract_all("").is_empty());
    }
}
