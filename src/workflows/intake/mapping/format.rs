//! Locale-free formatting used by the document projections.

use chrono::NaiveDate;

use crate::workflows::intake::domain::{Deductible, LiabilityLimit};

/// Groups an unsigned integer with commas: `1234567` becomes `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// `$1,234.50`. Rounds to whole cents; negative amounts render as `-$12.00`.
pub fn currency(amount: f64) -> String {
    let cents = (amount * 100.0).round();
    let sign = if cents < 0.0 { "-" } else { "" };
    let cents = cents.abs() as u64;
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// Preset limits render as `$500K` or `$1.0M`; a custom limit renders as currency.
pub fn liability_limit(limit: Option<LiabilityLimit>, custom: Option<f64>) -> Option<String> {
    match limit? {
        LiabilityLimit::Other => custom.map(currency),
        preset => preset.amount().map(|amount| {
            if amount >= 1_000_000 {
                format!("${:.1}M", amount as f64 / 1_000_000.0)
            } else {
                format!("${}K", amount / 1_000)
            }
        }),
    }
}

pub fn deductible(choice: Option<Deductible>, custom: Option<f64>) -> Option<String> {
    match choice? {
        Deductible::Other => custom.map(currency),
        preset => preset.amount().map(|amount| format!("${}", group_thousands(amount))),
    }
}

pub fn date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Joins snake_case codes as words: `dry_van, general_freight` becomes `dry van, general freight`.
pub fn joined_codes<'a>(codes: impl IntoIterator<Item = &'a str>) -> String {
    codes
        .into_iter()
        .map(|code| code.replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`; blank names become `Business`.
pub fn sanitize_name(name: &str) -> String {
    if name.trim().is_empty() {
        return "Business".to_string();
    }
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_grouping_and_two_decimals() {
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(525_000.0), "$525,000.00");
        assert_eq!(currency(1234.5), "$1,234.50");
        assert_eq!(currency(999.999), "$1,000.00");
        assert_eq!(currency(-12.0), "-$12.00");
    }

    #[test]
    fn limits_and_deductibles_follow_preset_notation() {
        assert_eq!(
            liability_limit(Some(LiabilityLimit::OneMillion), None).as_deref(),
            Some("$1.0M")
        );
        assert_eq!(
            liability_limit(Some(LiabilityLimit::SevenFiftyThousand), None).as_deref(),
            Some("$750K")
        );
        assert_eq!(
            liability_limit(Some(LiabilityLimit::Other), Some(2_000_000.0)).as_deref(),
            Some("$2,000,000.00")
        );
        assert_eq!(liability_limit(Some(LiabilityLimit::Other), None), None);
        assert_eq!(liability_limit(None, Some(1.0)), None);
        assert_eq!(
            deductible(Some(Deductible::TwentyFiveHundred), None).as_deref(),
            Some("$2,500")
        );
        assert_eq!(
            deductible(Some(Deductible::Other), Some(7_500.0)).as_deref(),
            Some("$7,500.00")
        );
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_name("Prairie Line Freight, LLC"), "Prairie_Line_Freight__LLC");
        assert_eq!(sanitize_name("  "), "Business");
        assert_eq!(sanitize_name("Café"), "Caf_");
        assert_eq!(sanitize_name(" Acme Haulers "), "_Acme_Haulers_");
    }

    #[test]
    fn grouping_handles_boundaries() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(26_000), "26,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
