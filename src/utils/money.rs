// Rupiah amounts: dot-grouped display, digit-only parsing and the minimum policy

use crate::models::payment::UniqueCode;

/// Smallest committed amount accepted by the form.
///
/// Compared against the raw integer, so this reads as Rp 100 even though
/// [`MIN_AMOUNT_WARNING`] advertises Rp 100.000.
pub const MIN_AMOUNT: u64 = 100;

pub const MIN_AMOUNT_WARNING: &str = "Jumlah minimum Rp 100.000";

/// Returned by [`apply_minimum`] when a committed amount is under [`MIN_AMOUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BelowMinimum {
    pub rejected: u64,
}

fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    grouped
}

/// Parses the digits of `display`, ignoring separators and any other noise.
/// Empty, non-numeric and overflowing input all read as 0.
pub fn to_number(display: &str) -> u64 {
    digits_only(display).parse().unwrap_or(0)
}

/// `"1234567"` -> `"1.234.567"`, `""` -> `"0"`.
pub fn to_display(raw: &str) -> String {
    group_thousands(to_number(raw))
}

/// Grouped amount with its trailing `.000` group replaced by the unique code.
///
/// Amounts whose last group is not exactly `000` come back grouped but untouched.
pub fn to_total_with_code(raw: &str, code: UniqueCode) -> String {
    let display = to_display(raw);

    match display.strip_suffix(".000") {
        Some(head) => format!("{}.{}", head, code),
        None => display,
    }
}

pub fn format_rupiah(amount: u64) -> String {
    format!("Rp {}", group_thousands(amount))
}

pub fn apply_minimum(value: u64) -> Result<u64, BelowMinimum> {
    if value < MIN_AMOUNT {
        Err(BelowMinimum { rejected: value })
    } else {
        Ok(value)
    }
}
