use rust_decimal::{Decimal, RoundingStrategy};

/// Formats an amount as whole dollars with thousands separators: `$1,234,568`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
