/// `₱12,500` style amount with thousands separators.
pub fn format_currency(symbol: &str, value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{symbol}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_currency("₱", 0), "₱0");
        assert_eq!(format_currency("₱", 950), "₱950");
        assert_eq!(format_currency("₱", 8500), "₱8,500");
        assert_eq!(format_currency("₱", 1_234_567), "₱1,234,567");
        assert_eq!(format_currency("$", -2000), "-$2,000");
    }
}
