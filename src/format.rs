// 💱 Display formatting - amounts, scores, truncation
//
// Amounts are grouped the Indian way (2,45,000) and prefixed with ₹ where
// the dashboard shows currency. Whole amounts drop the decimals.

pub const CURRENCY_SYMBOL: &str = "₹";

/// Group an integer as lakh/crore: last three digits, then pairs
fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (h, t) = rest.split_at(rest.len() - 2);
        groups.push(t);
        rest = h;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Grouped amount without currency symbol ("4,999", "2,45,000.50")
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let whole = cents / 100;
    let fraction = cents % 100;

    if fraction == 0 {
        format!("{}{}", sign, group_indian(whole))
    } else {
        format!("{}{}.{:02}", sign, group_indian(whole), fraction)
    }
}

/// Grouped amount with the rupee symbol
pub fn format_inr(amount: f64) -> String {
    let grouped = format_amount(amount);
    match grouped.strip_prefix('-') {
        Some(magnitude) => format!("-{}{}", CURRENCY_SYMBOL, magnitude),
        None => format!("{}{}", CURRENCY_SYMBOL, grouped),
    }
}

/// Risk score shown with two decimals (0.92)
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Char-boundary safe truncation with a trailing ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_amounts_are_ungrouped() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(100.0), "100");
        assert_eq!(format_amount(999.0), "999");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_amount(4999.0), "4,999");
        assert_eq!(format_amount(12500.0), "12,500");
        assert_eq!(format_amount(245000.0), "2,45,000");
        assert_eq!(format_amount(1234567.0), "12,34,567");
        assert_eq!(format_amount(123456789.0), "12,34,56,789");
    }

    #[test]
    fn test_fractional_and_negative() {
        assert_eq!(format_amount(4999.5), "4,999.50");
        assert_eq!(format_amount(-3200.0), "-3,200");
        assert_eq!(format_inr(245000.0), "₹2,45,000");
        assert_eq!(format_inr(-1500.0), "-₹1,500");
    }

    #[test]
    fn test_negative_that_rounds_to_zero_has_no_sign() {
        assert_eq!(format_amount(-0.001), "0");
        assert_eq!(format_amount(-0.004), "0");
        assert_eq!(format_inr(-0.001), "₹0");
        assert_eq!(format_amount(f64::NAN), "0");
        assert_eq!(format_amount(f64::NEG_INFINITY), "0");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("ACC-7821", 20), "ACC-7821");
        assert_eq!(truncate("Smurfing Investigation - ACC-7821", 15), "Smurfing Inv...");
        assert_eq!(truncate("₹₹₹₹₹₹", 5), "₹₹...");
    }

    #[test]
    fn test_score() {
        assert_eq!(format_score(0.92), "0.92");
        assert_eq!(format_score(0.5), "0.50");
    }
}
