use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Upper bound on any believable tire price; candidates above it are noise.
const MAX_PRICE: u32 = 2000;

/// Clean up a scraped numeric candidate: strip currency symbol and thousands
/// separators, reject non-positive or implausibly large values, round
/// half-up to cents. Returns None when the candidate is unusable.
pub fn sanitize_price(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    let value = Decimal::from_str(cleaned.trim()).ok()?;
    if value <= Decimal::ZERO || value > Decimal::from(MAX_PRICE) {
        return None;
    }
    Some(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(sanitize_price("0"), None);
        assert_eq!(sanitize_price("0.00"), None);
        assert_eq!(sanitize_price("-129.99"), None);
    }

    #[test]
    fn test_rejects_above_cap() {
        assert_eq!(sanitize_price("2000.01"), None);
        assert_eq!(sanitize_price("2,500"), None);
        // Exactly at the cap is allowed
        assert_eq!(sanitize_price("2000"), Some(dec("2000")));
    }

    #[test]
    fn test_strips_separators_and_symbol() {
        assert_eq!(sanitize_price("$1,299.50"), Some(dec("1299.50")));
        assert_eq!(sanitize_price(" 249.99 "), Some(dec("249.99")));
    }

    #[test]
    fn test_rounds_half_up_to_cents() {
        assert_eq!(sanitize_price("199.999"), Some(dec("200.00")));
        assert_eq!(sanitize_price("12.345"), Some(dec("12.35")));
        assert_eq!(sanitize_price("12.344"), Some(dec("12.34")));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(sanitize_price(""), None);
        assert_eq!(sanitize_price("free"), None);
        assert_eq!(sanitize_price("$"), None);
    }
}
