//! Null-propagating arithmetic used by every derived figure.
//!
//! `None` means "no data". Division, subtraction and multiplication yield `None` as soon as
//! either operand is missing; addition only does so when *both* are missing, and otherwise
//! returns the present operand untouched.

/// Rounds to two decimal places using decimal rounding of the exact binary value.
pub fn round_to_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.2}", value).parse().unwrap_or(value)
}

pub fn safe_div(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) if b != 0.0 => Some(round_to_cents(a / b)),
        _ => None,
    }
}

pub fn safe_sub(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(round_to_cents(a? - b?))
}

pub fn safe_mul(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(round_to_cents(a? * b?))
}

pub fn safe_add(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => Some(round_to_cents(a + b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(1615.3846153846), 1615.38);
        assert_eq!(round_to_cents(0.016), 0.02);
        assert_eq!(round_to_cents(-3.14159), -3.14);
        assert_eq!(round_to_cents(42.0), 42.0);
        // 1.005 is stored as 1.00499999..., so it rounds down.
        assert_eq!(round_to_cents(1.005), 1.0);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(Some(10.0), Some(4.0)), Some(2.5));
        assert_eq!(safe_div(Some(10.0), Some(3.0)), Some(3.33));
        assert_eq!(safe_div(Some(10.0), Some(0.0)), None);
        assert_eq!(safe_div(Some(0.0), Some(0.0)), None);
        assert_eq!(safe_div(Some(10.0), Some(-0.0)), None);
        assert_eq!(safe_div(None, Some(2.0)), None);
        assert_eq!(safe_div(Some(2.0), None), None);
    }

    #[test]
    fn test_safe_sub_and_mul_propagate_nulls() {
        assert_eq!(safe_sub(Some(10.5), Some(0.25)), Some(10.25));
        assert_eq!(safe_sub(Some(1.0), Some(3.0)), Some(-2.0));
        assert_eq!(safe_sub(None, Some(3.0)), None);
        assert_eq!(safe_sub(Some(3.0), None), None);

        assert_eq!(safe_mul(Some(0.15), Some(100.0)), Some(15.0));
        assert_eq!(safe_mul(Some(-0.27), Some(100.0)), Some(-27.0));
        assert_eq!(safe_mul(None, Some(100.0)), None);
        assert_eq!(safe_mul(Some(100.0), None), None);
    }

    #[test]
    fn test_safe_add_only_nulls_when_both_missing() {
        assert_eq!(safe_add(None, None), None);
        assert_eq!(safe_add(Some(5.0), None), Some(5.0));
        assert_eq!(safe_add(None, Some(7.125)), Some(7.125));
        assert_eq!(safe_add(Some(0.1), Some(0.2)), Some(0.3));
    }
}
