use crate::error::{FinancialRatioError, Result};
use crate::schema::{CanonicalField, NormalizedStatement, RawStatements, RawValue, RawYearStatement};
use log::debug;
use serde_json::Value;

/// Case-insensitive tokens that mean "no data".
const NO_DATA_TOKENS: [&str; 3] = ["na", "n/a", "sin dato"];

/// Currency, percent and sign markers removed before parsing.
const STRIPPED_MARKERS: [&str; 6] = ["$", "USD", "MXN", "%", "+", "-"];

/// Converts a raw scalar into a non-negative magnitude, or `None` when there is no usable number.
///
/// Numbers are taken as their absolute value. Strings go through [`normalize_amount_text`].
/// Anything else (null, booleans, arrays, objects) has no numeric reading.
pub fn normalize_value(raw: &RawValue) -> Option<f64> {
    match raw {
        Value::Number(number) => number.as_f64().map(f64::abs),
        Value::String(text) => normalize_amount_text(text),
        _ => None,
    }
}

/// Cleans a textual amount the way the source statements are written.
///
/// - `"(1,000)"`: parentheses mark a negative amount; only the magnitude is kept.
/// - `"$1,234 MXN"`: currency markers, `%`, `+` and `-` are removed.
/// - `"12.50"`: thousands commas *and* decimal points are removed, so this reads as `1250`.
///   Upstream extraction is asked for whole numbers only and this convention is relied on.
pub fn normalize_amount_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || NO_DATA_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }

    let unwrapped = trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(trimmed);

    let mut cleaned = unwrapped.to_string();
    for marker in STRIPPED_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned.retain(|c| c != ',' && c != '.');

    match strip_digit_underscores(cleaned.trim())?.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value.abs()),
        _ => None,
    }
}

/// Drops `_` digit separators (`"1_000"`). An underscore that does not sit between two digits
/// makes the whole amount unreadable.
fn strip_digit_underscores(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut digits = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c != '_' {
            digits.push(c);
            continue;
        }
        let before = i.checked_sub(1).and_then(|j| chars.get(j));
        let after = chars.get(i + 1);
        match (before, after) {
            (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit() => {}
            _ => return None,
        }
    }

    Some(digits)
}

/// Maps one year's free-text labels onto the canonical catalog and normalizes every value.
///
/// Unknown labels are dropped. When several labels resolve to the same field, the one that comes
/// last in map order wins.
pub fn normalize_statement(raw: &RawYearStatement) -> NormalizedStatement {
    let mut statement = NormalizedStatement::new();

    for (label, value) in raw {
        match CanonicalField::from_label(label) {
            Some(field) => statement.insert(field, normalize_value(value)),
            None => debug!("Dropping unrecognized line item '{}'", label),
        }
    }

    statement
}

/// Interprets recovered model JSON as `{ year: { label: value } }`.
pub fn parse_statements(value: Value) -> Result<RawStatements> {
    let years = match value {
        Value::Object(years) => years,
        other => {
            return Err(FinancialRatioError::InvalidStatementShape(format!(
                "expected an object keyed by year, got {}",
                value_kind(&other)
            )))
        }
    };

    let mut statements = RawStatements::new();
    for (year, items) in years {
        match items {
            Value::Object(items) => {
                statements.insert(year, items.into_iter().collect());
            }
            other => {
                return Err(FinancialRatioError::InvalidStatementShape(format!(
                    "year '{}' should map to an object of line items, got {}",
                    year,
                    value_kind(&other)
                )))
            }
        }
    }

    Ok(statements)
}

/// Merges per-document extractions into a single map keyed by year. A year seen again in a
/// later batch replaces the earlier entry as a whole.
pub fn merge_statements<I>(batches: I) -> RawStatements
where
    I: IntoIterator<Item = RawStatements>,
{
    let mut merged = RawStatements::new();
    for batch in batches {
        for (year, items) in batch {
            if merged.insert(year.clone(), items).is_some() {
                debug!("Year {} extracted more than once; keeping the latest document", year);
            }
        }
    }
    merged
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_thousands_and_parentheses() {
        assert_eq!(normalize_value(&json!("1,234")), Some(1234.0));
        assert_eq!(normalize_value(&json!("(1,000)")), Some(1000.0));
        assert_eq!(normalize_value(&json!("  $ 2,500,000 MXN ")), Some(2_500_000.0));
        assert_eq!(normalize_value(&json!("USD 75")), Some(75.0));
        assert_eq!(normalize_value(&json!("-300")), Some(300.0));
        assert_eq!(normalize_value(&json!("+12%")), Some(12.0));
    }

    #[test]
    fn test_digit_group_underscores() {
        assert_eq!(normalize_value(&json!("1_000")), Some(1000.0));
        assert_eq!(normalize_value(&json!("$ 2_500_000")), Some(2_500_000.0));
        assert_eq!(normalize_value(&json!("_1000")), None);
        assert_eq!(normalize_value(&json!("1__000")), None);
        assert_eq!(normalize_value(&json!("1000_")), None);
    }

    #[test]
    fn test_decimal_point_is_stripped() {
        assert_eq!(normalize_value(&json!("12.50")), Some(1250.0));
        assert_eq!(normalize_value(&json!("12721.65")), Some(1_272_165.0));
        assert_eq!(normalize_value(&json!("1.234.567")), Some(1_234_567.0));
    }

    #[test]
    fn test_numbers_pass_through_as_magnitudes() {
        assert_eq!(normalize_value(&json!(12.5)), Some(12.5));
        assert_eq!(normalize_value(&json!(-4500)), Some(4500.0));
        assert_eq!(normalize_value(&json!(0)), Some(0.0));
    }

    #[test]
    fn test_missing_and_unparsable_values_are_none() {
        assert_eq!(normalize_value(&Value::Null), None);
        assert_eq!(normalize_value(&json!("")), None);
        assert_eq!(normalize_value(&json!("   ")), None);
        assert_eq!(normalize_value(&json!("n/a")), None);
        assert_eq!(normalize_value(&json!("NA")), None);
        assert_eq!(normalize_value(&json!("Sin Dato")), None);
        assert_eq!(normalize_value(&json!("abc")), None);
        assert_eq!(normalize_value(&json!("12 500")), None);
        assert_eq!(normalize_value(&json!("()")), None);
        assert_eq!(normalize_value(&json!("nan")), None);
        assert_eq!(normalize_value(&json!("inf")), None);
        assert_eq!(normalize_value(&json!(true)), None);
        assert_eq!(normalize_value(&json!(["1"])), None);
    }

    #[test]
    fn test_normalize_statement_canonicalizes_and_drops_unknown_labels() {
        let raw: RawYearStatement = serde_json::from_value(json!({
            "Bancos": "10500",
            "TOTAL ACTIVO": "27,869,960",
            "Utilidad o pérdida del ejercicio": "(456408)",
            "Clientes": "",
            "Cuentas por cobrar": "2000",
            "Notas": "ver anexo"
        }))
        .unwrap();

        let statement = normalize_statement(&raw);

        assert_eq!(statement.len(), 4);
        assert_eq!(statement.get(CanonicalField::Bancos), Some(10500.0));
        assert_eq!(statement.get(CanonicalField::TotalActivo), Some(27_869_960.0));
        assert_eq!(statement.get(CanonicalField::UtilidadEjercicio), Some(456_408.0));
        assert!(statement.contains(CanonicalField::Clientes));
        assert_eq!(statement.get(CanonicalField::Clientes), None);
    }

    #[test]
    fn test_duplicate_labels_last_in_map_order_wins() {
        let raw: RawYearStatement = serde_json::from_value(json!({
            "INGRESOS": "100",
            "ingresos": "200"
        }))
        .unwrap();

        // Upper-case sorts first, so the lower-case label is applied last.
        assert_eq!(normalize_statement(&raw).get(CanonicalField::Ingresos), Some(200.0));
    }

    #[test]
    fn test_parse_statements_validates_shape() {
        let statements = parse_statements(json!({
            "2022": { "Bancos": "1" },
            "2021": {}
        }))
        .unwrap();
        assert_eq!(statements.keys().collect::<Vec<_>>(), vec!["2021", "2022"]);

        let err = parse_statements(json!(["2022"])).unwrap_err();
        assert!(matches!(err, FinancialRatioError::InvalidStatementShape(_)));

        let err = parse_statements(json!({ "2022": "Bancos 1" })).unwrap_err();
        assert!(err.to_string().contains("2022"));
    }

    #[test]
    fn test_merge_statements_later_batch_replaces_year() {
        let first = parse_statements(json!({
            "2021": { "Bancos": "1" },
            "2022": { "Bancos": "2" }
        }))
        .unwrap();
        let second = parse_statements(json!({ "2022": { "Clientes": "3" } })).unwrap();

        let merged = merge_statements(vec![first, second]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged["2021"]["Bancos"], json!("1"));
        assert!(!merged["2022"].contains_key("Bancos"));
        assert_eq!(merged["2022"]["Clientes"], json!("3"));
    }
}
