//! Minimal ERP domain evaluation.
//!
//! Terms are `[field, operator, value]` triples joined by implicit AND. Prefix
//! operators (`|`, `&`, `!`) and unknown operators are not evaluated; such
//! terms match every record.

use crate::models::{ForeignKeyRef, Record};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

/// True when `record` satisfies every evaluable term of `domain`.
pub fn matches_domain(record: &Record, domain: &[Value]) -> bool {
    domain.iter().all(|term| matches_term(record, term))
}

fn matches_term(record: &Record, term: &Value) -> bool {
    let Some([field, operator, expected]) = term.as_array().map(Vec::as_slice).and_then(triple) else {
        debug!("Domain term {} not evaluated, treated as match", term);
        return true;
    };
    let (Some(field), Some(operator)) = (field.as_str(), operator.as_str()) else {
        return true;
    };

    let actual = record.get(field).cloned().unwrap_or(Value::Bool(false));

    match operator {
        "=" | "==" => equals(&actual, expected),
        "!=" | "<>" => !equals(&actual, expected),
        "in" => expected
            .as_array()
            .is_some_and(|values| values.iter().any(|v| equals(&actual, v))),
        "not in" => !expected
            .as_array()
            .is_some_and(|values| values.iter().any(|v| equals(&actual, v))),
        "<" => compare(&actual, expected) == Some(Ordering::Less),
        "<=" => matches!(compare(&actual, expected), Some(Ordering::Less | Ordering::Equal)),
        ">" => compare(&actual, expected) == Some(Ordering::Greater),
        ">=" => matches!(compare(&actual, expected), Some(Ordering::Greater | Ordering::Equal)),
        "like" => contains(&actual, expected, false),
        "ilike" => contains(&actual, expected, true),
        other => {
            debug!("Domain operator '{}' not evaluated, treated as match", other);
            true
        }
    }
}

fn triple(items: &[Value]) -> Option<&[Value; 3]> {
    items.try_into().ok()
}

/// Collapse a many2one pair to its id, or to its label when compared with text.
fn normalize(actual: &Value, expected: &Value) -> Value {
    match ForeignKeyRef::from_value(actual) {
        Some(reference) if expected.is_string() => Value::from(reference.label),
        Some(reference) => Value::from(reference.id),
        None => actual.clone(),
    }
}

fn equals(actual: &Value, expected: &Value) -> bool {
    let actual = normalize(actual, expected);
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => actual == *expected,
    }
}

fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    let actual = normalize(actual, expected);
    match (&actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}

fn contains(actual: &Value, expected: &Value, case_insensitive: bool) -> bool {
    let actual = normalize(actual, expected);
    let (Some(haystack), Some(needle)) = (actual.as_str(), expected.as_str()) else {
        return false;
    };
    if case_insensitive {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    } else {
        haystack.contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attendance() -> Record {
        serde_json::from_value(json!({
            "id": 4,
            "employee_id": [4, "Choi Design"],
            "check_in": "2025-08-05 09:30:00",
            "check_out": false,
            "worked_hours": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_domain_matches() {
        assert!(matches_domain(&attendance(), &[]));
    }

    #[test]
    fn test_many2one_compares_by_id() {
        let record = attendance();
        assert!(matches_domain(&record, &[json!(["employee_id", "=", 4])]));
        assert!(!matches_domain(&record, &[json!(["employee_id", "=", 1])]));
        assert!(matches_domain(&record, &[json!(["employee_id", "in", [1, 4]])]));
        assert!(matches_domain(&record, &[json!(["employee_id", "ilike", "choi"])]));
    }

    #[test]
    fn test_comparisons_and_unset_values() {
        let record = attendance();
        assert!(matches_domain(&record, &[json!(["worked_hours", "<", 1.5])]));
        assert!(matches_domain(&record, &[json!(["check_in", ">=", "2025-08-05"])]));
        assert!(matches_domain(&record, &[json!(["check_out", "=", false])]));
        assert!(matches_domain(&record, &[json!(["missing", "=", false])]));
    }

    #[test]
    fn test_terms_are_anded() {
        let record = attendance();
        let domain = [json!(["id", "=", 4]), json!(["worked_hours", ">", 1])];
        assert!(!matches_domain(&record, &domain));
    }

    #[test]
    fn test_unevaluable_terms_match() {
        let record = attendance();
        assert!(matches_domain(&record, &[json!("|"), json!(["id", "child_of", 1])]));
    }

    #[test]
    fn test_prefix_or_is_not_evaluated() {
        // `|` is skipped, so both following terms must hold.
        let record = attendance();
        let domain = [json!("|"), json!(["id", "=", 4]), json!(["id", "=", 5])];
        assert!(!matches_domain(&record, &domain));
    }
}
