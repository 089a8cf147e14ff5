//! Schema validation for tool arguments.
//!
//! Validation is total: every field is checked and every violation is
//! reported, so a caller gets the complete diagnostic in one response
//! rather than fixing one field at a time. Defaults declared in the
//! schema are applied for absent optional fields, and string-typed
//! numeric input is coerced only for fields declared numeric.
//!
//! Every handler invocation passes through [`validate`] first; there is
//! no bypass path in the dispatcher.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::schema::{FieldSpec, FieldType, Format, ParamSchema};

// ============================================================================
// Violations
// ============================================================================

/// A single field-level constraint violation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Violation {
    /// Name of the offending field.
    pub field: String,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

impl Violation {
    fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            code: "missing_required",
            message: format!("'{field}' is required"),
        }
    }

    fn wrong_type(field: &str, expected: &str, actual: &Value) -> Self {
        Self {
            field: field.to_string(),
            code: "wrong_type",
            message: format!(
                "'{field}' must be a {expected}, got {}",
                json_type_name(actual)
            ),
        }
    }

    fn invalid_format(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            code: "invalid_format",
            message,
        }
    }

    fn too_short(field: &str, min: usize, actual: usize) -> Self {
        Self {
            field: field.to_string(),
            code: "too_short",
            message: format!("'{field}' must be at least {min} characters, got {actual}"),
        }
    }

    fn out_of_range(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            code: "out_of_range",
            message,
        }
    }
}

/// Arguments failed schema validation; carries every violation found.
#[derive(Debug, Clone, Error)]
#[error("{} invalid parameter(s): {}", violations.len(), summary(violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn summary(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validate raw arguments against a schema.
///
/// Returns the validated parameter map (defaults applied, numerics
/// coerced) or a [`ValidationError`] enumerating all violations. Fields
/// not declared in the schema are dropped.
pub fn validate(
    schema: &ParamSchema,
    arguments: &Value,
) -> Result<Map<String, Value>, ValidationError> {
    let args = match arguments {
        Value::Object(map) => map,
        other => {
            return Err(ValidationError {
                violations: vec![Violation::wrong_type("arguments", "object", other)],
            });
        }
    };

    let mut validated = Map::new();
    let mut violations = Vec::new();

    for field in schema.fields() {
        match args.get(&field.name) {
            Some(raw) => match check_field(field, raw) {
                Ok(value) => {
                    validated.insert(field.name.clone(), value);
                }
                Err(mut found) => violations.append(&mut found),
            },
            None => {
                if field.required {
                    violations.push(Violation::missing(&field.name));
                } else if let Some(default) = &field.default {
                    validated.insert(field.name.clone(), default.clone());
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(validated)
    } else {
        Err(ValidationError { violations })
    }
}

/// Check a single present field, returning the (possibly coerced) value
/// or all violations for that field.
fn check_field(field: &FieldSpec, raw: &Value) -> Result<Value, Vec<Violation>> {
    match field.field_type {
        FieldType::String => check_string(field, raw),
        FieldType::Integer => check_integer(field, raw),
        FieldType::Number => check_number(field, raw),
        FieldType::Boolean => match raw {
            Value::Bool(_) => Ok(raw.clone()),
            other => Err(vec![Violation::wrong_type(&field.name, "boolean", other)]),
        },
        FieldType::StringArray => check_string_array(field, raw),
        FieldType::Object => match raw {
            Value::Object(_) => Ok(raw.clone()),
            other => Err(vec![Violation::wrong_type(&field.name, "object", other)]),
        },
    }
}

fn check_string(field: &FieldSpec, raw: &Value) -> Result<Value, Vec<Violation>> {
    let text = match raw {
        Value::String(s) => s,
        other => return Err(vec![Violation::wrong_type(&field.name, "string", other)]),
    };

    let mut violations = Vec::new();
    if let Some(min) = field.min_length {
        let len = text.chars().count();
        if len < min {
            violations.push(Violation::too_short(&field.name, min, len));
        }
    }
    if let Some(Format::Email) = field.format {
        if !looks_like_email(text) {
            violations.push(Violation::invalid_format(
                &field.name,
                format!("'{}' must be a valid email address", field.name),
            ));
        }
    }

    if violations.is_empty() {
        Ok(raw.clone())
    } else {
        Err(violations)
    }
}

fn check_integer(field: &FieldSpec, raw: &Value) -> Result<Value, Vec<Violation>> {
    // Strings are coerced only because the field is declared numeric.
    let number = match raw {
        Value::Number(n) => match n.as_i64() {
            Some(value) => value,
            // A u64 above i64::MAX is integral but unrepresentable here.
            None if n.is_u64() => {
                return Err(vec![Violation::out_of_range(
                    &field.name,
                    format!("'{}' exceeds the maximum supported integer", field.name),
                )]);
            }
            None => return Err(vec![Violation::wrong_type(&field.name, "integer", raw)]),
        },
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => return Err(vec![Violation::wrong_type(&field.name, "integer", raw)]),
        },
        other => return Err(vec![Violation::wrong_type(&field.name, "integer", other)]),
    };

    check_bounds(field, number as f64)?;
    Ok(Value::from(number))
}

fn check_number(field: &FieldSpec, raw: &Value) -> Result<Value, Vec<Violation>> {
    let number = match raw {
        Value::Number(n) => n.as_f64().unwrap_or(f64::MAX),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return Err(vec![Violation::wrong_type(&field.name, "number", raw)]),
        },
        other => return Err(vec![Violation::wrong_type(&field.name, "number", other)]),
    };

    check_bounds(field, number)?;
    Ok(Value::from(number))
}

fn check_bounds(field: &FieldSpec, value: f64) -> Result<(), Vec<Violation>> {
    if let Some(min) = field.minimum {
        if value < min {
            return Err(vec![Violation::out_of_range(
                &field.name,
                format!("'{}' must be >= {min}, got {value}", field.name),
            )]);
        }
    }
    if let Some(max) = field.maximum {
        if value > max {
            return Err(vec![Violation::out_of_range(
                &field.name,
                format!("'{}' must be <= {max}, got {value}", field.name),
            )]);
        }
    }
    Ok(())
}

fn check_string_array(field: &FieldSpec, raw: &Value) -> Result<Value, Vec<Violation>> {
    let items = match raw {
        Value::Array(items) => items,
        other => return Err(vec![Violation::wrong_type(&field.name, "array", other)]),
    };

    let violations: Vec<Violation> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.is_string())
        .map(|(index, item)| {
            Violation::wrong_type(&format!("{}[{index}]", field.name), "string", item)
        })
        .collect();

    if violations.is_empty() {
        Ok(raw.clone())
    } else {
        Err(violations)
    }
}

/// Minimal email shape check: non-empty local part, non-empty domain
/// containing an interior dot.
fn looks_like_email(text: &str) -> bool {
    match text.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::schema::{FieldSpec, Format, ParamSchema};
    use serde_json::json;

    fn user_schema() -> ParamSchema {
        ParamSchema::new()
            .field(FieldSpec::string("email").format(Format::Email).required())
            .field(FieldSpec::string("password").min_length(8).required())
            .field(
                FieldSpec::integer("per_page")
                    .range(1.0, 100.0)
                    .default_value(json!(50)),
            )
            .field(FieldSpec::boolean("verify_email").default_value(json!(false)))
    }

    #[test]
    fn test_valid_arguments_pass() {
        let args = json!({ "email": "a@b.co", "password": "longenough" });
        let params = validate(&user_schema(), &args).unwrap();
        assert_eq!(params["email"], "a@b.co");
        assert_eq!(params["password"], "longenough");
    }

    #[test]
    fn test_defaults_applied_for_absent_optionals() {
        let args = json!({ "email": "a@b.co", "password": "longenough" });
        let params = validate(&user_schema(), &args).unwrap();
        assert_eq!(params["per_page"], 50);
        assert_eq!(params["verify_email"], false);
    }

    #[test]
    fn test_all_violations_reported_not_just_first() {
        let args = json!({ "email": "not-an-email", "password": "short", "per_page": 500 });
        let err = validate(&user_schema(), &args).unwrap_err();
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password", "per_page"]);
    }

    #[test]
    fn test_missing_required_fields_all_listed() {
        let err = validate(&user_schema(), &json!({})).unwrap_err();
        assert_eq!(err.violations.len(), 2);
        assert!(err.violations.iter().all(|v| v.code == "missing_required"));
    }

    #[test]
    fn test_numeric_string_coerced_for_numeric_field() {
        let args = json!({ "email": "a@b.co", "password": "longenough", "per_page": "25" });
        let params = validate(&user_schema(), &args).unwrap();
        assert_eq!(params["per_page"], 25);
    }

    #[test]
    fn test_no_coercion_for_boolean_field() {
        let args = json!({ "email": "a@b.co", "password": "longenough", "verify_email": "true" });
        let err = validate(&user_schema(), &args).unwrap_err();
        assert_eq!(err.violations[0].field, "verify_email");
        assert_eq!(err.violations[0].code, "wrong_type");
    }

    #[test]
    fn test_non_numeric_string_rejected_for_numeric_field() {
        let args = json!({ "email": "a@b.co", "password": "longenough", "per_page": "lots" });
        let err = validate(&user_schema(), &args).unwrap_err();
        assert_eq!(err.violations[0].code, "wrong_type");
    }

    #[test]
    fn test_range_lower_bound() {
        let args = json!({ "email": "a@b.co", "password": "longenough", "per_page": 0 });
        let err = validate(&user_schema(), &args).unwrap_err();
        assert_eq!(err.violations[0].code, "out_of_range");
    }

    #[test]
    fn test_unrepresentable_integer_reported_not_clamped() {
        let schema = ParamSchema::new().field(FieldSpec::integer("count"));
        let err = validate(&schema, &json!({ "count": u64::MAX })).unwrap_err();
        assert_eq!(err.violations[0].field, "count");
        assert_eq!(err.violations[0].code, "out_of_range");
    }

    #[test]
    fn test_undeclared_fields_dropped() {
        let args = json!({ "email": "a@b.co", "password": "longenough", "extra": 1 });
        let params = validate(&user_schema(), &args).unwrap();
        assert!(!params.contains_key("extra"));
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let err = validate(&user_schema(), &json!([1, 2])).unwrap_err();
        assert_eq!(err.violations[0].field, "arguments");
    }

    #[test]
    fn test_string_array_elements_checked() {
        let schema = ParamSchema::new().field(FieldSpec::string_array("roles").required());
        let err = validate(&schema, &json!({ "roles": ["rol_1", 7] })).unwrap_err();
        assert_eq!(err.violations[0].field, "roles[1]");
    }

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("user@example.com"));
        assert!(!looks_like_email("userexample.com"));
        assert!(!looks_like_email("user@"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("user@nodot"));
    }

    #[test]
    fn test_error_message_enumerates_violations() {
        let err = validate(&user_schema(), &json!({})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'email' is required"));
        assert!(msg.contains("'password' is required"));
    }
}
