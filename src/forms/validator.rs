//! Request parameter validation against form data.
//!
//! # Responsibilities
//! - Check every field in manifest order, every value in input order
//! - Substitute defaults for empty or absent values
//! - Coerce number fields to integers or decimals
//!
//! # Design Decisions
//! - First violation aborts validation with a `FormData` exception
//! - Values are checked trimmed but stored untrimmed; only defaults and
//!   number coercions change the stored parameters
//! - The `max` bound is checked with `<`, like `min`

use serde_json::{Number, Value};

use crate::exception::{AppResult, Exception, FieldViolation};
use crate::routing::Parameters;

use super::field::{FieldDefinition, FieldType, FormData};

/// Validate `parameters` against `form`, writing defaults and coercions back.
pub fn validate(parameters: &mut Parameters, form: &FormData) -> AppResult<()> {
    for (name, field) in form.iter() {
        let checked = match parameters.get(name) {
            Some(Value::Array(items)) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(check_value(name, field, item)?);
                }
                Value::Array(values)
            }
            Some(value) if !value.is_null() => check_value(name, field, value)?,
            _ => Value::Null,
        };
        parameters.insert(name.to_string(), checked);

        if is_blank(&parameters[name]) {
            parameters.insert(name.to_string(), field.default_value.clone());
            if field.required.value && (field.field_type == FieldType::Checkbox || !field.has_default()) {
                return Err(violation(name, field, "required", &field.required.message));
            }
        }
    }
    Ok(())
}

/// Check one submitted value, returning the value to store.
fn check_value(name: &str, field: &FieldDefinition, raw: &Value) -> AppResult<Value> {
    let mut stored = raw.clone();
    let mut value = stringify(raw).trim().to_string();

    if field.required.value && value.is_empty() {
        if !field.has_default() {
            return Err(violation(name, field, "required", &field.required.message));
        }
        stored = field.default_value.clone();
        value = stringify(&stored);
    }

    let length = value.chars().count();
    if length == 0 {
        return Ok(stored);
    }

    if field.min_length.value > 0 && length < field.min_length.value {
        return Err(violation(name, field, "minLength", &field.min_length.message));
    }
    if field.max_length.value > 0 && length > field.max_length.value {
        return Err(violation(name, field, "maxLength", &field.max_length.message));
    }
    if let Some(pattern) = &field.format.value {
        if !pattern.is_match(&value) {
            return Err(violation(name, field, "format", &field.format.message));
        }
    }

    match (field.field_type, &field.values) {
        (FieldType::Select, Some(allowed)) => {
            if !allowed.contains_key(&value) {
                return Err(violation(name, field, "format", &field.format.message));
            }
        }
        (FieldType::Number, _) => {
            let (number, json) = coerce_number(&value, field.is_decimal())
                .ok_or_else(|| violation(name, field, "format", &field.format.message))?;
            stored = json;

            if let Some(min) = field.min.value {
                if number < min {
                    return Err(violation(name, field, "min", &field.min.message));
                }
            }
            if let Some(max) = field.max.value {
                if number < max {
                    return Err(violation(name, field, "max", &field.max.message));
                }
            }
        }
        _ => {}
    }

    Ok(stored)
}

fn violation(name: &str, field: &FieldDefinition, constraint: &str, message: &str) -> Exception {
    Exception::form_data(FieldViolation {
        field_id: name.to_string(),
        constraint: constraint.to_string(),
        message: message.to_string(),
        label: field.display_label().to_string(),
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// String form of a parameter value; lists join with `,`.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Parse the leading number of `value`, like a lenient form parser would.
fn coerce_number(value: &str, decimal: bool) -> Option<(f64, Value)> {
    if decimal {
        let number = parse_float_prefix(value)?;
        Number::from_f64(number).map(|n| (number, Value::Number(n)))
    } else {
        let number = parse_int_prefix(value)?;
        Some((number as f64, Value::from(number)))
    }
}

fn parse_int_prefix(value: &str) -> Option<i64> {
    let bytes = value.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    value[..end].parse().ok()
}

fn parse_float_prefix(value: &str) -> Option<f64> {
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(value.len());
    (1..=end)
        .rev()
        .find_map(|i| value[..i].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}
