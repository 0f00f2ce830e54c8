//! # Conversion Engine
//!
//! Coerces a raw [`Value`] into the type demanded by a [`TypeDescriptor`],
//! or fails with a structured [`ConversionError`].
//!
//! Conversion is lenient on shape and strict on parseability: strings,
//! numbers, and booleans cross-convert freely, but a string that cannot
//! become a number fails loudly. This matches data arriving through untyped
//! transport (forms, query strings, JSON).
//!
//! ## Rules
//!
//! | Descriptor | Input                         | Result                          |
//! |------------|-------------------------------|---------------------------------|
//! | any        | `Undefined` / `Null`          | passed through unchanged        |
//! | `Optional` | `Undefined`                   | field omitted                   |
//! | `String`   | anything                      | textual form, never fails       |
//! | `Number`   | number, bool, numeric string, date | number, NaN fails          |
//! | `Boolean`  | string                        | `"false"`, `"0"`, `""` → false  |
//! | `Boolean`  | other                         | truthiness                      |
//! | `Date`     | date, epoch millis, ISO text  | date, invalid fails             |
//! | `Custom`   | anything                      | constructor result or its error |
//! | `Array`    | array                         | element-wise, first failure aborts |

use crate::descriptor::{Primitive, TypeDescriptor};
use crate::error::{ConversionError, ConversionFailure, FieldPath, Observed};
use crate::temporal;
use crate::value::Value;

/// Integer literal prefixes accepted in numeric strings.
const RADIX_PREFIXES: [(&str, u32); 6] = [
    ("0x", 16),
    ("0X", 16),
    ("0o", 8),
    ("0O", 8),
    ("0b", 2),
    ("0B", 2),
];

/// Convert `raw` according to `descriptor`.
///
/// Returns `Ok(None)` when the field must be omitted (an `Optional`
/// descriptor given `Undefined`), otherwise the converted value.
///
/// # Errors
///
/// Returns [`ConversionError`] when a present value cannot be coerced.
/// `Undefined` and `Null` never fail.
pub fn convert(
    path: &FieldPath,
    raw: &Value,
    descriptor: &TypeDescriptor,
) -> Result<Option<Value>, ConversionError> {
    match descriptor {
        TypeDescriptor::Optional(inner) => {
            if raw.is_undefined() {
                return Ok(None);
            }
            convert(path, raw, inner)
        }
        _ if raw.is_nullish() => Ok(Some(raw.clone())),
        TypeDescriptor::Primitive(primitive) => convert_primitive(raw, *primitive)
            .map(Some)
            .map_err(|failure| failed(path, descriptor, failure)),
        TypeDescriptor::Custom(custom) => custom.construct(raw).map(Some).map_err(|cause| {
            failed(
                path,
                descriptor,
                ConversionFailure::Rejected {
                    type_name: custom.name().to_string(),
                    observed: Observed::of(raw),
                    cause,
                },
            )
        }),
        TypeDescriptor::Array(inner) => convert_array(path, raw, descriptor, inner).map(Some),
    }
}

/// Convert a value that must not be omitted, mapping an omission to
/// `Undefined`. Convenient inside behaviors that coerce arguments.
pub fn coerce(raw: &Value, descriptor: &TypeDescriptor) -> Result<Value, ConversionError> {
    Ok(convert(&FieldPath::root(), raw, descriptor)?.unwrap_or(Value::Undefined))
}

fn failed(path: &FieldPath, descriptor: &TypeDescriptor, failure: ConversionFailure) -> ConversionError {
    ConversionError {
        path: path.clone(),
        expected: descriptor.name(),
        failure,
    }
}

fn convert_array(
    path: &FieldPath,
    raw: &Value,
    descriptor: &TypeDescriptor,
    inner: &TypeDescriptor,
) -> Result<Value, ConversionError> {
    let Value::Array(items) = raw else {
        return Err(failed(
            path,
            descriptor,
            ConversionFailure::NotAnArray {
                observed: Observed::of(raw),
            },
        ));
    };

    let mut converted = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let element = convert(&path.index(index), item, inner).map_err(|err| {
            failed(
                path,
                descriptor,
                ConversionFailure::ArrayElement {
                    index,
                    cause: Box::new(err.failure),
                },
            )
        })?;
        converted.push(element.unwrap_or(Value::Undefined));
    }
    Ok(Value::Array(converted))
}

fn convert_primitive(raw: &Value, primitive: Primitive) -> Result<Value, ConversionFailure> {
    match primitive {
        Primitive::String => Ok(Value::String(raw.to_text())),
        Primitive::Number => to_number(raw).map(Value::Number).ok_or_else(|| {
            ConversionFailure::NotANumber {
                observed: Observed::of(raw),
            }
        }),
        Primitive::Boolean => Ok(Value::Bool(to_boolean(raw))),
        Primitive::Date => to_date(raw).map(Value::Date).ok_or_else(|| {
            ConversionFailure::InvalidDate {
                observed: Observed::of(raw),
            }
        }),
    }
}

// ─── Primitive Coercions ─────────────────────────────────────────────

/// Numeric value of `raw`, or `None` when it is not a number (NaN).
pub fn to_number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => *n,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => parse_number(s)?,
        Value::Date(dt) => temporal::epoch_millis(dt),
        Value::Custom(custom) => return to_number(&Value::from(custom.to_json())),
        Value::Undefined | Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!n.is_nan()).then_some(n)
}

/// Parse numeric text: surrounding whitespace is ignored, empty text is
/// zero, `0x`/`0o`/`0b` integer prefixes and `Infinity` are accepted.
fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    for (prefix, radix) in RADIX_PREFIXES {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            // Accumulate in f64 so values past u64::MAX stay finite.
            return digits.chars().try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
            });
        }
    }
    // Restrict to decimal syntax so `inf` and `nan` spellings stay invalid.
    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Boolean value of `raw`.
///
/// Strings: `"false"` (any case), `"0"`, and `""` are false; every other
/// string is true. Other values use truthiness: `false`, `0`, NaN,
/// `Undefined`, and `Null` are false.
pub fn to_boolean(raw: &Value) -> bool {
    match raw {
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::Undefined | Value::Null => false,
        Value::Date(_) | Value::Array(_) | Value::Object(_) | Value::Custom(_) => true,
    }
}

/// Date value of `raw`, or `None` when it does not denote a valid date.
pub fn to_date(raw: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
    match raw {
        Value::Date(dt) => Some(*dt),
        Value::Number(millis) => temporal::from_epoch_millis(*millis),
        Value::String(s) => temporal::parse_date(s),
        Value::Custom(custom) => to_date(&Value::from(custom.to_json())),
        Value::Undefined | Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{array_of, boolean, custom, date, number, optional, string, Construct};
    use crate::error::ConstructorError;
    use proptest::prelude::*;
    use serde::Serialize;
    use serde_json::json;

    fn path() -> FieldPath {
        FieldPath::field("f")
    }

    fn ok(raw: impl Into<Value>, d: &TypeDescriptor) -> Value {
        convert(&path(), &raw.into(), d).unwrap().unwrap()
    }

    fn err(raw: impl Into<Value>, d: &TypeDescriptor) -> ConversionError {
        convert(&path(), &raw.into(), d).unwrap_err()
    }

    #[derive(Debug, PartialEq, Serialize)]
    struct Email(String);

    impl Construct for Email {
        type Error = ConstructorError;

        fn construct(raw: &Value) -> Result<Self, Self::Error> {
            match raw.as_str() {
                Some(s) if s.contains('@') => Ok(Self(s.to_string())),
                _ => Err(ConstructorError::new("Invalid email")),
            }
        }
    }

    // ── Absence and null ─────────────────────────────────────────────

    #[test]
    fn test_nullish_passes_through_every_descriptor() {
        for d in [string(), number(), boolean(), date(), array_of(number()), custom::<Email>()] {
            assert_eq!(convert(&path(), &Value::Undefined, &d).unwrap(), Some(Value::Undefined));
            assert_eq!(convert(&path(), &Value::Null, &d).unwrap(), Some(Value::Null));
        }
    }

    #[test]
    fn test_optional_undefined_is_omitted() {
        assert_eq!(convert(&path(), &Value::Undefined, &optional(number())).unwrap(), None);
    }

    #[test]
    fn test_optional_null_is_assigned() {
        assert_eq!(
            convert(&path(), &Value::Null, &optional(number())).unwrap(),
            Some(Value::Null)
        );
    }

    #[test]
    fn test_optional_present_delegates() {
        assert_eq!(ok("5", &optional(number())), Value::Number(5.0));
    }

    // ── String ───────────────────────────────────────────────────────

    #[test]
    fn test_string_conversion() {
        assert_eq!(ok(123, &string()), Value::from("123"));
        assert_eq!(ok(2.5, &string()), Value::from("2.5"));
        assert_eq!(ok(true, &string()), Value::from("true"));
        assert_eq!(ok("text", &string()), Value::from("text"));
    }

    #[test]
    fn test_string_from_date_is_iso() {
        let dt = temporal::parse_date("2023-01-02").unwrap();
        assert_eq!(ok(dt, &string()), Value::from("2023-01-02T00:00:00.000Z"));
    }

    // ── Number ───────────────────────────────────────────────────────

    #[test]
    fn test_number_conversion() {
        assert_eq!(ok("456", &number()), Value::Number(456.0));
        assert_eq!(ok("3.25", &number()), Value::Number(3.25));
        assert_eq!(ok(" 42 ", &number()), Value::Number(42.0));
        assert_eq!(ok(true, &number()), Value::Number(1.0));
        assert_eq!(ok(false, &number()), Value::Number(0.0));
        assert_eq!(ok("", &number()), Value::Number(0.0));
        assert_eq!(ok("0x1F", &number()), Value::Number(31.0));
        assert_eq!(ok("1e3", &number()), Value::Number(1000.0));
        assert_eq!(ok("-Infinity", &number()), Value::Number(f64::NEG_INFINITY));
    }

    #[test]
    fn test_number_radix_prefixes_past_u64() {
        assert_eq!(ok("0o17", &number()), Value::Number(15.0));
        assert_eq!(ok("0b101", &number()), Value::Number(5.0));
        assert_eq!(
            ok("0x10000000000000000", &number()),
            Value::Number(18_446_744_073_709_551_616.0)
        );
        let wide = format!("0b1{}", "0".repeat(100));
        assert_eq!(ok(wide.as_str(), &number()), Value::Number(2f64.powi(100)));
    }

    #[test]
    fn test_number_from_date_is_epoch_millis() {
        let dt = temporal::from_epoch_millis(1_672_531_200_000.0).unwrap();
        assert_eq!(ok(dt, &number()), Value::Number(1_672_531_200_000.0));
    }

    #[test]
    fn test_number_rejects_garbage() {
        for bad in ["invalid", "12abc", "inf", "NaN", "0x", "0xZZ", "1e"] {
            let e = err(bad, &number());
            assert!(
                e.to_string().contains("Cannot convert to number"),
                "{bad}: {e}"
            );
        }
        assert!(err(json!({"a": 1}), &number())
            .to_string()
            .contains("Cannot convert to number"));
        assert!(err(f64::NAN, &number())
            .to_string()
            .contains("Cannot convert to number"));
    }

    #[test]
    fn test_number_error_names_path_and_observed() {
        let e = err("invalid", &number());
        assert_eq!(e.path, path());
        assert_eq!(e.expected, "Number");
        let message = e.to_string();
        assert!(message.contains("'f'"));
        assert!(message.contains("string \"invalid\""));
    }

    // ── Boolean ──────────────────────────────────────────────────────

    #[test]
    fn test_boolean_textual_rule() {
        for falsy in ["false", "FALSE", "False", "0", ""] {
            assert_eq!(ok(falsy, &boolean()), Value::Bool(false), "{falsy:?}");
        }
        for truthy in ["true", "yes", "truthy", "no", "1", " "] {
            assert_eq!(ok(truthy, &boolean()), Value::Bool(true), "{truthy:?}");
        }
    }

    #[test]
    fn test_boolean_truthiness() {
        assert_eq!(ok(1, &boolean()), Value::Bool(true));
        assert_eq!(ok(0, &boolean()), Value::Bool(false));
        assert_eq!(ok(f64::NAN, &boolean()), Value::Bool(false));
        assert_eq!(ok(true, &boolean()), Value::Bool(true));
        assert_eq!(ok(json!([]), &boolean()), Value::Bool(true));
        assert_eq!(ok(json!({}), &boolean()), Value::Bool(true));
    }

    // ── Date ─────────────────────────────────────────────────────────

    #[test]
    fn test_date_conversion_formats() {
        let expected = Value::Date(temporal::parse_date("2023-01-01T00:00:00Z").unwrap());
        assert_eq!(ok("2023-01-01", &date()), expected);
        assert_eq!(ok(1_672_531_200_000i64, &date()), expected);
        assert_eq!(ok("2023-01-01T00:00:00Z", &date()), expected);
    }

    #[test]
    fn test_date_idempotent() {
        let dt = temporal::parse_date("2023-01-02").unwrap();
        assert_eq!(ok(dt, &date()), Value::Date(dt));
    }

    #[test]
    fn test_date_rejects_invalid() {
        assert!(err("invalid date", &date())
            .to_string()
            .contains("Cannot convert to Date"));
        assert!(err(true, &date()).to_string().contains("Cannot convert to Date"));
    }

    // ── Custom ───────────────────────────────────────────────────────

    #[test]
    fn test_custom_constructor_invoked() {
        let v = ok("john@example.com", &custom::<Email>());
        assert_eq!(v.as_custom::<Email>(), Some(&Email("john@example.com".into())));
    }

    #[test]
    fn test_custom_rejection_is_cause() {
        let e = err("invalid", &custom::<Email>());
        assert!(matches!(e.failure, ConversionFailure::Rejected { .. }));
        assert_eq!(e.root_cause().to_string(), "Invalid email");
        assert!(e.to_string().contains("Invalid email"));
    }

    // ── Array ────────────────────────────────────────────────────────

    #[test]
    fn test_array_converts_positionally() {
        let v = ok(json!(["25", 30, "35"]), &array_of(number()));
        assert_eq!(v, Value::from(vec![25, 30, 35]));
    }

    #[test]
    fn test_array_empty() {
        assert_eq!(ok(json!([]), &array_of(string())), Value::Array(vec![]));
    }

    #[test]
    fn test_array_rejects_non_array() {
        assert!(err("not an array", &array_of(string()))
            .to_string()
            .contains("Expected array but got string"));
        assert!(err(123, &array_of(number()))
            .to_string()
            .contains("Expected array but got number"));
        assert!(err(json!({"length": 3}), &array_of(number()))
            .to_string()
            .contains("Expected array but got object"));
    }

    #[test]
    fn test_array_element_failure_names_index() {
        let e = err(json!(["1", "invalid", "3"]), &array_of(number()));
        let message = e.to_string();
        assert!(message.contains("Array element at index 1"));
        assert!(message.contains("Cannot convert to number"));
        assert_eq!(e.element_indices(), vec![1]);
    }

    #[test]
    fn test_nested_array_failure_names_both_indices() {
        let e = err(json!([[1, 2], [3, "x"]]), &array_of(array_of(number())));
        assert_eq!(e.element_indices(), vec![1, 1]);
        assert!(e
            .to_string()
            .contains("Array element at index 1: Array element at index 1: Cannot convert"));
    }

    #[test]
    fn test_array_of_custom_failure_keeps_constructor_message() {
        let e = err(json!(["john@test.com", "invalid"]), &array_of(custom::<Email>()));
        assert_eq!(e.root_cause().to_string(), "Invalid email");
    }

    #[test]
    fn test_array_keeps_nullish_elements() {
        let v = ok(
            Value::Array(vec![Value::from("text"), Value::from(42), Value::Null, Value::Undefined]),
            &array_of(string()),
        );
        assert_eq!(
            v,
            Value::Array(vec![
                Value::from("text"),
                Value::from("42"),
                Value::Null,
                Value::Undefined
            ])
        );
    }

    #[test]
    fn test_array_of_optional_maps_omission_to_undefined() {
        let v = ok(
            Value::Array(vec![Value::Undefined, Value::from(1)]),
            &array_of(optional(number())),
        );
        assert_eq!(v, Value::Array(vec![Value::Undefined, Value::Number(1.0)]));
    }

    #[test]
    fn test_coerce_helper() {
        assert_eq!(coerce(&Value::from("7"), &number()).unwrap(), Value::Number(7.0));
        assert_eq!(coerce(&Value::Undefined, &optional(number())).unwrap(), Value::Undefined);
    }

    // ── Properties ───────────────────────────────────────────────────

    proptest! {
        /// Well-formed integer text round-trips to the same number.
        #[test]
        fn integer_text_round_trips(n in -1_000_000_000i64..1_000_000_000i64) {
            let v = ok(n.to_string(), &number());
            prop_assert_eq!(v, Value::Number(n as f64));
        }

        /// Finite floats survive String then Number conversion.
        #[test]
        fn float_text_round_trips(f in -1e12f64..1e12f64) {
            let text = ok(f, &string());
            let back = ok(text, &number());
            prop_assert_eq!(back, Value::Number(f));
        }

        /// Every non-empty string other than "0" and "false" is true.
        #[test]
        fn boolean_rule_holds(s in "[a-zA-Z0-9 ]{1,12}") {
            let expected = !(s == "0" || s.eq_ignore_ascii_case("false"));
            prop_assert_eq!(ok(s, &boolean()), Value::Bool(expected));
        }

        /// Successful array conversion preserves length and order.
        #[test]
        fn array_preserves_length(items in prop::collection::vec(-1000i32..1000, 0..32)) {
            let input: Vec<Value> = items.iter().map(|n| Value::from(n.to_string())).collect();
            let v = ok(input, &array_of(number()));
            let expected: Vec<Value> = items.iter().map(|n| Value::from(*n)).collect();
            prop_assert_eq!(v, Value::Array(expected));
        }

        /// A failing element is always reported at its own index.
        #[test]
        fn array_failure_reports_index(len in 1usize..16, bad in 0usize..16) {
            let bad = bad % len;
            let input: Vec<Value> = (0..len)
                .map(|i| if i == bad { Value::from("oops") } else { Value::from(i as i64) })
                .collect();
            let e = err(input, &array_of(number()));
            prop_assert_eq!(e.element_indices(), vec![bad]);
        }
    }
}
