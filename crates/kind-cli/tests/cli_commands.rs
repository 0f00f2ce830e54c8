//! Integration test: run the `check` and `describe` handlers against the
//! fixture files and inspect their output.

use std::path::PathBuf;

use kind_cli::check::{self, CheckArgs, CheckSummary, ExtraFieldsArg};
use kind_cli::describe::{self, DescribeArgs};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn check_args(schema: &str, input: &str) -> CheckArgs {
    CheckArgs {
        schema: fixture(schema),
        input: fixture(input),
        extra_fields: None,
        opaque_custom: false,
    }
}

#[test]
fn test_check_reports_each_record() {
    let mut out = Vec::new();
    let err = check::run(&check_args("rectangle.yaml", "rectangles.json"), &mut out).unwrap_err();
    assert_eq!(err.to_string(), "1 of 3 records failed");

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\"width\": 5"), "{text}");
    assert!(text.contains("\"label\": \"7\""), "{text}");
    assert!(text.contains("record 2: error: invalid value for field 'width'"), "{text}");
}

#[test]
fn test_check_custom_types_need_opt_in() {
    let mut out = Vec::new();
    let err = check::run(&check_args("order.yaml", "order.json"), &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("unknown type 'OrderId'"), "{err:#}");

    let mut args = check_args("order.yaml", "order.json");
    args.opaque_custom = true;
    let mut out = Vec::new();
    let summary = check::run(&args, &mut out).unwrap();
    assert_eq!(summary, CheckSummary { built: 1, failed: 0 });
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\"quantity\": 2"), "{text}");
    assert!(!text.contains("coupon"), "{text}");
}

#[test]
fn test_check_extra_fields_override() {
    let mut args = check_args("order.yaml", "order.json");
    args.opaque_custom = true;
    args.extra_fields = Some(ExtraFieldsArg::Reject);
    let mut out = Vec::new();
    assert!(check::run(&args, &mut out).is_err());
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("field 'coupon' is not declared by 'Order'"), "{text}");
}

#[test]
fn test_check_missing_input() {
    let mut out = Vec::new();
    let err = check::run(&check_args("rectangle.yaml", "missing.json"), &mut out).unwrap_err();
    assert!(err.to_string().contains("failed to read input"));
}

#[test]
fn test_describe() {
    let args = DescribeArgs {
        schema: fixture("rectangle.yaml"),
        opaque_custom: false,
    };
    let mut out = Vec::new();
    describe::run(&args, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Rectangle (extra fields: reject)\n  fields:\n    width   Number\n    height  Number\n    label   Optional<String>\n"
    );
}
