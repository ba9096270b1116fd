use expect_test::expect;
use mtm_source::Severity;
use mtm_syntax::{parse, UnifiedAst};
use mtm_types::{TypeErrorHandler, TypeErrorKind};

const SHOP: &str = r#"---
target: vue
---
$title: string = 42
$quantity = 3
$price = 9.99
$cart! = []
$user = null
$settings = loadSettings()
$history = fetchHistory()
$onChange! = (event) => update(event)

<template>
  <h1>{{$title}}</h1>
</template>
"#;

fn check(source: &str) -> Vec<mtm_types::TypeErrorInfo> {
    let UnifiedAst::Program(program) = parse(source).unwrap() else {
        panic!("expected modern program");
    };
    TypeErrorHandler::with_source(source).check_program(&program)
}

#[test]
fn reports_component_diagnostics_in_order() {
    let rendered: Vec<_> = check(SHOP).iter().map(ToString::to_string).collect();
    expect![[r#"
        [
            "error[TYPE_CONFLICT]: Type mismatch for '$title': declared 'string' but the value is 'number' (line 4, column 1)",
            "info[INFERENCE_FAILURE]: Could not infer a type for '$user', falling back to 'any' (line 8, column 1)",
            "info[INFERENCE_FAILURE]: Could not infer a type for '$settings', falling back to 'any' (line 9, column 1)",
            "info[INFERENCE_FAILURE]: Could not infer a type for '$history', falling back to 'any' (line 10, column 1)",
            "warning[INVALID_REACTIVE_TYPE]: Reactive variable '$onChange' holds a function (line 11, column 1)",
            "warning[TYPE_CONFLICT]: Mixed numeric types: $quantity are 'number' while $price are 'float' (line 5, column 1)",
        ]
    "#]]
    .assert_debug_eq(&rendered);
}

#[test]
fn quick_fixes_stay_inside_the_source() {
    for info in check(SHOP) {
        for fix in &info.quick_fixes {
            assert!(fix.range.start.index <= fix.range.end.index);
            assert!(fix.range.end.index <= SHOP.len());
            assert!(fix.range.start.line <= fix.range.end.line);
            assert!(fix.apply(SHOP).is_some(), "{} does not apply", fix.description);
        }
    }
}

#[test]
fn only_conflicts_are_errors() {
    let errors: Vec<_> = check(SHOP).into_iter().filter(|info| info.severity == Severity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, TypeErrorKind::TypeConflict);
}
