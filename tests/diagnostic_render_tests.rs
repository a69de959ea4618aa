mod support;

use ember::diagnostics::render_report;
use ember::driver::{EmberError, compile_source};

use support::eval_err;

fn codes(source: &str) -> Vec<String> {
    match compile_source(source) {
        Ok(_) => Vec::new(),
        Err(diagnostics) => diagnostics
            .iter()
            .filter_map(|diag| diag.code.clone())
            .collect(),
    }
}

#[test]
fn static_errors_use_phase_codes() {
    assert_eq!(codes("let a = ;"), vec!["E0002"]);
    assert_eq!(codes("print(missing);"), vec!["E0102"]);
    assert_eq!(codes("const a = 1; a = 2;"), vec!["E0103"]);
    assert_eq!(codes("break;"), vec!["E0104"]);
    assert_eq!(codes("return this;"), vec!["E0106"]);
    assert_eq!(codes("let a = 1; let a = 2;"), vec!["E0101"]);
}

#[test]
fn nesting_limit_stops_before_later_phases() {
    let deep = format!("return {}1{};", "(".repeat(100_000), ")".repeat(100_000));
    assert_eq!(codes(&deep), vec!["E0009"]);

    let shallow = format!("return {}1{};", "(".repeat(200), ")".repeat(200));
    assert_eq!(support::eval(&shallow), "1");
}

#[test]
fn resolver_reports_every_error() {
    assert_eq!(codes("x; y; continue;"), vec!["E0102", "E0102", "E0105"]);
}

#[test]
fn undefined_symbol_render_points_at_source() {
    let source = "let a = 1;\nprint(b);";
    let err = eval_err(source);
    assert!(matches!(err, EmberError::Static(_)));

    let rendered = err.render(Some(source), Some("main.em"));
    assert!(rendered.contains("[E0102]"));
    assert!(rendered.contains("main.em:2:7"));
    assert!(rendered.contains("2 | print(b);"));
    assert!(rendered.contains("^"));
}

#[test]
fn runtime_fault_render_includes_stack_trace() {
    let source = "fn inner() {\n  return null.x;\n}\ninner();";
    let err = eval_err(source);
    let rendered = err.render(Some(source), Some("main.em"));

    assert!(rendered.contains("[E1002]"));
    assert!(rendered.contains("Stack trace:"));
    assert!(rendered.contains("  at inner (line 2)"));
    assert!(rendered.contains("  at <main> (line 4)"));
}

#[test]
fn report_is_capped() {
    let diagnostics = match compile_source("a; b; c; d;") {
        Err(diagnostics) => diagnostics,
        Ok(_) => panic!("expected errors"),
    };
    let rendered = render_report(&diagnostics, None, Some("t.em"), 2);
    assert_eq!(rendered.matches("[E0102]").count(), 2);
    assert!(rendered.contains("... and 2 more errors not shown"));
}
