use minicpp::core::compiler::Compiler;
use minicpp::core::error::{Diagnostic, ErrorKind};
use minicpp::core::symbols::SymbolKind;

fn check(src: &str) -> Vec<Diagnostic> {
    let compiler = Compiler::new();
    let (program, parse_errors) = compiler.parse(src);
    assert!(parse_errors.is_empty(), "unexpected parse errors: {parse_errors:?}");
    let (_, diags) = compiler.analyze(&program);
    assert!(diags.iter().all(|d| d.kind == ErrorKind::Semantic));
    diags
}

fn messages(src: &str) -> Vec<String> {
    check(src).into_iter().map(|d| d.message).collect()
}

#[test]
fn block_variable_not_visible_after_block() {
    let errors = messages("{ int inner = 1; } printf(inner);");
    assert_eq!(errors, vec!["'inner' is not declared"]);
}

#[test]
fn outer_variable_visible_and_assignable_inside() {
    assert!(messages("int n = 1; { n = n + 1; { n += 2; } }").is_empty());
}

#[test]
fn shadowing_in_nested_scope_but_not_same_scope() {
    assert!(messages("int v = 1; void f() { int v = 2; { string v = \"s\"; } }").is_empty());
    let errors = messages("void f(int a) { int a = 2; }");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("'a' is already declared in this scope"));
}

#[test]
fn type_mismatch_in_initializer_and_assignment() {
    let errors = messages("int a = \"text\"; bool b = true; b = 3;");
    assert_eq!(
        errors,
        vec![
            "cannot initialize 'a' of type int with a value of type string",
            "cannot assign a value of type int to 'b' of type bool",
        ]
    );
}

#[test]
fn int_does_not_widen_to_float() {
    let errors = messages("float f = 1;");
    assert_eq!(errors.len(), 1);
}

#[test]
fn null_fits_class_and_string() {
    assert!(messages("class Node { int v; } Node n = null; string s = null;").is_empty());
}

#[test]
fn arity_mismatch_reports_counts() {
    let diags = check("int add(int a, int b) { return a + b; }\nprintf(add(1));");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "'add' expects 2 argument(s), got 1");
    assert_eq!(diags[0].span.line, 2);
}

#[test]
fn return_checks() {
    let errors = messages(
        "return 1;
         int f() { return; }
         void g() { return 1; }
         int h() { return true; }",
    );
    assert_eq!(
        errors,
        vec![
            "'return' used outside a function",
            "'return' without a value in 'f', which returns int",
            "void function 'g' cannot return a value",
            "'h' must return int, got bool",
        ]
    );
}

#[test]
fn continue_in_for_and_while_is_fine() {
    assert!(messages("for (int i = 0; i < 3; i++) { if (i == 1) continue; } while (false) { continue; }").is_empty());
    assert_eq!(messages("continue;"), vec!["'continue' used outside a loop"]);
}

#[test]
fn this_only_inside_class() {
    assert_eq!(messages("printf(this);"), vec!["'this' used outside of a class"]);
}

#[test]
fn member_access_is_checked() {
    let errors = messages("class P { int x; } P p = P(); printf(p.y); int n = 1; printf(n.x);");
    assert_eq!(
        errors,
        vec!["class 'P' has no member 'y'", "cannot access member 'x' on a value of type int"]
    );
}

#[test]
fn constructor_arguments_are_checked() {
    let errors = messages("class P { int x; P(int x) { this.x = x; } } P a = P(); P b = P(\"s\");");
    assert_eq!(errors, vec!["'P' expects 1 argument(s), got 0", "argument 1 of 'P' must be int, got string"]);
}

#[test]
fn methods_may_refer_to_later_members() {
    let src = "class C { int twice() { return once() * 2; } int once() { return base; } int base = 4; }";
    assert!(messages(src).is_empty());
}

#[test]
fn duplicate_members_and_constructors() {
    let errors = messages("class C { int a; float a; C() {} C(int x) {} }");
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert!(errors[0].starts_with("'a' is already declared"));
    assert_eq!(errors[1], "class 'C' already has a constructor");
}

#[test]
fn statements_in_class_body_are_rejected() {
    assert_eq!(messages("class C { printf(1); }"), vec!["only declarations may appear in the body of class 'C'"]);
}

#[test]
fn calling_a_non_function() {
    assert_eq!(messages("int x = 1; x();"), vec!["'x' is not callable (it has type int)"]);
}

#[test]
fn cannot_assign_to_a_function() {
    assert_eq!(messages("int f() { return 1; } f = 2;"), vec!["cannot assign to function 'f'"]);
}

#[test]
fn size_requires_string() {
    assert!(messages("string s = \"abc\"; size(s);").is_empty());
    assert_eq!(messages("size(3);"), vec!["size() expects a string, got int"]);
}

#[test]
fn increment_requires_number() {
    assert_eq!(messages("bool b = true; b++;"), vec!["operand of '++' must be int or float, got bool"]);
}

#[test]
fn errors_do_not_stop_the_traversal() {
    // each mistake reported once, siblings still visited
    let errors = messages("int a = x; int b = y; printf(a + b);");
    assert_eq!(errors, vec!["'x' is not declared", "'y' is not declared"]);
}

#[test]
fn symbol_tree_records_scopes() {
    let compiler = Compiler::new();
    let program = compiler.parse_source("int g; int f(int p) { { int local; } return p; } class K { int field; }").unwrap();
    let (table, diags) = compiler.analyze(&program);
    assert!(diags.is_empty());
    let labels: Vec<&str> = table.scopes().iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["global", "function f", "block", "class K"]);
    let global = table.scope(0);
    assert_eq!(global.get("f").map(|s| s.kind), Some(SymbolKind::Function));
    assert_eq!(table.scope(1).get("p").map(|s| s.kind), Some(SymbolKind::Parameter));
    assert_eq!(table.scope(3).get("field").map(|s| s.kind), Some(SymbolKind::Field));
    let dump = table.dump();
    assert!(dump.starts_with("scope #0 (global)\n"));
}

#[test]
fn class_name_inside_its_own_methods_is_the_class() {
    let src = "class Point { int x; Point(int x) { this.x = x; } Point copy() { return Point(x + 1); } } \
               Point p = Point(5); Point q = p.copy();";
    assert!(messages(src).is_empty());
}

#[test]
fn call_in_class_body_is_not_a_constructor() {
    let errors = messages("class A { f(); }");
    assert_eq!(errors, vec!["only declarations may appear in the body of class 'A'"]);
}
