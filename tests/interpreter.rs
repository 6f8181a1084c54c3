use minicpp::core::compiler::{Compiler, RunOutcome};
use minicpp::core::error::{CoreError, ErrorKind};

fn run(src: &str) -> RunOutcome {
    match Compiler::new().run_source(src) {
        Ok(outcome) => outcome,
        Err(e) => panic!("{e}: {:?}", e.diagnostics()),
    }
}

fn output(src: &str) -> Vec<String> {
    let outcome = run(src);
    assert!(outcome.is_ok(), "runtime error: {:?}", outcome.errors);
    outcome.output
}

fn runtime_error(src: &str) -> String {
    let outcome = run(src);
    assert_eq!(outcome.errors.len(), 1, "expected one runtime error, output {:?}", outcome.output);
    assert_eq!(outcome.errors[0].kind, ErrorKind::Runtime);
    outcome.errors[0].message.clone()
}

#[test]
fn while_counts_to_two() {
    assert_eq!(output("int x = 1; while (x < 3) { printf(x); x = x + 1; }"), vec!["1", "2"]);
}

#[test]
fn function_return_value_printed() {
    assert_eq!(output("int f() { return 2 + 2; } printf(f());"), vec!["4"]);
}

#[test]
fn constructor_sets_field() {
    let src = "class Point { int x; Point(int x){ this.x = x; } } Point p = Point(5); printf(p.x);";
    assert_eq!(output(src), vec!["5"]);
}

#[test]
fn arity_mismatch_never_reaches_the_interpreter() {
    let err = Compiler::new()
        .run_source("int add(int a, int b) { return a + b; } printf(1); printf(add(1));")
        .unwrap_err();
    match err {
        CoreError::Rejected { stage: ErrorKind::Semantic, diagnostics } => {
            assert_eq!(diagnostics[0].message, "'add' expects 2 argument(s), got 1");
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn integer_arithmetic_matches_host() {
    let ops = ["+", "-", "*", "/", "%"];
    let lhs = [-7i64, 0, 3, 13];
    let rhs = [-2i64, 3, 5];
    let mut src = String::new();
    let mut expected = Vec::new();
    for a in lhs {
        for b in rhs {
            for op in ops {
                src.push_str(&format!("printf({a} {op} {b});\n"));
                let v = match op {
                    "+" => a + b,
                    "-" => a - b,
                    "*" => a * b,
                    "/" => a / b,
                    _ => a % b,
                };
                expected.push(v.to_string());
            }
        }
    }
    assert_eq!(output(&src), expected);
}

#[test]
fn float_arithmetic_matches_host() {
    let cases = [(1.5f64, "+", 0.25f64), (-2.25, "*", 4.0), (7.5, "/", 2.5), (7.5, "%", 2.0), (0.1, "+", 0.2)];
    let mut src = String::new();
    let mut expected = Vec::new();
    for (a, op, b) in cases {
        src.push_str(&format!("printf({a:?} {op} {b:?});\n"));
        let v = match op {
            "+" => a + b,
            "*" => a * b,
            "/" => a / b,
            _ => a % b,
        };
        expected.push(format!("{v:?}"));
    }
    assert_eq!(output(&src), expected);
}

#[test]
fn mixed_operands_promote_to_float() {
    assert_eq!(output("printf(1 + 0.5); printf(3 * 2.0); printf(7 / 2);"), vec!["1.5", "6.0", "3"]);
}

#[test]
fn string_concatenation_and_non_numeric_operands() {
    assert_eq!(output("printf(\"mini\" + \"cpp\");"), vec!["minicpp"]);
    assert_eq!(runtime_error("printf(\"a\" * 2);"), "unsupported operand types for '*': string and int");
    assert_eq!(runtime_error("printf(true + 1);"), "unsupported operand types for '+': bool and int");
}

#[test]
fn dangling_else_runs_inner_else() {
    let src = "int a = 1; int b = 0;
               if (a == 1) if (b == 1) printf(\"inner\"); else printf(\"else\");
               a = 0;
               if (a == 1) if (b == 1) printf(\"never\"); else printf(\"never either\");";
    assert_eq!(output(src), vec!["else"]);
}

#[test]
fn inner_scope_mutates_outer_unless_shadowed() {
    let src = "int n = 1; { n = 2; } printf(n); { int n = 9; n = 10; } printf(n);";
    assert_eq!(output(src), vec!["2", "2"]);
}

#[test]
fn closure_resolves_from_declaration_site() {
    let src = "int x = 1;
               int show() { return x; }
               void caller() { int x = 99; printf(show()); }
               caller();";
    assert_eq!(output(src), vec!["1"]);
}

#[test]
fn nested_function_keeps_enclosing_state() {
    let src = "int make() { int c = 10; int bump() { c = c + 1; return c; } bump(); return bump(); }
               printf(make()); printf(make());";
    assert_eq!(output(src), vec!["12", "12"]);
}

#[test]
fn break_leaves_only_the_nearest_loop() {
    let src = "for (int i = 0; i < 2; i++) { for (int j = 0; j < 5; j++) { if (j == 1) break; printf(j); } printf(i); }";
    assert_eq!(output(src), vec!["0", "0", "0", "1"]);
}

#[test]
fn continue_in_for_still_runs_the_update() {
    let src = "for (int i = 0; i < 5; i++) { if (i == 2) continue; if (i == 4) break; printf(i); }";
    assert_eq!(output(src), vec!["0", "1", "3"]);
}

#[test]
fn continue_in_while() {
    let src = "int i = 0; while (i < 4) { i++; if (i % 2 == 0) continue; printf(i); }";
    assert_eq!(output(src), vec!["1", "3"]);
}

#[test]
fn return_from_inside_loop() {
    let src = "int first(int limit) { for (int i = 0; i < 10; i++) { if (i * i > limit) return i; } return -1; }
               printf(first(10)); printf(first(1000));";
    assert_eq!(output(src), vec!["4", "-1"]);
}

#[test]
fn recursion() {
    let src = "int fact(int n) { if (n <= 1) return 1; return n * fact(n - 1); } printf(fact(10));";
    assert_eq!(output(src), vec!["3628800"]);
}

#[test]
fn methods_see_fields_by_bare_name() {
    let src = "class Counter { int n = 0; void inc() { n = n + 1; } int get() { return n; } }
               Counter c = Counter(); c.inc(); c.inc(); printf(c.get());";
    assert_eq!(output(src), vec!["2"]);
}

#[test]
fn field_initializers_run_per_instance() {
    let src = "class Box { int v = 1; } Box a = Box(); Box b = Box(); a.v = 5; printf(b.v); printf(a.v);";
    assert_eq!(output(src), vec!["1", "5"]);
}

#[test]
fn compound_assignment_and_increment_on_fields() {
    let src = "class Acc { int total = 1; } Acc a = Acc(); a.total += 4; a.total *= 2; a.total++; printf(a.total);";
    assert_eq!(output(src), vec!["11"]);
}

#[test]
fn value_printing() {
    let src = "class K { } int f() { return 0; } K k = K();
               printf(k); printf(K); printf(f); printf(null); printf(true); printf(2.0);";
    assert_eq!(output(src), vec!["<K instance>", "<class K>", "<fn f>", "null", "true", "2.0"]);
}

#[test]
fn instances_compare_by_identity() {
    let src = "class B { } B a = B(); B same = a; printf(a == same); printf(a == B()); printf(1 == 1.0);";
    assert_eq!(output(src), vec!["true", "false", "true"]);
}

#[test]
fn logical_operators_yield_bools() {
    // only false and null are falsy; 0 is a true value
    assert_eq!(output("printf(1 && 2); printf(false || null); printf(!0);"), vec!["true", "false", "false"]);
}

#[test]
fn reading_uninitialized_variable_aborts() {
    let outcome = run("int x; printf(\"start\"); printf(x); printf(\"never\");");
    assert_eq!(outcome.output, vec!["start"]);
    assert_eq!(outcome.errors[0].message, "'x' is read before it is initialized");
}

#[test]
fn division_by_zero_aborts() {
    assert_eq!(runtime_error("int z = 0; printf(10 % z);"), "division by zero in '%'");
}

#[test]
fn call_depth_limit_is_configurable() {
    let outcome = Compiler::new()
        .with_max_call_depth(16)
        .run_source("int down(int n) { return down(n + 1); } down(0);")
        .unwrap();
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].message, "maximum call depth (16) exceeded");
}

#[test]
fn method_builds_a_new_instance_of_its_own_class() {
    let src = "class Point { int x; Point(int x) { this.x = x; } Point copy() { return Point(x + 1); } } \
               Point p = Point(5); Point q = p.copy(); printf(q.x);";
    assert_eq!(output(src), vec!["6"]);
}

#[test]
fn recursion_just_under_the_default_limit_completes() {
    let src = "int down(int n) { if (n == 0) { return 0; } return down(n - 1) + 1; } printf(down(250));";
    assert_eq!(output(src), vec!["250"]);
}

#[test]
fn recursion_past_the_default_limit_is_a_runtime_error() {
    let src = "int down(int n) { if (n == 0) { return 0; } return down(n - 1) + 1; } printf(down(300));";
    assert_eq!(runtime_error(src), "maximum call depth (256) exceeded");
}

#[test]
fn deeply_nested_parentheses_evaluate() {
    let src = format!("printf({}1{});", "(".repeat(3000), ")".repeat(3000));
    assert_eq!(output(&src), vec!["1"]);
}
