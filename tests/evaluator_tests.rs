use pretty_assertions::assert_eq;

use bhai::{run, Error, ErrorKind, Position, Value};

fn outputs(src: &str) -> Vec<String> {
    run(src).expect("program should run").outputs
}

fn run_err(src: &str) -> Error {
    run(src).expect_err("program should fail")
}

#[test]
fn prints_a_number_literal() {
    assert_eq!(outputs("hi_bhai chaap 5; bye_bhai"), ["5"]);
}

#[test]
fn declares_and_reads_a_variable() {
    assert_eq!(outputs("hi_bhai rakho x = 42; chaap x; bye_bhai"), ["42"]);
}

#[test]
fn if_runs_its_branch_when_the_condition_holds() {
    let src = "\
        hi_bhai \
        rakho x = 10; \
        agar x > 5 { \
            chaap \"x is greater than 5\"; \
        } \
        bye_bhai";
    assert_eq!(outputs(src), ["x is greater than 5"]);
}

#[test]
fn else_branch_runs_when_condition_is_false() {
    let src = "\
        hi_bhai \
        rakho x = 2; \
        agar x > 5 { chaap \"bada\"; } warna { chaap \"chhota\"; } \
        bye_bhai";
    assert_eq!(outputs(src), ["chhota"]);
}

#[test]
fn while_loop_counts_and_sees_outer_counter() {
    let src = "\
        hi_bhai \
        rakho count = 0; \
        jabtak count < 3 { \
            chaap count; \
            rakho count = count + 1; \
        } \
        bye_bhai";
    assert_eq!(outputs(src), ["0", "1", "2"]);
}

#[test]
fn undefined_variable_is_a_reference_error() {
    let err = run_err("hi_bhai chaap y; bye_bhai");
    assert_eq!(err.kind(), ErrorKind::Reference);
    assert!(err.message().contains("'y'"));
    assert_eq!(err.position(), Position::new(1, 15));
}

#[test]
fn constant_reassignment_is_a_runtime_error() {
    let err = run_err("hi_bhai pakka PI = 3.14159; rakho PI = 1; bye_bhai");
    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert!(err.message().contains("constant 'PI'"));
}

#[test]
fn string_concatenation_joins_strings() {
    assert_eq!(
        outputs("hi_bhai chaap \"namaste \" + \"duniya\"; bye_bhai"),
        ["namaste duniya"]
    );
}

#[test]
fn numbers_render_without_trailing_zeros() {
    assert_eq!(
        outputs("hi_bhai chaap 5.0; chaap 2.50 * 2; chaap 1 / 4; bye_bhai"),
        ["5", "5", "0.25"]
    );
}

#[test]
fn booleans_and_null_render_as_text() {
    assert_eq!(
        outputs("hi_bhai chaap sahi; chaap galat; chaap nalla; bye_bhai"),
        ["true", "false", "nalla"]
    );
}

#[test]
fn zero_empty_string_and_null_are_falsy() {
    assert_eq!(
        outputs("hi_bhai chaap !0; chaap !\"\"; chaap !nalla; chaap !1; chaap !\"x\"; bye_bhai"),
        ["true", "true", "true", "false", "false"]
    );
}

#[test]
fn logical_operators_short_circuit() {
    // The right side would divide by zero; short-circuiting must skip it.
    assert_eq!(
        outputs("hi_bhai chaap galat && 1 / 0 == 0; chaap sahi || 1 / 0 == 0; bye_bhai"),
        ["false", "true"]
    );
}

#[test]
fn logical_results_are_booleans_not_operands() {
    assert_eq!(
        outputs("hi_bhai chaap 2 && 3; chaap 0 || \"haan\"; bye_bhai"),
        ["true", "true"]
    );
}

#[test]
fn unary_minus_negates_numbers() {
    assert_eq!(outputs("hi_bhai chaap -5 + 3; chaap -(2 * 4); bye_bhai"), ["-2", "-8"]);
}

#[test]
fn functions_return_values() {
    let src = "\
        hi_bhai \
        kaam jod(a, b) { \
            wapas a + b; \
        } \
        chaap jod(2, 3); \
        bye_bhai";
    assert_eq!(outputs(src), ["5"]);
}

#[test]
fn function_without_return_yields_null() {
    let src = "\
        hi_bhai \
        kaam shor() { \
            chaap \"arre\"; \
        } \
        chaap shor(); \
        bye_bhai";
    assert_eq!(outputs(src), ["arre", "nalla"]);
}

#[test]
fn recursion_computes_factorial() {
    let src = "\
        hi_bhai \
        kaam factorial(n) { \
            agar n <= 1 { wapas 1; } \
            wapas n * factorial(n - 1); \
        } \
        chaap factorial(6); \
        bye_bhai";
    assert_eq!(outputs(src), ["720"]);
}

#[test]
fn closures_capture_their_defining_scope() {
    let src = "\
        hi_bhai \
        kaam banao() { \
            rakho total = 0; \
            kaam badhao() { \
                rakho total = total + 1; \
                wapas total; \
            } \
            wapas badhao; \
        } \
        rakho counter = banao(); \
        chaap counter(); \
        chaap counter(); \
        bye_bhai";
    assert_eq!(outputs(src), ["1", "2"]);
}

#[test]
fn each_closure_gets_its_own_captured_scope() {
    let src = "\
        hi_bhai \
        kaam banao() { \
            rakho total = 0; \
            kaam badhao() { \
                rakho total = total + 1; \
                wapas total; \
            } \
            wapas badhao; \
        } \
        rakho pehla = banao(); \
        rakho doosra = banao(); \
        chaap pehla(); \
        chaap pehla(); \
        chaap doosra(); \
        bye_bhai";
    assert_eq!(outputs(src), ["1", "2", "1"]);
}

#[test]
fn block_locals_are_invisible_after_the_block() {
    let err = run_err("hi_bhai agar sahi { rakho andar = 1; } chaap andar; bye_bhai");
    assert_eq!(err.kind(), ErrorKind::Reference);
    assert!(err.message().contains("'andar'"));
}

#[test]
fn function_locals_are_invisible_after_the_call() {
    let err = run_err("hi_bhai kaam f() { rakho local = 9; } f(); chaap local; bye_bhai");
    assert_eq!(err.kind(), ErrorKind::Reference);
    assert!(err.message().contains("'local'"));
}

#[test]
fn parameters_shadow_outer_bindings() {
    let src = "\
        hi_bhai \
        rakho x = 1; \
        kaam dikhao(x) { \
            chaap x; \
        } \
        dikhao(99); \
        chaap x; \
        bye_bhai";
    assert_eq!(outputs(src), ["99", "1"]);
}

#[test]
fn break_and_continue_steer_loops() {
    let src = "\
        hi_bhai \
        rakho i = 0; \
        rakho sum = 0; \
        jabtak i < 10 { \
            rakho i = i + 1; \
            agar i == 3 { agla_dekho; } \
            agar i == 6 { bas_karo; } \
            rakho sum = sum + i; \
        } \
        chaap sum; \
        bye_bhai";
    // 1 + 2 + 4 + 5; iteration 3 is skipped and 6 breaks out.
    assert_eq!(outputs(src), ["12"]);
}

#[test]
fn return_unwinds_out_of_a_loop_inside_a_function() {
    let src = "\
        hi_bhai \
        kaam pehla_badaa(seema) { \
            rakho n = 0; \
            jabtak sahi { \
                agar n > seema { wapas n; } \
                rakho n = n + 7; \
            } \
        } \
        chaap pehla_badaa(20); \
        bye_bhai";
    assert_eq!(outputs(src), ["21"]);
}

#[test]
fn nested_loops_break_only_the_inner_one() {
    let src = "\
        hi_bhai \
        rakho i = 0; \
        rakho total = 0; \
        jabtak i < 3 { \
            rakho j = 0; \
            jabtak sahi { \
                agar j == 2 { bas_karo; } \
                rakho j = j + 1; \
                rakho total = total + 1; \
            } \
            rakho i = i + 1; \
        } \
        chaap total; \
        bye_bhai";
    assert_eq!(outputs(src), ["6"]);
}

#[test]
fn empty_program_produces_no_output() {
    let execution = run("hi_bhai bye_bhai").expect("program should run");
    assert!(execution.outputs.is_empty());
    assert_eq!(execution.result, Value::Null);
}

#[test]
fn result_is_the_last_top_level_value() {
    let execution = run("hi_bhai rakho x = 2; x * 21; bye_bhai").expect("program should run");
    assert_eq!(execution.result, Value::Number(42.0));
}

#[test]
fn output_lines_keep_program_order() {
    let src = "\
        hi_bhai \
        chaap \"ek\"; \
        agar sahi { chaap \"do\"; } \
        jabtak galat { chaap \"kabhi nahi\"; } \
        chaap \"teen\"; \
        bye_bhai";
    assert_eq!(outputs(src), ["ek", "do", "teen"]);
}
