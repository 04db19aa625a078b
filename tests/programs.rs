//! End-to-end programs run through the scanner and the interpreter

use bluestack_core::config::Limits;
use bluestack_core::error::{ErrorKind, VmError};
use bluestack_core::execute_with;
use bluestack_core::lexer::Scanner;
use bluestack_core::vm::{run_source, Interpreter, Session, StackManager};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// Helpers
// ============================================================================

struct Outcome {
    result: Result<StackManager, VmError>,
    output: String,
}

fn run_with_input(source: &str, input: &str) -> Outcome {
    run_with_limits(source, input, Limits::default())
}

fn run_with_limits(source: &str, input: &str, limits: Limits) -> Outcome {
    let mut interp = Interpreter::new(input.as_bytes(), Vec::new());
    let result = run_source(source, limits, &mut interp)
        .and_then(|outcome| outcome.result.map(|()| outcome.stacks));
    let output = String::from_utf8(interp.into_output()).expect("utf8 output");
    Outcome { result, output }
}

fn run(source: &str) -> Outcome {
    run_with_input(source, "")
}

fn stack_values(source: &str) -> Vec<i32> {
    let outcome = run(source);
    let stacks = outcome.result.expect("program failed");
    stacks.current_stack().values().to_vec()
}

fn error_kind(source: &str) -> ErrorKind {
    match run(source).result {
        Ok(_) => panic!("expected an error"),
        Err(e) => e.kind,
    }
}

// ============================================================================
// Programs
// ============================================================================

#[test]
fn add_and_print_top() {
    let outcome = run("PUSH 3\nPUSH 4\nADD\nTOP\nHALT\n");
    assert!(outcome.result.is_ok());
    assert_eq!(outcome.output, "7\n");
}

#[test]
fn copy_between_stacks() {
    let source = "INITSTACK foo\nCURRENTSTACK foo\nPUSH 10\n\
                  CURRENTSTACK main\nCOPY foo\nTOP\nHALT\n";
    let outcome = run(source);
    let stacks = outcome.result.expect("program failed");
    assert_eq!(outcome.output, "10\n");
    assert_eq!(stacks.current_stack().name(), "main");
    assert_eq!(stacks.current_stack().values(), &[10]);
}

#[test]
fn runaway_loop_overflows() {
    let outcome = run("loop:\nPUSH 1\nJUMP.>0 loop\nHALT\n");
    let err = outcome.result.err().expect("loop should overflow");
    assert_eq!(err.kind, ErrorKind::StackOverflow);
}

#[test]
fn zero_test_on_nonzero_top_falls_through() {
    let outcome = run("loop:\nPUSH 1\nJUMP.=0 loop\nHALT\n");
    let stacks = outcome.result.expect("program failed");
    assert_eq!(stacks.current_stack().values(), &[1]);
}

#[test]
fn countdown_demo() {
    let outcome = run(include_str!("../demos/countdown.bs"));
    assert!(outcome.result.is_ok());
    assert_eq!(outcome.output, "5\n4\n3\n2\n1\nliftoff\n");
}

#[rstest]
#[case("5\n", "n? 120\n")]
#[case("0\n", "n? 1\n")]
#[case("  3  \n", "n? 6\n")]
fn factorial_demo(#[case] input: &str, #[case] expected: &str) {
    let outcome = run_with_input(include_str!("../demos/factorial.bs"), input);
    assert!(outcome.result.is_ok());
    assert_eq!(outcome.output, expected);
}

#[test]
fn factorial_rejects_bad_input() {
    let outcome = run_with_input(include_str!("../demos/factorial.bs"), "five\n");
    assert_eq!(outcome.output, "n? ");
    assert_eq!(outcome.result.err().map(|e| e.kind), Some(ErrorKind::InvalidInput));
}

// ============================================================================
// Entry point
// ============================================================================

fn execute_source(source: &str, stacks: &mut StackManager) -> (Result<(), VmError>, String) {
    let (program, labels) = Scanner::new(source).scan_program().expect("load");
    let mut out = Vec::new();
    let result = execute_with(&program, &labels, stacks, "".as_bytes(), &mut out);
    (result, String::from_utf8(out).expect("utf8 output"))
}

#[test]
fn execute_with_runs_programs() {
    let mut stacks = StackManager::new();
    let (result, output) = execute_source("PUSH 3\nPUSH 4\nADD\nTOP\nHALT\n", &mut stacks);
    assert!(result.is_ok());
    assert_eq!(output, "7\n");

    let copy = "INITSTACK foo\nCURRENTSTACK foo\nPUSH 10\nCURRENTSTACK main\nCOPY foo\nTOP\n";
    let mut stacks = StackManager::new();
    let (result, output) = execute_source(copy, &mut stacks);
    assert!(result.is_ok());
    assert_eq!(output, "10\n");
    assert_eq!(stacks.current_stack().values(), &[10]);
}

#[test]
fn execute_with_keeps_stacks_across_calls() {
    let mut stacks = StackManager::new();
    let (result, _) = execute_source("INITSTACK keep\nPUSH 5\n", &mut stacks);
    assert!(result.is_ok());

    let (result, output) = execute_source("PUSH 6\nMUL\nTOP\nCURRENTSTACK keep\n", &mut stacks);
    assert!(result.is_ok());
    assert_eq!(output, "30\n");
    assert_eq!(stacks.len(), 2);
    assert_eq!(stacks.current_stack().name(), "keep");
}

#[test]
fn execute_with_aborts_runaway_loop() {
    let mut stacks = StackManager::new();
    let (result, _) = execute_source("loop:\nPUSH 1\nJUMP.>0 loop\nHALT\n", &mut stacks);
    assert_eq!(result.err().map(|e| e.kind), Some(ErrorKind::StackOverflow));
    assert_eq!(stacks.current_stack().len(), 256);
}

// ============================================================================
// Stack properties
// ============================================================================

#[rstest]
#[case(1, 2)]
#[case(-5, 0)]
#[case(i32::MAX, i32::MIN)]
fn swap_twice_is_identity(#[case] below: i32, #[case] top: i32) {
    let source = format!("PUSH {}\nPUSH {}\nSWAP\nSWAP\n", below, top);
    assert_eq!(stack_values(&source), vec![below, top]);
}

#[test]
fn dup2_then_two_pops_is_identity() {
    assert_eq!(stack_values("PUSH 8\nPUSH 9\nDUP2\nPOP\nPOP\n"), vec![8, 9]);
}

#[rstest]
#[case("ADD", 3, 11, 14)]
#[case("MUL", -3, 11, -33)]
fn commutative_ops(#[case] op: &str, #[case] x: i32, #[case] y: i32, #[case] expected: i32) {
    let forward = format!("PUSH {}\nPUSH {}\n{}\n", x, y, op);
    let backward = format!("PUSH {}\nPUSH {}\n{}\n", y, x, op);
    assert_eq!(stack_values(&forward), vec![expected]);
    assert_eq!(stack_values(&backward), vec![expected]);
}

#[rstest]
#[case("SUB", 2)]
#[case("DIV", 1)]
#[case("MOD", 2)]
fn order_sensitive_ops(#[case] op: &str, #[case] expected: i32) {
    let source = format!("PUSH 5\nPUSH 3\n{}\n", op);
    assert_eq!(stack_values(&source), vec![expected]);
}

#[rstest]
#[case("DIV")]
#[case("MOD")]
fn divide_by_zero_drops_operands(#[case] op: &str) {
    let source = format!("PUSH 7\nPUSH 6\nPUSH 0\n{}\n", op);
    let mut interp = Interpreter::new("".as_bytes(), Vec::new());
    let (program, labels) = Scanner::new(&source).scan_program().expect("load");
    let mut stacks = StackManager::new();
    let err = interp
        .execute(&program, &labels, &mut stacks)
        .expect_err("should divide by zero");
    assert_eq!(err.kind, ErrorKind::DivideByZero);
    assert_eq!(stacks.current_stack().values(), &[7]);
}

#[test]
fn deleting_last_stack_leaves_default() {
    let stacks = run("PUSH 1\nDELETESTACK main\n").result.expect("program failed");
    assert_eq!(stacks.len(), 1);
    assert_eq!(stacks.current_stack().name(), "default");
    assert!(stacks.current_stack().is_empty());
}

#[test]
fn copy_grows_destination_only() {
    let source = "INITSTACK src\nCURRENTSTACK src\nPUSH 1\nPUSH 2\n\
                  CURRENTSTACK main\nCOPY src\nCOPY src\n";
    let stacks = run(source).result.expect("program failed");
    let src = stacks.find_by_name("src").expect("src exists");
    assert_eq!(stacks.get(src).map(|s| s.values().to_vec()), Some(vec![1, 2]));
    assert_eq!(stacks.current_stack().values(), &[2, 2]);
}

#[test]
fn shadowed_stack_name_is_unreachable() {
    let source = "INITSTACK dup\nINITSTACK dup\nCURRENTSTACK dup\nPUSH 4\n";
    let stacks = run(source).result.expect("program failed");
    assert_eq!(stacks.current_index(), 1);
    assert_eq!(stacks.get(2).map(|s| s.len()), Some(0));
}

// ============================================================================
// Errors
// ============================================================================

#[rstest]
#[case("POP\n", ErrorKind::StackUnderflow)]
#[case("TOP\n", ErrorKind::StackUnderflow)]
#[case("CURRENTSTACK nope\n", ErrorKind::StackNotFound)]
#[case("INITSTACK e\nCOPY e\n", ErrorKind::EmptySource)]
#[case("JUMP nowhere\n", ErrorKind::LabelNotFound)]
#[case("PUSH 1\nPUSH 0\nMOD\n", ErrorKind::DivideByZero)]
#[case("NOPE\n", ErrorKind::UnknownOpcode)]
fn run_errors(#[case] source: &str, #[case] expected: ErrorKind) {
    assert_eq!(error_kind(source), expected);
}

#[test]
fn output_before_abort_is_kept() {
    let outcome = run("PRINT \"before\\n\"\nPOP\nPRINT \"after\\n\"\n");
    assert_eq!(outcome.output, "before\n");
    assert_eq!(outcome.result.err().map(|e| e.kind), Some(ErrorKind::StackUnderflow));
}

#[test]
fn stack_limit_from_config() {
    let limits = Limits {
        max_stacks: 2,
        ..Limits::default()
    };
    let outcome = run_with_limits("INITSTACK a\nINITSTACK b\n", "", limits);
    assert_eq!(outcome.result.err().map(|e| e.kind), Some(ErrorKind::CapacityExceeded));
}

#[test]
fn stack_capacity_from_config() {
    let limits = Limits {
        stack_capacity: 2,
        ..Limits::default()
    };
    let outcome = run_with_limits("PUSH 1\nDUP\nDUP\n", "", limits);
    assert_eq!(outcome.result.err().map(|e| e.kind), Some(ErrorKind::StackOverflow));
}

// ============================================================================
// Console session
// ============================================================================

#[test]
fn session_keeps_stacks_between_lines() {
    let mut session = Session::default();
    let mut interp = Interpreter::new("".as_bytes(), Vec::new());

    session
        .run_line("INITSTACK side PUSH 2", &mut interp)
        .expect("line 1");
    let err = session
        .run_line("CURRENTSTACK side POP", &mut interp)
        .expect_err("side is empty");
    assert_eq!(err.kind, ErrorKind::StackUnderflow);

    // The failed line still switched stacks before aborting
    session
        .run_line("COPY main TOP", &mut interp)
        .expect("line 3");
    assert_eq!(interp.output(), b"2\n");
    assert_eq!(session.stacks().current_stack().name(), "side");
}

#[test]
fn session_line_with_loop() {
    let mut session = Session::default();
    let mut interp = Interpreter::new("".as_bytes(), Vec::new());
    session
        .run_line("PUSH 3 again: TOP PUSH 1 SUB JUMP.>0 again", &mut interp)
        .expect("loop line");
    assert_eq!(interp.output(), b"3\n2\n1\n");
}
