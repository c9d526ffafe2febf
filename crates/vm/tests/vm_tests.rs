//! Integration tests for the IPPcode23 VM.
//!
//! Organized by instruction group; each test builds a program directly
//! from instructions and checks output, outcome or the failure kind.

use std::io::Cursor;

use ippcode_common::{
    Argument, ErrorKind, FrameKind, Instruction, Opcode, Program, TypeTag, Value, Variable,
};
use ippcode_vm::{run, Io, Machine, Outcome, RuntimeError};

// ============================================================
// Helper functions
// ============================================================

fn var(frame: FrameKind, name: &str) -> Argument {
    Argument::Var(Variable::new(frame, name))
}

fn gf(name: &str) -> Argument {
    var(FrameKind::Global, name)
}

fn lf(name: &str) -> Argument {
    var(FrameKind::Local, name)
}

fn tf(name: &str) -> Argument {
    var(FrameKind::Temporary, name)
}

fn int(n: i64) -> Argument {
    Argument::Const(Value::Int(n))
}

fn boolean(b: bool) -> Argument {
    Argument::Const(Value::Bool(b))
}

fn string(s: &str) -> Argument {
    Argument::Const(Value::Str(s.to_string()))
}

fn nil() -> Argument {
    Argument::Const(Value::Nil)
}

fn label(name: &str) -> Argument {
    Argument::Const(Value::Label(name.to_string()))
}

fn ty(tt: TypeTag) -> Argument {
    Argument::Const(Value::TypeName(tt))
}

fn ins(op: Opcode, args: Vec<Argument>) -> Instruction {
    Instruction::new(op, args)
}

fn defvar(arg: Argument) -> Instruction {
    ins(Opcode::DefVar, vec![arg])
}

fn write(arg: Argument) -> Instruction {
    ins(Opcode::Write, vec![arg])
}

/// Everything a finished run produced.
#[derive(Debug)]
struct Run {
    result: Result<Outcome, RuntimeError>,
    stdout: String,
    stderr: String,
}

fn run_with_input(instructions: Vec<Instruction>, input: &str) -> Run {
    let program = Program::new(instructions).unwrap();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let result = run(
        &program,
        Io::new(Cursor::new(input.as_bytes().to_vec()), &mut stdout, &mut stderr),
    );
    Run {
        result,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
    }
}

fn run_program(instructions: Vec<Instruction>) -> Run {
    run_with_input(instructions, "")
}

/// Run and return stdout, asserting the program finished normally.
fn output(instructions: Vec<Instruction>) -> String {
    let run = run_program(instructions);
    assert_eq!(run.result, Ok(Outcome::Finished), "stderr: {}", run.stderr);
    run.stdout
}

/// Run and return the failure kind, asserting the program failed.
fn failure(instructions: Vec<Instruction>) -> ErrorKind {
    match run_program(instructions).result {
        Err(err) => err.kind(),
        Ok(outcome) => panic!("expected failure, got {outcome:?}"),
    }
}

/// `DEFVAR GF@r; <op> GF@r a b; WRITE GF@r`
fn binary(op: Opcode, a: Argument, b: Argument) -> Vec<Instruction> {
    vec![defvar(gf("r")), ins(op, vec![gf("r"), a, b]), write(gf("r"))]
}

/// `DEFVAR GF@r; <op> GF@r a; WRITE GF@r`
fn unary(op: Opcode, a: Argument) -> Vec<Instruction> {
    vec![defvar(gf("r")), ins(op, vec![gf("r"), a]), write(gf("r"))]
}

// ============================================================
// End-to-end scenarios
// ============================================================

#[test]
fn empty_program_finishes() {
    let run = run_program(vec![]);
    assert_eq!(run.result, Ok(Outcome::Finished));
    assert_eq!(run.stdout, "");
}

#[test]
fn add_and_write() {
    assert_eq!(output(binary(Opcode::Add, int(5), int(3))), "8");
}

#[test]
fn temporary_frame_becomes_local() {
    let out = output(vec![
        ins(Opcode::CreateFrame, vec![]),
        defvar(tf("a")),
        ins(Opcode::Move, vec![tf("a"), string("hi")]),
        ins(Opcode::PushFrame, vec![]),
        write(lf("a")),
    ]);
    assert_eq!(out, "hi");
}

#[test]
fn undefined_label_fails_without_output() {
    let run = run_program(vec![
        ins(Opcode::JumpIfEq, vec![label("nowhere"), int(1), int(1)]),
        write(string("unreachable")),
    ]);
    assert_eq!(run.result.unwrap_err().kind().exit_code(), 52);
    assert_eq!(run.stdout, "");
}

#[test]
fn exit_out_of_range_is_wrong_value() {
    let kind = failure(vec![ins(Opcode::Exit, vec![int(99)])]);
    assert_eq!(kind.exit_code(), 57);
}

#[test]
fn exit_stops_execution() {
    let run = run_program(vec![
        write(string("before")),
        ins(Opcode::Exit, vec![int(42)]),
        write(string("after")),
    ]);
    assert_eq!(run.result, Ok(Outcome::Exited(42)));
    assert_eq!(run.result.unwrap().exit_code(), 42);
    assert_eq!(run.stdout, "before");
}

#[test]
fn output_before_failure_is_kept() {
    let run = run_program(vec![
        write(string("partial")),
        ins(Opcode::PopFrame, vec![]),
    ]);
    assert_eq!(run.result.unwrap_err().kind(), ErrorKind::Frame);
    assert_eq!(run.stdout, "partial");
}

#[test]
fn deep_recursion_does_not_overflow() {
    // count down from 10000 through recursive calls, counting depth on the way
    let out = output(vec![
        defvar(gf("n")),
        defvar(gf("depth")),
        ins(Opcode::Move, vec![gf("n"), int(10_000)]),
        ins(Opcode::Move, vec![gf("depth"), int(0)]),
        ins(Opcode::Call, vec![label("rec")]),
        write(gf("depth")),
        ins(Opcode::Jump, vec![label("end")]),
        ins(Opcode::Label, vec![label("rec")]),
        ins(Opcode::JumpIfEq, vec![label("done"), gf("n"), int(0)]),
        ins(Opcode::Sub, vec![gf("n"), gf("n"), int(1)]),
        ins(Opcode::Add, vec![gf("depth"), gf("depth"), int(1)]),
        ins(Opcode::Call, vec![label("rec")]),
        ins(Opcode::Label, vec![label("done")]),
        ins(Opcode::Return, vec![]),
        ins(Opcode::Label, vec![label("end")]),
    ]);
    assert_eq!(out, "10000");
}

// ============================================================
// Frames and variables
// ============================================================

#[test]
fn move_copies_value() {
    let out = output(vec![
        defvar(gf("a")),
        defvar(gf("b")),
        ins(Opcode::Move, vec![gf("a"), int(7)]),
        ins(Opcode::Move, vec![gf("b"), gf("a")]),
        ins(Opcode::Move, vec![gf("a"), int(1)]),
        write(gf("b")),
    ]);
    assert_eq!(out, "7");
}

#[test]
fn variables_change_type_on_assignment() {
    let out = output(vec![
        defvar(gf("x")),
        ins(Opcode::Move, vec![gf("x"), int(1)]),
        ins(Opcode::Move, vec![gf("x"), string("now text")]),
        write(gf("x")),
    ]);
    assert_eq!(out, "now text");
}

#[test]
fn redeclaration_is_semantic_error() {
    assert_eq!(
        failure(vec![defvar(gf("x")), defvar(gf("x"))]),
        ErrorKind::Semantic
    );
}

#[test]
fn undeclared_variable_read() {
    assert_eq!(failure(vec![write(gf("ghost"))]), ErrorKind::UndeclaredVariable);
}

#[test]
fn undeclared_variable_write() {
    assert_eq!(
        failure(vec![ins(Opcode::Move, vec![gf("ghost"), int(1)])]),
        ErrorKind::UndeclaredVariable
    );
}

#[test]
fn unset_variable_read_is_missing_value() {
    assert_eq!(
        failure(vec![defvar(gf("x")), write(gf("x"))]),
        ErrorKind::MissingValue
    );
}

#[test]
fn missing_local_frame() {
    assert_eq!(failure(vec![defvar(lf("x"))]), ErrorKind::Frame);
    assert_eq!(failure(vec![write(lf("x"))]), ErrorKind::Frame);
}

#[test]
fn missing_temporary_frame() {
    assert_eq!(failure(vec![defvar(tf("x"))]), ErrorKind::Frame);
    assert_eq!(failure(vec![ins(Opcode::PushFrame, vec![])]), ErrorKind::Frame);
}

#[test]
fn pushframe_consumes_temporary() {
    let kind = failure(vec![
        ins(Opcode::CreateFrame, vec![]),
        ins(Opcode::PushFrame, vec![]),
        defvar(tf("x")),
    ]);
    assert_eq!(kind, ErrorKind::Frame);
}

#[test]
fn popframe_restores_temporary() {
    let out = output(vec![
        ins(Opcode::CreateFrame, vec![]),
        defvar(tf("v")),
        ins(Opcode::Move, vec![tf("v"), int(3)]),
        ins(Opcode::PushFrame, vec![]),
        ins(Opcode::Add, vec![lf("v"), lf("v"), int(1)]),
        ins(Opcode::PopFrame, vec![]),
        write(tf("v")),
    ]);
    assert_eq!(out, "4");
}

#[test]
fn createframe_replaces_temporary() {
    let kind = failure(vec![
        ins(Opcode::CreateFrame, vec![]),
        defvar(tf("x")),
        ins(Opcode::CreateFrame, vec![]),
        ins(Opcode::Move, vec![tf("x"), int(1)]),
    ]);
    assert_eq!(kind, ErrorKind::UndeclaredVariable);
}

#[test]
fn nested_local_frames_shadow() {
    let out = output(vec![
        ins(Opcode::CreateFrame, vec![]),
        defvar(tf("x")),
        ins(Opcode::Move, vec![tf("x"), string("outer")]),
        ins(Opcode::PushFrame, vec![]),
        ins(Opcode::CreateFrame, vec![]),
        defvar(tf("x")),
        ins(Opcode::Move, vec![tf("x"), string("inner")]),
        ins(Opcode::PushFrame, vec![]),
        write(lf("x")),
        ins(Opcode::PopFrame, vec![]),
        write(lf("x")),
    ]);
    assert_eq!(out, "innerouter");
}

// ============================================================
// Calls and the operand stack
// ============================================================

#[test]
fn call_and_return() {
    let out = output(vec![
        ins(Opcode::Call, vec![label("f")]),
        write(string("back")),
        ins(Opcode::Jump, vec![label("end")]),
        ins(Opcode::Label, vec![label("f")]),
        write(string("in f;")),
        ins(Opcode::Return, vec![]),
        ins(Opcode::Label, vec![label("end")]),
    ]);
    assert_eq!(out, "in f;back");
}

#[test]
fn return_without_call() {
    assert_eq!(
        failure(vec![ins(Opcode::Return, vec![])]),
        ErrorKind::MissingValue
    );
}

#[test]
fn call_undefined_label() {
    assert_eq!(
        failure(vec![ins(Opcode::Call, vec![label("f")])]),
        ErrorKind::Semantic
    );
}

#[test]
fn pushs_pops_lifo() {
    let out = output(vec![
        defvar(gf("x")),
        ins(Opcode::PushS, vec![int(1)]),
        ins(Opcode::PushS, vec![string("two")]),
        ins(Opcode::PopS, vec![gf("x")]),
        write(gf("x")),
        ins(Opcode::PopS, vec![gf("x")]),
        write(gf("x")),
    ]);
    assert_eq!(out, "two1");
}

#[test]
fn pops_empty_stack() {
    assert_eq!(
        failure(vec![defvar(gf("x")), ins(Opcode::PopS, vec![gf("x")])]),
        ErrorKind::MissingValue
    );
}

#[test]
fn pushs_nil_roundtrips() {
    let out = output(vec![
        defvar(gf("x")),
        defvar(gf("t")),
        ins(Opcode::PushS, vec![nil()]),
        ins(Opcode::PopS, vec![gf("x")]),
        ins(Opcode::Type, vec![gf("t"), gf("x")]),
        write(gf("t")),
    ]);
    assert_eq!(out, "nil");
}

// ============================================================
// Arithmetic
// ============================================================

#[test]
fn arithmetic_operations() {
    assert_eq!(output(binary(Opcode::Sub, int(3), int(10))), "-7");
    assert_eq!(output(binary(Opcode::Mul, int(-4), int(6))), "-24");
    assert_eq!(output(binary(Opcode::IDiv, int(9), int(3))), "3");
}

#[test]
fn idiv_truncates_toward_zero() {
    assert_eq!(output(binary(Opcode::IDiv, int(-7), int(2))), "-3");
    assert_eq!(output(binary(Opcode::IDiv, int(7), int(-2))), "-3");
}

#[test]
fn idiv_by_zero() {
    let run = run_program(binary(Opcode::IDiv, int(1), int(0)));
    assert_eq!(run.result, Err(RuntimeError::DivisionByZero { at: 2 }));
    assert_eq!(run.result.unwrap_err().kind().exit_code(), 57);
}

#[test]
fn arithmetic_wraps() {
    assert_eq!(
        output(binary(Opcode::Add, int(i64::MAX), int(1))),
        i64::MIN.to_string()
    );
}

#[test]
fn arithmetic_rejects_non_int() {
    assert_eq!(
        failure(binary(Opcode::Add, int(1), string("1"))),
        ErrorKind::OperandType
    );
    assert_eq!(
        failure(binary(Opcode::Mul, boolean(true), int(1))),
        ErrorKind::OperandType
    );
    assert_eq!(failure(binary(Opcode::IDiv, nil(), int(1))), ErrorKind::OperandType);
}

#[test]
fn destination_must_be_variable() {
    let kind = failure(vec![ins(Opcode::Add, vec![int(1), int(2), int(3)])]);
    assert_eq!(kind, ErrorKind::Structure);
}

// ============================================================
// Relational and boolean
// ============================================================

#[test]
fn relational_on_each_type() {
    assert_eq!(output(binary(Opcode::Lt, int(1), int(2))), "true");
    assert_eq!(output(binary(Opcode::Gt, int(1), int(2))), "false");
    assert_eq!(output(binary(Opcode::Lt, boolean(false), boolean(true))), "true");
    assert_eq!(output(binary(Opcode::Gt, string("b"), string("abc"))), "true");
    assert_eq!(output(binary(Opcode::Lt, string("a"), string("a"))), "false");
}

#[test]
fn relational_rejects_nil_and_mixed() {
    assert_eq!(failure(binary(Opcode::Lt, nil(), nil())), ErrorKind::OperandType);
    assert_eq!(failure(binary(Opcode::Gt, int(1), nil())), ErrorKind::OperandType);
    assert_eq!(
        failure(binary(Opcode::Lt, int(1), string("1"))),
        ErrorKind::OperandType
    );
}

#[test]
fn eq_rules() {
    assert_eq!(output(binary(Opcode::Eq, int(4), int(4))), "true");
    assert_eq!(output(binary(Opcode::Eq, string("a"), string("b"))), "false");
    assert_eq!(output(binary(Opcode::Eq, nil(), nil())), "true");
    assert_eq!(output(binary(Opcode::Eq, nil(), string(""))), "false");
    assert_eq!(output(binary(Opcode::Eq, boolean(false), nil())), "false");
    assert_eq!(
        failure(binary(Opcode::Eq, int(0), boolean(false))),
        ErrorKind::OperandType
    );
}

#[test]
fn boolean_operations() {
    assert_eq!(output(binary(Opcode::And, boolean(true), boolean(false))), "false");
    assert_eq!(output(binary(Opcode::Or, boolean(true), boolean(false))), "true");
    assert_eq!(output(unary(Opcode::Not, boolean(false))), "true");
    assert_eq!(
        failure(binary(Opcode::And, boolean(true), int(1))),
        ErrorKind::OperandType
    );
    assert_eq!(failure(unary(Opcode::Not, nil())), ErrorKind::OperandType);
}

// ============================================================
// Conversions
// ============================================================

#[test]
fn int2char() {
    assert_eq!(output(unary(Opcode::Int2Char, int(65))), "A");
    assert_eq!(output(unary(Opcode::Int2Char, int(256))), "\u{100}");
    assert_eq!(failure(unary(Opcode::Int2Char, int(257))), ErrorKind::String);
    assert_eq!(failure(unary(Opcode::Int2Char, int(-1))), ErrorKind::String);
    assert_eq!(
        failure(unary(Opcode::Int2Char, string("A"))),
        ErrorKind::OperandType
    );
}

#[test]
fn stri2int() {
    assert_eq!(output(binary(Opcode::Stri2Int, string("abc"), int(1))), "98");
    assert_eq!(output(binary(Opcode::Stri2Int, string("žluť"), int(0))), "382");
    assert_eq!(
        failure(binary(Opcode::Stri2Int, string("abc"), int(3))),
        ErrorKind::String
    );
    assert_eq!(
        failure(binary(Opcode::Stri2Int, string("abc"), int(-1))),
        ErrorKind::String
    );
    assert_eq!(
        failure(binary(Opcode::Stri2Int, int(1), int(0))),
        ErrorKind::OperandType
    );
}

// ============================================================
// Input and output
// ============================================================

fn read_as(tt: TypeTag, input: &str) -> (String, String) {
    let run = run_with_input(
        vec![
            defvar(gf("x")),
            defvar(gf("t")),
            ins(Opcode::Read, vec![gf("x"), ty(tt)]),
            ins(Opcode::Type, vec![gf("t"), gf("x")]),
            write(gf("t")),
            write(string(":")),
            write(gf("x")),
        ],
        input,
    );
    assert_eq!(run.result, Ok(Outcome::Finished));
    let (t, v) = run.stdout.split_once(':').unwrap();
    (t.to_string(), v.to_string())
}

#[test]
fn read_int() {
    assert_eq!(read_as(TypeTag::Int, "42\n"), ("int".into(), "42".into()));
    assert_eq!(read_as(TypeTag::Int, "-5"), ("int".into(), "-5".into()));
    assert_eq!(read_as(TypeTag::Int, "4x2\n"), ("nil".into(), "".into()));
}

#[test]
fn read_bool() {
    assert_eq!(read_as(TypeTag::Bool, "TRUE\n"), ("bool".into(), "true".into()));
    assert_eq!(read_as(TypeTag::Bool, "nope\n"), ("bool".into(), "false".into()));
}

#[test]
fn read_string() {
    assert_eq!(
        read_as(TypeTag::String, "hello world\r\n"),
        ("string".into(), "hello world".into())
    );
}

#[test]
fn read_string_drops_trailing_whitespace() {
    assert_eq!(
        read_as(TypeTag::String, "  padded \t \n"),
        ("string".into(), "  padded".into())
    );
    assert_eq!(read_as(TypeTag::String, "   \n"), ("nil".into(), "".into()));
}

#[test]
fn read_keeps_backslash_sequences() {
    let run = run_with_input(
        vec![
            defvar(gf("s")),
            defvar(gf("n")),
            ins(Opcode::Read, vec![gf("s"), ty(TypeTag::String)]),
            write(gf("s")),
            ins(Opcode::StrLen, vec![gf("n"), gf("s")]),
            write(string(":")),
            write(gf("n")),
        ],
        "C:\\065dir  \n",
    );
    assert_eq!(run.result, Ok(Outcome::Finished));
    assert_eq!(run.stdout, "C:\\065dir:9");
}

#[test]
fn read_at_end_of_input_is_nil() {
    assert_eq!(read_as(TypeTag::String, ""), ("nil".into(), "".into()));
    assert_eq!(read_as(TypeTag::Int, "\n"), ("nil".into(), "".into()));
}

#[test]
fn read_consumes_lines_in_order() {
    let run = run_with_input(
        vec![
            defvar(gf("a")),
            defvar(gf("b")),
            ins(Opcode::Read, vec![gf("a"), ty(TypeTag::Int)]),
            ins(Opcode::Read, vec![gf("b"), ty(TypeTag::Int)]),
            ins(Opcode::Sub, vec![gf("a"), gf("a"), gf("b")]),
            write(gf("a")),
        ],
        "10\n3\n",
    );
    assert_eq!(run.stdout, "7");
}

#[test]
fn read_nil_type_is_wrong_value() {
    let kind = failure(vec![
        defvar(gf("x")),
        ins(Opcode::Read, vec![gf("x"), ty(TypeTag::Nil)]),
    ]);
    assert_eq!(kind, ErrorKind::WrongValue);
}

#[test]
fn read_requires_type_operand() {
    let kind = failure(vec![
        defvar(gf("x")),
        ins(Opcode::Read, vec![gf("x"), string("int")]),
    ]);
    assert_eq!(kind, ErrorKind::Structure);
}

#[test]
fn write_forms() {
    let out = output(vec![
        write(int(-12)),
        write(boolean(true)),
        write(nil()),
        write(string("a b\n")),
    ]);
    assert_eq!(out, "-12truea b\n");
}

#[test]
fn write_prints_backslashes_verbatim() {
    assert_eq!(output(vec![write(string("C:\\065dir"))]), "C:\\065dir");
}

// ============================================================
// Strings
// ============================================================

#[test]
fn concat_and_strlen() {
    assert_eq!(output(binary(Opcode::Concat, string("ab"), string("cd"))), "abcd");
    assert_eq!(output(binary(Opcode::Concat, string(""), string(""))), "");
    assert_eq!(output(unary(Opcode::StrLen, string("žluť"))), "4");
    assert_eq!(output(unary(Opcode::StrLen, string(""))), "0");
    assert_eq!(
        failure(binary(Opcode::Concat, string("a"), nil())),
        ErrorKind::OperandType
    );
    assert_eq!(failure(unary(Opcode::StrLen, int(3))), ErrorKind::OperandType);
}

#[test]
fn getchar() {
    assert_eq!(output(binary(Opcode::GetChar, string("abc"), int(2))), "c");
    assert_eq!(
        failure(binary(Opcode::GetChar, string("abc"), int(3))),
        ErrorKind::String
    );
    assert_eq!(
        failure(binary(Opcode::GetChar, string(""), int(0))),
        ErrorKind::String
    );
}

fn setchar(initial: &str, index: i64, replacement: &str) -> Run {
    run_program(vec![
        defvar(gf("s")),
        ins(Opcode::Move, vec![gf("s"), string(initial)]),
        ins(Opcode::SetChar, vec![gf("s"), int(index), string(replacement)]),
        write(gf("s")),
    ])
}

#[test]
fn setchar_replaces_one_char() {
    assert_eq!(setchar("abc", 1, "XYZ").stdout, "aXc");
    assert_eq!(setchar("žluť", 3, "t").stdout, "žlut");
}

#[test]
fn setchar_errors() {
    let kind = |run: Run| run.result.unwrap_err().kind();
    assert_eq!(kind(setchar("abc", 3, "x")), ErrorKind::String);
    assert_eq!(kind(setchar("abc", -1, "x")), ErrorKind::String);
    assert_eq!(kind(setchar("abc", 0, "")), ErrorKind::String);

    let unset = failure(vec![
        defvar(gf("s")),
        ins(Opcode::SetChar, vec![gf("s"), int(0), string("x")]),
    ]);
    assert_eq!(unset, ErrorKind::MissingValue);

    let wrong = failure(vec![
        defvar(gf("s")),
        ins(Opcode::Move, vec![gf("s"), int(5)]),
        ins(Opcode::SetChar, vec![gf("s"), int(0), string("x")]),
    ]);
    assert_eq!(wrong, ErrorKind::OperandType);
}

// ============================================================
// TYPE
// ============================================================

#[test]
fn type_of_each_value() {
    assert_eq!(output(unary(Opcode::Type, int(1))), "int");
    assert_eq!(output(unary(Opcode::Type, boolean(true))), "bool");
    assert_eq!(output(unary(Opcode::Type, string("x"))), "string");
    assert_eq!(output(unary(Opcode::Type, nil())), "nil");
}

#[test]
fn type_of_unset_variable_is_empty() {
    let out = output(vec![
        defvar(gf("u")),
        defvar(gf("t")),
        ins(Opcode::Type, vec![gf("t"), gf("u")]),
        write(gf("t")),
        ins(Opcode::StrLen, vec![gf("u"), gf("t")]),
        write(gf("u")),
    ]);
    assert_eq!(out, "0");
}

#[test]
fn type_of_undeclared_variable_fails() {
    assert_eq!(
        failure(unary(Opcode::Type, gf("missing"))),
        ErrorKind::UndeclaredVariable
    );
}

// ============================================================
// Control flow
// ============================================================

#[test]
fn jump_skips_instructions() {
    let out = output(vec![
        ins(Opcode::Jump, vec![label("skip")]),
        write(string("no")),
        ins(Opcode::Label, vec![label("skip")]),
        write(string("yes")),
    ]);
    assert_eq!(out, "yes");
}

#[test]
fn forward_and_backward_jumps() {
    // loop: i = 0..3
    let out = output(vec![
        defvar(gf("i")),
        ins(Opcode::Move, vec![gf("i"), int(0)]),
        ins(Opcode::Label, vec![label("loop")]),
        ins(Opcode::JumpIfEq, vec![label("end"), gf("i"), int(3)]),
        write(gf("i")),
        ins(Opcode::Add, vec![gf("i"), gf("i"), int(1)]),
        ins(Opcode::Jump, vec![label("loop")]),
        ins(Opcode::Label, vec![label("end")]),
    ]);
    assert_eq!(out, "012");
}

#[test]
fn conditional_jumps() {
    let program = |op: Opcode, a: Argument, b: Argument| {
        vec![
            ins(op, vec![label("taken"), a, b]),
            write(string("fall")),
            ins(Opcode::Exit, vec![int(0)]),
            ins(Opcode::Label, vec![label("taken")]),
            write(string("jump")),
        ]
    };
    let run_out = |instrs| run_program(instrs).stdout;
    assert_eq!(run_out(program(Opcode::JumpIfEq, int(1), int(1))), "jump");
    assert_eq!(run_out(program(Opcode::JumpIfEq, int(1), int(2))), "fall");
    assert_eq!(run_out(program(Opcode::JumpIfNeq, string("a"), nil())), "jump");
    assert_eq!(run_out(program(Opcode::JumpIfNeq, nil(), nil())), "fall");
}

#[test]
fn conditional_jump_type_mismatch() {
    let kind = failure(vec![
        ins(Opcode::JumpIfEq, vec![label("l"), int(1), string("1")]),
        ins(Opcode::Label, vec![label("l")]),
    ]);
    assert_eq!(kind, ErrorKind::OperandType);
}

#[test]
fn undefined_label_checked_before_operands() {
    let kind = failure(vec![ins(
        Opcode::JumpIfNeq,
        vec![label("nowhere"), int(1), string("1")],
    )]);
    assert_eq!(kind, ErrorKind::Semantic);
}

#[test]
fn exit_codes() {
    assert_eq!(
        run_program(vec![ins(Opcode::Exit, vec![int(0)])]).result,
        Ok(Outcome::Exited(0))
    );
    assert_eq!(
        run_program(vec![ins(Opcode::Exit, vec![int(49)])]).result,
        Ok(Outcome::Exited(49))
    );
    assert_eq!(failure(vec![ins(Opcode::Exit, vec![int(50)])]), ErrorKind::WrongValue);
    assert_eq!(failure(vec![ins(Opcode::Exit, vec![int(-1)])]), ErrorKind::WrongValue);
    assert_eq!(
        run_program(vec![ins(Opcode::Exit, vec![int(300)])]).result,
        Err(RuntimeError::InvalidExitCode { at: 1, code: 300 })
    );
    assert_eq!(
        failure(vec![ins(Opcode::Exit, vec![string("1")])]),
        ErrorKind::OperandType
    );
}

#[test]
fn wrong_arity_is_structural() {
    let run = run_program(vec![ins(Opcode::Add, vec![gf("x"), int(1)])]);
    assert_eq!(
        run.result,
        Err(RuntimeError::ArgumentCount {
            at: 1,
            opcode: Opcode::Add,
            expected: 3,
            found: 2,
        })
    );
}

#[test]
fn label_operand_where_symbol_expected() {
    assert_eq!(failure(vec![write(label("x"))]), ErrorKind::Structure);
    assert_eq!(failure(vec![write(ty(TypeTag::Int))]), ErrorKind::Structure);
}

// ============================================================
// Debugging
// ============================================================

#[test]
fn dprint_goes_to_diagnostics() {
    let run = run_program(vec![
        ins(Opcode::DPrint, vec![string("debug line")]),
        write(string("out")),
    ]);
    assert_eq!(run.stdout, "out");
    assert_eq!(run.stderr, "debug line");
}

#[test]
fn break_dumps_state() {
    let run = run_program(vec![
        defvar(gf("a")),
        ins(Opcode::Move, vec![gf("a"), int(1)]),
        ins(Opcode::PushS, vec![int(2)]),
        ins(Opcode::Break, vec![]),
    ]);
    assert_eq!(run.result, Ok(Outcome::Finished));
    assert_eq!(run.stdout, "");
    assert_eq!(
        run.stderr,
        "BREAK at instruction 4 (4 instructions executed)\n\
         GF: a=int@1\n\
         LF: <undefined>\n\
         TF: <undefined>\n\
         data stack: 1, call stack: 0\n"
    );
}

#[test]
fn error_reports_position() {
    let run = run_program(vec![
        defvar(gf("x")),
        ins(Opcode::Label, vec![label("l")]),
        write(gf("x")),
    ]);
    assert_eq!(
        run.result.unwrap_err().to_string(),
        "variable GF@x has no value at instruction 3"
    );
}

// ============================================================
// Machine inspection
// ============================================================

#[test]
fn executed_counts_every_dispatch() {
    // setup, three passes of LABEL JUMPIFEQ ADD JUMP, then LABEL JUMPIFEQ LABEL
    let program = Program::new(vec![
        defvar(gf("i")),
        ins(Opcode::Move, vec![gf("i"), int(0)]),
        ins(Opcode::Label, vec![label("loop")]),
        ins(Opcode::JumpIfEq, vec![label("end"), gf("i"), int(3)]),
        ins(Opcode::Add, vec![gf("i"), gf("i"), int(1)]),
        ins(Opcode::Jump, vec![label("loop")]),
        ins(Opcode::Label, vec![label("end")]),
    ])
    .unwrap();

    let mut vm = Machine::new(&program, Io::new(std::io::empty(), std::io::sink(), std::io::sink()));
    assert_eq!(vm.executed(), 0);
    assert_eq!(vm.execute(), Ok(Outcome::Finished));
    assert_eq!(vm.executed(), 2 + 3 * 4 + 3);
}

#[test]
fn frames_after_popframe() {
    let program = Program::new(vec![
        defvar(gf("g")),
        ins(Opcode::Move, vec![gf("g"), boolean(true)]),
        ins(Opcode::CreateFrame, vec![]),
        defvar(tf("a")),
        ins(Opcode::PushFrame, vec![]),
        ins(Opcode::Move, vec![lf("a"), string("x y")]),
        ins(Opcode::PopFrame, vec![]),
    ])
    .unwrap();

    let mut vm = Machine::new(&program, Io::new(std::io::empty(), std::io::sink(), std::io::sink()));
    assert_eq!(vm.execute(), Ok(Outcome::Finished));

    let frames = vm.frames();
    assert_eq!(frames.local_depth(), 0);
    assert!(frames.has_temporary());
    assert_eq!(
        frames.to_string(),
        "GF: g=bool@true\nLF: <undefined>\nTF: a=string@x y\n"
    );
}
