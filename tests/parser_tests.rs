use pretty_assertions::assert_eq;

use bhai::ast::{ExprKind, InfixOp, StmtKind};
use bhai::lexer::tokenize;
use bhai::parser::Parser;
use bhai::{Error, ErrorKind, Program};

fn parse_src(src: &str) -> Result<Program, Error> {
    let tokens = tokenize(src).expect("lexer should succeed");
    Parser::new(tokens).parse_program()
}

#[test]
fn parses_declaration_and_print() {
    let program = parse_src("hi_bhai rakho x = 42; chaap x; bye_bhai").expect("parser should succeed");

    assert_eq!(program.statements.len(), 2);
    match &program.statements[0].kind {
        StmtKind::Declare { name, .. } => assert_eq!(name, "x"),
        other => panic!("expected declaration, got {other:?}"),
    }
    assert!(matches!(program.statements[1].kind, StmtKind::Print { .. }));
}

#[test]
fn parses_constant_declaration() {
    let program = parse_src("hi_bhai pakka PI = 3.14159; bye_bhai").expect("parser should succeed");

    match &program.statements[0].kind {
        StmtKind::DeclareConst { name, .. } => assert_eq!(name, "PI"),
        other => panic!("expected constant declaration, got {other:?}"),
    }
}

#[test]
fn missing_start_marker_is_a_syntax_error() {
    let err = parse_src("chaap 5; bye_bhai").expect_err("parser should fail");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("hi_bhai"));
}

#[test]
fn missing_end_marker_is_a_syntax_error() {
    let err = parse_src("hi_bhai chaap 5;").expect_err("parser should fail");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("bye_bhai"));
}

#[test]
fn trailing_tokens_after_end_marker_are_rejected() {
    let err = parse_src("hi_bhai bye_bhai chaap 5;").expect_err("parser should fail");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("after 'bye_bhai'"));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let program = parse_src("hi_bhai chaap 1 + 2 * 3; bye_bhai").expect("parser should succeed");

    let StmtKind::Print { value } = &program.statements[0].kind else {
        panic!("expected print statement");
    };
    let ExprKind::Infix { op, rhs, .. } = &value.kind else {
        panic!("expected infix expression");
    };

    assert_eq!(*op, InfixOp::Add);
    assert!(matches!(
        rhs.kind,
        ExprKind::Infix {
            op: InfixOp::Multiply,
            ..
        }
    ));
}

#[test]
fn equal_precedence_associates_left() {
    let program = parse_src("hi_bhai chaap 10 - 3 - 2; bye_bhai").expect("parser should succeed");

    let StmtKind::Print { value } = &program.statements[0].kind else {
        panic!("expected print statement");
    };
    let ExprKind::Infix { lhs, op, rhs } = &value.kind else {
        panic!("expected infix expression");
    };

    // (10 - 3) - 2
    assert_eq!(*op, InfixOp::Subtract);
    assert!(matches!(
        lhs.kind,
        ExprKind::Infix {
            op: InfixOp::Subtract,
            ..
        }
    ));
    assert!(matches!(rhs.kind, ExprKind::Number(n) if n == 2.0));
}

#[test]
fn comparison_binds_tighter_than_logical_and() {
    let program =
        parse_src("hi_bhai chaap 1 < 2 && 3 < 4; bye_bhai").expect("parser should succeed");

    let StmtKind::Print { value } = &program.statements[0].kind else {
        panic!("expected print statement");
    };
    let ExprKind::Infix { lhs, op, rhs } = &value.kind else {
        panic!("expected infix expression");
    };

    assert_eq!(*op, InfixOp::And);
    assert!(matches!(lhs.kind, ExprKind::Infix { op: InfixOp::Lt, .. }));
    assert!(matches!(rhs.kind, ExprKind::Infix { op: InfixOp::Lt, .. }));
}

#[test]
fn parses_if_with_bare_condition_and_else() {
    let program = parse_src(
        "hi_bhai agar x > 5 { chaap \"bada\"; } warna { chaap \"chhota\"; } bye_bhai",
    )
    .expect("parser should succeed");

    let StmtKind::If {
        condition,
        then_branch,
        else_branch,
    } = &program.statements[0].kind
    else {
        panic!("expected if statement");
    };

    assert!(matches!(condition.kind, ExprKind::Infix { op: InfixOp::Gt, .. }));
    assert_eq!(then_branch.len(), 1);
    assert_eq!(else_branch.as_ref().map(Vec::len), Some(1));
}

#[test]
fn parses_while_with_condition_and_body() {
    let program = parse_src("hi_bhai jabtak count < 3 { chaap count; } bye_bhai")
        .expect("parser should succeed");

    let StmtKind::While { condition, body } = &program.statements[0].kind else {
        panic!("expected while statement");
    };

    assert!(matches!(condition.kind, ExprKind::Infix { op: InfixOp::Lt, .. }));
    assert_eq!(body.len(), 1);
}

#[test]
fn parses_function_definition_and_call() {
    let program = parse_src("hi_bhai kaam jod(a, b) { wapas a + b; } chaap jod(1, 2); bye_bhai")
        .expect("parser should succeed");

    let StmtKind::FunctionDef { name, params, body } = &program.statements[0].kind else {
        panic!("expected function definition");
    };
    assert_eq!(name, "jod");
    assert_eq!(params, &vec!["a".to_string(), "b".to_string()]);
    assert_eq!(body.len(), 1);

    let StmtKind::Print { value } = &program.statements[1].kind else {
        panic!("expected print statement");
    };
    let ExprKind::Call { callee, args } = &value.kind else {
        panic!("expected call expression");
    };
    assert!(matches!(&callee.kind, ExprKind::Identifier(n) if n == "jod"));
    assert_eq!(args.len(), 2);
}

#[test]
fn bare_return_forms_parse() {
    let program = parse_src("hi_bhai kaam ruk() { wapas; } kaam thak() { wapas } bye_bhai")
        .expect("parser should succeed");

    for stmt in &program.statements {
        let StmtKind::FunctionDef { body, .. } = &stmt.kind else {
            panic!("expected function definition");
        };
        assert!(matches!(body[0].kind, StmtKind::Return(None)));
    }
}

#[test]
fn unterminated_block_reports_missing_brace() {
    let err = parse_src("hi_bhai agar sahi { chaap 1;").expect_err("parser should fail");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("expected '}'"));
}

#[test]
fn invalid_assignment_target_is_rejected() {
    let err = parse_src("hi_bhai 5 = x; bye_bhai").expect_err("parser should fail");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("invalid assignment target"));
}

#[test]
fn assignment_statement_parses_to_assign_node() {
    let program = parse_src("hi_bhai rakho x = 1; x = 2; bye_bhai").expect("parser should succeed");

    match &program.statements[1].kind {
        StmtKind::Assign { name, .. } => assert_eq!(name, "x"),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn condition_may_be_parenthesized() {
    let program =
        parse_src("hi_bhai agar (1 < 2) { chaap 1; } bye_bhai").expect("parser should succeed");
    assert!(matches!(program.statements[0].kind, StmtKind::If { .. }));
}

#[test]
fn semicolons_are_optional_before_closing_brace() {
    let program = parse_src("hi_bhai agar sahi { chaap 1 } bye_bhai").expect("parser should succeed");
    assert!(matches!(program.statements[0].kind, StmtKind::If { .. }));
}

#[test]
fn parsing_is_deterministic() {
    let src = "hi_bhai rakho n = 5; jabtak n > 0 { chaap n; n = n - 1; } bye_bhai";
    let first = parse_src(src).expect("parser should succeed");
    let second = parse_src(src).expect("parser should succeed");
    assert_eq!(first, second);
}

#[test]
fn error_position_points_at_the_offending_token() {
    let err = parse_src("hi_bhai rakho = 5; bye_bhai").expect_err("parser should fail");
    assert_eq!(err.kind(), ErrorKind::Syntax);
    // `=` sits at column 15: "hi_bhai rakho ="
    assert_eq!(err.position().line, 1);
    assert_eq!(err.position().column, 15);
}
