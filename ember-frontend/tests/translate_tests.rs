//! End-to-end tests: typed AST in, IR text out

use ember_codegen::EmitterConfig;
use ember_common::{CompilerError, NumberType, SourceLocation};
use ember_frontend::{
    Expression, Frontend, Function, GlobalDecl, Program, Statement, StatementKind,
};
use ember_ir::{ArithmeticOp, CompareOp, LogicalOp, Module};
use pretty_assertions::assert_eq;

fn config() -> EmitterConfig {
    EmitterConfig {
        module_id: "test".to_string(),
        emit_attributes: false,
        ..EmitterConfig::default()
    }
}

fn program(globals: Vec<GlobalDecl>, body: Vec<Statement>) -> Program {
    Program {
        globals,
        functions: vec![Function {
            name: "main".to_string(),
            body,
            location: None,
        }],
    }
}

fn global(name: &str, ty: NumberType, init: Option<i64>) -> GlobalDecl {
    GlobalDecl {
        name: name.to_string(),
        ty,
        init,
        location: None,
    }
}

fn declare(name: &str, ty: NumberType, init: Option<Expression>) -> Statement {
    Statement::new(StatementKind::Declare {
        name: name.to_string(),
        ty,
        init,
    })
}

fn assign(name: &str, value: Expression) -> Statement {
    Statement::new(StatementKind::Assign {
        name: name.to_string(),
        value,
    })
}

fn print(value: Expression) -> Statement {
    Statement::new(StatementKind::Print { value })
}

fn block(body: Vec<Statement>) -> Statement {
    Statement::new(StatementKind::Block { body })
}

fn lit(value: i64, ty: NumberType) -> Expression {
    Expression::literal(value, ty)
}

fn var(name: &str, ty: NumberType) -> Expression {
    Expression::identifier(name, ty)
}

fn compile(program: &Program) -> Result<Module, CompilerError> {
    Frontend::compile(program, config())
}

fn body_lines(module: &Module) -> Vec<String> {
    module.functions[0]
        .instructions
        .iter()
        .map(|inst| inst.to_string())
        .collect()
}

const PRINT_SIGNED: &str =
    "@printf(i8* getelementptr inbounds ([6 x i8], [6 x i8]* @print_signed_fstring, i32 0, i32 0)";
const PRINT_UNSIGNED: &str =
    "@printf(i8* getelementptr inbounds ([6 x i8], [6 x i8]* @print_unsigned_fstring, i32 0, i32 0)";

#[test]
fn test_global_store_add_reload() {
    let program = program(
        vec![global("x", NumberType::I32, None)],
        vec![
            assign("x", lit(5, NumberType::I32)),
            assign(
                "x",
                Expression::binary(
                    ArithmeticOp::Add,
                    var("x", NumberType::I32),
                    lit(3, NumberType::I32),
                    NumberType::I32,
                ),
            ),
            print(var("x", NumberType::I32)),
        ],
    );

    let module = compile(&program).unwrap();

    assert_eq!(
        body_lines(&module),
        vec![
            "store i32 5, i32* @x".to_string(),
            "%1 = load i32, i32* @x".to_string(),
            "%2 = add nsw i32 %1, 3".to_string(),
            "store i32 %2, i32* @x".to_string(),
            "%3 = load i32, i32* @x".to_string(),
            "%4 = sext i32 %3 to i64".to_string(),
            format!("%5 = call i32 (i8*, ...) {}, i64 %4)", PRINT_SIGNED),
            "ret i32 0".to_string(),
        ]
    );
    let text = module.render();
    assert!(text.contains("@x = global i32 0\n"));
    assert!(text.contains("@print_signed_fstring = "));
}

#[test]
fn test_initialized_global_add_and_reload() {
    let program = program(
        vec![global("x", NumberType::I32, Some(5))],
        vec![
            assign(
                "x",
                Expression::binary(
                    ArithmeticOp::Add,
                    var("x", NumberType::I32),
                    lit(3, NumberType::I32),
                    NumberType::I32,
                ),
            ),
            Statement::new(StatementKind::Return {
                value: Some(var("x", NumberType::I32)),
            }),
        ],
    );

    let module = compile(&program).unwrap();
    let body = body_lines(&module);

    assert_eq!(
        body,
        vec![
            "%1 = load i32, i32* @x".to_string(),
            "%2 = add nsw i32 %1, 3".to_string(),
            "store i32 %2, i32* @x".to_string(),
            "%3 = load i32, i32* @x".to_string(),
            "ret i32 %3".to_string(),
        ]
    );
    assert!(!body.iter().any(|line| line.starts_with("store i32 5")));
    assert!(module.render().contains("@x = global i32 5\n"));
}

#[test]
fn test_if_else_branches() {
    let program = program(
        vec![],
        vec![
            declare("n", NumberType::I32, Some(lit(3, NumberType::I32))),
            Statement::new(StatementKind::If {
                condition: Expression::compare(
                    CompareOp::Lt,
                    var("n", NumberType::I32),
                    lit(5, NumberType::I32),
                ),
                then_body: vec![print(var("n", NumberType::I32))],
                else_body: Some(vec![print(lit(0, NumberType::I32))]),
            }),
        ],
    );

    let module = compile(&program).unwrap();

    assert_eq!(
        body_lines(&module),
        vec![
            "; frame: 4 bytes, align 4, i32 n@0".to_string(),
            "%1 = alloca i32, align 4".to_string(),
            "store i32 3, i32* %1".to_string(),
            "%2 = load i32, i32* %1".to_string(),
            "%3 = icmp slt i32 %2, 5".to_string(),
            "br i1 %3, label %L1, label %L0".to_string(),
            "L1:".to_string(),
            "%4 = load i32, i32* %1".to_string(),
            "%5 = sext i32 %4 to i64".to_string(),
            format!("%6 = call i32 (i8*, ...) {}, i64 %5)", PRINT_SIGNED),
            "br label %L2".to_string(),
            "L0:".to_string(),
            format!("%7 = call i32 (i8*, ...) {}, i64 0)", PRINT_SIGNED),
            "br label %L2".to_string(),
            "L2:".to_string(),
            "ret i32 0".to_string(),
        ]
    );
}

#[test]
fn test_while_loop_counts() {
    let program = program(
        vec![],
        vec![
            declare("i", NumberType::U8, Some(lit(0, NumberType::U8))),
            Statement::new(StatementKind::While {
                condition: Expression::compare(
                    CompareOp::Lt,
                    var("i", NumberType::U8),
                    lit(3, NumberType::U8),
                ),
                body: vec![
                    print(var("i", NumberType::U8)),
                    assign(
                        "i",
                        Expression::binary(
                            ArithmeticOp::Add,
                            var("i", NumberType::U8),
                            lit(1, NumberType::U8),
                            NumberType::U8,
                        ),
                    ),
                ],
                step: None,
                else_body: None,
            }),
        ],
    );

    let module = compile(&program).unwrap();

    assert_eq!(
        body_lines(&module),
        vec![
            "; frame: 1 bytes, align 1, u8 i@0".to_string(),
            "%1 = alloca i8, align 1".to_string(),
            "store i8 0, i8* %1".to_string(),
            "br label %L0".to_string(),
            "L0:".to_string(),
            "%2 = load i8, i8* %1".to_string(),
            "%3 = icmp ult i8 %2, 3".to_string(),
            "br i1 %3, label %L2, label %L1".to_string(),
            "L2:".to_string(),
            "%4 = load i8, i8* %1".to_string(),
            "%5 = zext i8 %4 to i64".to_string(),
            format!("%6 = call i32 (i8*, ...) {}, i64 %5)", PRINT_UNSIGNED),
            "%7 = load i8, i8* %1".to_string(),
            "%8 = add i8 %7, 1".to_string(),
            "store i8 %8, i8* %1".to_string(),
            "br label %L0".to_string(),
            "L1:".to_string(),
            "ret i32 0".to_string(),
        ]
    );
}

#[test]
fn test_while_step_and_else_order() {
    let program = program(
        vec![global("g", NumberType::I64, Some(0))],
        vec![Statement::new(StatementKind::While {
            condition: Expression::compare(
                CompareOp::Ne,
                var("g", NumberType::I64),
                lit(2, NumberType::I64),
            ),
            body: vec![],
            step: Some(vec![assign(
                "g",
                Expression::binary(
                    ArithmeticOp::Add,
                    var("g", NumberType::I64),
                    lit(1, NumberType::I64),
                    NumberType::I64,
                ),
            )]),
            else_body: Some(vec![print(lit(7, NumberType::I64))]),
        })],
    );

    let lines = body_lines(&compile(&program).unwrap());

    let step = lines.iter().position(|l| l.starts_with("store i64")).unwrap();
    let back_edge = lines.iter().rposition(|l| l == "br label %L0").unwrap();
    let exit = lines.iter().position(|l| l == "L1:").unwrap();
    let else_print = lines.iter().position(|l| l.ends_with("i64 7)")).unwrap();
    assert!(step < back_edge && back_edge < exit && exit < else_print);
}

#[test]
fn test_shadowing_in_nested_block() {
    let program = program(
        vec![],
        vec![
            declare("x", NumberType::I32, Some(lit(1, NumberType::I32))),
            block(vec![
                declare("x", NumberType::I8, Some(lit(2, NumberType::I8))),
                print(var("x", NumberType::I8)),
            ]),
            print(var("x", NumberType::I32)),
        ],
    );

    let lines = body_lines(&compile(&program).unwrap());

    assert_eq!(lines[1], "%1 = alloca i32, align 4");
    assert_eq!(lines[2], "%2 = alloca i8, align 1");
    assert_eq!(
        lines[3..].to_vec(),
        vec![
            "store i32 1, i32* %1".to_string(),
            "store i8 2, i8* %2".to_string(),
            "%3 = load i8, i8* %2".to_string(),
            "%4 = sext i8 %3 to i64".to_string(),
            format!("%5 = call i32 (i8*, ...) {}, i64 %4)", PRINT_SIGNED),
            "%6 = load i32, i32* %1".to_string(),
            "%7 = sext i32 %6 to i64".to_string(),
            format!("%8 = call i32 (i8*, ...) {}, i64 %7)", PRINT_SIGNED),
            "ret i32 0".to_string(),
        ]
    );
}

#[test]
fn test_local_shadows_global() {
    let program = program(
        vec![global("v", NumberType::I16, Some(4))],
        vec![
            declare("v", NumberType::I16, Some(lit(9, NumberType::I16))),
            print(var("v", NumberType::I16)),
        ],
    );

    let lines = body_lines(&compile(&program).unwrap());

    assert!(lines.contains(&"%2 = load i16, i16* %1".to_string()));
    assert!(!lines.iter().any(|l| l.contains("@v")));
}

#[test]
fn test_operands_widen_to_node_type() {
    let program = program(
        vec![global("small", NumberType::I8, Some(-2))],
        vec![print(Expression::binary(
            ArithmeticOp::Mul,
            var("small", NumberType::I8),
            lit(1000, NumberType::I32),
            NumberType::I32,
        ))],
    );

    let lines = body_lines(&compile(&program).unwrap());

    assert_eq!(lines[0], "%1 = load i8, i8* @small");
    assert_eq!(lines[1], "%2 = sext i8 %1 to i32");
    assert_eq!(lines[2], "%3 = mul nsw i32 %2, 1000");
}

#[test]
fn test_comparison_uses_common_type() {
    let program = program(
        vec![global("a", NumberType::U8, None), global("b", NumberType::U32, None)],
        vec![print(Expression::compare(
            CompareOp::Ge,
            var("a", NumberType::U8),
            var("b", NumberType::U32),
        ))],
    );

    let lines = body_lines(&compile(&program).unwrap());

    assert_eq!(lines[0], "%1 = load i8, i8* @a");
    assert_eq!(lines[1], "%2 = zext i8 %1 to i32");
    assert_eq!(lines[2], "%3 = load i32, i32* @b");
    assert_eq!(lines[3], "%4 = icmp uge i32 %2, %3");
    assert!(lines[4].starts_with("%5 = select i1 %4"));
}

#[test]
fn test_non_bool_condition_tests_non_zero() {
    let program = program(
        vec![global("flag", NumberType::I32, Some(1))],
        vec![Statement::new(StatementKind::If {
            condition: var("flag", NumberType::I32),
            then_body: vec![print(lit(1, NumberType::I32))],
            else_body: None,
        })],
    );

    let lines = body_lines(&compile(&program).unwrap());

    assert_eq!(lines[0], "%1 = load i32, i32* @flag");
    assert_eq!(lines[1], "%2 = icmp ne i32 %1, 0");
    assert_eq!(lines[2], "br i1 %2, label %L1, label %L0");
    assert_eq!(lines[3], "L1:");
    assert_eq!(lines[5], "br label %L0");
    assert_eq!(lines[6], "L0:");
}

#[test]
fn test_logical_condition_branches_on_bool() {
    let program = program(
        vec![global("a", NumberType::I32, None)],
        vec![Statement::new(StatementKind::If {
            condition: Expression::logical(
                LogicalOp::And,
                Expression::compare(CompareOp::Gt, var("a", NumberType::I32), lit(0, NumberType::I32)),
                Expression::compare(CompareOp::Lt, var("a", NumberType::I32), lit(9, NumberType::I32)),
            ),
            then_body: vec![],
            else_body: None,
        })],
    );

    let lines = body_lines(&compile(&program).unwrap());

    assert_eq!(lines[4], "%5 = and i1 %2, %4");
    assert_eq!(lines[5], "br i1 %5, label %L1, label %L0");
    assert_eq!(lines[6], "L1:");
}

#[test]
fn test_return_ends_function() {
    let program = program(
        vec![],
        vec![Statement::new(StatementKind::Return {
            value: Some(lit(3, NumberType::I8)),
        })],
    );

    let lines = body_lines(&compile(&program).unwrap());

    assert_eq!(lines, vec!["ret i32 3"]);
}

#[test]
fn test_return_inside_branch_keeps_ir_well_formed() {
    let program = program(
        vec![],
        vec![Statement::new(StatementKind::If {
            condition: lit(1, NumberType::Bool),
            then_body: vec![Statement::new(StatementKind::Return { value: None })],
            else_body: Some(vec![print(lit(2, NumberType::U16))]),
        })],
    );

    let lines = body_lines(&compile(&program).unwrap());

    assert_eq!(lines[0], "br i1 true, label %L1, label %L0");
    assert_eq!(lines[1], "L1:");
    assert_eq!(lines[2], "ret i32 0");
    assert_eq!(lines[3], "L0:");
    assert_eq!(lines.last().map(String::as_str), Some("ret i32 0"));
}

#[test]
fn test_undeclared_identifier_reports_location() {
    let here = SourceLocation::new("main.c", 3, 11);
    let program = program(vec![], vec![print(var("y", NumberType::I32).at(here.clone()))]);

    let err = compile(&program).unwrap_err();

    assert!(matches!(err, CompilerError::ScopeError { .. }));
    assert_eq!(err.location(), Some(&here));
    assert!(err.to_string().contains("undeclared identifier 'y'"));
}

#[test]
fn test_statement_location_used_when_expression_has_none() {
    let here = SourceLocation::new("main.c", 8, 1);
    let program = program(vec![], vec![assign("missing", lit(1, NumberType::I32)).at(here.clone())]);

    let err = compile(&program).unwrap_err();

    assert_eq!(err.location(), Some(&here));
}

#[test]
fn test_redeclaration_in_same_scope() {
    let here = SourceLocation::new("main.c", 5, 5);
    let program = program(
        vec![],
        vec![
            declare("x", NumberType::I32, None),
            declare("x", NumberType::I64, None).at(here.clone()),
        ],
    );

    let err = compile(&program).unwrap_err();

    assert!(matches!(err, CompilerError::ScopeError { .. }));
    assert_eq!(err.location(), Some(&here));
    assert!(err.to_string().contains("redeclaration of 'x'"));
}

#[test]
fn test_block_local_is_gone_after_block() {
    let program = program(
        vec![],
        vec![
            block(vec![declare("t", NumberType::I32, None)]),
            print(var("t", NumberType::I32)),
        ],
    );

    assert!(matches!(compile(&program), Err(CompilerError::ScopeError { .. })));
}

#[test]
fn test_global_initializer_must_fit() {
    let mut g = global("g", NumberType::U8, Some(300));
    g.location = Some(SourceLocation::new("main.c", 1, 1));

    let err = compile(&program(vec![g], vec![])).unwrap_err();

    assert!(matches!(err, CompilerError::TypeError { .. }));
    assert_eq!(err.location().map(|l| l.line), Some(1));
}

#[test]
fn test_literal_must_fit_its_type() {
    let program = program(
        vec![],
        vec![print(lit(300, NumberType::I8).at(SourceLocation::new("main.c", 4, 7)))],
    );

    let err = compile(&program).unwrap_err();

    assert!(matches!(err, CompilerError::TypeError { .. }));
    assert!(err.to_string().contains("literal 300 does not fit in i8"));
    assert_eq!(err.location().map(|l| (l.line, l.column)), Some((4, 7)));
}

#[test]
fn test_narrowing_to_bool_is_type_error() {
    let program = program(
        vec![],
        vec![declare("b", NumberType::Bool, Some(lit(5, NumberType::I32)))],
    );

    assert!(matches!(compile(&program), Err(CompilerError::TypeError { .. })));
}

#[test]
fn test_duplicate_function_is_scope_error() {
    let main = Function {
        name: "main".to_string(),
        body: vec![],
        location: None,
    };
    let program = Program {
        globals: vec![],
        functions: vec![main.clone(), main],
    };

    assert!(matches!(compile(&program), Err(CompilerError::ScopeError { .. })));
}

#[test]
fn test_each_function_numbers_from_one() {
    let body = vec![print(lit(1, NumberType::I32))];
    let program = Program {
        globals: vec![],
        functions: vec![
            Function { name: "first".to_string(), body: body.clone(), location: None },
            Function { name: "second".to_string(), body, location: None },
        ],
    };

    let module = compile(&program).unwrap();

    for function in &module.functions {
        assert!(function.instructions[0].to_string().starts_with("%1 = call"));
    }
}

#[test]
fn test_json_program_end_to_end() {
    let source = r#"{
        "globals": [ { "name": "x", "ty": "i32" } ],
        "functions": [ {
            "name": "main",
            "body": [
                { "stmt": "assign", "name": "x",
                  "value": { "expr": "literal", "value": 5, "ty": "i32" } },
                { "stmt": "print",
                  "value": { "expr": "binary", "op": "add", "ty": "i32",
                             "lhs": { "expr": "identifier", "name": "x", "ty": "i32" },
                             "rhs": { "expr": "literal", "value": 3, "ty": "i32" } } }
            ]
        } ]
    }"#;

    let text = Frontend::compile_json(source, config()).unwrap();

    assert!(text.contains("  store i32 5, i32* @x\n  %1 = load i32, i32* @x\n  %2 = add nsw i32 %1, 3\n"));
    assert!(text.contains("declare i32 @printf(i8*, ...)\n"));
}
