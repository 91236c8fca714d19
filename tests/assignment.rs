use bumpalo::Bump;
use insta::assert_snapshot;
use php_expr_parser::ast::sexpr::SExprFormatter;
use php_expr_parser::ast::visitor::Visitor;
use php_expr_parser::ast::{BinaryOp, Expr, ExprId, PostOp};
use php_expr_parser::lexer::Lexer;
use php_expr_parser::parser::Parser;

fn parse_snippet<'ast>(code: &'ast str, arena: &'ast Bump) -> ExprId<'ast> {
    let mut lexer = Lexer::new(code.as_bytes());
    lexer.start_in_scripting();
    let mut parser = Parser::new(lexer, arena);
    let expr = parser.parse_expression();
    assert!(parser.errors().is_empty(), "errors: {:?}", parser.errors());
    expr
}

fn sexpr(code: &str) -> String {
    let arena = Bump::new();
    let lexer = Lexer::new(code.as_bytes());
    let mut parser = Parser::new(lexer, &arena);
    let program = parser.parse_program();
    assert!(program.errors.is_empty(), "errors: {:?}", program.errors);

    let mut formatter = SExprFormatter::new(code.as_bytes());
    formatter.visit_program(&program);
    formatter.finish()
}

#[test]
fn compound_assignment_copies_its_target() {
    let arena = Bump::new();
    let expr = parse_snippet("$a += 2", &arena);

    match *expr {
        Expr::Set { var, value, span } => {
            assert_eq!(expr.kind(), "set");
            match *value {
                Expr::Binary {
                    op: BinaryOp::Plus,
                    left,
                    right,
                    span: value_span,
                } => {
                    assert!(!std::ptr::eq(left, var));
                    assert!(matches!(*left, Expr::Variable { .. }));
                    assert_eq!(left.span(), var.span());
                    assert!(matches!(*right, Expr::Number { value: b"2", .. }));
                    assert_eq!(value_span, span);
                }
                ref other => panic!("expected addition, got {:?}", other),
            }
        }
        ref other => panic!("expected set, got {:?}", other),
    }
}

#[test]
fn every_compound_operator_is_accepted() {
    let cases = [
        ("+=", BinaryOp::Plus),
        ("-=", BinaryOp::Minus),
        ("*=", BinaryOp::Mul),
        ("**=", BinaryOp::Pow),
        ("/=", BinaryOp::Div),
        (".=", BinaryOp::Concat),
        ("%=", BinaryOp::Mod),
        ("&=", BinaryOp::BitAnd),
        ("|=", BinaryOp::BitOr),
        ("^=", BinaryOp::BitXor),
        ("<<=", BinaryOp::ShiftLeft),
        (">>=", BinaryOp::ShiftRight),
    ];

    for (token, expected) in cases {
        let code = format!("$a {token} $b");
        let arena = Bump::new();
        let expr = parse_snippet(&code, &arena);
        match *expr {
            Expr::Set { value, .. } => match *value {
                Expr::Binary { op, .. } => assert_eq!(op, expected, "for {token}"),
                ref other => panic!("{token}: expected binary, got {:?}", other),
            },
            ref other => panic!("{token}: expected set, got {:?}", other),
        }
    }
}

#[test]
fn prefix_increment_builds_a_set() {
    let arena = Bump::new();
    let expr = parse_snippet("--$i", &arena);

    match *expr {
        Expr::Set { var, value, .. } => match *value {
            Expr::Binary {
                op: BinaryOp::Minus,
                left,
                right,
                ..
            } => {
                assert!(!std::ptr::eq(left, var));
                assert_eq!(left.span(), var.span());
                assert!(matches!(*right, Expr::Number { value: b"1", .. }));
            }
            ref other => panic!("expected subtraction, got {:?}", other),
        },
        ref other => panic!("expected set, got {:?}", other),
    }
}

#[test]
fn postfix_decrement_is_not_an_increment() {
    let arena = Bump::new();
    let inc = parse_snippet("$i++", &arena);
    let dec = parse_snippet("$i--", &arena);

    assert!(matches!(
        *inc,
        Expr::Post {
            op: PostOp::Increment,
            ..
        }
    ));
    assert!(matches!(
        *dec,
        Expr::Post {
            op: PostOp::Decrement,
            ..
        }
    ));
}

#[test]
fn assignment_forms() {
    assert_snapshot!(sexpr("<?php $a = $b = 1; $c =& $d; $e = &new Foo(1); ++$f; $g--; $h[] = 2;"), @r"
    (program
      (nop)
      (statement (assign (variable $a) (assign (variable $b) (number 1))))
      (statement (assign-ref (variable $c) (variable $d)))
      (statement (assign-ref (variable $e) (new (name Foo) (number 1))))
      (statement (set (variable $f) (bin + (variable $f) (number 1))))
      (statement (post -- (variable $g)))
      (statement (assign (offset (variable $h) _) (number 2))))
    ");
}

#[test]
fn compound_assignment_renders_with_operator() {
    assert_snapshot!(sexpr("<?php $s .= 'x' . 'y';"), @r"
    (program
      (nop)
      (statement (set (variable $s) (bin . (variable $s) (bin . (string 'x') (string 'y'))))))
    ");
}

#[test]
fn coalesce_assignment_is_not_a_variable_suffix() {
    let code = "<?php $a ??= 1;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();

    assert_eq!(program.errors.len(), 1);
    assert_eq!(program.errors[0].message, "Missing semicolon");
}

#[test]
fn compound_assignment_on_a_chain_copies_every_link() {
    let arena = Bump::new();
    let expr = parse_snippet("$a->b[$k] .= 'x'", &arena);

    let Expr::Set { var, value, .. } = *expr else {
        panic!("expected set, got {:?}", expr);
    };
    let Expr::Binary { left, .. } = *value else {
        panic!("expected binary, got {:?}", value);
    };
    let (
        Expr::ArrayDimFetch { array: outer, dim: Some(outer_dim), .. },
        Expr::ArrayDimFetch { array: inner, dim: Some(inner_dim), .. },
    ) = (var, left)
    else {
        panic!("expected offsets, got {:?} and {:?}", var, left);
    };
    assert!(!std::ptr::eq(*outer, *inner));
    assert!(!std::ptr::eq(*outer_dim, *inner_dim));
    assert_eq!(outer.span(), inner.span());
    assert_eq!(outer_dim.span(), inner_dim.span());
}
