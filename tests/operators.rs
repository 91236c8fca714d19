use bumpalo::Bump;
use insta::assert_snapshot;
use php_expr_parser::Span;
use php_expr_parser::ast::sexpr::SExprFormatter;
use php_expr_parser::ast::visitor::Visitor;
use php_expr_parser::ast::{BinaryOp, BoolOp, Expr};
use php_expr_parser::lexer::Lexer;
use php_expr_parser::parser::Parser;

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
fn arithmetic_groups_to_the_right() {
    assert_snapshot!(sexpr("<?php 1 + 2 * 3; 1 * 2 + 3;"), @r"
    (program
      (nop)
      (statement (bin + (number 1) (bin * (number 2) (number 3))))
      (statement (bin * (number 1) (bin + (number 2) (number 3)))))
    ");
}

#[test]
fn word_and_symbol_logical_operators() {
    assert_snapshot!(sexpr("<?php $a || $b && $c; $a and $b or $c; $a xor $b;"), @r"
    (program
      (nop)
      (statement (bool || (variable $a) (bool && (variable $b) (variable $c))))
      (statement (bool && (variable $a) (bool || (variable $b) (variable $c))))
      (statement (bool xor (variable $a) (variable $b))))
    ");
}

#[test]
fn comparisons_are_bool_nodes() {
    assert_snapshot!(sexpr("<?php $a === $b; $a <=> $b; $a instanceof Foo; $a != 1;"), @r"
    (program
      (nop)
      (statement (bool === (variable $a) (variable $b)))
      (statement (bool <=> (variable $a) (variable $b)))
      (statement (bool instanceof (variable $a) (constant Foo)))
      (statement (bool != (variable $a) (number 1))))
    ");
}

#[test]
fn bitwise_concat_and_shift_chain() {
    assert_snapshot!(sexpr("<?php $a . 'b' | 2 ** 3 << 1;"), @r"
    (program
      (nop)
      (statement (bin . (variable $a) (bin | (string 'b') (bin ** (number 2) (bin << (number 3) (number 1)))))))
    ");
}

#[test]
fn parse_expression_reads_a_bare_snippet() {
    let code = "$x - 1 ?? 2";
    let arena = Bump::new();
    let mut lexer = Lexer::new(code.as_bytes());
    lexer.start_in_scripting();
    let mut parser = Parser::new(lexer, &arena);
    let expr = parser.parse_expression();

    assert!(parser.errors().is_empty());
    assert_eq!(expr.kind(), "bin");
    assert_eq!(expr.span(), Span::new(0, code.len()));
    match *expr {
        Expr::Binary {
            op: BinaryOp::Minus,
            left,
            right,
            ..
        } => {
            assert_eq!(left.kind(), "variable");
            assert_eq!(right.kind(), "coalesce");
            assert_eq!(right.span(), Span::new(5, code.len()));
        }
        ref other => panic!("expected subtraction, got {:?}", other),
    }
}

#[test]
fn word_forms_share_the_symbol_variant() {
    let arena = Bump::new();
    let mut lexer = Lexer::new(b"$a or $b");
    lexer.start_in_scripting();
    let expr = Parser::new(lexer, &arena).parse_expression();

    assert!(matches!(*expr, Expr::Bool { op: BoolOp::Or, .. }));
    assert_eq!(BoolOp::Or.as_str(), "||");
}
