use bumpalo::Bump;
use insta::assert_snapshot;
use php_expr_parser::ast::sexpr::SExprFormatter;
use php_expr_parser::ast::visitor::Visitor;
use php_expr_parser::ast::Expr;
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
fn full_and_short_ternary() {
    assert_snapshot!(sexpr("<?php $a ? $b : $c; $x = $a ?: 1;"), @r"
    (program
      (nop)
      (statement (ternary (variable $a) (variable $b) (variable $c)))
      (statement (assign (variable $x) (ternary (variable $a) _ (number 1)))))
    ");
}

#[test]
fn chains_nest_in_the_else_branch() {
    assert_snapshot!(sexpr("<?php $a ? $b : $c ? $d : $e; $a ?? $b ?? $c;"), @r"
    (program
      (nop)
      (statement (ternary (variable $a) (variable $b) (ternary (variable $c) (variable $d) (variable $e))))
      (statement (coalesce (variable $a) (coalesce (variable $b) (variable $c)))))
    ");
}

#[test]
fn comparison_takes_the_whole_ternary_as_right_operand() {
    assert_snapshot!(sexpr("<?php $a == 1 ? 'y' : 'n';"), @r"
    (program
      (nop)
      (statement (bool == (variable $a) (ternary (number 1) (string 'y') (string 'n')))))
    ");
}

#[test]
fn short_ternary_leaves_true_branch_empty() {
    let arena = Bump::new();
    let mut lexer = Lexer::new(b"$a ?: $b");
    lexer.start_in_scripting();
    let expr = Parser::new(lexer, &arena).parse_expression();

    match *expr {
        Expr::Ternary {
            if_true, if_false, ..
        } => {
            assert!(if_true.is_none());
            assert_eq!(if_false.kind(), "variable");
        }
        ref other => panic!("expected ternary, got {:?}", other),
    }
}
