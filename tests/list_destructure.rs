use bumpalo::Bump;
use insta::assert_snapshot;
use php_expr_parser::ast::sexpr::SExprFormatter;
use php_expr_parser::ast::visitor::Visitor;
use php_expr_parser::ast::{Expr, Severity, Stmt};
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
fn skipped_slots_stay_empty() {
    let code = "<?php list($a, , $b) = $value;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();
    assert!(program.errors.is_empty());

    let stmt = program
        .statements
        .iter()
        .find(|s| !matches!(***s, Stmt::Nop { .. }))
        .expect("expected assignment statement");

    let (lhs, rhs) = match *stmt {
        Stmt::Expression { expr, .. } => match *expr {
            Expr::Assign { var, expr, .. } => (var, expr),
            ref other => panic!("expected assignment, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    };

    match *lhs {
        Expr::List { items, .. } => {
            assert_eq!(items.len(), 3);
            assert!(items[0].is_some());
            assert!(items[1].is_none());
            assert!(items[2].is_some_and(|item| item.key.is_none()));
        }
        ref other => panic!("expected list pattern, got {:?}", other),
    }
    assert!(matches!(*rhs, Expr::Variable { .. }));
}

#[test]
fn keyed_and_nested_patterns() {
    assert_snapshot!(sexpr("<?php list('x' => $a, 'y' => list($b, $c)) = $d;"), @r"
    (program
      (nop)
      (statement (assign (list (key (string 'x') (variable $a)) (key (string 'y') (list (variable $b) (variable $c)))) (variable $d))))
    ");
}

#[test]
fn nested_list_leaves_assignment_to_outer() {
    assert_snapshot!(sexpr("<?php list($a, list($b)) = $c; list(list($a), $b) = $c;"), @r"
    (program
      (nop)
      (statement (assign (list (variable $a) (list (variable $b))) (variable $c)))
      (statement (assign (list (list (variable $a)) (variable $b)) (variable $c))))
    ");
}

#[test]
fn list_without_assignment_is_a_bare_pattern() {
    assert_snapshot!(sexpr("<?php list($a);"), @r"
    (program
      (nop)
      (statement (list (variable $a))))
    ");
}

#[test]
fn empty_list_is_fatal_with_its_line() {
    let code = "<?php\n$x = 1;\nlist() = $a;\nlist(,) = $b;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();

    let messages: Vec<_> = program.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Cannot use empty list on line 3", "Cannot use empty list on line 4"]
    );
    assert!(program.errors.iter().all(|e| e.severity == Severity::Fatal));
    assert!(program.has_fatal());

    // parsing continues past the fatal pattern
    let assigns = program
        .statements
        .iter()
        .filter(|s| matches!(s, Stmt::Expression { expr: Expr::Assign { .. }, .. }))
        .count();
    assert_eq!(assigns, 3);
}

#[test]
fn bare_empty_list_is_fatal_without_assignment() {
    let code = "<?php\nlist();";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();

    assert_eq!(program.errors.len(), 1, "errors: {:?}", program.errors);
    assert_eq!(program.errors[0].message, "Cannot use empty list on line 2");
    assert_eq!(program.errors[0].severity, Severity::Fatal);

    let exprs: Vec<_> = program
        .statements
        .iter()
        .filter_map(|s| match s {
            Stmt::Expression { expr, .. } => Some(*expr),
            _ => None,
        })
        .collect();
    assert_eq!(exprs.len(), 1);
    assert!(matches!(exprs[0], Expr::List { .. }), "got {:?}", exprs[0]);
}
