use bumpalo::Bump;
use php_expr_parser::Span;
use php_expr_parser::ast::visitor::{Visitor, walk_expr, walk_stmt};
use php_expr_parser::ast::{Expr, ExprId, Stmt, StmtId};
use php_expr_parser::lexer::Lexer;
use php_expr_parser::parser::Parser;

#[derive(Default)]
struct LintVisitor {
    evals: Vec<Span>,
    silenced: usize,
    functions: usize,
    variables: Vec<Span>,
}

impl<'ast> Visitor<'ast> for LintVisitor {
    fn visit_stmt(&mut self, stmt: StmtId<'ast>) {
        if let Stmt::Function { .. } = stmt {
            self.functions += 1;
        }

        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: ExprId<'ast>) {
        match expr {
            Expr::Eval { span, .. } => self.evals.push(*span),
            Expr::Silent { .. } => self.silenced += 1,
            Expr::Variable { span, .. } => self.variables.push(*span),
            _ => {}
        }

        walk_expr(self, expr);
    }
}

#[test]
fn visitor_drives_simple_lint() {
    let code = r#"<?php
function demo($items) {
    $value = eval('2 + 2');
    $closure = function() use ($items) {
        return @eval('3');
    };
    return [$value => new class { const A = 1; function f() { return eval('4'); } }];
}
"#;

    let arena = Bump::new();
    let lexer = Lexer::new(code.as_bytes());
    let mut parser = Parser::new(lexer, &arena);
    let program = parser.parse_program();
    assert!(program.errors.is_empty(), "errors: {:?}", program.errors);

    let mut visitor = LintVisitor::default();
    visitor.visit_program(&program);

    assert_eq!(visitor.functions, 1);
    assert_eq!(visitor.evals.len(), 3);
    assert_eq!(visitor.silenced, 1);
}

#[test]
fn compound_assignment_visits_target_and_operand() {
    let code = "<?php $total += $step;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();

    let mut visitor = LintVisitor::default();
    visitor.visit_program(&program);

    let names: Vec<_> = visitor
        .variables
        .iter()
        .filter_map(|span| span.as_str(code.as_bytes()))
        .collect();
    assert_eq!(names, vec![&b"$total"[..], &b"$total"[..], &b"$step"[..]]);
}
