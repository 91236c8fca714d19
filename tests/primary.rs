use bumpalo::Bump;
use insta::assert_snapshot;
use php_expr_parser::ast::sexpr::SExprFormatter;
use php_expr_parser::ast::visitor::Visitor;
use php_expr_parser::ast::{Expr, Stmt};
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
fn minus_fuses_with_number_literals_only() {
    assert_snapshot!(sexpr("<?php -5; -$x; - 1.5; !$a == $b; ~$b; +$c;"), @r"
    (program
      (nop)
      (statement (number -5))
      (statement (unary - (variable $x)))
      (statement (number -1.5))
      (statement (unary ! (bool == (variable $a) (variable $b))))
      (statement (unary ~ (variable $b)))
      (statement (unary + (variable $c))))
    ");
}

#[test]
fn casts() {
    assert_snapshot!(sexpr("<?php (int)$a; (bool)$b; (unset)$c; (string) 1 . 2;"), @r"
    (program
      (nop)
      (statement (cast int (variable $a)))
      (statement (cast boolean (variable $b)))
      (statement (cast unset (variable $c)))
      (statement (cast string (bin . (number 1) (number 2)))))
    ");
}

#[test]
fn exit_forms() {
    assert_snapshot!(sexpr("<?php exit; exit(); exit(2); die('x');"), @r"
    (program
      (nop)
      (statement (exit))
      (statement (exit))
      (statement (exit (number 2)))
      (statement (exit (string 'x'))))
    ");
}

#[test]
fn include_family_sets_flags() {
    let code = "<?php include 'a.php'; include_once 'b.php'; require $c; require_once __DIR__ . '/d.php';";
    assert_snapshot!(sexpr(code), @r"
    (program
      (nop)
      (statement (include (string 'a.php')))
      (statement (include_once (string 'b.php')))
      (statement (require (variable $c)))
      (statement (require_once (bin . (magic __DIR__) (string '/d.php')))))
    ");

    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();
    let flags: Vec<(bool, bool)> = program
        .statements
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Expression { expr, .. } => match expr {
                Expr::Include { once, require, .. } => Some((*once, *require)),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(
        flags,
        vec![(false, false), (true, false), (false, true), (true, true)]
    );
}

#[test]
fn keyword_forms() {
    assert_snapshot!(sexpr("<?php isset($a, $b['k'],); empty($c); eval('1;'); print $d; clone $e; @foo();"), @r"
    (program
      (nop)
      (statement (isset (variable $a) (offset (variable $b) (string 'k'))))
      (statement (empty (variable $c)))
      (statement (eval (string '1;')))
      (statement (print (variable $d)))
      (statement (clone (variable $e)))
      (statement (silent (call (name foo)))))
    ");
}

#[test]
fn yield_takes_key_before_arrow() {
    assert_snapshot!(sexpr("<?php function gen() { yield; yield $v; yield $k => $v; yield from other(); }"), @r"
    (program
      (nop)
      (function gen (params)
        (statement (yield))
        (statement (yield (variable $v)))
        (statement (yield (variable $k) => (variable $v)))
        (statement (yieldfrom (call (name other))))))
    ");
}

#[test]
fn static_closure_with_uses_and_return_type() {
    let code = "<?php $f = static function &($a, &$b = 1, ...$c) use ($x, &$y): ?int { return $a; };";
    assert_snapshot!(sexpr(code), @r"
    (program
      (nop)
      (statement (assign (variable $f) (closure static & (params $a &$b=(number 1) ...$c) (use $x &$y)
        (return (variable $a))))))
    ");
}

#[test]
fn closure_at_statement_start_is_an_expression() {
    assert_snapshot!(sexpr("<?php function () {};"), @r"
    (program
      (nop)
      (statement (closure (params))))
    ");
}

#[test]
fn scalars_and_arrays() {
    assert_snapshot!(sexpr("<?php __LINE__; [1, 'k' => &$v, ...$rest]; array(); [1, 2][0];"), @r"
    (program
      (nop)
      (statement (magic __LINE__))
      (statement (array (number 1) (key (string 'k') &(variable $v)) ...(variable $rest)))
      (statement (array))
      (statement (offset (array (number 1) (number 2)) (number 0))))
    ");
}

#[test]
fn encapsed_string_parts() {
    let code = "<?php \"a $b {$c->d}\"; `ls $dir`;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();
    assert!(program.errors.is_empty(), "errors: {:?}", program.errors);

    let exprs: Vec<_> = program
        .statements
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Expression { expr, .. } => Some(*expr),
            _ => None,
        })
        .collect();

    match exprs[0] {
        Expr::Encapsed { parts, .. } => {
            let kinds: Vec<_> = parts.iter().map(|p| p.kind()).collect();
            assert_eq!(kinds, vec!["string", "variable", "string", "prop"]);
        }
        other => panic!("expected encapsed string, got {:?}", other),
    }
    match exprs[1] {
        Expr::ShellExec { parts, .. } => {
            assert_eq!(parts.len(), 2);
            assert_eq!(exprs[1].kind(), "shell");
        }
        other => panic!("expected shell command, got {:?}", other),
    }
}

#[test]
fn member_and_static_access() {
    let code = "<?php $a->b->c(1)[0]; $a->$b; $a->{'x'}; $s{0}; Foo::BAR; Foo::$baz; Foo::bar(1); static::class; $obj::class;";
    assert_snapshot!(sexpr(code), @r"
    (program
      (nop)
      (statement (offset (method (prop (variable $a) b) c (number 1)) (number 0)))
      (statement (prop (variable $a) (variable $b)))
      (statement (prop (variable $a) (string 'x')))
      (statement (offset (variable $s) (number 0)))
      (statement (classconst (name Foo) BAR))
      (statement (staticprop (name Foo) (variable $baz)))
      (statement (staticcall (name Foo) bar (number 1)))
      (statement (classconst (name static) class))
      (statement (classconst (variable $obj) class)))
    ");
}

#[test]
fn curly_offsets_after_parens_and_scalars() {
    let code = "<?php ('abc'){0}; 'abc'{1}; ($s){$i}[2];";
    assert_snapshot!(sexpr(code), @r"
    (program
      (nop)
      (statement (offset (string 'abc') (number 0)))
      (statement (offset (string 'abc') (number 1)))
      (statement (offset (offset (variable $s) (variable $i)) (number 2))))
    ");
}

#[test]
fn variable_variables_and_names() {
    let code = "<?php $$a; ${'b'}; \\Foo\\bar(); namespace\\baz; true; (new Foo)->run();";
    assert_snapshot!(sexpr(code), @r"
    (program
      (nop)
      (statement (varvar (variable $a)))
      (statement (varvar (string 'b')))
      (statement (call (name \Foo\bar)))
      (statement (constant namespace\baz))
      (statement (constant true))
      (statement (method (new (name Foo)) run)))
    ");
}
