use bumpalo::Bump;
use insta::assert_snapshot;
use php_expr_parser::ast::sexpr::SExprFormatter;
use php_expr_parser::ast::visitor::Visitor;
use php_expr_parser::lexer::Lexer;
use php_expr_parser::parser::{Parser, ParserConfig};

fn messages(code: &str) -> Vec<String> {
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();
    program.errors.iter().map(|e| e.message.clone()).collect()
}

#[test]
fn missing_semicolon_resyncs_at_next_statement_end() {
    let code = "<?php\n$a = 1\n$b = 2;\necho 3;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();

    assert_eq!(program.errors.len(), 1);
    let error = &program.errors[0];
    assert_eq!(error.message, "Missing semicolon");
    assert_eq!(error.to_string(), "Missing semicolon");
    assert_eq!(error.span.line(code.as_bytes()), 3);

    let mut formatter = SExprFormatter::new(code.as_bytes());
    formatter.visit_program(&program);
    assert_snapshot!(formatter.finish(), @r"
    (program
      (nop)
      (statement (assign (variable $a) (number 1)))
      (echo (number 3)))
    ");
}

#[test]
fn human_readable_points_at_the_span() {
    let code = "<?php\n$a = 1\n$b = 2;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();

    assert_eq!(
        program.errors[0].to_human_readable(code.as_bytes()),
        "error: Missing semicolon\n --> line 3, column 1\n  |\n3 | $b = 2;\n  | ^^"
    );
}

#[test]
fn fatal_diagnostics_are_labelled() {
    let code = "<?php\nlist() = $a;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();

    let rendered = program.errors[0].to_human_readable(code.as_bytes());
    assert!(
        rendered.starts_with("fatal error: Cannot use empty list on line 2\n --> line 2, column 1"),
        "{rendered}"
    );
}

#[test]
fn dangling_operator_leaves_an_error_node() {
    let code = "<?php $a = 1 + ;";
    let arena = Bump::new();
    let mut parser = Parser::new(Lexer::new(code.as_bytes()), &arena);
    let program = parser.parse_program();

    assert_eq!(
        program.errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
        vec!["Expected EXPR"]
    );

    let mut formatter = SExprFormatter::new(code.as_bytes());
    formatter.visit_program(&program);
    assert_snapshot!(formatter.finish(), @r"
    (program
      (nop)
      (statement (assign (variable $a) (bin + (number 1) (error)))))
    ");
}

#[test]
fn expected_token_messages() {
    assert_eq!(messages("<?php foo(1;"), vec!["Expected ')'"]);
    assert_eq!(messages("<?php $a ? $b;"), vec!["Expected ':'", "Expected EXPR"]);
    assert_eq!(
        messages("<?php new 1;"),
        vec!["Expected identifier or variable", "Missing semicolon"]
    );
    assert_eq!(messages("<?php $a = &;"), vec!["Expected 'variable'"]);
}

#[test]
fn truncated_input_never_hangs() {
    let snippets = [
        "<?php )",
        "<?php ->",
        "<?php new",
        "<?php list(",
        "<?php function",
        "<?php class {",
        "<?php $a[",
        "<?php \"abc",
        "<?php `",
        "<?php ${",
        "<?php Foo::",
        "<?php isset(",
        "<?php 1 ? 2",
        "<?php $a->",
        "<?php static function (",
        "<?php [1, 2",
        "<?php abstract",
    ];
    for code in snippets {
        assert!(!messages(code).is_empty(), "no diagnostics for {code:?}");
    }
}

#[test]
fn nesting_limit_reports_instead_of_overflowing() {
    let handle = std::thread::Builder::new()
        .stack_size(32 * 1024 * 1024)
        .spawn(|| {
            let depth = 10_000;
            let code = format!("<?php {}1{};", "(".repeat(depth), ")".repeat(depth));
            messages(&code)
        })
        .unwrap();
    let errors = handle.join().unwrap();

    assert!(
        errors
            .iter()
            .any(|m| m == "Maximum expression nesting depth exceeded"),
        "{errors:?}"
    );
}

#[test]
fn nesting_limit_is_configurable() {
    let code = "<?php ((((((((((1))))))))));";

    assert!(messages(code).is_empty());

    let arena = Bump::new();
    let config = ParserConfig { max_depth: 8 };
    let mut parser = Parser::with_config(Lexer::new(code.as_bytes()), &arena, config);
    let program = parser.parse_program();
    assert!(
        program
            .errors
            .iter()
            .any(|e| e.message == "Maximum expression nesting depth exceeded")
    );
    assert_eq!(parser.config().max_depth, 8);
}

#[test]
fn zero_nesting_limit_still_consumes_stray_braces() {
    for code in ["<?php }", "<?php $a; }", "<?php } }"] {
        let arena = Bump::new();
        let config = ParserConfig { max_depth: 0 };
        let mut parser = Parser::with_config(Lexer::new(code.as_bytes()), &arena, config);
        let program = parser.parse_program();

        assert!(
            program
                .errors
                .iter()
                .any(|e| e.message == "Maximum expression nesting depth exceeded"),
            "{code:?}: {:?}",
            program.errors
        );
    }
}

#[test]
fn config_deserializes_with_defaults() {
    let config: ParserConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, ParserConfig::default());

    let config: ParserConfig = serde_json::from_str(r#"{"max_depth": 12}"#).unwrap();
    assert_eq!(config.max_depth, 12);
}
