use anyhow::{Context, Result};
use bumpalo::Bump;
use clap::{Parser as ClapParser, ValueEnum};
use php_expr_parser::ast::sexpr::SExprFormatter;
use php_expr_parser::ast::visitor::Visitor;
use php_expr_parser::lexer::Lexer;
use php_expr_parser::parser::{Parser, ParserConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Debug,
    Sexpr,
    Json,
}

#[derive(ClapParser)]
#[command(name = "php-expr-parse")]
#[command(about = "Parse a PHP file and print its syntax tree")]
#[command(version)]
struct Cli {
    /// PHP source file
    path: PathBuf,

    #[arg(long, value_enum, default_value = "sexpr")]
    format: Format,

    /// JSON file holding parser settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured nesting limit
    #[arg(long)]
    max_depth: Option<usize>,
}

fn load_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_slice(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ParserConfig::default(),
    };
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let source =
        std::fs::read(&cli.path).with_context(|| format!("reading {}", cli.path.display()))?;

    let arena = Bump::new();
    let lexer = Lexer::new(&source);
    let mut parser = Parser::with_config(lexer, &arena, config);
    let program = parser.parse_program();

    match cli.format {
        Format::Debug => println!("{program:#?}"),
        Format::Sexpr => {
            let mut formatter = SExprFormatter::new(&source);
            formatter.visit_program(&program);
            println!("{}", formatter.finish());
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&program)?),
    }

    if program.errors.is_empty() {
        return Ok(());
    }
    for error in &program.errors {
        eprintln!("{}", error.to_human_readable(&source));
    }
    tracing::warn!(
        errors = program.errors.len(),
        path = %cli.path.display(),
        "parsed with diagnostics"
    );
    std::process::exit(1);
}
