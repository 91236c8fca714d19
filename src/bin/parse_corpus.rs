use anyhow::Result;
use bumpalo::Bump;
use clap::Parser as ClapParser;
use php_expr_parser::lexer::Lexer;
use php_expr_parser::parser::{Parser, ParserConfig};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

#[derive(ClapParser)]
#[command(name = "parse_corpus")]
#[command(about = "Parse every .php file under a directory and report diagnostics")]
struct Cli {
    dir: PathBuf,

    #[arg(long)]
    max_depth: Option<usize>,

    /// Paths listed per failure category
    #[arg(long, default_value_t = 5)]
    show: usize,
}

fn find_php_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
        .map(|e| e.into_path())
        .collect()
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
    let mut config = ParserConfig::default();
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }

    let files = find_php_files(&cli.dir);
    tracing::info!(dir = %cli.dir.display(), files = files.len(), "scanning corpus");

    let clean = AtomicUsize::new(0);
    let with_errors = AtomicUsize::new(0);
    let fatal = AtomicUsize::new(0);
    let unreadable = AtomicUsize::new(0);
    let start = Instant::now();

    files.par_iter().for_each(|path| {
        let source = match fs::read(path) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable file");
                unreadable.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let arena = Bump::new();
        let mut parser = Parser::with_config(Lexer::new(&source), &arena, config);
        let program = parser.parse_program();

        if program.errors.is_empty() {
            clean.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let counter = if program.has_fatal() {
            &fatal
        } else {
            &with_errors
        };
        if counter.fetch_add(1, Ordering::Relaxed) < cli.show {
            let first = &program.errors[0];
            println!("{}: {}", path.display(), first.to_human_readable(&source));
        }
    });

    println!("--------------------------------------------------");
    println!("Parsed {} files in {:.2?}", files.len(), start.elapsed());
    println!("Clean: {}", clean.load(Ordering::Relaxed));
    println!("With diagnostics: {}", with_errors.load(Ordering::Relaxed));
    println!("Fatal: {}", fatal.load(Ordering::Relaxed));
    println!("Unreadable: {}", unreadable.load(Ordering::Relaxed));

    Ok(())
}
