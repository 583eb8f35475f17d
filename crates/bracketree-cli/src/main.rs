use anyhow::{Context, Result};
use bracketree_config::Config;
use bracketree_engine::{
    BracketInfo, BracketPairInfo, BracketPairsModel, ClassifiedDocument, Range, TextDocument,
};
use bracketree_syntax::classify_document;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::{env, process};

const USAGE: &str = "[--language <id>] [--pairs] [--min-indent] [--raw] <file>";

#[derive(Debug, Default, PartialEq)]
struct Args {
    path: PathBuf,
    language: Option<String>,
    pairs: bool,
    min_indent: bool,
    raw: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pairs" => parsed.pairs = true,
            "--min-indent" => parsed.min_indent = true,
            "--raw" => parsed.raw = true,
            "--language" => {
                let language = iter.next().ok_or("--language needs a value")?;
                parsed.language = Some(language.clone());
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            file if path.is_none() => path = Some(PathBuf::from(file)),
            extra => return Err(format!("unexpected argument {extra}")),
        }
    }
    parsed.path = path.ok_or("no file given")?;
    if parsed.min_indent && !parsed.pairs {
        parsed.pairs = true;
    }
    Ok(parsed)
}

/// Language id for a file extension, as used in the config.
fn language_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "go" => "go",
        "java" => "java",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "json" => "json",
        "rs" => "rust",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "rb" => "ruby",
        "pas" | "pp" => "pascal",
        "html" | "htm" => "html",
        _ => "plaintext",
    }
}

fn format_range(range: &Range) -> String {
    format!(
        "{}:{}-{}:{}",
        range.start.line_number, range.start.column, range.end.line_number, range.end.column
    )
}

fn format_bracket(bracket: &BracketInfo) -> String {
    let mut line = format!(
        "{} {} level={} family_level={}",
        format_range(&bracket.range),
        bracket.text,
        bracket.nesting_level,
        bracket.nesting_level_of_same_family
    );
    if bracket.is_unmatched {
        line.push_str(" unmatched");
    }
    line
}

fn format_pair(pair: &BracketPairInfo) -> String {
    let mut line = format!("{} level={}", format_range(&pair.range), pair.nesting_level);
    if let Some(indent) = pair.min_indentation {
        line.push_str(&format!(" min_indent={indent}"));
    }
    if pair.closing_range.is_none() {
        line.push_str(" unterminated");
    }
    line
}

fn run(args: Args) -> Result<()> {
    let config = Config::load_or_builtin().context("Failed to load config file")?;
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let language = args
        .language
        .clone()
        .unwrap_or_else(|| language_for_path(&args.path).to_string());
    let text = TextDocument::from_bytes(&language, &bytes)
        .with_context(|| format!("Failed to load {}", args.path.display()))?;
    log::info!("{} as {language}", args.path.display());

    let mut doc = ClassifiedDocument::from_document(text);
    if !args.raw {
        classify_document(&mut doc);
    }

    let options = config.options();
    let mut model = BracketPairsModel::new(&doc, Rc::new(config), options);
    if !model.is_document_supported() {
        log::warn!("{} is too large for bracket pairs", args.path.display());
    }

    let range = doc.document().full_range();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.pairs {
        for pair in model.bracket_pairs_in_range(&doc, range, args.min_indent) {
            writeln!(out, "{}", format_pair(&pair))?;
        }
    } else {
        for bracket in model.brackets_in_range(&doc, range) {
            writeln!(out, "{}", format_bracket(&bracket))?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("bracketree");
    let parsed = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {program} {USAGE}");
            eprintln!("Languages are configured in {}", Config::config_path().display());
            process::exit(1);
        }
    };

    run(parsed)
}
