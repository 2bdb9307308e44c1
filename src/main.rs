use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use bhai::{compile, compile_and_run, Error, Evaluator, Limits, Value};

/// Interpreter for Bhai, a tiny Hindi-slang scripting language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run; starts the REPL when omitted.
    script: Option<PathBuf>,

    /// Abort a 'jabtak' loop after this many iterations.
    #[arg(long, default_value_t = Limits::default().max_loop_iterations)]
    max_loop_iterations: usize,

    /// Abort nested 'kaam' calls beyond this depth.
    #[arg(long, default_value_t = Limits::default().max_recursion_depth)]
    max_recursion_depth: usize,

    /// Abort string concatenation beyond this many bytes.
    #[arg(long, default_value_t = Limits::default().max_string_length)]
    max_string_length: usize,
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let limits = Limits {
        max_loop_iterations: args.max_loop_iterations,
        max_recursion_depth: args.max_recursion_depth,
        max_string_length: args.max_string_length,
    };

    match args.script {
        Some(path) => run_file(&path, limits),
        None => run_repl(limits),
    }
}

fn run_file(path: &Path, limits: Limits) -> Result<(), String> {
    let source = fs::read_to_string(path)
        .map_err(|err| format!("failed to read '{}': {}", path.display(), err))?;

    if path.extension().and_then(|ext| ext.to_str()) != Some("bhai") {
        eprintln!(
            "warning: '{}' does not use the .bhai extension",
            path.display()
        );
    }

    debug!("running '{}'", path.display());

    let execution =
        compile_and_run(&source, limits).map_err(|err| render_error(&source, &err))?;

    for line in &execution.outputs {
        println!("{line}");
    }

    Ok(())
}

fn run_repl(limits: Limits) -> Result<(), String> {
    let mut editor = DefaultEditor::new().map_err(|err| err.to_string())?;
    let mut evaluator = Evaluator::with_limits(limits);

    println!(
        "bhai {} (Ctrl-D to exit; 'hi_bhai'/'bye_bhai' markers are optional here)",
        env!("CARGO_PKG_VERSION")
    );

    loop {
        match editor.readline("bhai> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                eval_line(&mut evaluator, trimmed);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.to_string()),
        }
    }

    Ok(())
}

// One REPL entry: a bare statement is wrapped in program markers, then run
// against the session's persistent global scope.
fn eval_line(evaluator: &mut Evaluator, line: &str) {
    let source = if line.starts_with("hi_bhai") {
        line.to_string()
    } else {
        format!("hi_bhai {line} bye_bhai")
    };

    let result = compile(&source).and_then(|program| evaluator.eval_program(&program));

    // Output printed before a failure still belongs to the user.
    for printed in evaluator.take_outputs() {
        println!("{printed}");
    }

    match result {
        Ok(Value::Null) => {}
        Ok(value) => println!("=> {value}"),
        Err(err) => eprintln!("{err}"),
    }
}

fn render_error(source: &str, err: &Error) -> String {
    let pos = err.position();
    let line_text = source
        .lines()
        .nth(pos.line as usize - 1)
        .unwrap_or_default();
    let caret_padding = " ".repeat(pos.column as usize - 1);
    format!("{err}\n{line_text}\n{caret_padding}^")
}
