//! Bhai is a tiny Hindi-slang scripting language: programs open with
//! `hi_bhai`, close with `bye_bhai`, and speak in keywords like `chaap`
//! (print), `rakho` (let), `agar`/`warna` (if/else) and `jabtak` (while).
//!
//! The crate exposes each pipeline stage ([`tokenize`], [`Parser`],
//! [`Evaluator`]) plus [`compile_and_run`] as the one-call boundary the
//! CLI and REPL adapters build on. Printed output is collected in memory
//! and handed back in the [`Execution`], never written to stdout by the
//! core.

use log::debug;

pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use ast::Program;
pub use error::{Error, ErrorKind};
pub use evaluator::{Evaluator, Execution, FunctionValue, Limits, Value};
pub use lexer::{tokenize, Position, Token, TokenKind};
pub use parser::Parser;

/// Lexes and parses `source` without running it.
pub fn compile(source: &str) -> Result<Program, Error> {
    let tokens = tokenize(source)?;
    debug!("lexed {} token(s)", tokens.len());

    let program = Parser::new(tokens).parse_program()?;
    debug!("parsed {} top-level statement(s)", program.statements.len());

    Ok(program)
}

/// Runs `source` in a fresh global scope under `limits`, returning the
/// printed lines and the final value together.
pub fn compile_and_run(source: &str, limits: Limits) -> Result<Execution, Error> {
    let program = compile(source)?;

    let mut evaluator = Evaluator::with_limits(limits);
    let result = evaluator.eval_program(&program)?;

    Ok(Execution {
        outputs: evaluator.take_outputs(),
        result,
    })
}

/// [`compile_and_run`] with [`Limits::default`].
pub fn run(source: &str) -> Result<Execution, Error> {
    compile_and_run(source, Limits::default())
}
