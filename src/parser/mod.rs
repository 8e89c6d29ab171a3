//! Guest source parser
//!
//! This module transforms submission text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens, with INDENT/DEDENT layout)
//! - [`parse`]: Parser core and error type
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! The parser accepts a teaching subset of Python:
//! - Statements: assignment (including unpacking and chains), augmented assignment,
//!   `if`/`elif`/`else`, `while`, `for`, `def`, `class`, `return`, `del`, `global`,
//!   `assert`, `raise`, `break`, `continue`, `pass`
//! - Expressions: arithmetic, comparisons, boolean operators, conditional
//!   expressions, calls with keyword arguments, subscripts, slices, attributes,
//!   list/tuple/dict displays, list comprehensions, f-strings
//! - No `import`, `try`, `with`, `lambda`, generators, or decorators
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one method per precedence level.
//! No external parser generator dependencies.

pub mod ast;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseError, Parser};

/// Parse a complete submission into a [`ast::Program`]
pub fn parse(source: &str) -> Result<ast::Program, ParseError> {
    Parser::new(source)?.parse_program()
}
