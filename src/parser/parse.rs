//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `statements`: Parsing statements and indented blocks (if, while, for, def, class)
//! - `expressions`: Parsing expressions by precedence level, plus f-strings
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, SyntaxErrorKind, Token, TokenKind};

/// Parser error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError {
            kind: SyntaxErrorKind::Syntax,
            message: message.into(),
            location,
        }
    }

    pub(crate) fn indentation(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError {
            kind: SyntaxErrorKind::Indentation,
            message: message.into(),
            location,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            kind: err.kind,
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the guest language
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Number of enclosing loops in the current function body
    pub(crate) loop_depth: usize,
    /// Number of enclosing `def` blocks
    pub(crate) function_depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            loop_depth: 0,
            function_depth: 0,
        })
    }

    /// Parse the entire program (a sequence of top-level statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        loop {
            while self.match_token(&TokenKind::Newline) {}
            if self.is_at_end() {
                break;
            }
            let statements = self.parse_statement()?;
            program.body.extend(statements);
        }

        Ok(program)
    }

    // Helper methods

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_ahead(&self, n: usize, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.position + n)
            .is_some_and(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof, and `advance` never moves past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    /// Build an "invalid syntax" error pointing at the current token
    pub(crate) fn unexpected(&self) -> ParseError {
        let message = match self.peek_kind() {
            TokenKind::Newline | TokenKind::Eof => "invalid syntax: unexpected end of line".to_string(),
            TokenKind::Indent => {
                return ParseError::indentation("unexpected indent", self.current_location());
            }
            other => format!("invalid syntax: unexpected {}", other),
        };
        ParseError::syntax(message, self.current_location())
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, message: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::syntax(
                format!("{}, found {}", message, self.peek_kind()),
                self.current_location(),
            ))
        }
    }

    pub(crate) fn expect_name(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Name(name) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::syntax(
                format!("expected a name, found {}", self.peek_kind()),
                self.current_location(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse_program().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        match Parser::new(source) {
            Ok(mut parser) => parser.parse_program().unwrap_err(),
            Err(err) => err,
        }
    }

    #[test]
    fn test_parse_assignment_and_call() {
        let program = parse("x = 1\nprint(x)");
        assert_eq!(program.body.len(), 2);
        assert!(matches!(program.body[0], Stmt::Assign { .. }));
        match &program.body[1] {
            Stmt::Expr { expr: Expr::Call { args, .. }, location } => {
                assert_eq!(args.len(), 1);
                assert_eq!(location.line, 2);
            }
            other => panic!("Expected call statement, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_for_loop() {
        let program = parse("for i in range(3):\n    print(i)\n");
        assert_eq!(program.body.len(), 1);
        match &program.body[0] {
            Stmt::For { target, body, .. } => {
                assert!(matches!(target, Expr::Name(name, _) if name == "i"));
                assert_eq!(body.len(), 1);
                assert_eq!(body[0].location().line, 2);
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_elif_nests_as_if_in_else_branch() {
        let program = parse("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
        match &program.body[0] {
            Stmt::If { orelse, .. } => match &orelse[0] {
                Stmt::If { location, orelse, .. } => {
                    assert_eq!(location.line, 3);
                    assert_eq!(orelse.len(), 1);
                }
                other => panic!("Expected nested if, got {:?}", other),
            },
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_with_defaults() {
        let program = parse("def greet(name, punct='!'):\n    return name + punct\n");
        match &program.body[0] {
            Stmt::FunctionDef(decl) => {
                assert_eq!(decl.name, "greet");
                assert_eq!(decl.params.len(), 2);
                assert!(decl.params[1].default.is_some());
            }
            other => panic!("Expected def, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_class() {
        let program = parse("class Card:\n    def __init__(self, name):\n        self.name = name\n");
        match &program.body[0] {
            Stmt::ClassDef { name, body, .. } => {
                assert_eq!(name, "Card");
                assert_eq!(body.len(), 1);
            }
            other => panic!("Expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_semicolons_split_statements() {
        let program = parse("a = 1; b = 2\n");
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_one_line_suite() {
        let program = parse("if x: y = 1\n");
        match &program.body[0] {
            Stmt::If { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_tuple_unpacking_target() {
        let program = parse("a, b = b, a\n");
        match &program.body[0] {
            Stmt::Assign { targets, value, .. } => {
                assert!(matches!(targets[0], Expr::Tuple(ref items, _) if items.len() == 2));
                assert!(matches!(value, Expr::Tuple(ref items, _) if items.len() == 2));
            }
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_block_is_indentation_error() {
        let err = parse_err("for i in xs:\nprint(i)\n");
        assert_eq!(err.kind, SyntaxErrorKind::Indentation);
        assert_eq!(err.location.line, 2);
    }

    #[test]
    fn test_break_outside_loop() {
        let err = parse_err("break\n");
        assert!(err.message.contains("outside loop"));
    }

    #[test]
    fn test_return_outside_function() {
        let err = parse_err("return 1\n");
        assert!(err.message.contains("outside function"));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse_err("1 = x\n");
        assert_eq!(err.kind, SyntaxErrorKind::Syntax);
    }

    #[test]
    fn test_unsupported_keyword_statement() {
        let err = parse_err("import math\n");
        assert!(err.message.contains("import"));
    }
}
