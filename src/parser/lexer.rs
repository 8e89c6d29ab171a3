//! Lexer (tokenizer) for the guest language
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Indentation is significant: the lexer tracks an indentation stack and emits
//! [`TokenKind::Indent`] / [`TokenKind::Dedent`] around nested blocks, and a
//! [`TokenKind::Newline`] at the end of every logical line. Blank and
//! comment-only lines never produce tokens, and line breaks inside brackets
//! are joined into the surrounding logical line.

use super::ast::SourceLocation;
use std::fmt;

/// Width a tab advances the indentation column to (next multiple of 8)
const TAB_WIDTH: usize = 8;

/// The kind of syntax failure, named after the exception it surfaces as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    Syntax,
    Indentation,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::Syntax => write!(f, "SyntaxError"),
            SyntaxErrorKind::Indentation => write!(f, "IndentationError"),
        }
    }
}

/// All token variants produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    FString { body: String, raw: bool },

    // Identifiers
    Name(String),

    // Keywords
    True,
    False,
    None,
    And,
    Or,
    Not,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Is,
    Def,
    Return,
    Class,
    Break,
    Continue,
    Pass,
    Del,
    Global,
    Assert,
    Raise,

    // Arithmetic
    Plus,        // +
    Minus,       // -
    Star,        // *
    DoubleStar,  // **
    Slash,       // /
    DoubleSlash, // //
    Percent,     // %

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Assignment
    Eq,            // =
    PlusEq,        // +=
    MinusEq,       // -=
    StarEq,        // *=
    SlashEq,       // /=
    DoubleSlashEq, // //=
    PercentEq,     // %=
    DoubleStarEq,  // **=

    // Punctuation
    Dot,       // .
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    Arrow,     // ->
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }

    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(n) => write!(f, "int literal {}", n),
            TokenKind::Float(x) => write!(f, "float literal {}", x),
            TokenKind::Str(s) => write!(f, "string literal {:?}", s),
            TokenKind::FString { body, .. } => write!(f, "f-string {:?}", body),
            TokenKind::Name(s) => write!(f, "name '{}'", s),
            TokenKind::True => write!(f, "'True'"),
            TokenKind::False => write!(f, "'False'"),
            TokenKind::None => write!(f, "'None'"),
            TokenKind::And => write!(f, "'and'"),
            TokenKind::Or => write!(f, "'or'"),
            TokenKind::Not => write!(f, "'not'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Elif => write!(f, "'elif'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::For => write!(f, "'for'"),
            TokenKind::In => write!(f, "'in'"),
            TokenKind::Is => write!(f, "'is'"),
            TokenKind::Def => write!(f, "'def'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::Class => write!(f, "'class'"),
            TokenKind::Break => write!(f, "'break'"),
            TokenKind::Continue => write!(f, "'continue'"),
            TokenKind::Pass => write!(f, "'pass'"),
            TokenKind::Del => write!(f, "'del'"),
            TokenKind::Global => write!(f, "'global'"),
            TokenKind::Assert => write!(f, "'assert'"),
            TokenKind::Raise => write!(f, "'raise'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::DoubleStar => write!(f, "'**'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::DoubleSlash => write!(f, "'//'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::PlusEq => write!(f, "'+='"),
            TokenKind::MinusEq => write!(f, "'-='"),
            TokenKind::StarEq => write!(f, "'*='"),
            TokenKind::SlashEq => write!(f, "'/='"),
            TokenKind::DoubleSlashEq => write!(f, "'//='"),
            TokenKind::PercentEq => write!(f, "'%='"),
            TokenKind::DoubleStarEq => write!(f, "'**='"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Newline => write!(f, "end of line"),
            TokenKind::Indent => write!(f, "indent"),
            TokenKind::Dedent => write!(f, "dedent"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// A token and the location of its first character
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} at line {}, column {}: {message}", location.line, location.column)]
pub struct LexError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub location: SourceLocation,
}

impl LexError {
    fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        LexError {
            kind: SyntaxErrorKind::Syntax,
            message: message.into(),
            location,
        }
    }

    fn indentation(message: impl Into<String>, location: SourceLocation) -> Self {
        LexError {
            kind: SyntaxErrorKind::Indentation,
            message: message.into(),
            location,
        }
    }
}

/// Lexer for guest source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    indent_stack: Vec<usize>,
    bracket_depth: usize,
    at_line_start: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            if self.at_line_start && self.bracket_depth == 0 {
                self.at_line_start = false;
                if !self.handle_indentation(&mut tokens)? {
                    continue;
                }
            }

            self.skip_inline_whitespace();

            let Some(ch) = self.peek() else {
                break;
            };

            match ch {
                '#' => self.skip_comment(),
                '\\' if self.peek_ahead(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                '\\' if self.peek_ahead(1) == Some('\r') && self.peek_ahead(2) == Some('\n') => {
                    self.advance();
                    self.advance();
                    self.advance();
                }
                '\n' => {
                    let loc = self.current_location();
                    self.advance();
                    if self.bracket_depth == 0 {
                        tokens.push(Token::new(TokenKind::Newline, loc));
                        self.at_line_start = true;
                    }
                }
                _ => tokens.push(self.next_token()?),
            }
        }

        let loc = self.current_location();
        if self.bracket_depth > 0 {
            return Err(LexError::syntax("unexpected EOF while parsing", loc));
        }
        if tokens
            .last()
            .is_some_and(|t| !matches!(t.kind, TokenKind::Newline))
        {
            tokens.push(Token::new(TokenKind::Newline, loc));
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            tokens.push(Token::new(TokenKind::Dedent, loc));
        }
        tokens.push(Token::new(TokenKind::Eof, loc));

        Ok(tokens)
    }

    /// Measure the indentation of a fresh line and emit Indent/Dedent tokens.
    ///
    /// Returns `false` when the line is blank or comment-only and was skipped.
    fn handle_indentation(&mut self, tokens: &mut Vec<Token>) -> Result<bool, LexError> {
        let mut width = 0;
        while let Some(ch) = self.peek() {
            match ch {
                ' ' => width += 1,
                '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                '\x0c' => width = 0,
                _ => break,
            }
            self.advance();
        }

        match self.peek() {
            None => return Ok(false),
            Some('\n') | Some('\r') | Some('#') => {
                self.skip_comment();
                if self.peek() == Some('\n') {
                    self.advance();
                }
                self.at_line_start = true;
                return Ok(false);
            }
            _ => {}
        }

        let loc = self.current_location();
        let current = *self.indent_stack.last().unwrap_or(&0);

        if width > current {
            if tokens.is_empty() {
                return Err(LexError::indentation("unexpected indent", loc));
            }
            self.indent_stack.push(width);
            tokens.push(Token::new(TokenKind::Indent, loc));
        } else if width < current {
            while self.indent_stack.last().is_some_and(|&w| w > width) {
                self.indent_stack.pop();
                tokens.push(Token::new(TokenKind::Dedent, loc));
            }
            if self.indent_stack.last() != Some(&width) {
                return Err(LexError::indentation(
                    "unindent does not match any outer indentation level",
                    loc,
                ));
            }
        }

        Ok(true)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self
            .advance()
            .ok_or_else(|| LexError::syntax("unexpected end of file", loc))?;

        let kind = match ch {
            '"' | '\'' => self.string_literal(ch, false, loc)?,

            '0'..='9' => self.number_literal(ch, loc)?,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, loc)?
            }

            c if c.is_alphabetic() || c == '_' => {
                let ident = self.identifier(c);
                match self.peek() {
                    Some(q @ ('"' | '\'')) if is_string_prefix(&ident) => {
                        self.advance();
                        let lower = ident.to_ascii_lowercase();
                        let raw = lower.contains('r');
                        if lower.contains('f') {
                            let body = self.raw_string_body(q, loc)?;
                            TokenKind::FString { body, raw }
                        } else {
                            self.string_literal(q, raw, loc)?
                        }
                    }
                    _ => keyword_or_name(ident),
                }
            }

            '+' => self.with_eq(TokenKind::Plus, TokenKind::PlusEq),
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    self.with_eq(TokenKind::Minus, TokenKind::MinusEq)
                }
            }
            '*' => {
                if self.peek() == Some('*') {
                    self.advance();
                    self.with_eq(TokenKind::DoubleStar, TokenKind::DoubleStarEq)
                } else {
                    self.with_eq(TokenKind::Star, TokenKind::StarEq)
                }
            }
            '/' => {
                if self.peek() == Some('/') {
                    self.advance();
                    self.with_eq(TokenKind::DoubleSlash, TokenKind::DoubleSlashEq)
                } else {
                    self.with_eq(TokenKind::Slash, TokenKind::SlashEq)
                }
            }
            '%' => self.with_eq(TokenKind::Percent, TokenKind::PercentEq),
            '=' => self.with_eq(TokenKind::Eq, TokenKind::EqEq),
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    return Err(LexError::syntax("invalid syntax", loc));
                }
            }
            '<' => self.with_eq(TokenKind::Lt, TokenKind::Le),
            '>' => self.with_eq(TokenKind::Gt, TokenKind::Ge),
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '(' | '[' | '{' => {
                self.bracket_depth += 1;
                match ch {
                    '(' => TokenKind::LParen,
                    '[' => TokenKind::LBracket,
                    _ => TokenKind::LBrace,
                }
            }
            ')' | ']' | '}' => {
                if self.bracket_depth == 0 {
                    return Err(LexError::syntax(format!("unmatched '{}'", ch), loc));
                }
                self.bracket_depth -= 1;
                match ch {
                    ')' => TokenKind::RParen,
                    ']' => TokenKind::RBracket,
                    _ => TokenKind::RBrace,
                }
            }

            _ => {
                return Err(LexError::syntax(
                    format!("invalid character '{}' (U+{:04X})", ch, ch as u32),
                    loc,
                ));
            }
        };

        Ok(Token::new(kind, loc))
    }

    /// Consume a trailing `=` if present, choosing between the two kinds
    fn with_eq(&mut self, plain: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.peek() == Some('=') {
            self.advance();
            with_eq
        } else {
            plain
        }
    }

    /// Parse a string literal whose opening quote was already consumed
    fn string_literal(
        &mut self,
        quote: char,
        raw: bool,
        loc: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        let body = self.raw_string_body(quote, loc)?;
        if raw {
            Ok(TokenKind::Str(body))
        } else {
            Ok(TokenKind::Str(unescape(&body)))
        }
    }

    /// Collect the body of a string up to its closing quote, escapes untouched
    fn raw_string_body(&mut self, quote: char, loc: SourceLocation) -> Result<String, LexError> {
        let triple = self.peek() == Some(quote) && self.peek_ahead(1) == Some(quote);
        if triple {
            self.advance();
            self.advance();
        }

        let mut body = String::new();
        loop {
            let Some(ch) = self.peek() else {
                let message = if triple {
                    "unterminated triple-quoted string literal"
                } else {
                    "unterminated string literal"
                };
                return Err(LexError::syntax(message, loc));
            };

            if ch == '\\' {
                self.advance();
                body.push('\\');
                if let Some(next) = self.advance() {
                    body.push(next);
                }
                continue;
            }

            if ch == quote {
                if !triple {
                    self.advance();
                    return Ok(body);
                }
                if self.peek_ahead(1) == Some(quote) && self.peek_ahead(2) == Some(quote) {
                    self.advance();
                    self.advance();
                    self.advance();
                    return Ok(body);
                }
            }

            if ch == '\n' && !triple {
                return Err(LexError::syntax("unterminated string literal", loc));
            }

            body.push(ch);
            self.advance();
        }
    }

    /// Parse numeric literal (int or float, `_` separators allowed)
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut text = String::new();
        text.push(first);
        let mut is_float = first == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '_' {
                text.push(ch);
            } else if ch == '.' && !is_float {
                is_float = true;
                text.push(ch);
            } else if (ch == 'e' || ch == 'E')
                && (self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
                    || (matches!(self.peek_ahead(1), Some('+') | Some('-'))
                        && self.peek_ahead(2).is_some_and(|c| c.is_ascii_digit())))
            {
                is_float = true;
                text.push(ch);
                self.advance();
                if let Some(sign) = self.peek().filter(|c| *c == '+' || *c == '-') {
                    text.push(sign);
                    self.advance();
                }
                continue;
            } else {
                break;
            }
            self.advance();
        }

        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return Err(LexError::syntax("invalid decimal literal", loc));
        }

        let cleaned: String = text.chars().filter(|c| *c != '_').collect();
        if is_float {
            cleaned
                .parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| LexError::syntax(format!("invalid float literal: {}", text), loc))
        } else {
            if cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.chars().any(|c| c != '0') {
                return Err(LexError::syntax(
                    "leading zeros in decimal integer literals are not permitted",
                    loc,
                ));
            }
            cleaned
                .parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|_| LexError::syntax(format!("integer literal too large: {}", text), loc))
        }
    }

    /// Parse an identifier (keywords are resolved by the caller)
    fn identifier(&mut self, first_char: char) -> String {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        ident
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\x0c') = self.peek() {
            self.advance();
        }
    }

    /// Skip to (but not past) the end of the current line
    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn is_string_prefix(ident: &str) -> bool {
    matches!(
        ident.to_ascii_lowercase().as_str(),
        "r" | "f" | "rf" | "fr" | "u"
    )
}

fn keyword_or_name(ident: String) -> TokenKind {
    match ident.as_str() {
        "True" => TokenKind::True,
        "False" => TokenKind::False,
        "None" => TokenKind::None,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "def" => TokenKind::Def,
        "return" => TokenKind::Return,
        "class" => TokenKind::Class,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "pass" => TokenKind::Pass,
        "del" => TokenKind::Del,
        "global" => TokenKind::Global,
        "assert" => TokenKind::Assert,
        "raise" => TokenKind::Raise,
        _ => TokenKind::Name(ident),
    }
}

/// Resolve backslash escapes; unknown escapes keep their backslash
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_statement() {
        let tokens = kinds("x = 1\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Name("x".to_string()),
                TokenKind::Eq,
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_indent_and_dedent() {
        let tokens = kinds("for i in xs:\n    print(i)\nx = 2");
        assert!(tokens.contains(&TokenKind::Indent));
        assert!(tokens.contains(&TokenKind::Dedent));
        let indent = tokens.iter().position(|t| *t == TokenKind::Indent).unwrap();
        assert_eq!(tokens[indent - 1], TokenKind::Newline);
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let tokens = kinds("x = 1\n\n   # note\n\ny = 2\n");
        let newlines = tokens.iter().filter(|t| **t == TokenKind::Newline).count();
        assert_eq!(newlines, 2);
        assert!(!tokens.contains(&TokenKind::Indent));
    }

    #[test]
    fn test_brackets_join_lines() {
        let tokens = kinds("xs = [1,\n      2]\n");
        let newlines = tokens.iter().filter(|t| **t == TokenKind::Newline).count();
        assert_eq!(newlines, 1);
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("a //= b ** c != d -> e");
        assert_eq!(tokens[1], TokenKind::DoubleSlashEq);
        assert_eq!(tokens[3], TokenKind::DoubleStar);
        assert_eq!(tokens[5], TokenKind::NotEq);
        assert_eq!(tokens[7], TokenKind::Arrow);
    }

    #[test]
    fn test_string_literals() {
        let tokens = kinds(r#"s = 'it\'s' + "a\tb" + r"\n""#);
        assert_eq!(tokens[2], TokenKind::Str("it's".to_string()));
        assert_eq!(tokens[4], TokenKind::Str("a\tb".to_string()));
        assert_eq!(tokens[6], TokenKind::Str("\\n".to_string()));
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let mut lexer = Lexer::new("s = \"\"\"one\ntwo\"\"\"\nx = 1");
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Str("one\ntwo".to_string()));
        assert_eq!(tokens[4].location.line, 3);
    }

    #[test]
    fn test_fstring_keeps_raw_body() {
        let tokens = kinds("f\"hi {name}\\n\"");
        assert_eq!(
            tokens[0],
            TokenKind::FString {
                body: "hi {name}\\n".to_string(),
                raw: false
            }
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("1_000 2.5 .5 1e3");
        assert_eq!(tokens[0], TokenKind::Int(1000));
        assert_eq!(tokens[1], TokenKind::Float(2.5));
        assert_eq!(tokens[2], TokenKind::Float(0.5));
        assert_eq!(tokens[3], TokenKind::Float(1000.0));
    }

    #[test]
    fn test_bad_dedent_is_indentation_error() {
        let err = Lexer::new("if x:\n        y = 1\n    z = 2\n")
            .tokenize()
            .unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Indentation);
        assert_eq!(err.location.line, 3);
    }

    #[test]
    fn test_unexpected_indent() {
        let err = Lexer::new("  x = 1").tokenize().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Indentation);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("s = 'abc\n").tokenize().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Syntax);
        assert!(err.message.contains("unterminated"));
    }
}
