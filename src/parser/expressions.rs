//! Expression parsing implementation
//!
//! Recursive descent, one method per precedence level, loosest first:
//!
//! | Level        | Forms                                         |
//! |--------------|-----------------------------------------------|
//! | conditional  | `a if c else b`                               |
//! | or / and     | short-circuit boolean operators               |
//! | not          | `not x`                                       |
//! | comparison   | `== != < <= > >= in not in is is not`, chained|
//! | arith / term | `+ -` then `* / // %`                         |
//! | factor       | unary `- +`                                   |
//! | power        | `**` (right-associative, binds tighter than unary on its left) |
//! | postfix      | calls, subscripts and slices, attributes      |
//! | atom         | literals, names, displays, comprehensions     |
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{unescape, TokenKind};
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point, no bare tuples)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_conditional()
    }

    /// Parse `expr (, expr)* [,]`, producing a tuple when a comma is present
    pub(crate) fn parse_expression_list(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        let first = self.parse_expression()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.match_token(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.parse_expression()?);
        }
        Ok(Expr::Tuple(items, location))
    }

    /// Whether the current token can begin an expression
    fn starts_expression(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::FString { .. }
                | TokenKind::Name(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::None
                | TokenKind::Not
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
        )
    }

    /// Parse conditional expression: value if condition else other
    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        let then_value = self.parse_or()?;

        if !self.match_token(&TokenKind::If) {
            return Ok(then_value);
        }

        let condition = self.parse_or()?;
        self.expect_token(&TokenKind::Else, "expected 'else' in conditional expression")?;
        let else_value = self.parse_conditional()?;

        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then_value: Box::new(then_value),
            else_value: Box::new(else_value),
            location,
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&TokenKind::Or) {
            let location = self.current_location();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Logical {
                op: BoolOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;

        while self.check(&TokenKind::And) {
            let location = self.current_location();
            self.advance();
            let right = self.parse_not()?;
            left = Expr::Logical {
                op: BoolOp::And,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Not) {
            let location = self.current_location();
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnOp::Not,
                operand: Box::new(operand),
                location,
            });
        }
        self.parse_comparison()
    }

    /// Parse a comparison chain; `a < b < c` keeps every operator and operand
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        let left = self.parse_arith()?;
        let mut comparisons = Vec::new();

        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => CmpOp::Eq,
                TokenKind::NotEq => CmpOp::Ne,
                TokenKind::Lt => CmpOp::Lt,
                TokenKind::Le => CmpOp::Le,
                TokenKind::Gt => CmpOp::Gt,
                TokenKind::Ge => CmpOp::Ge,
                TokenKind::In => CmpOp::In,
                TokenKind::Not if self.check_ahead(1, &TokenKind::In) => {
                    self.advance();
                    CmpOp::NotIn
                }
                TokenKind::Is if self.check_ahead(1, &TokenKind::Not) => {
                    self.advance();
                    CmpOp::IsNot
                }
                TokenKind::Is => CmpOp::Is,
                _ => break,
            };
            self.advance();
            comparisons.push((op, self.parse_arith()?));
        }

        if comparisons.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare {
                left: Box::new(left),
                comparisons,
                location,
            })
        }
    }

    fn parse_arith(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let location = self.current_location();
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::DoubleSlash => BinOp::FloorDiv,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let location = self.current_location();
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location,
            };
        }

        Ok(left)
    }

    /// Parse unary plus/minus
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Plus => Some(UnOp::Pos),
            _ => None,
        };

        let Some(op) = op else {
            return self.parse_power();
        };

        let location = self.current_location();
        self.advance();
        let operand = self.parse_factor()?;

        // Fold negative literals so `-5` is a constant
        if op == UnOp::Neg {
            match operand {
                Expr::Int(n, _) if n != i64::MIN => return Ok(Expr::Int(-n, location)),
                Expr::Float(x, _) => return Ok(Expr::Float(-x, location)),
                _ => {}
            }
        }

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            location,
        })
    }

    /// Parse `postfix ** factor`; `-2 ** 2` is `-(2 ** 2)`
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_postfix()?;

        if !self.check(&TokenKind::DoubleStar) {
            return Ok(base);
        }

        let location = self.current_location();
        self.advance();
        let exponent = self.parse_factor()?;
        Ok(Expr::Binary {
            op: BinOp::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
            location,
        })
    }

    /// Parse calls, subscripts and attribute access trailing an atom
    pub(crate) fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;

        loop {
            let location = self.current_location();
            match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let (args, keywords) = self.parse_call_arguments()?;
                    expr = Expr::Call {
                        func: Box::new(expr),
                        args,
                        keywords,
                        location,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_subscript()?;
                    self.expect_token(&TokenKind::RBracket, "expected ']' after subscript")?;
                    expr = Expr::Subscript {
                        object: Box::new(expr),
                        index: Box::new(index),
                        location,
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_name()?;
                    expr = Expr::Attribute {
                        object: Box::new(expr),
                        name,
                        location,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Parse call arguments after `(`, consuming the closing `)`
    fn parse_call_arguments(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), ParseError> {
        let mut args = Vec::new();
        let mut keywords: Vec<(String, Expr)> = Vec::new();

        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::Star) || self.check(&TokenKind::DoubleStar) {
                return Err(ParseError::syntax(
                    "argument unpacking with '*' is not supported",
                    self.current_location(),
                ));
            }

            let is_keyword = matches!(self.peek_kind(), TokenKind::Name(_))
                && self.check_ahead(1, &TokenKind::Eq);

            if is_keyword {
                let location = self.current_location();
                let name = self.expect_name()?;
                self.advance();
                if keywords.iter().any(|(k, _)| *k == name) {
                    return Err(ParseError::syntax(
                        format!("keyword argument repeated: {}", name),
                        location,
                    ));
                }
                keywords.push((name, self.parse_expression()?));
            } else {
                if !keywords.is_empty() {
                    return Err(ParseError::syntax(
                        "positional argument follows keyword argument",
                        self.current_location(),
                    ));
                }
                let arg = self.parse_expression()?;
                if self.check(&TokenKind::For) {
                    // Generator argument: `sum(x * x for x in xs)`
                    let comp = self.parse_comprehension_tail(arg)?;
                    args.push(comp);
                    if !self.check(&TokenKind::RParen) {
                        return Err(ParseError::syntax(
                            "generator expression must be parenthesized",
                            self.current_location(),
                        ));
                    }
                    break;
                }
                args.push(arg);
            }

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RParen, "expected ')' after arguments")?;
        Ok((args, keywords))
    }

    /// Parse the inside of `[...]`: an index, a slice, or a tuple of indices
    fn parse_subscript(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        let first = self.parse_slice_item()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.match_token(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.parse_slice_item()?);
        }
        Ok(Expr::Tuple(items, location))
    }

    fn parse_slice_item(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            let expr = self.parse_expression()?;
            if !self.check(&TokenKind::Colon) {
                return Ok(expr);
            }
            Some(Box::new(expr))
        };

        self.advance();
        let upper = self.parse_optional_slice_bound()?;
        let step = if self.match_token(&TokenKind::Colon) {
            self.parse_optional_slice_bound()?
        } else {
            None
        };

        Ok(Expr::Slice {
            lower,
            upper,
            step,
            location,
        })
    }

    fn parse_optional_slice_bound(&mut self) -> Result<Option<Box<Expr>>, ParseError> {
        if matches!(
            self.peek_kind(),
            TokenKind::Colon | TokenKind::RBracket | TokenKind::Comma
        ) {
            Ok(None)
        } else {
            Ok(Some(Box::new(self.parse_expression()?)))
        }
    }

    /// Parse primary expression (literals, names, parenthesized and display forms)
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();

        match self.peek_kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Int(n, location))
            }
            TokenKind::Float(x) => {
                self.advance();
                Ok(Expr::Float(x, location))
            }
            TokenKind::Str(_) | TokenKind::FString { .. } => self.parse_string_atom(),
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true, location))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false, location))
            }
            TokenKind::None => {
                self.advance();
                Ok(Expr::None(location))
            }
            TokenKind::Name(name) => {
                if name == "lambda" || name == "yield" || name == "await" {
                    return Err(ParseError::syntax(
                        format!("'{}' expressions are not supported", name),
                        location,
                    ));
                }
                self.advance();
                Ok(Expr::Name(name, location))
            }
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::LBracket => self.parse_list_display(),
            TokenKind::LBrace => self.parse_dict_display(),
            _ => Err(self.unexpected()),
        }
    }

    /// Parse one or more adjacent string literals, concatenating them
    fn parse_string_atom(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        let mut parts: Vec<FStringPart> = Vec::new();
        let mut has_interpolation = false;

        loop {
            match self.peek_kind().clone() {
                TokenKind::Str(s) => {
                    self.advance();
                    push_literal(&mut parts, s);
                }
                TokenKind::FString { body, raw } => {
                    let token_location = self.current_location();
                    self.advance();
                    for part in parse_fstring_body(&body, raw, token_location)? {
                        match part {
                            FStringPart::Literal(s) => push_literal(&mut parts, s),
                            interpolation => {
                                has_interpolation = true;
                                parts.push(interpolation);
                            }
                        }
                    }
                }
                _ => break,
            }
        }

        if has_interpolation {
            return Ok(Expr::FString(parts, location));
        }

        let text = parts
            .into_iter()
            .map(|part| match part {
                FStringPart::Literal(s) => s,
                FStringPart::Interpolation { .. } => String::new(),
            })
            .collect();
        Ok(Expr::Str(text, location))
    }

    /// Parse `( ... )`: grouping, tuple, or generator (evaluated eagerly as a list)
    fn parse_parenthesized(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        self.advance();

        if self.match_token(&TokenKind::RParen) {
            return Ok(Expr::Tuple(Vec::new(), location));
        }

        let first = self.parse_expression()?;

        if self.check(&TokenKind::For) {
            let comp = self.parse_comprehension_tail(first)?;
            self.expect_token(&TokenKind::RParen, "expected ')'")?;
            return Ok(comp);
        }

        if self.match_token(&TokenKind::RParen) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.match_token(&TokenKind::Comma) {
            if self.check(&TokenKind::RParen) {
                break;
            }
            items.push(self.parse_expression()?);
        }
        self.expect_token(&TokenKind::RParen, "expected ')'")?;
        Ok(Expr::Tuple(items, location))
    }

    /// Parse `[ ... ]`: list literal or list comprehension
    fn parse_list_display(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        self.advance();

        if self.match_token(&TokenKind::RBracket) {
            return Ok(Expr::List(Vec::new(), location));
        }

        let first = self.parse_expression()?;

        if self.check(&TokenKind::For) {
            let comp = self.parse_comprehension_tail(first)?;
            self.expect_token(&TokenKind::RBracket, "expected ']'")?;
            return Ok(comp);
        }

        let mut items = vec![first];
        while self.match_token(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.parse_expression()?);
        }
        self.expect_token(&TokenKind::RBracket, "expected ']'")?;
        Ok(Expr::List(items, location))
    }

    /// Parse `for target in iterable [if condition]` after a comprehension element
    fn parse_comprehension_tail(&mut self, element: Expr) -> Result<Expr, ParseError> {
        let location = element.location();
        self.expect_token(&TokenKind::For, "expected 'for'")?;
        let target = self.parse_target_list()?;
        self.expect_token(&TokenKind::In, "expected 'in' in comprehension")?;
        let iter = self.parse_or()?;
        let condition = if self.match_token(&TokenKind::If) {
            Some(Box::new(self.parse_or()?))
        } else {
            None
        };

        if self.check(&TokenKind::For) || self.check(&TokenKind::If) {
            return Err(ParseError::syntax(
                "comprehensions with more than one 'for' or 'if' clause are not supported",
                self.current_location(),
            ));
        }

        Ok(Expr::ListComp {
            element: Box::new(element),
            target: Box::new(target),
            iter: Box::new(iter),
            condition,
            location,
        })
    }

    /// Parse `{ key: value, ... }`
    fn parse_dict_display(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        self.advance();
        let mut entries = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            let key = self.parse_expression()?;
            if !self.match_token(&TokenKind::Colon) {
                return Err(ParseError::syntax(
                    "set literals and dict comprehensions are not supported",
                    self.current_location(),
                ));
            }
            let value = self.parse_expression()?;
            entries.push((key, value));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RBrace, "expected '}'")?;
        Ok(Expr::Dict(entries, location))
    }
}

fn push_literal(parts: &mut Vec<FStringPart>, text: String) {
    if let Some(FStringPart::Literal(last)) = parts.last_mut() {
        last.push_str(&text);
    } else {
        parts.push(FStringPart::Literal(text));
    }
}

/// Split an f-string body into literal text and `{expr[!r|!s][:spec]}` fields
fn parse_fstring_body(
    body: &str,
    raw: bool,
    location: SourceLocation,
) -> Result<Vec<FStringPart>, ParseError> {
    let chars: Vec<char> = body.chars().collect();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    let finish_literal = |literal: &mut String, parts: &mut Vec<FStringPart>| {
        if !literal.is_empty() {
            let text = if raw {
                std::mem::take(literal)
            } else {
                unescape(&std::mem::take(literal))
            };
            parts.push(FStringPart::Literal(text));
        }
    };

    while i < chars.len() {
        match chars[i] {
            '{' if chars.get(i + 1) == Some(&'{') => {
                literal.push('{');
                i += 2;
            }
            '}' if chars.get(i + 1) == Some(&'}') => {
                literal.push('}');
                i += 2;
            }
            '}' => {
                return Err(ParseError::syntax(
                    "f-string: single '}' is not allowed",
                    location,
                ));
            }
            '{' => {
                finish_literal(&mut literal, &mut parts);
                let (field, next) = scan_field(&chars, i + 1, location)?;
                parts.push(parse_field(&field, location)?);
                i = next;
            }
            ch => {
                literal.push(ch);
                i += 1;
            }
        }
    }
    finish_literal(&mut literal, &mut parts);

    Ok(parts)
}

/// Collect the text of a replacement field up to its matching `}`
fn scan_field(
    chars: &[char],
    start: usize,
    location: SourceLocation,
) -> Result<(String, usize), ParseError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut field = String::new();
    let mut i = start;

    while i < chars.len() {
        let ch = chars[i];
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '}' if depth == 0 => return Ok((field, i + 1)),
                '}' => depth -= 1,
                _ => {}
            },
        }
        field.push(ch);
        i += 1;
    }

    Err(ParseError::syntax("f-string: expecting '}'", location))
}

/// Parse the text between braces into an interpolation part
fn parse_field(field: &str, location: SourceLocation) -> Result<FStringPart, ParseError> {
    let (expr_text, conversion, spec) = split_field(field);

    if expr_text.trim().is_empty() {
        return Err(ParseError::syntax(
            "f-string: empty expression not allowed",
            location,
        ));
    }

    let mut parser = Parser::new(expr_text.trim())?;
    for token in &mut parser.tokens {
        token.location.line += location.line.saturating_sub(1);
    }
    let mut expr = parser.parse_expression_list()?;
    while parser.match_token(&TokenKind::Newline) {}
    if !parser.is_at_end() {
        return Err(ParseError::syntax("f-string: invalid syntax", location));
    }

    if let Some(conversion) = conversion {
        let func = match conversion {
            'r' => "repr",
            's' => "str",
            other => {
                return Err(ParseError::syntax(
                    format!("f-string: invalid conversion character '{}'", other),
                    location,
                ));
            }
        };
        expr = Expr::Call {
            func: Box::new(Expr::Name(func.to_string(), location)),
            args: vec![expr],
            keywords: Vec::new(),
            location,
        };
    }

    Ok(FStringPart::Interpolation {
        expr: Box::new(expr),
        spec: spec.map(str::to_string),
    })
}

/// Split `expr!c:spec` at the first top-level `!` (not `!=`) and `:`
fn split_field(field: &str) -> (&str, Option<char>, Option<&str>) {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let bytes: Vec<(usize, char)> = field.char_indices().collect();

    for (pos, &(idx, ch)) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '!' if depth == 0 && bytes.get(pos + 1).map(|&(_, c)| c) != Some('=') => {
                let conversion = bytes.get(pos + 1).map(|&(_, c)| c);
                let rest_start = bytes.get(pos + 2).map(|&(i, _)| i).unwrap_or(field.len());
                let spec = field[rest_start..].strip_prefix(':');
                return (&field[..idx], conversion, spec);
            }
            ':' if depth == 0 => return (&field[..idx], None, Some(&field[idx + 1..])),
            _ => {}
        }
    }

    (field, None, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(source: &str) -> Expr {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_expression_list().unwrap()
    }

    #[test]
    fn test_precedence() {
        match expr("1 + 2 * 3") {
            Expr::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("Expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_power_binds_tighter_than_unary_minus() {
        match expr("-2 ** 2") {
            Expr::Unary { op: UnOp::Neg, operand, .. } => {
                assert!(matches!(*operand, Expr::Binary { op: BinOp::Pow, .. }));
            }
            other => panic!("Expected negation, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_literal_folds() {
        assert!(matches!(expr("-5"), Expr::Int(-5, _)));
    }

    #[test]
    fn test_comparison_chain() {
        match expr("a < b <= c") {
            Expr::Compare { comparisons, .. } => {
                assert_eq!(comparisons.len(), 2);
                assert_eq!(comparisons[1].0, CmpOp::Le);
            }
            other => panic!("Expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_not_in_and_is_not() {
        match expr("x not in xs") {
            Expr::Compare { comparisons, .. } => assert_eq!(comparisons[0].0, CmpOp::NotIn),
            other => panic!("Expected comparison, got {:?}", other),
        }
        match expr("x is not None") {
            Expr::Compare { comparisons, .. } => assert_eq!(comparisons[0].0, CmpOp::IsNot),
            other => panic!("Expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_conditional_expression() {
        assert!(matches!(expr("a if c else b"), Expr::Conditional { .. }));
    }

    #[test]
    fn test_call_with_keywords() {
        match expr("print(a, b, sep='-')") {
            Expr::Call { args, keywords, .. } => {
                assert_eq!(args.len(), 2);
                assert_eq!(keywords[0].0, "sep");
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_method_call_on_literal() {
        match expr("', '.join(names)") {
            Expr::Call { func, .. } => {
                assert!(matches!(*func, Expr::Attribute { ref name, .. } if name == "join"));
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_slices() {
        match expr("xs[1:]") {
            Expr::Subscript { index, .. } => {
                assert!(matches!(*index, Expr::Slice { lower: Some(_), upper: None, step: None, .. }));
            }
            other => panic!("Expected subscript, got {:?}", other),
        }
        match expr("xs[::-1]") {
            Expr::Subscript { index, .. } => {
                assert!(matches!(*index, Expr::Slice { lower: None, upper: None, step: Some(_), .. }));
            }
            other => panic!("Expected subscript, got {:?}", other),
        }
    }

    #[test]
    fn test_list_comprehension() {
        match expr("[x * x for x in xs if x > 0]") {
            Expr::ListComp { condition, .. } => assert!(condition.is_some()),
            other => panic!("Expected comprehension, got {:?}", other),
        }
    }

    #[test]
    fn test_generator_argument() {
        match expr("sum(x for x in xs)") {
            Expr::Call { args, .. } => assert!(matches!(args[0], Expr::ListComp { .. })),
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_tuples() {
        assert!(matches!(expr("()"), Expr::Tuple(ref items, _) if items.is_empty()));
        assert!(matches!(expr("(1,)"), Expr::Tuple(ref items, _) if items.len() == 1));
        assert!(matches!(expr("(1)"), Expr::Int(1, _)));
        assert!(matches!(expr("1, 2"), Expr::Tuple(ref items, _) if items.len() == 2));
    }

    #[test]
    fn test_dict_display() {
        assert!(matches!(expr("{'a': 1, 'b': 2}"), Expr::Dict(ref entries, _) if entries.len() == 2));
        assert!(matches!(expr("{}"), Expr::Dict(ref entries, _) if entries.is_empty()));
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        assert!(matches!(expr("'ab' 'cd'"), Expr::Str(ref s, _) if s == "abcd"));
    }

    #[test]
    fn test_fstring_parts() {
        match expr("f'{name!r} has {n:>3} items {{ok}}'") {
            Expr::FString(parts, _) => {
                assert_eq!(parts.len(), 4);
                match &parts[0] {
                    FStringPart::Interpolation { expr, spec } => {
                        assert!(matches!(**expr, Expr::Call { .. }));
                        assert!(spec.is_none());
                    }
                    other => panic!("Expected interpolation, got {:?}", other),
                }
                match &parts[2] {
                    FStringPart::Interpolation { spec, .. } => {
                        assert_eq!(spec.as_deref(), Some(">3"));
                    }
                    other => panic!("Expected interpolation, got {:?}", other),
                }
                assert!(matches!(&parts[3], FStringPart::Literal(s) if s == " items {ok}"));
            }
            other => panic!("Expected f-string, got {:?}", other),
        }
    }

    #[test]
    fn test_fstring_keeps_not_equal_operator() {
        match expr("f'{a != b}'") {
            Expr::FString(parts, _) => match &parts[0] {
                FStringPart::Interpolation { expr, .. } => {
                    assert!(matches!(**expr, Expr::Compare { .. }));
                }
                other => panic!("Expected interpolation, got {:?}", other),
            },
            other => panic!("Expected f-string, got {:?}", other),
        }
    }

    #[test]
    fn test_lambda_is_rejected() {
        let mut parser = Parser::new("lambda x: x").unwrap();
        assert!(parser.parse_expression().is_err());
    }
}
