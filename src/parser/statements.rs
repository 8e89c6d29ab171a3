//! Statement parsing implementation
//!
//! Handles compound statements that own an indented block (`if`/`elif`/`else`,
//! `while`, `for`, `def`, `class`) and the simple statements that fit on one
//! logical line (assignments, `return`, `del`, `global`, `assert`, `raise`, ...).
//!
//! `elif` is parsed as an `if` nested in the `else` branch of its parent, so
//! each `elif` line is a statement of its own for step attribution.

use std::rc::Rc;

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// Statement keywords of the full language that the guest subset rejects
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "import", "from", "try", "except", "finally", "with", "lambda", "yield", "async", "await",
    "nonlocal", "match",
];

impl Parser {
    /// Parse one statement line; simple statements joined by `;` yield several
    pub(crate) fn parse_statement(&mut self) -> Result<Vec<Stmt>, ParseError> {
        match self.peek_kind() {
            TokenKind::If => Ok(vec![self.parse_if()?]),
            TokenKind::While => Ok(vec![self.parse_while()?]),
            TokenKind::For => Ok(vec![self.parse_for()?]),
            TokenKind::Def => Ok(vec![self.parse_function_definition()?]),
            TokenKind::Class => Ok(vec![self.parse_class_definition()?]),
            TokenKind::Elif | TokenKind::Else | TokenKind::Indent => Err(self.unexpected()),
            TokenKind::Name(name) if UNSUPPORTED_KEYWORDS.contains(&name.as_str()) => {
                let name = name.clone();
                if self.check_ahead(1, &TokenKind::Eq) || self.check_ahead(1, &TokenKind::LParen) {
                    return self.parse_simple_statements();
                }
                Err(ParseError::syntax(
                    format!("'{}' statements are not supported", name),
                    self.current_location(),
                ))
            }
            _ => self.parse_simple_statements(),
        }
    }

    /// Parse the block following a `:`, either indented or on the same line
    fn parse_block(&mut self, owner: &str, owner_line: usize) -> Result<Vec<Stmt>, ParseError> {
        if !self.match_token(&TokenKind::Newline) {
            return self.parse_simple_statements();
        }

        if !self.match_token(&TokenKind::Indent) {
            return Err(ParseError::indentation(
                format!(
                    "expected an indented block after '{}' statement on line {}",
                    owner, owner_line
                ),
                self.current_location(),
            ));
        }

        let mut body = Vec::new();
        while !self.check(&TokenKind::Dedent) && !self.is_at_end() {
            body.extend(self.parse_statement()?);
        }
        self.match_token(&TokenKind::Dedent);

        Ok(body)
    }

    fn expect_colon(&mut self) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::Colon, "expected ':'")
    }

    /// Parse `if`/`elif` with its trailing `elif`/`else` chain
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        let keyword = if self.check(&TokenKind::Elif) { "elif" } else { "if" };
        self.advance();

        let condition = self.parse_expression()?;
        self.expect_colon()?;
        let body = self.parse_block(keyword, location.line)?;

        let orelse = if self.check(&TokenKind::Elif) {
            vec![self.parse_if()?]
        } else if self.check(&TokenKind::Else) {
            let else_line = self.current_location().line;
            self.advance();
            self.expect_colon()?;
            self.parse_block("else", else_line)?
        } else {
            Vec::new()
        };

        Ok(Stmt::If {
            condition,
            body,
            orelse,
            location,
        })
    }

    fn parse_loop_body(&mut self, owner: &str, line: usize) -> Result<Vec<Stmt>, ParseError> {
        self.loop_depth += 1;
        let body = self.parse_block(owner, line);
        self.loop_depth -= 1;
        body
    }

    fn parse_loop_else(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if !self.check(&TokenKind::Else) {
            return Ok(Vec::new());
        }
        let else_line = self.current_location().line;
        self.advance();
        self.expect_colon()?;
        self.parse_block("else", else_line)
    }

    /// Parse `while condition: block [else: block]`
    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance();

        let condition = self.parse_expression()?;
        self.expect_colon()?;
        let body = self.parse_loop_body("while", location.line)?;
        let orelse = self.parse_loop_else()?;

        Ok(Stmt::While {
            condition,
            body,
            orelse,
            location,
        })
    }

    /// Parse `for target in iterable: block [else: block]`
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance();

        let target = self.parse_target_list()?;
        self.expect_token(&TokenKind::In, "expected 'in' after for-loop target")?;
        let iter = self.parse_expression_list()?;
        self.expect_colon()?;
        let body = self.parse_loop_body("for", location.line)?;
        let orelse = self.parse_loop_else()?;

        Ok(Stmt::For {
            target,
            iter,
            body,
            orelse,
            location,
        })
    }

    /// Parse function definition: def name(params) [-> annotation]: block
    fn parse_function_definition(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance();

        let name = self.expect_name()?;
        self.expect_token(&TokenKind::LParen, "expected '(' after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_token(&TokenKind::RParen, "expected ')' after parameters")?;

        if self.match_token(&TokenKind::Arrow) {
            // Return annotations are accepted and ignored
            self.parse_expression()?;
        }
        self.expect_colon()?;

        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let body = self.parse_block("def", location.line);
        self.function_depth -= 1;
        self.loop_depth = saved_loop_depth;

        Ok(Stmt::FunctionDef(Rc::new(FunctionDecl {
            name,
            params,
            body: body?,
            location,
        })))
    }

    /// Parse parameter list: name[: annotation][= default], ...
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params: Vec<Param> = Vec::new();

        while !self.check(&TokenKind::RParen) {
            let param_location = self.current_location();
            let name = self.expect_name()?;

            if params.iter().any(|p| p.name == name) {
                return Err(ParseError::syntax(
                    format!("duplicate argument '{}' in function definition", name),
                    param_location,
                ));
            }

            if self.match_token(&TokenKind::Colon) {
                self.parse_expression()?;
            }

            let default = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                if params.iter().any(|p| p.default.is_some()) {
                    return Err(ParseError::syntax(
                        "non-default argument follows default argument",
                        param_location,
                    ));
                }
                None
            };

            params.push(Param { name, default });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse class definition: class Name[(Base)]: block
    fn parse_class_definition(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();
        self.advance();

        let name = self.expect_name()?;
        let mut base = None;
        if self.match_token(&TokenKind::LParen) {
            if !self.check(&TokenKind::RParen) {
                base = Some(self.parse_expression()?);
            }
            self.expect_token(&TokenKind::RParen, "expected ')' after base class")?;
        }
        self.expect_colon()?;

        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        let saved_function_depth = std::mem::replace(&mut self.function_depth, 0);
        let body = self.parse_block("class", location.line);
        self.loop_depth = saved_loop_depth;
        self.function_depth = saved_function_depth;

        Ok(Stmt::ClassDef {
            name,
            base,
            body: body?,
            location,
        })
    }

    /// Parse `simple (; simple)* NEWLINE`
    fn parse_simple_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = vec![self.parse_simple_statement()?];

        while self.match_token(&TokenKind::Semicolon) {
            if self.check(&TokenKind::Newline) || self.is_at_end() {
                break;
            }
            statements.push(self.parse_simple_statement()?);
        }

        if !self.match_token(&TokenKind::Newline) && !self.is_at_end() {
            return Err(self.unexpected());
        }

        Ok(statements)
    }

    fn parse_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        let location = self.current_location();

        match self.peek_kind() {
            TokenKind::Pass => {
                self.advance();
                Ok(Stmt::Pass { location })
            }
            TokenKind::Break | TokenKind::Continue => {
                let is_break = self.check(&TokenKind::Break);
                self.advance();
                if self.loop_depth == 0 {
                    let keyword = if is_break { "break" } else { "continue" };
                    let message = if is_break {
                        format!("'{}' outside loop", keyword)
                    } else {
                        format!("'{}' not properly in loop", keyword)
                    };
                    return Err(ParseError::syntax(message, location));
                }
                if is_break {
                    Ok(Stmt::Break { location })
                } else {
                    Ok(Stmt::Continue { location })
                }
            }
            TokenKind::Return => {
                self.advance();
                if self.function_depth == 0 {
                    return Err(ParseError::syntax("'return' outside function", location));
                }
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression_list()?)
                };
                Ok(Stmt::Return { value, location })
            }
            TokenKind::Del => {
                self.advance();
                let mut targets = vec![self.parse_target()?];
                while self.match_token(&TokenKind::Comma) {
                    targets.push(self.parse_target()?);
                }
                Ok(Stmt::Delete { targets, location })
            }
            TokenKind::Global => {
                self.advance();
                let mut names = vec![self.expect_name()?];
                while self.match_token(&TokenKind::Comma) {
                    names.push(self.expect_name()?);
                }
                Ok(Stmt::Global { names, location })
            }
            TokenKind::Assert => {
                self.advance();
                let condition = self.parse_expression()?;
                let message = if self.match_token(&TokenKind::Comma) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                Ok(Stmt::Assert {
                    condition,
                    message,
                    location,
                })
            }
            TokenKind::Raise => {
                self.advance();
                let exception = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                Ok(Stmt::Raise {
                    exception,
                    location,
                })
            }
            _ => self.parse_expression_statement(location),
        }
    }

    /// Parse an expression statement, plain assignment, or augmented assignment
    fn parse_expression_statement(&mut self, location: SourceLocation) -> Result<Stmt, ParseError> {
        let first = self.parse_expression_list()?;

        if self.check(&TokenKind::Eq) {
            let mut items = vec![first];
            while self.match_token(&TokenKind::Eq) {
                items.push(self.parse_expression_list()?);
            }
            let value = items.pop().ok_or_else(|| self.unexpected())?;
            for target in &items {
                Self::validate_target(target)?;
            }
            return Ok(Stmt::Assign {
                targets: items,
                value,
                location,
            });
        }

        let aug_op = match self.peek_kind() {
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            TokenKind::DoubleSlashEq => Some(BinOp::FloorDiv),
            TokenKind::PercentEq => Some(BinOp::Mod),
            TokenKind::DoubleStarEq => Some(BinOp::Pow),
            _ => None,
        };

        if let Some(op) = aug_op {
            self.advance();
            if !matches!(
                first,
                Expr::Name(..) | Expr::Attribute { .. } | Expr::Subscript { .. }
            ) {
                return Err(ParseError::syntax(
                    "'expression' is an illegal expression for augmented assignment",
                    first.location(),
                ));
            }
            let value = self.parse_expression_list()?;
            return Ok(Stmt::AugAssign {
                target: first,
                op,
                value,
                location,
            });
        }

        Ok(Stmt::Expr {
            expr: first,
            location,
        })
    }

    fn validate_target(target: &Expr) -> Result<(), ParseError> {
        if target.is_assignable() {
            Ok(())
        } else {
            Err(ParseError::syntax(
                "cannot assign to expression here. Maybe you meant '==' instead of '='?",
                target.location(),
            ))
        }
    }

    /// Parse a single assignment target (name, attribute, subscript, or parenthesized tuple)
    pub(crate) fn parse_target(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_postfix()?;
        Self::validate_target(&target)?;
        Ok(target)
    }

    /// Parse `target (, target)*` as used by `for` and comprehensions
    pub(crate) fn parse_target_list(&mut self) -> Result<Expr, ParseError> {
        let location = self.current_location();
        let first = self.parse_target()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.match_token(&TokenKind::Comma) {
            if self.check(&TokenKind::In) {
                break;
            }
            items.push(self.parse_target()?);
        }
        Ok(Expr::Tuple(items, location))
    }

    pub(crate) fn at_statement_end(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }
}
