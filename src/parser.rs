use std::rc::Rc;

use crate::ast::{Block, Expr, ExprKind, InfixOp, PrefixOp, Program, Stmt, StmtKind};
use crate::error::Error;
use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    Equality = 3,
    Comparison = 4,
    Sum = 5,
    Product = 6,
    Prefix = 7,
    Postfix = 8,
}

/// Recursive-descent parser over the token stream, with precedence
/// climbing for expressions.
///
/// Stops at the first ill-formed construct; there is no recovery and no
/// partial program.
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens
            .last()
            .is_some_and(|token| matches!(token.kind, TokenKind::Eof))
        {
            let pos = tokens.last().map(|token| token.pos).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, pos));
        }

        Self { tokens, cursor: 0 }
    }

    /// Parses a whole program: `hi_bhai` statements... `bye_bhai`, with
    /// nothing but the end of input after the closing marker.
    pub fn parse_program(mut self) -> Result<Program, Error> {
        self.expect(
            |kind| matches!(kind, TokenKind::HiBhai),
            "program must start with 'hi_bhai'",
        )?;

        let mut statements = Vec::new();
        while !self.at_end() && !self.check(|kind| matches!(kind, TokenKind::ByeBhai)) {
            statements.push(self.parse_statement()?);
        }

        self.expect(
            |kind| matches!(kind, TokenKind::ByeBhai),
            "expected 'bye_bhai' to close the program",
        )?;

        if !self.at_end() {
            let token = self.current();
            return Err(Error::syntax(
                format!("unexpected {} after 'bye_bhai'", describe(&token.kind)),
                token.pos,
            ));
        }

        Ok(Program::new(statements))
    }

    fn parse_statement(&mut self) -> Result<Stmt, Error> {
        if self.check(|kind| matches!(kind, TokenKind::Chaap)) {
            self.parse_print_statement()
        } else if self.check(|kind| matches!(kind, TokenKind::Rakho)) {
            self.parse_declaration(false)
        } else if self.check(|kind| matches!(kind, TokenKind::Pakka)) {
            self.parse_declaration(true)
        } else if self.check(|kind| matches!(kind, TokenKind::Agar)) {
            self.parse_if_statement()
        } else if self.check(|kind| matches!(kind, TokenKind::Jabtak)) {
            self.parse_while_statement()
        } else if self.check(|kind| matches!(kind, TokenKind::Kaam)) {
            self.parse_function_definition()
        } else if self.check(|kind| matches!(kind, TokenKind::Wapas)) {
            self.parse_return_statement()
        } else if self.check(|kind| matches!(kind, TokenKind::BasKaro)) {
            self.parse_break_statement()
        } else if self.check(|kind| matches!(kind, TokenKind::AglaDekho)) {
            self.parse_continue_statement()
        } else {
            self.parse_assignment_or_expression_statement()
        }
    }

    fn parse_print_statement(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_semicolon();
        Ok(Stmt::new(StmtKind::Print { value }, keyword.pos))
    }

    fn parse_declaration(&mut self, constant: bool) -> Result<Stmt, Error> {
        let keyword = self.advance();

        let name = if constant {
            self.expect_ident("expected variable name after 'pakka'")?
        } else {
            self.expect_ident("expected variable name after 'rakho'")?
        };

        self.expect(
            |kind| matches!(kind, TokenKind::Assign),
            "expected '=' after variable name",
        )?;

        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_semicolon();

        let kind = if constant {
            StmtKind::DeclareConst { name, value }
        } else {
            StmtKind::Declare { name, value }
        };
        Ok(Stmt::new(kind, keyword.pos))
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        let then_branch = self.parse_block("expected '{' after 'agar' condition")?;

        let else_branch = if self.check(|kind| matches!(kind, TokenKind::Warna)) {
            self.advance();
            Some(self.parse_block("expected '{' after 'warna'")?)
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            keyword.pos,
        ))
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        let body = self.parse_block("expected '{' after 'jabtak' condition")?;
        Ok(Stmt::new(StmtKind::While { condition, body }, keyword.pos))
    }

    fn parse_function_definition(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance();
        let name = self.expect_ident("expected function name after 'kaam'")?;

        self.expect(
            |kind| matches!(kind, TokenKind::LParen),
            "expected '(' after function name",
        )?;

        let mut params = Vec::new();
        if !self.check(|kind| matches!(kind, TokenKind::RParen)) {
            loop {
                params.push(self.expect_ident("expected parameter name in function definition")?);
                if self.check(|kind| matches!(kind, TokenKind::Comma)) {
                    self.advance();
                    continue;
                }
                break;
            }
        }

        self.expect(
            |kind| matches!(kind, TokenKind::RParen),
            "expected ')' after function parameters",
        )?;

        let body = self.parse_block("expected function body block")?;
        Ok(Stmt::new(
            StmtKind::FunctionDef {
                name,
                params,
                body: Rc::new(body),
            },
            keyword.pos,
        ))
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance();

        if self.check(|kind| matches!(kind, TokenKind::Semicolon)) {
            self.advance();
            return Ok(Stmt::new(StmtKind::Return(None), keyword.pos));
        }

        // Bare `wapas` right before a closing brace or program end.
        if self.check(|kind| matches!(kind, TokenKind::RBrace | TokenKind::ByeBhai)) || self.at_end()
        {
            return Ok(Stmt::new(StmtKind::Return(None), keyword.pos));
        }

        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_semicolon();
        Ok(Stmt::new(StmtKind::Return(Some(value)), keyword.pos))
    }

    fn parse_break_statement(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance();
        self.consume_semicolon();
        Ok(Stmt::new(StmtKind::Break, keyword.pos))
    }

    fn parse_continue_statement(&mut self) -> Result<Stmt, Error> {
        let keyword = self.advance();
        self.consume_semicolon();
        Ok(Stmt::new(StmtKind::Continue, keyword.pos))
    }

    fn parse_assignment_or_expression_statement(&mut self) -> Result<Stmt, Error> {
        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.check(|kind| matches!(kind, TokenKind::Assign)) {
            self.advance();

            let ExprKind::Identifier(name) = expr.kind else {
                return Err(Error::syntax(
                    "invalid assignment target (expected a variable name)",
                    expr.pos,
                ));
            };

            let value = self.parse_expression(Precedence::Lowest)?;
            self.consume_semicolon();
            return Ok(Stmt::new(StmtKind::Assign { name, value }, expr.pos));
        }

        let pos = expr.pos;
        self.consume_semicolon();
        Ok(Stmt::new(StmtKind::Expr(expr), pos))
    }

    fn parse_block(&mut self, missing_open_message: &'static str) -> Result<Block, Error> {
        self.expect(|kind| matches!(kind, TokenKind::LBrace), missing_open_message)?;

        let mut statements = Vec::new();
        while !self.at_end() && !self.check(|kind| matches!(kind, TokenKind::RBrace)) {
            statements.push(self.parse_statement()?);
        }

        self.expect(
            |kind| matches!(kind, TokenKind::RBrace),
            "expected '}' to close block",
        )?;

        Ok(statements)
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, Error> {
        let mut left = self.parse_prefix()?;

        while !self.at_end()
            && !self.check(|kind| matches!(kind, TokenKind::Semicolon))
            && precedence < self.current_precedence()
        {
            let operator = self.advance();
            left = self.parse_infix(left, operator)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, Error> {
        let token = self.advance();

        match token.kind {
            TokenKind::Ident(name) => Ok(Expr::new(ExprKind::Identifier(name), token.pos)),
            TokenKind::Number(value) => Ok(Expr::new(ExprKind::Number(value), token.pos)),
            TokenKind::Str(value) => Ok(Expr::new(ExprKind::Str(value), token.pos)),
            TokenKind::Sahi => Ok(Expr::new(ExprKind::Boolean(true), token.pos)),
            TokenKind::Galat => Ok(Expr::new(ExprKind::Boolean(false), token.pos)),
            TokenKind::Nalla => Ok(Expr::new(ExprKind::Null, token.pos)),
            TokenKind::Bang => {
                let rhs = self.parse_expression(Precedence::Prefix)?;
                Ok(Expr::new(
                    ExprKind::Prefix {
                        op: PrefixOp::Not,
                        rhs: Box::new(rhs),
                    },
                    token.pos,
                ))
            }
            TokenKind::Minus => {
                let rhs = self.parse_expression(Precedence::Prefix)?;
                Ok(Expr::new(
                    ExprKind::Prefix {
                        op: PrefixOp::Negate,
                        rhs: Box::new(rhs),
                    },
                    token.pos,
                ))
            }
            TokenKind::LParen => {
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect(
                    |kind| matches!(kind, TokenKind::RParen),
                    "expected ')' after grouped expression",
                )?;
                Ok(expr)
            }
            other => Err(Error::syntax(
                format!("expected expression, found {}", describe(&other)),
                token.pos,
            )),
        }
    }

    fn parse_infix(&mut self, lhs: Expr, operator: Token) -> Result<Expr, Error> {
        if matches!(operator.kind, TokenKind::LParen) {
            return self.parse_call_expression(lhs);
        }

        let (op, precedence) = match operator.kind {
            TokenKind::And => (InfixOp::And, Precedence::LogicalAnd),
            TokenKind::Or => (InfixOp::Or, Precedence::LogicalOr),
            TokenKind::Plus => (InfixOp::Add, Precedence::Sum),
            TokenKind::Minus => (InfixOp::Subtract, Precedence::Sum),
            TokenKind::Star => (InfixOp::Multiply, Precedence::Product),
            TokenKind::Slash => (InfixOp::Divide, Precedence::Product),
            TokenKind::Eq => (InfixOp::Eq, Precedence::Equality),
            TokenKind::NotEq => (InfixOp::NotEq, Precedence::Equality),
            TokenKind::Lt => (InfixOp::Lt, Precedence::Comparison),
            TokenKind::Gt => (InfixOp::Gt, Precedence::Comparison),
            TokenKind::LtEq => (InfixOp::LtEq, Precedence::Comparison),
            TokenKind::GtEq => (InfixOp::GtEq, Precedence::Comparison),
            other => {
                return Err(Error::syntax(
                    format!("expected infix operator, found {}", describe(&other)),
                    operator.pos,
                ));
            }
        };

        // Right side binds at the operator's own precedence, so equal
        // precedence associates left.
        let rhs = self.parse_expression(precedence)?;
        Ok(Expr::new(
            ExprKind::Infix {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            },
            operator.pos,
        ))
    }

    fn parse_call_expression(&mut self, callee: Expr) -> Result<Expr, Error> {
        let pos = callee.pos;
        let mut args = Vec::new();

        if self.check(|kind| matches!(kind, TokenKind::RParen)) {
            self.advance();
            return Ok(Expr::new(
                ExprKind::Call {
                    callee: Box::new(callee),
                    args,
                },
                pos,
            ));
        }

        loop {
            args.push(self.parse_expression(Precedence::Lowest)?);

            if self.check(|kind| matches!(kind, TokenKind::Comma)) {
                self.advance();
                continue;
            }

            self.expect(
                |kind| matches!(kind, TokenKind::RParen),
                "expected ')' after call arguments",
            )?;
            break;
        }

        Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            pos,
        ))
    }

    fn expect_ident(&mut self, message: &'static str) -> Result<String, Error> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            _ => Err(Error::syntax(message, token.pos)),
        }
    }

    fn expect(
        &mut self,
        predicate: impl Fn(&TokenKind) -> bool,
        message: &'static str,
    ) -> Result<Token, Error> {
        let token = self.advance();
        if predicate(&token.kind) {
            Ok(token)
        } else {
            Err(Error::syntax(message, token.pos))
        }
    }

    // Semicolons are statement terminators but optional before `}` and at
    // the end of input.
    fn consume_semicolon(&mut self) {
        if self.check(|kind| matches!(kind, TokenKind::Semicolon)) {
            self.advance();
        }
    }

    fn check(&self, predicate: impl Fn(&TokenKind) -> bool) -> bool {
        predicate(&self.current().kind)
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(&self.current().kind)
    }

    fn at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }
}

fn precedence_of(kind: &TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::LogicalOr,
        TokenKind::And => Precedence::LogicalAnd,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equality,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
            Precedence::Comparison
        }
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Postfix,
        _ => Precedence::Lowest,
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Ident(name) => format!("identifier '{name}'"),
        TokenKind::Number(value) => format!("number '{value}'"),
        TokenKind::Str(value) => format!("string \"{value}\""),
        other => format!("'{other}'"),
    }
}
