//! Recursive-descent parser
//!
//! Statements are disambiguated by their first token; references parse
//! before the `=` / `++` / `(` decision point. A `%>` token is handled
//! as a statement form that switches the tokenizer back to literal mode
//! and yields a text statement, which is what lets raw template text sit
//! inside `if` and `for` bodies.
//!
//! The expression grammar is a fixed ladder of binary levels, loosest to
//! tightest, every level left-associative:
//!
//!   `<`  `>`  `==`  `!=`  `|`  `^`  `&`  `>>`  `<<`  `+`  `-`  `*`  `/`  `%`
//!
//! Each operator gets its own level, so `a + b - c` groups as
//! `a + (b - c)` and `8 * 2 / 4` as `8 * (2 / 4)`. This ordering is
//! intentional and pinned by tests; do not "fix" it toward conventional
//! precedence.

use std::rc::Rc;

use crate::config::constants::syntax::MAX_PARSE_DEPTH;
use crate::grammar::{Access, BinOp, Expr, Param, RefPath, Stmt, UnaryOp};
use crate::lexical::Tokenizer;
use crate::runtime::builtins::Builtins;
use crate::runtime::context::{Context, SharedContext};
use crate::runtime::eval;
use crate::syntax::error::ParseError;
use crate::tokens::Token;
use crate::utils::Span;

/// Binary operator ladder, loosest binding first
const LADDER: &[(Token, BinOp)] = &[
    (Token::Lt, BinOp::Lt),
    (Token::Gt, BinOp::Gt),
    (Token::Eq, BinOp::Eq),
    (Token::Ne, BinOp::Ne),
    (Token::Pipe, BinOp::BitOr),
    (Token::Caret, BinOp::BitXor),
    (Token::Amp, BinOp::BitAnd),
    (Token::Shr, BinOp::Shr),
    (Token::Shl, BinOp::Shl),
    (Token::Plus, BinOp::Add),
    (Token::Minus, BinOp::Sub),
    (Token::Star, BinOp::Mul),
    (Token::Slash, BinOp::Div),
    (Token::Percent, BinOp::Rem),
];

pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    builtins: Rc<Builtins>,
    static_ctx: SharedContext,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, builtins: Rc<Builtins>) -> Self {
        Self {
            tokenizer: Tokenizer::new(source),
            builtins,
            static_ctx: Context::new_root().into_shared(),
            depth: 0,
        }
    }

    /// Parse the whole template. Static directives execute against the
    /// parser's static context as they are encountered; the returned
    /// context carries their bindings.
    pub fn parse(mut self) -> Result<(Vec<Stmt>, SharedContext), ParseError> {
        let mut program = Vec::new();

        let leading = self.tokenizer.read_text();
        if !leading.is_empty() {
            program.push(Stmt::Text(leading));
        }

        loop {
            match self.tokenizer.peek()? {
                Token::Eof => break,
                Token::At => {
                    self.tokenizer.consume();
                    self.parse_static_block(&mut program)?;
                }
                _ => {
                    let statement = self.parse_statement()?;
                    program.push(statement);
                }
            }
        }

        Ok((program, self.static_ctx))
    }

    /// `<%@ stmt* %>`: each statement runs immediately against the
    /// static context and is not added to the program
    fn parse_static_block(&mut self, program: &mut Vec<Stmt>) -> Result<(), ParseError> {
        loop {
            match self.tokenizer.peek()? {
                Token::CloseTag => break,
                Token::Eof => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "'%>' closing the static directive".to_string(),
                        span: self.tokenizer.peek_span()?,
                    });
                }
                _ => {
                    let span = self.tokenizer.peek_span()?;
                    let statement = self.parse_statement()?;
                    eval::execute(&statement, &self.static_ctx, &self.builtins)
                        .map_err(|source| ParseError::StaticDirective { source, span })?;
                }
            }
        }
        self.tokenizer.consume();
        let text = self.tokenizer.read_text();
        if !text.is_empty() {
            program.push(Stmt::Text(text));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let span = self.tokenizer.peek_span()?;
        match self.tokenizer.peek()? {
            Token::CloseTag => {
                self.tokenizer.consume();
                Ok(Stmt::Text(self.tokenizer.read_text()))
            }
            Token::Assign => {
                self.tokenizer.consume();
                let expr = self.parse_expression()?;
                // Semicolon is optional after the print shorthand
                if matches!(self.tokenizer.peek()?, Token::Semi) {
                    self.tokenizer.consume();
                }
                Ok(Stmt::PrintExpr(expr))
            }
            Token::Print | Token::Printf => self.parse_print(),
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::While => Err(ParseError::Reserved {
                keyword: "while".to_string(),
                span,
            }),
            Token::LBrace => self.parse_block(),
            Token::Ident(_) => self.parse_reference_statement(true),
            Token::Eof => Err(ParseError::UnexpectedEof {
                expected: "a statement".to_string(),
                span,
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "a statement".to_string(),
                found: other.as_source_string(),
                span,
            }),
        }
    }

    /// Statement beginning with an identifier: a call, an assignment, or
    /// an increment. `require_semi` is false inside `for` headers.
    fn parse_reference_statement(&mut self, require_semi: bool) -> Result<Stmt, ParseError> {
        let (name, name_span) = self.expect_ident("a reference or call")?;

        if matches!(self.tokenizer.peek()?, Token::LParen) {
            let args = self.parse_call_args()?;
            if require_semi {
                self.expect(&Token::Semi, "';' after the call")?;
            }
            return Ok(Stmt::CallStmt {
                name,
                args,
                span: name_span,
            });
        }

        let target = self.parse_ref_path(name, name_span)?;
        let span = self.tokenizer.peek_span()?;
        match self.tokenizer.peek()? {
            Token::Assign => {
                self.tokenizer.consume();
                let value = self.parse_expression()?;
                if require_semi {
                    self.expect(&Token::Semi, "';' after the assignment")?;
                }
                Ok(Stmt::Assign { target, value })
            }
            Token::Inc => {
                self.tokenizer.consume();
                if require_semi {
                    self.expect(&Token::Semi, "';' after '++'")?;
                }
                Ok(Stmt::Increment { target })
            }
            Token::Dec => Err(ParseError::Reserved {
                keyword: "--".to_string(),
                span,
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "'=' or '++' after the reference".to_string(),
                found: other.as_source_string(),
                span,
            }),
        }
    }

    /// `print(args...)` and `printf(args...)` are the same statement;
    /// `printf` performs no format interpretation
    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.tokenizer.next()?;
        let args = self.parse_call_args()?;
        self.expect(&Token::Semi, "';' after print")?;
        Ok(Stmt::Print {
            args,
            span: keyword.span,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.tokenizer.consume();
        self.expect(&Token::LParen, "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(&Token::RParen, "')' closing the condition")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if matches!(self.tokenizer.peek()?, Token::Else) {
            self.tokenizer.consume();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `for (init; cond; step) body` where init and step are reference
    /// statements (assignment or increment)
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.tokenizer.consume();
        self.expect(&Token::LParen, "'(' after 'for'")?;
        let init = Box::new(self.parse_reference_statement(false)?);
        self.expect(&Token::Semi, "';' after the loop initializer")?;
        let condition = self.parse_expression()?;
        self.expect(&Token::Semi, "';' after the loop condition")?;
        let step = Box::new(self.parse_reference_statement(false)?);
        self.expect(&Token::RParen, "')' closing the loop header")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::For {
            init,
            condition,
            step,
            body,
        })
    }

    fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        self.expect(&Token::LBrace, "'{'")?;
        let mut statements = Vec::new();
        loop {
            match self.tokenizer.peek()? {
                Token::RBrace => {
                    self.tokenizer.consume();
                    return Ok(Stmt::Block(statements));
                }
                Token::Eof => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "'}' closing the block".to_string(),
                        span: self.tokenizer.peek_span()?,
                    });
                }
                _ => statements.push(self.parse_statement()?),
            }
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let span = self.tokenizer.peek_span()?;
        self.descend(span)?;
        let result = self.parse_binary(0);
        self.ascend();
        let expr = result?;

        // A reserved operator after a complete expression would otherwise
        // surface as a confusing unexpected-token error downstream
        let next_span = self.tokenizer.peek_span()?;
        if let reserved @ (Token::AndAnd | Token::OrOr | Token::Le | Token::Ge | Token::Dec) =
            self.tokenizer.peek()?
        {
            return Err(ParseError::Reserved {
                keyword: reserved.as_source_string(),
                span: next_span,
            });
        }
        Ok(expr)
    }

    fn parse_binary(&mut self, level: usize) -> Result<Expr, ParseError> {
        if level == LADDER.len() {
            return self.parse_primary();
        }

        let (expected, op) = &LADDER[level];
        let mut left = self.parse_binary(level + 1)?;
        while self.tokenizer.peek()? == expected {
            self.tokenizer.consume();
            let right = self.parse_binary(level + 1)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                op: *op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let spanned = self.tokenizer.next()?;
        let span = spanned.span;
        match spanned.value {
            Token::Int(value) => Ok(Expr::Int(value, span)),
            Token::Float(value) => Ok(Expr::Float(value, span)),
            Token::Str(text) => Ok(Expr::Str(text, span)),
            Token::Minus => self.parse_unary(UnaryOp::Neg, span),
            Token::Tilde => self.parse_unary(UnaryOp::BitNot, span),
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(expr)
            }
            Token::Func => self.parse_func_literal(span),
            Token::Ident(name) => {
                if matches!(self.tokenizer.peek()?, Token::LParen) {
                    let args = self.parse_call_args()?;
                    Ok(Expr::Call { name, args, span })
                } else {
                    Ok(Expr::Ref(self.parse_ref_path(name, span)?))
                }
            }
            reserved @ (Token::Not
            | Token::AndAnd
            | Token::OrOr
            | Token::Le
            | Token::Ge
            | Token::Dec) => Err(ParseError::Reserved {
                keyword: reserved.as_source_string(),
                span,
            }),
            Token::Eof => Err(ParseError::UnexpectedEof {
                expected: "an expression".to_string(),
                span,
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: "an expression".to_string(),
                found: other.as_source_string(),
                span,
            }),
        }
    }

    /// Unary operators bind to a primary, not to a binary expression
    fn parse_unary(&mut self, op: UnaryOp, start: Span) -> Result<Expr, ParseError> {
        self.descend(start)?;
        let operand = self.parse_primary()?;
        self.ascend();
        let span = start.merge(operand.span());
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    /// `func(params) { body }`
    fn parse_func_literal(&mut self, start: Span) -> Result<Expr, ParseError> {
        self.expect(&Token::LParen, "'(' after 'func'")?;
        let mut params = Vec::new();
        if !matches!(self.tokenizer.peek()?, Token::RParen) {
            loop {
                let (name, span) = self.expect_ident("a parameter name")?;
                params.push(Param { name, span });
                if matches!(self.tokenizer.peek()?, Token::Comma) {
                    self.tokenizer.consume();
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')' closing the parameter list")?;
        let body = self.parse_block()?;
        Ok(Expr::Func {
            params,
            body: Rc::new(body),
            span: start,
        })
    }

    /// `.field` and `[index]` accesses after a base identifier
    fn parse_ref_path(&mut self, base: String, base_span: Span) -> Result<RefPath, ParseError> {
        let mut path = RefPath::variable(base, base_span);
        loop {
            match self.tokenizer.peek()? {
                Token::Dot => {
                    self.tokenizer.consume();
                    let (field, field_span) = self.expect_ident("a field name after '.'")?;
                    path.accesses.push(Access::Field(field));
                    path.span = path.span.merge(field_span);
                }
                Token::LBracket => {
                    self.tokenizer.consume();
                    let index = self.parse_expression()?;
                    let close = self.expect(&Token::RBracket, "']' closing the index")?;
                    path.accesses.push(Access::Index(index));
                    path.span = path.span.merge(close);
                }
                _ => return Ok(path),
            }
        }
    }

    /// `( expr, expr, ... )`, possibly empty
    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        if !matches!(self.tokenizer.peek()?, Token::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if matches!(self.tokenizer.peek()?, Token::Comma) {
                    self.tokenizer.consume();
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')' closing the argument list")?;
        Ok(args)
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn expect(&mut self, token: &Token, expected: &str) -> Result<Span, ParseError> {
        let spanned = self.tokenizer.next()?;
        if &spanned.value == token {
            Ok(spanned.span)
        } else if spanned.value == Token::Eof {
            Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
                span: spanned.span,
            })
        } else {
            Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: spanned.value.as_source_string(),
                span: spanned.span,
            })
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<(String, Span), ParseError> {
        let spanned = self.tokenizer.next()?;
        match spanned.value {
            Token::Ident(name) => Ok((name, spanned.span)),
            Token::Eof => Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
                span: spanned.span,
            }),
            other => Err(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: other.as_source_string(),
                span: spanned.span,
            }),
        }
    }

    fn descend(&mut self, span: Span) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_PARSE_DEPTH {
            return Err(ParseError::DepthExceeded { span });
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }
}
