use crate::ast::{Arg, Expr, ExprId, Name, ParseError};
use crate::lexer::token::TokenKind;
use crate::parser::{NodeStart, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VariableMode {
    /// Full dereference chains including calls.
    Expression,
    /// After `new`: the chain stops before `(` so the argument list stays
    /// with the instantiation.
    ClassReference,
}

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Reads `$a`, `$$a`, `${expr}`, a name, `static`, and any dereference
    /// chain that follows.
    pub(super) fn parse_variable(&mut self, mode: VariableMode) -> ExprId<'ast> {
        let start = self.node();
        let token = self.current_token;

        let base: ExprId<'ast> = match token.kind {
            TokenKind::Variable | TokenKind::Dollar => self.parse_simple_variable(),
            TokenKind::Static => {
                self.bump();
                let name = Name {
                    parts: self.arena.alloc_slice_copy(&[token]),
                    span: token.span,
                };
                self.arena.alloc(Expr::Name {
                    name,
                    span: token.span,
                })
            }
            TokenKind::Identifier | TokenKind::NsSeparator | TokenKind::Namespace => {
                let name = self.parse_name();
                match self.current_token.kind {
                    TokenKind::OpenParen | TokenKind::DoubleColon => self.arena.alloc(Expr::Name {
                        name,
                        span: name.span,
                    }),
                    _ => {
                        return self.arena.alloc(Expr::ConstFetch {
                            name,
                            span: name.span,
                        });
                    }
                }
            }
            _ => {
                self.push_error(ParseError::new(token.span, "Expected 'variable'"));
                return self.arena.alloc(Expr::Error { span: token.span });
            }
        };

        self.parse_dereference_chain(start, base, mode)
    }

    /// `$name`, `$$name` or `${expr}` without any trailing access.
    fn parse_simple_variable(&mut self) -> ExprId<'ast> {
        let start = self.node();
        let token = self.current_token;

        if token.kind == TokenKind::Variable {
            self.bump();
            return self.arena.alloc(Expr::Variable {
                name: token.span,
                span: token.span,
            });
        }

        // `$`
        self.bump();
        let name = match self.current_token.kind {
            TokenKind::OpenBrace => {
                self.bump();
                let expr = self.parse_expr();
                self.consume(TokenKind::CloseBrace);
                expr
            }
            TokenKind::Variable | TokenKind::Dollar => {
                if !self.enter() {
                    return self.arena.alloc(Expr::Error { span: token.span });
                }
                let inner = self.parse_simple_variable();
                self.leave();
                inner
            }
            _ => {
                let span = self.current_token.span;
                self.push_error(ParseError::new(span, "Expected 'variable'"));
                self.arena.alloc(Expr::Error { span })
            }
        };

        self.arena.alloc(Expr::VariableVariable {
            name,
            span: self.finish(start),
        })
    }

    /// Applies `->`, `[...]`, `{...}`, `::` and call continuations to `base`
    /// until a token that continues nothing.
    pub(super) fn parse_dereference_chain(
        &mut self,
        start: NodeStart,
        base: ExprId<'ast>,
        mode: VariableMode,
    ) -> ExprId<'ast> {
        let mut expr = base;
        loop {
            expr = match self.current_token.kind {
                TokenKind::Arrow => {
                    self.bump();
                    let member = self.parse_member_name();
                    if mode == VariableMode::Expression
                        && self.current_token.kind == TokenKind::OpenParen
                    {
                        let args = self.parse_call_arguments();
                        self.arena.alloc(Expr::MethodCall {
                            target: expr,
                            method: member,
                            args,
                            span: self.finish(start),
                        })
                    } else {
                        self.arena.alloc(Expr::PropertyFetch {
                            target: expr,
                            property: member,
                            span: self.finish(start),
                        })
                    }
                }
                TokenKind::OpenBracket => {
                    self.bump();
                    let dim = if self.current_token.kind == TokenKind::CloseBracket {
                        None
                    } else {
                        Some(self.parse_expr())
                    };
                    self.consume(TokenKind::CloseBracket);
                    self.arena.alloc(Expr::ArrayDimFetch {
                        array: expr,
                        dim,
                        span: self.finish(start),
                    })
                }
                // `$s{0}`, the pre-8.0 string offset form
                TokenKind::OpenBrace if mode == VariableMode::Expression => {
                    self.bump();
                    let dim = self.parse_expr();
                    self.consume(TokenKind::CloseBrace);
                    self.arena.alloc(Expr::ArrayDimFetch {
                        array: expr,
                        dim: Some(dim),
                        span: self.finish(start),
                    })
                }
                TokenKind::DoubleColon => {
                    self.bump();
                    self.parse_static_member(start, expr, mode)
                }
                TokenKind::OpenParen if mode == VariableMode::Expression => {
                    let args = self.parse_call_arguments();
                    self.arena.alloc(Expr::Call {
                        func: expr,
                        args,
                        span: self.finish(start),
                    })
                }
                _ => return expr,
            };
        }
    }

    /// What follows `::`: `$prop`, `class`, or a constant / method name.
    pub(super) fn parse_static_member(
        &mut self,
        start: NodeStart,
        class: ExprId<'ast>,
        mode: VariableMode,
    ) -> ExprId<'ast> {
        let token = self.current_token;
        match token.kind {
            TokenKind::Variable | TokenKind::Dollar => {
                let property = self.parse_simple_variable();
                self.arena.alloc(Expr::StaticPropertyFetch {
                    class,
                    property,
                    span: self.finish(start),
                })
            }
            kind if kind == TokenKind::Identifier || kind.is_semi_reserved() => {
                self.bump();
                let name: ExprId<'ast> = self.arena.alloc(Expr::Identifier {
                    name: token.span,
                    span: token.span,
                });
                if kind != TokenKind::Class
                    && mode == VariableMode::Expression
                    && self.current_token.kind == TokenKind::OpenParen
                {
                    let args = self.parse_call_arguments();
                    return self.arena.alloc(Expr::StaticCall {
                        class,
                        method: name,
                        args,
                        span: self.finish(start),
                    });
                }
                self.arena.alloc(Expr::ClassConstFetch {
                    class,
                    constant: name,
                    span: self.finish(start),
                })
            }
            _ => {
                self.push_error(ParseError::new(
                    token.span,
                    "Expected identifier or variable",
                ));
                self.arena.alloc(Expr::Error { span: token.span })
            }
        }
    }

    /// The member after `->`: a name (reserved words allowed), a variable,
    /// or `{expr}`.
    fn parse_member_name(&mut self) -> ExprId<'ast> {
        let token = self.current_token;
        match token.kind {
            kind if kind == TokenKind::Identifier || kind.is_semi_reserved() => {
                self.bump();
                self.arena.alloc(Expr::Identifier {
                    name: token.span,
                    span: token.span,
                })
            }
            TokenKind::Variable | TokenKind::Dollar => self.parse_simple_variable(),
            TokenKind::OpenBrace => {
                self.bump();
                let expr = self.parse_expr();
                self.consume(TokenKind::CloseBrace);
                expr
            }
            _ => {
                self.push_error(ParseError::new(
                    token.span,
                    "Expected identifier or variable",
                ));
                self.arena.alloc(Expr::Error { span: token.span })
            }
        }
    }

    /// `( arg, ...$spread, )`. Returns no arguments when the current token
    /// is not `(`.
    pub(super) fn parse_call_arguments(&mut self) -> &'ast [Arg<'ast>] {
        if self.current_token.kind != TokenKind::OpenParen {
            return &[];
        }
        self.bump();

        let mut args = std::vec::Vec::new();
        while self.current_token.kind != TokenKind::CloseParen
            && self.current_token.kind != TokenKind::Eof
        {
            let start = self.node();
            let unpack = self.current_token.kind == TokenKind::Ellipsis;
            if unpack {
                self.bump();
            }

            let value = self.parse_expr();
            args.push(Arg {
                value,
                unpack,
                span: self.finish(start),
            });

            if self.current_token.kind == TokenKind::Comma {
                self.bump();
            } else {
                break;
            }
        }
        self.consume(TokenKind::CloseParen);

        self.arena.alloc_slice_copy(&args)
    }
}
