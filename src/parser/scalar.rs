use crate::ast::{ArrayItem, Expr, ExprId, MagicConstKind, ParseError};
use crate::lexer::token::TokenKind;
use crate::parser::Parser;

fn magic_const(kind: TokenKind) -> Option<MagicConstKind> {
    Some(match kind {
        TokenKind::Line => MagicConstKind::Line,
        TokenKind::File => MagicConstKind::File,
        TokenKind::Dir => MagicConstKind::Dir,
        TokenKind::ClassC => MagicConstKind::Class,
        TokenKind::TraitC => MagicConstKind::Trait,
        TokenKind::MethodC => MagicConstKind::Method,
        TokenKind::FuncC => MagicConstKind::Function,
        TokenKind::NsC => MagicConstKind::Namespace,
        _ => return None,
    })
}

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Numbers, strings, magic constants and array literals.
    pub(super) fn parse_scalar(&mut self) -> ExprId<'ast> {
        let start = self.node();
        let token = self.current_token;

        if let Some(kind) = magic_const(token.kind) {
            self.bump();
            return self.arena.alloc(Expr::MagicConst {
                kind,
                span: token.span,
            });
        }

        match token.kind {
            TokenKind::LNumber | TokenKind::DNumber => {
                self.bump();
                self.arena.alloc(Expr::Number {
                    value: self.arena.alloc_slice_copy(self.lexer.slice(token.span)),
                    span: token.span,
                })
            }
            TokenKind::StringLiteral => {
                self.bump();
                self.arena.alloc(Expr::String {
                    value: self.arena.alloc_slice_copy(self.lexer.slice(token.span)),
                    span: token.span,
                })
            }
            TokenKind::DoubleQuote => {
                let parts = self.parse_encapsed(TokenKind::DoubleQuote);
                self.arena.alloc(Expr::Encapsed {
                    parts,
                    span: self.finish(start),
                })
            }
            TokenKind::Array | TokenKind::OpenBracket => {
                let short = token.kind == TokenKind::OpenBracket;
                self.bump();
                let close = if short {
                    TokenKind::CloseBracket
                } else {
                    self.consume(TokenKind::OpenParen);
                    TokenKind::CloseParen
                };

                let mut items = std::vec::Vec::new();
                while self.current_token.kind != close && self.current_token.kind != TokenKind::Eof
                {
                    items.push(self.parse_array_item());
                    if self.current_token.kind == TokenKind::Comma {
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.consume(close);

                self.arena.alloc(Expr::Array {
                    items: self.arena.alloc_slice_copy(&items),
                    short,
                    span: self.finish(start),
                })
            }
            _ => {
                self.push_error(ParseError::new(token.span, "Expected EXPR"));
                self.bump();
                self.arena.alloc(Expr::Error { span: token.span })
            }
        }
    }

    fn parse_array_item(&mut self) -> ArrayItem<'ast> {
        let start = self.node();
        let unpack = self.current_token.kind == TokenKind::Ellipsis;
        if unpack {
            self.bump();
        }

        let by_ref = self.current_token.kind == TokenKind::Ampersand;
        if by_ref {
            self.bump();
        }

        let first = self.parse_expr();

        if self.current_token.kind == TokenKind::DoubleArrow {
            self.bump();
            let value_by_ref = self.current_token.kind == TokenKind::Ampersand;
            if value_by_ref {
                self.bump();
            }
            let value = self.parse_expr();
            return ArrayItem {
                key: Some(first),
                value,
                by_ref: value_by_ref,
                unpack,
                span: self.finish(start),
            };
        }

        ArrayItem {
            key: None,
            value: first,
            by_ref,
            unpack,
            span: self.finish(start),
        }
    }

    /// Reads the parts of an interpolated string, from the opening quote
    /// through `terminator`.
    pub(super) fn parse_encapsed(&mut self, terminator: TokenKind) -> &'ast [ExprId<'ast>] {
        self.bump();

        let mut parts: std::vec::Vec<ExprId<'ast>> = std::vec::Vec::new();
        while self.current_token.kind != terminator && self.current_token.kind != TokenKind::Eof {
            let token = self.current_token;
            match token.kind {
                TokenKind::EncapsedAndWhitespace => {
                    self.bump();
                    parts.push(self.arena.alloc(Expr::String {
                        value: self.arena.alloc_slice_copy(self.lexer.slice(token.span)),
                        span: token.span,
                    }));
                }
                TokenKind::Variable => {
                    self.bump();
                    parts.push(self.arena.alloc(Expr::Variable {
                        name: token.span,
                        span: token.span,
                    }));
                }
                TokenKind::CurlyOpen => {
                    self.bump();
                    parts.push(self.parse_expr());
                    self.consume(TokenKind::CloseBrace);
                }
                TokenKind::DollarOpenCurlyBraces => {
                    let start = self.node();
                    self.bump();
                    // `${name}` names the variable directly
                    if self.current_token.kind == TokenKind::Identifier
                        && self.next_token.kind == TokenKind::CloseBrace
                    {
                        let name = self.current_token.span;
                        self.bump();
                        self.bump();
                        parts.push(self.arena.alloc(Expr::Variable {
                            name,
                            span: self.finish(start),
                        }));
                    } else {
                        let name = self.parse_expr();
                        self.consume(TokenKind::CloseBrace);
                        parts.push(self.arena.alloc(Expr::VariableVariable {
                            name,
                            span: self.finish(start),
                        }));
                    }
                }
                _ => {
                    self.expect(terminator);
                    self.bump();
                }
            }
        }
        self.consume(terminator);

        self.arena.alloc_slice_copy(&parts)
    }
}
