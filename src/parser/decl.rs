use crate::ast::{
    ClassConst, ClassMember, ClosureUse, Expr, ExprId, Name, Param, PropertyEntry, Stmt, StmtId,
    TypeHint,
};
use crate::lexer::token::{Token, TokenKind};
use crate::parser::{NodeStart, Parser};

/// Parts shared by closures, named functions and methods.
struct Signature<'ast> {
    by_ref: bool,
    params: &'ast [Param<'ast>],
    return_type: Option<TypeHint<'ast>>,
}

fn is_member_modifier(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Public
            | TokenKind::Protected
            | TokenKind::Private
            | TokenKind::Static
            | TokenKind::Abstract
            | TokenKind::Final
            | TokenKind::Var
            | TokenKind::Readonly
    )
}

impl<'src, 'ast> Parser<'src, 'ast> {
    /// `function &? (params) use (...)? (: type)? { body }`; the current
    /// token is `function`.
    pub(super) fn parse_closure(&mut self, start: NodeStart, is_static: bool) -> ExprId<'ast> {
        self.bump();
        let by_ref = self.eat_ampersand();

        if self.current_token.kind == TokenKind::Identifier {
            self.expect(TokenKind::OpenParen);
            self.bump();
        }
        let params = self.parse_params();

        let mut uses = std::vec::Vec::new();
        if self.current_token.kind == TokenKind::Use {
            self.bump();
            self.consume(TokenKind::OpenParen);
            while self.current_token.kind != TokenKind::CloseParen
                && self.current_token.kind != TokenKind::Eof
            {
                let use_start = self.node();
                let by_ref = self.eat_ampersand();
                if !self.expect(TokenKind::Variable) {
                    break;
                }
                let var = self.arena.alloc(self.current_token);
                self.bump();
                uses.push(ClosureUse {
                    var,
                    by_ref,
                    span: self.finish(use_start),
                });
                if self.current_token.kind == TokenKind::Comma {
                    self.bump();
                } else {
                    break;
                }
            }
            self.consume(TokenKind::CloseParen);
        }

        let return_type = self.parse_return_type();
        let body = self.parse_braced_statements();

        self.arena.alloc(Expr::Closure {
            by_ref,
            is_static,
            params,
            uses: self.arena.alloc_slice_copy(&uses),
            return_type,
            body,
            doc: start.doc,
            span: self.finish(start),
        })
    }

    pub(super) fn parse_function_declaration(&mut self) -> StmtId<'ast> {
        let start = self.node();
        self.bump();
        let by_ref = self.eat_ampersand();
        let name = self.parse_declared_name();
        let signature = self.parse_signature(by_ref);
        let body = self.parse_braced_statements();

        self.arena.alloc(Stmt::Function {
            name,
            by_ref: signature.by_ref,
            params: signature.params,
            return_type: signature.return_type,
            body,
            doc: start.doc,
            span: self.finish(start),
        })
    }

    /// `class Name extends Parent implements A, B { members }`; the current
    /// token is `class`.
    pub(super) fn parse_class(&mut self, start: NodeStart, modifiers: &'ast [Token]) -> StmtId<'ast> {
        self.bump();
        let name = if self.expect(TokenKind::Identifier) {
            let token = self.arena.alloc(self.current_token);
            self.bump();
            token
        } else {
            self.arena.alloc(Token {
                kind: TokenKind::Error,
                span: self.current_token.span,
            })
        };

        let extends = if self.current_token.kind == TokenKind::Extends {
            self.bump();
            Some(self.parse_name())
        } else {
            None
        };
        let implements: &'ast [Name<'ast>] = if self.current_token.kind == TokenKind::Implements {
            self.bump();
            self.parse_name_list()
        } else {
            &[]
        };
        let members: &'ast [ClassMember<'ast>] = if self.consume(TokenKind::OpenBrace) {
            self.parse_class_body()
        } else {
            &[]
        };

        self.arena.alloc(Stmt::Class {
            name,
            modifiers,
            extends,
            implements,
            members,
            doc: start.doc,
            span: self.finish(start),
        })
    }

    /// Members up to and including the closing `}`; the opening brace is
    /// already consumed.
    pub(super) fn parse_class_body(&mut self) -> &'ast [ClassMember<'ast>] {
        let mut members = std::vec::Vec::new();
        while self.current_token.kind != TokenKind::CloseBrace
            && self.current_token.kind != TokenKind::Eof
        {
            if let Some(member) = self.parse_class_member() {
                members.push(member);
            }
        }
        self.consume(TokenKind::CloseBrace);
        self.arena.alloc_slice_copy(&members)
    }

    fn parse_class_member(&mut self) -> Option<ClassMember<'ast>> {
        let start = self.node();

        if self.current_token.kind == TokenKind::Use {
            self.bump();
            let traits = self.parse_name_list();
            self.consume(TokenKind::SemiColon);
            return Some(ClassMember::TraitUse {
                traits,
                span: self.finish(start),
            });
        }

        let mut modifiers = std::vec::Vec::new();
        while is_member_modifier(self.current_token.kind) {
            modifiers.push(self.current_token);
            self.bump();
        }
        let modifiers: &'ast [Token] = self.arena.alloc_slice_copy(&modifiers);

        match self.current_token.kind {
            TokenKind::Const => {
                self.bump();
                let mut consts = std::vec::Vec::new();
                loop {
                    let const_start = self.node();
                    let name = self.parse_declared_name();
                    self.consume(TokenKind::Eq);
                    let value = self.parse_expr();
                    consts.push(ClassConst {
                        name,
                        value,
                        span: self.finish(const_start),
                    });
                    if self.current_token.kind == TokenKind::Comma {
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.consume(TokenKind::SemiColon);
                Some(ClassMember::Const {
                    modifiers,
                    consts: self.arena.alloc_slice_copy(&consts),
                    doc: start.doc,
                    span: self.finish(start),
                })
            }
            TokenKind::Function => {
                self.bump();
                let by_ref = self.eat_ampersand();
                let name = self.parse_declared_name();
                let signature = self.parse_signature(by_ref);
                let body = if self.current_token.kind == TokenKind::SemiColon {
                    self.bump();
                    None
                } else {
                    Some(self.parse_braced_statements())
                };
                Some(ClassMember::Method {
                    modifiers,
                    name,
                    by_ref: signature.by_ref,
                    params: signature.params,
                    return_type: signature.return_type,
                    body,
                    doc: start.doc,
                    span: self.finish(start),
                })
            }
            _ => {
                let ty = if self.current_token.kind == TokenKind::Variable {
                    None
                } else {
                    self.parse_type_hint()
                };
                if !self.expect(TokenKind::Variable) {
                    if !matches!(
                        self.current_token.kind,
                        TokenKind::CloseBrace | TokenKind::Eof
                    ) {
                        self.bump();
                    }
                    return None;
                }

                let mut entries = std::vec::Vec::new();
                while self.current_token.kind == TokenKind::Variable {
                    let entry_start = self.node();
                    let name = self.arena.alloc(self.current_token);
                    self.bump();
                    let default = if self.current_token.kind == TokenKind::Eq {
                        self.bump();
                        Some(self.parse_expr())
                    } else {
                        None
                    };
                    entries.push(PropertyEntry {
                        name,
                        default,
                        span: self.finish(entry_start),
                    });
                    if self.current_token.kind == TokenKind::Comma {
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.consume(TokenKind::SemiColon);
                Some(ClassMember::Property {
                    modifiers,
                    ty,
                    entries: self.arena.alloc_slice_copy(&entries),
                    doc: start.doc,
                    span: self.finish(start),
                })
            }
        }
    }

    fn eat_ampersand(&mut self) -> bool {
        let found = self.current_token.kind == TokenKind::Ampersand;
        if found {
            self.bump();
        }
        found
    }

    /// Function, method or constant name; reserved words are allowed.
    fn parse_declared_name(&mut self) -> &'ast Token {
        let token = self.current_token;
        if token.kind == TokenKind::Identifier || token.kind.is_semi_reserved() {
            self.bump();
            return self.arena.alloc(token);
        }
        self.expect(TokenKind::Identifier);
        self.arena.alloc(Token {
            kind: TokenKind::Error,
            span: token.span,
        })
    }

    fn parse_signature(&mut self, by_ref: bool) -> Signature<'ast> {
        let params = self.parse_params();
        let return_type = self.parse_return_type();
        Signature {
            by_ref,
            params,
            return_type,
        }
    }

    fn parse_params(&mut self) -> &'ast [Param<'ast>] {
        if !self.consume(TokenKind::OpenParen) {
            return &[];
        }
        let mut params = std::vec::Vec::new();
        while self.current_token.kind != TokenKind::CloseParen
            && self.current_token.kind != TokenKind::Eof
        {
            params.push(self.parse_param());
            if self.current_token.kind == TokenKind::Comma {
                self.bump();
            } else {
                break;
            }
        }
        self.consume(TokenKind::CloseParen);
        self.arena.alloc_slice_copy(&params)
    }

    fn parse_param(&mut self) -> Param<'ast> {
        let start = self.node();
        let ty = if self.current_token.kind == TokenKind::Variable {
            None
        } else {
            self.parse_type_hint()
        };
        let by_ref = self.eat_ampersand();
        let variadic = self.current_token.kind == TokenKind::Ellipsis;
        if variadic {
            self.bump();
        }

        if !self.expect(TokenKind::Variable) {
            let span = self.current_token.span;
            if !matches!(
                self.current_token.kind,
                TokenKind::CloseParen | TokenKind::Eof
            ) {
                self.bump();
            }
            return Param {
                name: self.arena.alloc(Token {
                    kind: TokenKind::Error,
                    span,
                }),
                ty,
                default: None,
                by_ref,
                variadic,
                span: self.finish(start),
            };
        }

        let name = self.arena.alloc(self.current_token);
        self.bump();
        let default = if self.current_token.kind == TokenKind::Eq {
            self.bump();
            Some(self.parse_expr())
        } else {
            None
        };

        Param {
            name,
            ty,
            default,
            by_ref,
            variadic,
            span: self.finish(start),
        }
    }

    fn parse_return_type(&mut self) -> Option<TypeHint<'ast>> {
        if self.current_token.kind != TokenKind::Colon {
            return None;
        }
        self.bump();
        let ty = self.parse_type_hint();
        if ty.is_none() {
            self.expect(TokenKind::Identifier);
        }
        ty
    }

    /// `?Foo`, `\A\B`, `array`, `static`. Returns None when no type starts
    /// here.
    fn parse_type_hint(&mut self) -> Option<TypeHint<'ast>> {
        let start = self.node();
        let nullable = self.current_token.kind == TokenKind::Question;
        if nullable {
            self.bump();
        }

        let name = match self.current_token.kind {
            TokenKind::Identifier | TokenKind::NsSeparator | TokenKind::Namespace => {
                self.parse_name()
            }
            TokenKind::Array | TokenKind::Static => {
                let token = self.current_token;
                self.bump();
                Name {
                    parts: self.arena.alloc_slice_copy(&[token]),
                    span: token.span,
                }
            }
            _ => {
                if nullable {
                    self.expect(TokenKind::Identifier);
                }
                return None;
            }
        };

        Some(TypeHint {
            nullable,
            name,
            span: self.finish(start),
        })
    }
}
