use crate::ast::{
    BinaryOp, BoolOp, CastKind, ClassMember, Expr, ExprId, ListItem, Name, NewTarget, ParseError,
    PostOp, UnaryOp,
};
use crate::lexer::token::TokenKind;
use crate::parser::variable::VariableMode;
use crate::parser::{Checkpoint, NodeStart, Parser};

/// Whether a `list(...)` being read sits directly inside another one.
/// Only an outer list may take a trailing `= expr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ListContext {
    Outer,
    Nested,
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Ampersand => BinaryOp::BitAnd,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Dot => BinaryOp::Concat,
        TokenKind::Plus => BinaryOp::Plus,
        TokenKind::Minus => BinaryOp::Minus,
        TokenKind::Asterisk => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Pow => BinaryOp::Pow,
        TokenKind::Sl => BinaryOp::ShiftLeft,
        TokenKind::Sr => BinaryOp::ShiftRight,
        _ => return None,
    })
}

fn bool_op(kind: TokenKind) -> Option<BoolOp> {
    Some(match kind {
        TokenKind::PipePipe | TokenKind::LogicalOr => BoolOp::Or,
        TokenKind::AmpersandAmpersand | TokenKind::LogicalAnd => BoolOp::And,
        TokenKind::LogicalXor => BoolOp::Xor,
        TokenKind::EqEqEq => BoolOp::Identical,
        TokenKind::BangEqEq => BoolOp::NotIdentical,
        TokenKind::EqEq => BoolOp::Equal,
        TokenKind::BangEq => BoolOp::NotEqual,
        TokenKind::Lt => BoolOp::Lt,
        TokenKind::Gt => BoolOp::Gt,
        TokenKind::LtEq => BoolOp::LtEq,
        TokenKind::GtEq => BoolOp::GtEq,
        TokenKind::Spaceship => BoolOp::Spaceship,
        TokenKind::InstanceOf => BoolOp::InstanceOf,
        _ => return None,
    })
}

/// Compound assignment tokens and the operator they desugar to.
fn compound_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::PlusEq => BinaryOp::Plus,
        TokenKind::MinusEq => BinaryOp::Minus,
        TokenKind::MulEq => BinaryOp::Mul,
        TokenKind::PowEq => BinaryOp::Pow,
        TokenKind::DivEq => BinaryOp::Div,
        TokenKind::ConcatEq => BinaryOp::Concat,
        TokenKind::ModEq => BinaryOp::Mod,
        TokenKind::AndEq => BinaryOp::BitAnd,
        TokenKind::OrEq => BinaryOp::BitOr,
        TokenKind::XorEq => BinaryOp::BitXor,
        TokenKind::SlEq => BinaryOp::ShiftLeft,
        TokenKind::SrEq => BinaryOp::ShiftRight,
        _ => return None,
    })
}

fn cast_kind(kind: TokenKind) -> Option<CastKind> {
    Some(match kind {
        TokenKind::IntCast => CastKind::Int,
        TokenKind::DoubleCast => CastKind::Double,
        TokenKind::StringCast => CastKind::String,
        TokenKind::ArrayCast => CastKind::Array,
        TokenKind::ObjectCast => CastKind::Object,
        TokenKind::BoolCast => CastKind::Bool,
        TokenKind::UnsetCast => CastKind::Unset,
        _ => return None,
    })
}

impl<'src, 'ast> Parser<'src, 'ast> {
    /// Reads one full expression: a primary item followed by any operator
    /// chain.
    pub fn parse_expression(&mut self) -> ExprId<'ast> {
        self.parse_expr()
    }

    /// Every operator recurses into the full grammar for its right-hand
    /// side, so mixed chains group to the right: `1 * 2 + 3` is
    /// `1 * (2 + 3)`.
    pub(super) fn parse_expr(&mut self) -> ExprId<'ast> {
        if !self.enter() {
            return self.depth_error();
        }
        let start = self.node();
        let left = self.parse_expr_item();
        let expr = self.parse_operator(start, left);
        self.leave();
        expr
    }

    fn depth_error(&mut self) -> ExprId<'ast> {
        let span = self.current_token.span;
        if self.current_token.kind != TokenKind::Eof {
            self.bump();
        }
        self.arena.alloc(Expr::Error { span })
    }

    fn parse_operator(&mut self, start: NodeStart, left: ExprId<'ast>) -> ExprId<'ast> {
        let kind = self.current_token.kind;

        if let Some(op) = binary_op(kind) {
            self.bump();
            let right = self.parse_expr();
            return self.arena.alloc(Expr::Binary {
                op,
                left,
                right,
                span: self.finish(start),
            });
        }

        if let Some(op) = bool_op(kind) {
            self.bump();
            let right = self.parse_expr();
            return self.arena.alloc(Expr::Bool {
                op,
                left,
                right,
                span: self.finish(start),
            });
        }

        match kind {
            TokenKind::Coalesce => {
                self.bump();
                let right = self.parse_expr();
                self.arena.alloc(Expr::Coalesce {
                    left,
                    right,
                    span: self.finish(start),
                })
            }
            TokenKind::Question => {
                self.bump();
                let if_true = if self.current_token.kind == TokenKind::Colon {
                    None
                } else {
                    Some(self.parse_expr())
                };
                self.consume(TokenKind::Colon);
                let if_false = self.parse_expr();
                self.arena.alloc(Expr::Ternary {
                    condition: left,
                    if_true,
                    if_false,
                    span: self.finish(start),
                })
            }
            _ => left,
        }
    }

    pub(super) fn parse_expr_item(&mut self) -> ExprId<'ast> {
        self.parse_expr_item_in(ListContext::Outer)
    }

    fn parse_expr_item_in(&mut self, list: ListContext) -> ExprId<'ast> {
        if !self.enter() {
            return self.depth_error();
        }
        let expr = self.parse_primary(list);
        self.leave();
        expr
    }

    fn parse_primary(&mut self, list: ListContext) -> ExprId<'ast> {
        let start = self.node();
        let token = self.current_token;

        match token.kind {
            TokenKind::At => {
                self.bump();
                let expr = self.parse_expr();
                return self.arena.alloc(Expr::Silent {
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Minus => {
                self.bump();
                if matches!(
                    self.current_token.kind,
                    TokenKind::LNumber | TokenKind::DNumber
                ) {
                    let digits = self.text();
                    let mut value =
                        bumpalo::collections::Vec::with_capacity_in(digits.len() + 1, self.arena);
                    value.push(b'-');
                    value.extend_from_slice(digits);
                    self.bump();
                    return self.arena.alloc(Expr::Number {
                        value: value.into_bump_slice(),
                        span: self.finish(start),
                    });
                }
                let expr = self.parse_expr();
                return self.arena.alloc(Expr::Unary {
                    op: UnaryOp::Minus,
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Plus | TokenKind::Bang | TokenKind::BitNot => {
                let op = match token.kind {
                    TokenKind::Plus => UnaryOp::Plus,
                    TokenKind::Bang => UnaryOp::Not,
                    _ => UnaryOp::BitNot,
                };
                self.bump();
                let expr = self.parse_expr();
                return self.arena.alloc(Expr::Unary {
                    op,
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::OpenParen => {
                self.bump();
                let expr = self.parse_expr();
                self.consume(TokenKind::CloseParen);
                if matches!(
                    self.current_token.kind,
                    TokenKind::Arrow
                        | TokenKind::OpenBracket
                        | TokenKind::OpenBrace
                        | TokenKind::OpenParen
                ) {
                    return self.parse_dereference_chain(start, expr, VariableMode::Expression);
                }
                return expr;
            }
            TokenKind::Backtick => {
                let parts = self.parse_encapsed(TokenKind::Backtick);
                return self.arena.alloc(Expr::ShellExec {
                    parts,
                    span: self.finish(start),
                });
            }
            TokenKind::List => return self.parse_list(list),
            TokenKind::Clone => {
                self.bump();
                let expr = self.parse_expr();
                return self.arena.alloc(Expr::Clone {
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Inc | TokenKind::Dec => {
                let op = if token.kind == TokenKind::Inc {
                    BinaryOp::Plus
                } else {
                    BinaryOp::Minus
                };
                self.bump();
                let target = self.checkpoint();
                let var = self.parse_variable(VariableMode::Expression);
                let left = self.reparse_target(target);
                let one = self.arena.alloc(Expr::Number {
                    value: b"1",
                    span: token.span,
                });
                let span = self.finish(start);
                let value = self.arena.alloc(Expr::Binary {
                    op,
                    left,
                    right: one,
                    span,
                });
                return self.arena.alloc(Expr::Set { var, value, span });
            }
            TokenKind::New => {
                self.bump();
                return self.parse_new_expr(start);
            }
            TokenKind::Isset => {
                self.bump();
                self.consume(TokenKind::OpenParen);
                let mut vars = std::vec::Vec::new();
                loop {
                    vars.push(self.parse_expr());
                    if self.current_token.kind != TokenKind::Comma {
                        break;
                    }
                    self.bump();
                    if self.current_token.kind == TokenKind::CloseParen {
                        break;
                    }
                }
                self.consume(TokenKind::CloseParen);
                return self.arena.alloc(Expr::Isset {
                    vars: self.arena.alloc_slice_copy(&vars),
                    span: self.finish(start),
                });
            }
            TokenKind::Empty => {
                self.bump();
                self.consume(TokenKind::OpenParen);
                let expr = self.parse_expr();
                self.consume(TokenKind::CloseParen);
                return self.arena.alloc(Expr::Empty {
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Include
            | TokenKind::IncludeOnce
            | TokenKind::Require
            | TokenKind::RequireOnce => {
                let once = matches!(token.kind, TokenKind::IncludeOnce | TokenKind::RequireOnce);
                let require = matches!(token.kind, TokenKind::Require | TokenKind::RequireOnce);
                self.bump();
                let expr = self.parse_expr();
                return self.arena.alloc(Expr::Include {
                    once,
                    require,
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Eval => {
                self.bump();
                self.consume(TokenKind::OpenParen);
                let expr = self.parse_expr();
                self.consume(TokenKind::CloseParen);
                return self.arena.alloc(Expr::Eval {
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Exit => {
                self.bump();
                let mut expr = None;
                if self.current_token.kind == TokenKind::OpenParen {
                    self.bump();
                    if self.current_token.kind == TokenKind::CloseParen {
                        self.bump();
                    } else {
                        expr = Some(self.parse_expr());
                        self.consume(TokenKind::CloseParen);
                    }
                }
                return self.arena.alloc(Expr::Exit {
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Print => {
                self.bump();
                let expr = self.parse_expr();
                return self.arena.alloc(Expr::Print {
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Yield => {
                self.bump();
                let (mut key, mut value) = (None, None);
                if self.current_token.kind.starts_expr() {
                    let first = self.parse_expr();
                    if self.current_token.kind == TokenKind::DoubleArrow {
                        self.bump();
                        key = Some(first);
                        value = Some(self.parse_expr());
                    } else {
                        value = Some(first);
                    }
                }
                return self.arena.alloc(Expr::Yield {
                    key,
                    value,
                    span: self.finish(start),
                });
            }
            TokenKind::YieldFrom => {
                self.bump();
                let expr = self.parse_expr();
                return self.arena.alloc(Expr::YieldFrom {
                    expr,
                    span: self.finish(start),
                });
            }
            TokenKind::Function => return self.parse_closure(start, false),
            TokenKind::Static if self.next_token.kind == TokenKind::Function => {
                self.bump();
                return self.parse_closure(start, true);
            }
            _ => {}
        }

        if let Some(kind) = cast_kind(token.kind) {
            self.bump();
            let expr = self.parse_expr();
            return self.arena.alloc(Expr::Cast {
                kind,
                expr,
                span: self.finish(start),
            });
        }

        if token.kind.starts_variable() {
            let target = self.checkpoint();
            let var = self.parse_variable(VariableMode::Expression);
            return self.parse_variable_suffix(start, var, target);
        }

        if token.kind.starts_scalar() {
            let scalar = self.parse_scalar();
            if matches!(
                self.current_token.kind,
                TokenKind::Arrow
                    | TokenKind::OpenBracket
                    | TokenKind::OpenBrace
                    | TokenKind::OpenParen
            ) {
                return self.parse_dereference_chain(start, scalar, VariableMode::Expression);
            }
            return scalar;
        }

        self.push_error(ParseError::new(token.span, "Expected EXPR"));
        if token.kind != TokenKind::Eof {
            self.bump();
        }
        self.arena.alloc(Expr::Error { span: token.span })
    }

    /// Reads the variable reference at `target` a second time, so the
    /// operand of a desugared assignment is its own subtree and not the
    /// node already stored as the assignment target. The cursor ends up
    /// where it was before the call.
    fn reparse_target(&mut self, target: Checkpoint<'src>) -> ExprId<'ast> {
        let resume = self.checkpoint();
        self.rewind(target);
        let copy = self.parse_variable(VariableMode::Expression);
        self.rewind(resume);
        copy
    }

    /// Assignment forms that only apply after a variable reference; `target`
    /// is the cursor position where `var` began.
    fn parse_variable_suffix(
        &mut self,
        start: NodeStart,
        var: ExprId<'ast>,
        target: Checkpoint<'src>,
    ) -> ExprId<'ast> {
        let kind = self.current_token.kind;

        if kind == TokenKind::Eq {
            self.bump();
            if self.current_token.kind == TokenKind::Ampersand {
                self.bump();
                let expr = if self.current_token.kind == TokenKind::New {
                    let new_start = self.node();
                    self.bump();
                    self.parse_new_expr(new_start)
                } else {
                    self.parse_variable(VariableMode::Expression)
                };
                return self.arena.alloc(Expr::Assign {
                    var,
                    expr,
                    by_ref: true,
                    span: self.finish(start),
                });
            }
            let expr = self.parse_expr();
            return self.arena.alloc(Expr::Assign {
                var,
                expr,
                by_ref: false,
                span: self.finish(start),
            });
        }

        if let Some(op) = compound_op(kind) {
            let left = self.reparse_target(target);
            self.bump();
            let right = self.parse_expr();
            let span = self.finish(start);
            let value = self.arena.alloc(Expr::Binary {
                op,
                left,
                right,
                span,
            });
            return self.arena.alloc(Expr::Set { var, value, span });
        }

        let op = match kind {
            TokenKind::Inc => PostOp::Increment,
            TokenKind::Dec => PostOp::Decrement,
            _ => return var,
        };
        self.bump();
        self.arena.alloc(Expr::Post {
            op,
            var,
            span: self.finish(start),
        })
    }

    /// `list(...)`, with an optional `= expr` when not nested in another
    /// list. A pattern whose every slot is empty is fatal.
    fn parse_list(&mut self, context: ListContext) -> ExprId<'ast> {
        let start = self.node();
        let keyword = self.current_token.span;
        self.bump();
        self.consume(TokenKind::OpenParen);

        let mut items = std::vec::Vec::new();
        loop {
            items.push(self.parse_list_element());
            if self.current_token.kind != TokenKind::Comma {
                break;
            }
            self.bump();
        }

        if items.iter().all(Option::is_none) {
            let line = keyword.line(self.lexer.source());
            self.push_error(ParseError::fatal(
                keyword,
                format!("Cannot use empty list on line {line}"),
            ));
        }
        self.consume(TokenKind::CloseParen);

        let list: ExprId<'ast> = self.arena.alloc(Expr::List {
            items: self.arena.alloc_slice_copy(&items),
            span: self.finish(start),
        });

        if context == ListContext::Outer && self.current_token.kind == TokenKind::Eq {
            self.bump();
            let expr = self.parse_expr();
            return self.arena.alloc(Expr::Assign {
                var: list,
                expr,
                by_ref: false,
                span: self.finish(start),
            });
        }
        list
    }

    /// One slot of a list pattern; `None` for a skipped position.
    fn parse_list_element(&mut self) -> Option<ListItem<'ast>> {
        if matches!(
            self.current_token.kind,
            TokenKind::Comma | TokenKind::CloseParen
        ) {
            return None;
        }
        let start = self.node();
        let first = self.parse_expr_item_in(ListContext::Nested);
        if self.current_token.kind == TokenKind::DoubleArrow {
            self.bump();
            let value = self.parse_expr_item_in(ListContext::Nested);
            return Some(ListItem {
                key: Some(first),
                value,
                span: self.finish(start),
            });
        }
        Some(ListItem {
            key: None,
            value: first,
            span: self.finish(start),
        })
    }

    /// Everything after `new`.
    pub(super) fn parse_new_expr(&mut self, start: NodeStart) -> ExprId<'ast> {
        if self.current_token.kind == TokenKind::Class {
            let class_start = self.node();
            self.bump();
            let args = self.parse_call_arguments();
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
            return self.arena.alloc(Expr::New {
                class: NewTarget::Anonymous {
                    extends,
                    implements,
                    members,
                    span: self.finish(class_start),
                },
                args,
                span: self.finish(start),
            });
        }

        let class = self.parse_class_reference();
        let args = self.parse_call_arguments();
        self.arena.alloc(Expr::New {
            class: NewTarget::Class(class),
            args,
            span: self.finish(start),
        })
    }

    /// The class part of `new X`: a name, optionally with a static member
    /// access, or a variable reference without call parentheses.
    fn parse_class_reference(&mut self) -> ExprId<'ast> {
        let start = self.node();
        match self.current_token.kind {
            TokenKind::NsSeparator | TokenKind::Identifier | TokenKind::Namespace => {
                let name = self.parse_name();
                let class: ExprId<'ast> = self.arena.alloc(Expr::Name {
                    name,
                    span: name.span,
                });
                if self.current_token.kind == TokenKind::DoubleColon {
                    self.bump();
                    return self.parse_static_member(start, class, VariableMode::ClassReference);
                }
                class
            }
            kind if kind.starts_variable() => self.parse_variable(VariableMode::ClassReference),
            _ => {
                let span = self.current_token.span;
                self.push_error(ParseError::new(span, "Expected identifier or variable"));
                self.arena.alloc(Expr::Error { span })
            }
        }
    }
}
