mod decl;
mod expr;
mod scalar;
mod variable;

use crate::ast::{Name, ParseError, Program, Stmt, StmtId};
use crate::lexer::Lexer;
use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;
use bumpalo::Bump;
use serde::Deserialize;

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Nested reader frames allowed before the parser gives up on a
    /// construct and records a diagnostic instead of recursing further.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Where a node began: the start offset of its first token and the doc
/// comment that preceded it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeStart {
    pub start: usize,
    pub doc: Option<Span>,
}

/// Saved cursor position. Rewinding to it discards diagnostics recorded
/// after it was taken.
#[derive(Clone)]
pub(crate) struct Checkpoint<'src> {
    lexer: Lexer<'src>,
    prev_token: Token,
    current_token: Token,
    next_token: Token,
    current_doc_comment: Option<Span>,
    next_doc_comment: Option<Span>,
    errors: usize,
    depth: usize,
}

pub struct Parser<'src, 'ast> {
    lexer: Lexer<'src>,
    arena: &'ast Bump,
    config: ParserConfig,
    prev_token: Token,
    current_token: Token,
    next_token: Token,
    current_doc_comment: Option<Span>,
    next_doc_comment: Option<Span>,
    errors: std::vec::Vec<ParseError>,
    depth: usize,
}

impl<'src, 'ast> Parser<'src, 'ast> {
    pub fn new(lexer: Lexer<'src>, arena: &'ast Bump) -> Self {
        Self::with_config(lexer, arena, ParserConfig::default())
    }

    pub fn with_config(lexer: Lexer<'src>, arena: &'ast Bump, config: ParserConfig) -> Self {
        let eof = Token {
            kind: TokenKind::Eof,
            span: Span::default(),
        };
        let mut parser = Self {
            lexer,
            arena,
            config,
            prev_token: eof,
            current_token: eof,
            next_token: eof,
            current_doc_comment: None,
            next_doc_comment: None,
            errors: std::vec::Vec::new(),
            depth: 0,
        };
        parser.bump();
        parser.bump();
        parser
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn bump(&mut self) {
        self.prev_token = self.current_token;
        self.current_token = self.next_token;
        self.current_doc_comment = self.next_doc_comment.take();
        loop {
            let token = self.lexer.next().unwrap_or(Token {
                kind: TokenKind::Eof,
                span: Span::default(),
            });
            match token.kind {
                TokenKind::DocComment => self.next_doc_comment = Some(token.span),
                TokenKind::Comment => {}
                _ => {
                    self.next_token = token;
                    break;
                }
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint<'src> {
        Checkpoint {
            lexer: self.lexer.clone(),
            prev_token: self.prev_token,
            current_token: self.current_token,
            next_token: self.next_token,
            current_doc_comment: self.current_doc_comment,
            next_doc_comment: self.next_doc_comment,
            errors: self.errors.len(),
            depth: self.depth,
        }
    }

    fn rewind(&mut self, checkpoint: Checkpoint<'src>) {
        self.lexer = checkpoint.lexer;
        self.prev_token = checkpoint.prev_token;
        self.current_token = checkpoint.current_token;
        self.next_token = checkpoint.next_token;
        self.current_doc_comment = checkpoint.current_doc_comment;
        self.next_doc_comment = checkpoint.next_doc_comment;
        self.errors.truncate(checkpoint.errors);
        self.depth = checkpoint.depth;
    }

    /// Literal bytes of the current token.
    fn text(&self) -> &'src [u8] {
        self.lexer.slice(self.current_token.span)
    }

    fn node(&self) -> NodeStart {
        NodeStart {
            start: self.current_token.span.start,
            doc: self.current_doc_comment,
        }
    }

    /// Span from `start` to the end of the last consumed token.
    fn finish(&self, start: NodeStart) -> Span {
        Span::new(start.start, self.prev_token.span.end.max(start.start))
    }

    /// Records `Expected '<tok>'` unless the current token is `kind`. Never
    /// consumes.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.current_token.kind == kind {
            return true;
        }
        self.push_error(ParseError::new(
            self.current_token.span,
            format!("Expected '{}'", kind.describe()),
        ));
        false
    }

    /// `expect` followed by a bump when the token matched.
    fn consume(&mut self, kind: TokenKind) -> bool {
        let matched = self.expect(kind);
        if matched {
            self.bump();
        }
        matched
    }

    fn push_error(&mut self, error: ParseError) {
        tracing::trace!(
            message = %error.message,
            start = error.span.start,
            end = error.span.end,
            "parse diagnostic"
        );
        self.errors.push(error);
    }

    /// Enters one nesting level. Returns false, after recording the depth
    /// diagnostic, when the configured limit is already reached.
    fn enter(&mut self) -> bool {
        if self.depth >= self.config.max_depth {
            tracing::debug!(
                depth = self.depth,
                offset = self.current_token.span.start,
                "nesting limit reached"
            );
            self.push_error(ParseError::new(
                self.current_token.span,
                "Maximum expression nesting depth exceeded",
            ));
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expect_semicolon(&mut self) {
        match self.current_token.kind {
            TokenKind::SemiColon => self.bump(),
            // `?>` and end of input close a statement implicitly
            TokenKind::CloseTag | TokenKind::Eof => {}
            _ => {
                self.push_error(ParseError::new(
                    self.current_token.span,
                    "Missing semicolon",
                ));
                self.sync_to_statement_end();
            }
        }
    }

    fn sync_to_statement_end(&mut self) {
        while !matches!(
            self.current_token.kind,
            TokenKind::SemiColon | TokenKind::CloseBrace | TokenKind::CloseTag | TokenKind::Eof
        ) {
            self.bump();
        }
        if self.current_token.kind == TokenKind::SemiColon {
            self.bump();
        }
    }

    /// Reads `Foo`, `\A\B` or `namespace\C`. Segments after a separator may
    /// be reserved words.
    fn parse_name(&mut self) -> Name<'ast> {
        let start = self.current_token.span.start;
        let mut parts = std::vec::Vec::new();

        if self.current_token.kind == TokenKind::Namespace
            && self.next_token.kind == TokenKind::NsSeparator
        {
            parts.push(self.current_token);
            self.bump();
        }
        if self.current_token.kind == TokenKind::NsSeparator {
            parts.push(self.current_token);
            self.bump();
        }

        loop {
            let kind = self.current_token.kind;
            let segment_ok = kind == TokenKind::Identifier
                || (!parts.is_empty() && kind.is_semi_reserved());
            if !segment_ok {
                self.expect(TokenKind::Identifier);
                break;
            }
            parts.push(self.current_token);
            self.bump();

            if self.current_token.kind == TokenKind::NsSeparator {
                parts.push(self.current_token);
                self.bump();
            } else {
                break;
            }
        }

        let end = parts.last().map_or(start, |t| t.span.end);
        Name {
            parts: self.arena.alloc_slice_copy(&parts),
            span: Span::new(start, end),
        }
    }

    /// Comma-separated names, as after `implements`.
    fn parse_name_list(&mut self) -> &'ast [Name<'ast>] {
        let mut names = std::vec::Vec::new();
        loop {
            names.push(self.parse_name());
            if self.current_token.kind == TokenKind::Comma {
                self.bump();
            } else {
                break;
            }
        }
        self.arena.alloc_slice_copy(&names)
    }

    pub fn parse_program(&mut self) -> Program<'ast> {
        let mut statements = std::vec::Vec::new();

        while self.current_token.kind != TokenKind::Eof {
            statements.push(self.parse_stmt());
        }

        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => Span::new(first.span().start, last.span().end),
            _ => Span::default(),
        };

        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );

        Program {
            statements: self.arena.alloc_slice_copy(&statements),
            errors: std::mem::take(&mut self.errors),
            span,
        }
    }

    fn parse_stmt(&mut self) -> StmtId<'ast> {
        if !self.enter() {
            // consume even a `}`: at the top level nothing else will
            let span = self.current_token.span;
            if self.current_token.kind != TokenKind::Eof {
                self.bump();
            }
            self.sync_to_statement_end();
            return self.arena.alloc(Stmt::Error { span });
        }
        let stmt = self.parse_stmt_inner();
        self.leave();
        stmt
    }

    fn parse_stmt_inner(&mut self) -> StmtId<'ast> {
        let token = self.current_token;
        match token.kind {
            TokenKind::OpenTag | TokenKind::CloseTag | TokenKind::SemiColon => {
                self.bump();
                self.arena.alloc(Stmt::Nop { span: token.span })
            }
            TokenKind::InlineHtml => {
                self.bump();
                self.arena.alloc(Stmt::InlineHtml {
                    value: self.arena.alloc_slice_copy(self.lexer.slice(token.span)),
                    span: token.span,
                })
            }
            TokenKind::Echo | TokenKind::OpenTagEcho => self.parse_echo(),
            TokenKind::Return => self.parse_return(),
            TokenKind::OpenBrace => self.parse_block(),
            TokenKind::Function if self.starts_function_declaration() => {
                self.parse_function_declaration()
            }
            TokenKind::Class => self.parse_class(self.node(), &[]),
            TokenKind::Abstract | TokenKind::Final | TokenKind::Readonly => {
                let start = self.node();
                let mut modifiers = std::vec::Vec::new();
                while matches!(
                    self.current_token.kind,
                    TokenKind::Abstract | TokenKind::Final | TokenKind::Readonly
                ) {
                    modifiers.push(self.current_token);
                    self.bump();
                }
                if self.expect(TokenKind::Class) {
                    self.parse_class(start, self.arena.alloc_slice_copy(&modifiers))
                } else {
                    self.sync_to_statement_end();
                    self.arena.alloc(Stmt::Error { span: token.span })
                }
            }
            _ => {
                let start = self.node();
                let expr = self.parse_expr();
                self.expect_semicolon();
                self.arena.alloc(Stmt::Expression {
                    expr,
                    doc: start.doc,
                    span: self.finish(start),
                })
            }
        }
    }

    /// `function name(` or `function &name(` at statement start; anything
    /// else is a closure expression.
    fn starts_function_declaration(&self) -> bool {
        match self.next_token.kind {
            TokenKind::Identifier => true,
            TokenKind::Ampersand => {
                let mut lookahead = self.lexer.clone();
                lookahead
                    .find(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::DocComment))
                    .is_some_and(|t| t.kind == TokenKind::Identifier)
            }
            _ => false,
        }
    }

    fn parse_echo(&mut self) -> StmtId<'ast> {
        let start = self.node();
        self.bump();

        let mut exprs = std::vec::Vec::new();
        exprs.push(self.parse_expr());
        while self.current_token.kind == TokenKind::Comma {
            self.bump();
            exprs.push(self.parse_expr());
        }

        self.expect_semicolon();

        self.arena.alloc(Stmt::Echo {
            exprs: self.arena.alloc_slice_copy(&exprs),
            span: self.finish(start),
        })
    }

    fn parse_return(&mut self) -> StmtId<'ast> {
        let start = self.node();
        self.bump();

        let expr = if matches!(
            self.current_token.kind,
            TokenKind::SemiColon | TokenKind::CloseTag | TokenKind::Eof | TokenKind::CloseBrace
        ) {
            None
        } else {
            Some(self.parse_expr())
        };

        self.expect_semicolon();

        self.arena.alloc(Stmt::Return {
            expr,
            span: self.finish(start),
        })
    }

    fn parse_block(&mut self) -> StmtId<'ast> {
        let start = self.node();
        let statements = self.parse_braced_statements();
        self.arena.alloc(Stmt::Block {
            statements,
            span: self.finish(start),
        })
    }

    /// `{ stmt* }`; an absent `{` records a diagnostic and yields no
    /// statements.
    fn parse_braced_statements(&mut self) -> &'ast [StmtId<'ast>] {
        if !self.consume(TokenKind::OpenBrace) {
            return &[];
        }

        let mut statements = std::vec::Vec::new();
        while self.current_token.kind != TokenKind::CloseBrace
            && self.current_token.kind != TokenKind::Eof
        {
            statements.push(self.parse_stmt());
        }
        self.consume(TokenKind::CloseBrace);

        self.arena.alloc_slice_copy(&statements)
    }
}
