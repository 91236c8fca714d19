use crate::span::Span;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash, Serialize)]
pub enum TokenKind {
    // Keywords
    Function, Class, Extends, Implements,
    Echo, Print, Return,
    Public, Protected, Private, Static, Abstract, Final, Readonly, Var,
    Namespace, Use, Const,
    New, Clone, InstanceOf,
    Array, List,
    Include, IncludeOnce, Require, RequireOnce, Eval, Exit,
    Empty, Isset,
    Yield, YieldFrom,

    // Magic Constants
    Line, File, Dir, ClassC, TraitC, MethodC, FuncC, NsC,

    // Casts
    IntCast, DoubleCast, StringCast, ArrayCast, ObjectCast, BoolCast, UnsetCast,

    // Identifiers & Literals
    Identifier,
    LNumber,
    DNumber,
    StringLiteral,
    Variable,
    InlineHtml,
    EncapsedAndWhitespace,
    DollarOpenCurlyBraces, // ${
    CurlyOpen, // {$
    Backtick, // `
    DoubleQuote, // "
    Dollar, // $ (for variable variables like $$a)
    NsSeparator, // \

    // Comments
    Comment,
    DocComment,

    // Symbols
    Arrow, // ->
    DoubleArrow, // =>
    DoubleColon, // ::
    Ellipsis, // ...

    Plus, Minus, Asterisk, Slash, Percent, Dot,
    Pow, // **
    Inc, Dec, // ++, --

    Eq, // =
    PlusEq, MinusEq, MulEq, DivEq, ModEq, ConcatEq, PowEq,
    AndEq, OrEq, XorEq, SlEq, SrEq, CoalesceEq,

    EqEq, // ==
    EqEqEq, // ===
    Bang, // !
    BangEq, // !=
    BangEqEq, // !==
    Lt, // <
    LtEq, // <=
    Gt, // >
    GtEq, // >=
    Spaceship, // <=>

    Ampersand, // &
    Pipe, // |
    Caret, // ^
    BitNot, // ~
    Sl, // <<
    Sr, // >>

    AmpersandAmpersand, // &&
    PipePipe, // ||
    LogicalAnd, // and
    LogicalOr, // or
    LogicalXor, // xor
    Question, // ?
    Coalesce, // ??
    At, // @

    SemiColon,
    Colon,
    Comma,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,

    OpenTag, // <?php
    OpenTagEcho, // <?=
    CloseTag, // ?>

    Eof,

    // Error token for lexing failures
    Error,
}

impl TokenKind {
    /// Keywords that may still appear as member names after `->` or `::`.
    pub fn is_semi_reserved(&self) -> bool {
        matches!(
            self,
            TokenKind::Function
                | TokenKind::Class
                | TokenKind::Extends
                | TokenKind::Implements
                | TokenKind::Echo
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Abstract
                | TokenKind::Final
                | TokenKind::Readonly
                | TokenKind::Var
                | TokenKind::Namespace
                | TokenKind::Use
                | TokenKind::Const
                | TokenKind::New
                | TokenKind::Clone
                | TokenKind::InstanceOf
                | TokenKind::Array
                | TokenKind::List
                | TokenKind::Include
                | TokenKind::IncludeOnce
                | TokenKind::Require
                | TokenKind::RequireOnce
                | TokenKind::Eval
                | TokenKind::Exit
                | TokenKind::Empty
                | TokenKind::Isset
                | TokenKind::Yield
                | TokenKind::LogicalAnd
                | TokenKind::LogicalOr
                | TokenKind::LogicalXor
        )
    }

    pub fn is_magic_const(&self) -> bool {
        matches!(
            self,
            TokenKind::Line
                | TokenKind::File
                | TokenKind::Dir
                | TokenKind::ClassC
                | TokenKind::TraitC
                | TokenKind::MethodC
                | TokenKind::FuncC
                | TokenKind::NsC
        )
    }

    pub fn is_cast(&self) -> bool {
        matches!(
            self,
            TokenKind::IntCast
                | TokenKind::DoubleCast
                | TokenKind::StringCast
                | TokenKind::ArrayCast
                | TokenKind::ObjectCast
                | TokenKind::BoolCast
                | TokenKind::UnsetCast
        )
    }

    /// Tokens that can begin a variable reference (including names that
    /// resolve to calls, constants or static lookups).
    pub fn starts_variable(&self) -> bool {
        matches!(
            self,
            TokenKind::Variable
                | TokenKind::Dollar
                | TokenKind::Identifier
                | TokenKind::NsSeparator
                | TokenKind::Namespace
                | TokenKind::Static
        )
    }

    pub fn starts_scalar(&self) -> bool {
        matches!(
            self,
            TokenKind::LNumber
                | TokenKind::DNumber
                | TokenKind::StringLiteral
                | TokenKind::DoubleQuote
                | TokenKind::Array
                | TokenKind::OpenBracket
        ) || self.is_magic_const()
    }

    pub fn starts_expr(&self) -> bool {
        matches!(
            self,
            TokenKind::At
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Bang
                | TokenKind::BitNot
                | TokenKind::OpenParen
                | TokenKind::Backtick
                | TokenKind::List
                | TokenKind::Clone
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::New
                | TokenKind::Isset
                | TokenKind::Empty
                | TokenKind::Include
                | TokenKind::IncludeOnce
                | TokenKind::Require
                | TokenKind::RequireOnce
                | TokenKind::Eval
                | TokenKind::Exit
                | TokenKind::Print
                | TokenKind::Yield
                | TokenKind::YieldFrom
                | TokenKind::Function
        ) || self.is_cast()
            || self.starts_variable()
            || self.starts_scalar()
    }

    /// Source form used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::SemiColon => ";",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::Eq => "=",
            TokenKind::DoubleArrow => "=>",
            TokenKind::Variable => "variable",
            TokenKind::Identifier => "identifier",
            TokenKind::Function => "function",
            TokenKind::Backtick => "`",
            TokenKind::DoubleQuote => "\"",
            TokenKind::Eof => "end of file",
            _ => "token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TokenKind;

    #[test]
    fn variables_and_scalars_start_expressions() {
        assert!(TokenKind::Variable.starts_expr());
        assert!(TokenKind::LNumber.starts_expr());
        assert!(TokenKind::ClassC.starts_scalar());
        assert!(TokenKind::IntCast.starts_expr());
    }

    #[test]
    fn terminators_do_not_start_expressions() {
        for kind in [
            TokenKind::SemiColon,
            TokenKind::CloseParen,
            TokenKind::Comma,
            TokenKind::DoubleArrow,
            TokenKind::Eof,
        ] {
            assert!(!kind.starts_expr(), "{kind:?}");
        }
    }
}
