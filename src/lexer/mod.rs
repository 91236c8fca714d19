pub mod token;

use crate::span::Span;
use token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
enum LexerState {
    Initial,
    Scripting,
    DoubleQuotes,
    Backquote,
}

#[derive(Clone)]
pub struct Lexer<'src> {
    input: &'src [u8],
    cursor: usize,
    state_stack: Vec<LexerState>,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src [u8]) -> Self {
        Self {
            input,
            cursor: 0,
            state_stack: vec![LexerState::Initial],
        }
    }

    /// Skips the inline HTML state so snippets without `<?php` lex as code.
    pub fn start_in_scripting(&mut self) {
        self.state_stack.clear();
        self.state_stack.push(LexerState::Scripting);
    }

    pub fn source(&self) -> &'src [u8] {
        self.input
    }

    pub fn slice(&self, span: Span) -> &'src [u8] {
        let end = span.end.min(self.input.len());
        let start = span.start.min(end);
        &self.input[start..end]
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.cursor).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.cursor + offset).copied()
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    fn advance_n(&mut self, n: usize) {
        self.cursor += n;
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80 {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> TokenKind {
        let mut is_float = false;

        if self.peek() == Some(b'0') {
            let radix = match self.peek_at(1) {
                Some(b'x' | b'X') => Some(16),
                Some(b'b' | b'B') => Some(2),
                Some(b'o' | b'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance_n(2);
                while let Some(c) = self.peek() {
                    if (c as char).is_digit(radix) || c == b'_' {
                        self.advance();
                    } else {
                        break;
                    }
                }
                return TokenKind::LNumber;
            }
        }

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == b'_' {
                self.advance();
            } else if c == b'.' && !is_float && self.peek_at(1) != Some(b'.') {
                is_float = true;
                self.advance();
            } else if (c == b'e' || c == b'E')
                && (self.peek_at(1).is_some_and(|n| n.is_ascii_digit())
                    || (matches!(self.peek_at(1), Some(b'+' | b'-'))
                        && self.peek_at(2).is_some_and(|n| n.is_ascii_digit())))
            {
                is_float = true;
                self.advance_n(2);
            } else {
                break;
            }
        }

        if is_float {
            TokenKind::DNumber
        } else {
            TokenKind::LNumber
        }
    }

    fn consume_single_line_comment(&mut self) -> TokenKind {
        while let Some(c) = self.peek() {
            if c == b'\n' || c == b'\r' {
                break;
            } else if c == b'?' && self.peek_at(1) == Some(b'>') {
                // `?>` still closes the script inside a line comment
                break;
            }
            self.advance();
        }
        TokenKind::Comment
    }

    fn consume_multi_line_comment(&mut self) -> TokenKind {
        let is_doc = self.peek() == Some(b'*') && self.peek_at(1) != Some(b'/');
        match memchr::memmem::find(&self.input[self.cursor..], b"*/") {
            Some(offset) => {
                self.advance_n(offset + 2);
                if is_doc {
                    TokenKind::DocComment
                } else {
                    TokenKind::Comment
                }
            }
            None => {
                self.cursor = self.input.len();
                TokenKind::Error
            }
        }
    }

    fn read_single_quoted(&mut self) -> TokenKind {
        while let Some(c) = self.peek() {
            if c == b'\'' {
                self.advance();
                return TokenKind::StringLiteral;
            } else if c == b'\\' {
                self.advance();
                if self.peek().is_some() {
                    self.advance();
                }
            } else {
                self.advance();
            }
        }
        TokenKind::Error
    }

    fn starts_interpolation(&self, at: usize) -> bool {
        match self.input.get(at) {
            Some(b'$') => self
                .input
                .get(at + 1)
                .is_some_and(|&n| n.is_ascii_alphabetic() || n == b'_' || n == b'{' || n >= 0x80),
            Some(b'{') => self.input.get(at + 1) == Some(&b'$'),
            _ => false,
        }
    }

    /// Reads a `"` or backtick string. A string without interpolation is a
    /// single token; otherwise only the opening quote is returned and the
    /// lexer switches to the matching string state.
    fn read_quoted(&mut self, quote: u8, start: usize) -> TokenKind {
        while let Some(c) = self.peek() {
            if c == quote {
                self.advance();
                return if quote == b'"' {
                    TokenKind::StringLiteral
                } else {
                    // Backtick strings are always interpolated shell commands.
                    self.cursor = start + 1;
                    self.state_stack.push(LexerState::Backquote);
                    TokenKind::Backtick
                };
            } else if c == b'\\' {
                self.advance();
                if self.peek().is_some() {
                    self.advance();
                }
            } else if self.starts_interpolation(self.cursor) {
                self.cursor = start + 1;
                if quote == b'"' {
                    self.state_stack.push(LexerState::DoubleQuotes);
                    return TokenKind::DoubleQuote;
                }
                self.state_stack.push(LexerState::Backquote);
                return TokenKind::Backtick;
            } else {
                self.advance();
            }
        }
        TokenKind::Error
    }

    fn next_in_string(&mut self, quote: u8) -> Token {
        let start = self.cursor;
        match self.peek() {
            None => {
                self.state_stack.pop();
                return Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, start),
                };
            }
            Some(c) if c == quote => {
                self.advance();
                self.state_stack.pop();
                let kind = if quote == b'"' {
                    TokenKind::DoubleQuote
                } else {
                    TokenKind::Backtick
                };
                return Token {
                    kind,
                    span: Span::new(start, self.cursor),
                };
            }
            Some(b'$') if self.starts_interpolation(self.cursor) => {
                self.advance();
                if self.peek() == Some(b'{') {
                    self.advance();
                    self.state_stack.push(LexerState::Scripting);
                    return Token {
                        kind: TokenKind::DollarOpenCurlyBraces,
                        span: Span::new(start, self.cursor),
                    };
                }
                self.read_identifier();
                return Token {
                    kind: TokenKind::Variable,
                    span: Span::new(start, self.cursor),
                };
            }
            Some(b'{') if self.starts_interpolation(self.cursor) => {
                // `{$`: only the brace is consumed, the variable lexes as code
                self.advance();
                self.state_stack.push(LexerState::Scripting);
                return Token {
                    kind: TokenKind::CurlyOpen,
                    span: Span::new(start, self.cursor),
                };
            }
            Some(_) => {}
        }

        while let Some(c) = self.peek() {
            if c == quote || self.starts_interpolation(self.cursor) {
                break;
            }
            if c == b'\\' {
                self.advance();
                if self.peek().is_some() {
                    self.advance();
                }
            } else {
                self.advance();
            }
        }

        Token {
            kind: TokenKind::EncapsedAndWhitespace,
            span: Span::new(start, self.cursor),
        }
    }

    fn next_in_initial(&mut self) -> Token {
        let input = self.input;
        let start = self.cursor;
        let mut search = self.cursor;
        while let Some(offset) = memchr::memmem::find(&input[search..], b"<?") {
            let tag = search + offset;
            let rest = &input[tag..];
            let (kind, len) = if rest.len() >= 5 && rest[..5].eq_ignore_ascii_case(b"<?php") {
                (TokenKind::OpenTag, 5)
            } else if rest.starts_with(b"<?=") {
                (TokenKind::OpenTagEcho, 3)
            } else {
                search = tag + 2;
                continue;
            };

            if tag > start {
                self.cursor = tag;
                return Token {
                    kind: TokenKind::InlineHtml,
                    span: Span::new(start, tag),
                };
            }

            self.state_stack.pop();
            self.state_stack.push(LexerState::Scripting);
            self.cursor = tag + len;
            if kind == TokenKind::OpenTag && self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                self.advance();
            }
            return Token {
                kind,
                span: Span::new(tag, self.cursor),
            };
        }

        self.cursor = self.input.len();
        if self.cursor > start {
            Token {
                kind: TokenKind::InlineHtml,
                span: Span::new(start, self.cursor),
            }
        } else {
            Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
            }
        }
    }

    /// Recognises `(int)`, `( string )` and friends; the cursor sits just
    /// past the opening parenthesis.
    fn read_cast(&mut self) -> Option<TokenKind> {
        let saved = self.cursor;
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.advance();
        }
        let input = self.input;
        let ident_start = self.cursor;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.advance();
        }
        let ident = &input[ident_start..self.cursor];
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.advance();
        }
        let kind = if ident.is_empty() || self.peek() != Some(b')') {
            None
        } else {
            match ident.to_ascii_lowercase().as_slice() {
                b"int" | b"integer" => Some(TokenKind::IntCast),
                b"bool" | b"boolean" => Some(TokenKind::BoolCast),
                b"float" | b"double" | b"real" => Some(TokenKind::DoubleCast),
                b"string" | b"binary" => Some(TokenKind::StringCast),
                b"array" => Some(TokenKind::ArrayCast),
                b"object" => Some(TokenKind::ObjectCast),
                b"unset" => Some(TokenKind::UnsetCast),
                _ => None,
            }
        };
        match kind {
            Some(kind) => {
                self.advance(); // Eat ')'
                Some(kind)
            }
            None => {
                self.cursor = saved;
                None
            }
        }
    }

    fn keyword(&mut self, text: &[u8]) -> TokenKind {
        match text.to_ascii_lowercase().as_slice() {
            b"or" => TokenKind::LogicalOr,
            b"and" => TokenKind::LogicalAnd,
            b"xor" => TokenKind::LogicalXor,
            b"exit" | b"die" => TokenKind::Exit,
            b"function" => TokenKind::Function,
            b"const" => TokenKind::Const,
            b"return" => TokenKind::Return,
            b"yield" => {
                let mut ahead = self.cursor;
                while self.input.get(ahead).is_some_and(|c| c.is_ascii_whitespace()) {
                    ahead += 1;
                }
                let follows_from = ahead > self.cursor
                    && self
                        .input
                        .get(ahead..ahead + 4)
                        .is_some_and(|w| w.eq_ignore_ascii_case(b"from"))
                    && !self
                        .input
                        .get(ahead + 4)
                        .is_some_and(|&c| c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80);
                if follows_from {
                    self.cursor = ahead + 4;
                    TokenKind::YieldFrom
                } else {
                    TokenKind::Yield
                }
            }
            b"instanceof" => TokenKind::InstanceOf,
            b"echo" => TokenKind::Echo,
            b"print" => TokenKind::Print,
            b"class" => TokenKind::Class,
            b"extends" => TokenKind::Extends,
            b"implements" => TokenKind::Implements,
            b"new" => TokenKind::New,
            b"clone" => TokenKind::Clone,
            b"var" => TokenKind::Var,
            b"public" => TokenKind::Public,
            b"protected" => TokenKind::Protected,
            b"private" => TokenKind::Private,
            b"final" => TokenKind::Final,
            b"abstract" => TokenKind::Abstract,
            b"static" => TokenKind::Static,
            b"readonly" => TokenKind::Readonly,
            b"namespace" => TokenKind::Namespace,
            b"use" => TokenKind::Use,
            b"isset" => TokenKind::Isset,
            b"empty" => TokenKind::Empty,
            b"__class__" => TokenKind::ClassC,
            b"__trait__" => TokenKind::TraitC,
            b"__function__" => TokenKind::FuncC,
            b"__method__" => TokenKind::MethodC,
            b"__line__" => TokenKind::Line,
            b"__file__" => TokenKind::File,
            b"__dir__" => TokenKind::Dir,
            b"__namespace__" => TokenKind::NsC,
            b"array" => TokenKind::Array,
            b"list" => TokenKind::List,
            b"include" => TokenKind::Include,
            b"include_once" => TokenKind::IncludeOnce,
            b"require" => TokenKind::Require,
            b"require_once" => TokenKind::RequireOnce,
            b"eval" => TokenKind::Eval,
            _ => TokenKind::Identifier,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    /// Never returns `None`: once the input is exhausted every call yields
    /// an `Eof` token.
    fn next(&mut self) -> Option<Self::Item> {
        match self.state_stack.last() {
            Some(LexerState::Initial) => return Some(self.next_in_initial()),
            Some(LexerState::DoubleQuotes) => return Some(self.next_in_string(b'"')),
            Some(LexerState::Backquote) => return Some(self.next_in_string(b'`')),
            Some(LexerState::Scripting) | None => {}
        }

        self.skip_whitespace();

        let start = self.cursor;
        let Some(char) = self.peek() else {
            return Some(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
            });
        };
        self.advance();

        let kind = match char {
            b'$' => {
                if self
                    .peek()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == b'_' || c >= 0x80)
                {
                    self.read_identifier();
                    TokenKind::Variable
                } else {
                    TokenKind::Dollar
                }
            }
            b'\\' => TokenKind::NsSeparator,
            b'\'' => self.read_single_quoted(),
            b'"' => self.read_quoted(b'"', start),
            b'`' => self.read_quoted(b'`', start),
            b'#' => self.consume_single_line_comment(),
            b';' => TokenKind::SemiColon,
            b':' => {
                if self.peek() == Some(b':') {
                    self.advance();
                    TokenKind::DoubleColon
                } else {
                    TokenKind::Colon
                }
            }
            b',' => TokenKind::Comma,
            b'{' => {
                self.state_stack.push(LexerState::Scripting);
                TokenKind::OpenBrace
            }
            b'}' => {
                if self.state_stack.len() > 1 {
                    self.state_stack.pop();
                }
                TokenKind::CloseBrace
            }
            b'(' => self.read_cast().unwrap_or(TokenKind::OpenParen),
            b')' => TokenKind::CloseParen,
            b'[' => TokenKind::OpenBracket,
            b']' => TokenKind::CloseBracket,
            b'+' => match self.peek() {
                Some(b'+') => {
                    self.advance();
                    TokenKind::Inc
                }
                Some(b'=') => {
                    self.advance();
                    TokenKind::PlusEq
                }
                _ => TokenKind::Plus,
            },
            b'-' => match self.peek() {
                Some(b'>') => {
                    self.advance();
                    TokenKind::Arrow
                }
                Some(b'-') => {
                    self.advance();
                    TokenKind::Dec
                }
                Some(b'=') => {
                    self.advance();
                    TokenKind::MinusEq
                }
                _ => TokenKind::Minus,
            },
            b'*' => {
                if self.peek() == Some(b'*') {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::PowEq
                    } else {
                        TokenKind::Pow
                    }
                } else if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::MulEq
                } else {
                    TokenKind::Asterisk
                }
            }
            b'/' => match self.peek() {
                Some(b'/') => {
                    self.advance();
                    self.consume_single_line_comment()
                }
                Some(b'*') => {
                    self.advance();
                    self.consume_multi_line_comment()
                }
                Some(b'=') => {
                    self.advance();
                    TokenKind::DivEq
                }
                _ => TokenKind::Slash,
            },
            b'%' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::ModEq
                } else {
                    TokenKind::Percent
                }
            }
            b'.' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::ConcatEq
                } else if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') {
                    self.advance_n(2);
                    TokenKind::Ellipsis
                } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.cursor -= 1;
                    self.read_number()
                } else {
                    TokenKind::Dot
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    TokenKind::DoubleArrow
                } else {
                    TokenKind::Eq
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::BangEqEq
                    } else {
                        TokenKind::BangEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    if self.peek() == Some(b'>') {
                        self.advance();
                        TokenKind::Spaceship
                    } else {
                        TokenKind::LtEq
                    }
                } else if self.peek() == Some(b'<') {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::SlEq
                    } else {
                        TokenKind::Sl
                    }
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    TokenKind::BangEq
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::GtEq
                } else if self.peek() == Some(b'>') {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::SrEq
                    } else {
                        TokenKind::Sr
                    }
                } else {
                    TokenKind::Gt
                }
            }
            b'&' => match self.peek() {
                Some(b'&') => {
                    self.advance();
                    TokenKind::AmpersandAmpersand
                }
                Some(b'=') => {
                    self.advance();
                    TokenKind::AndEq
                }
                _ => TokenKind::Ampersand,
            },
            b'|' => match self.peek() {
                Some(b'|') => {
                    self.advance();
                    TokenKind::PipePipe
                }
                Some(b'=') => {
                    self.advance();
                    TokenKind::OrEq
                }
                _ => TokenKind::Pipe,
            },
            b'^' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::XorEq
                } else {
                    TokenKind::Caret
                }
            }
            b'~' => TokenKind::BitNot,
            b'@' => TokenKind::At,
            b'?' => {
                if self.peek() == Some(b'>') {
                    self.advance();
                    // Swallow a single newline directly after the close tag
                    if self.peek() == Some(b'\n') {
                        self.advance();
                    }
                    self.state_stack.clear();
                    self.state_stack.push(LexerState::Initial);
                    TokenKind::CloseTag
                } else if self.peek() == Some(b'?') {
                    self.advance();
                    if self.peek() == Some(b'=') {
                        self.advance();
                        TokenKind::CoalesceEq
                    } else {
                        TokenKind::Coalesce
                    }
                } else {
                    TokenKind::Question
                }
            }
            c if c.is_ascii_digit() => {
                self.cursor -= 1;
                self.read_number()
            }
            c if c.is_ascii_alphabetic() || c == b'_' || c >= 0x80 => {
                self.read_identifier();
                let input = self.input;
                self.keyword(&input[start..self.cursor])
            }
            _ => TokenKind::Error,
        };

        Some(Token {
            kind,
            span: Span::new(start, self.cursor),
        })
    }
}
