pub mod sexpr;
pub mod visitor;

use crate::lexer::token::Token;
use crate::span::Span;
use serde::{Serialize, Serializer};

pub type ExprId<'ast> = &'ast Expr<'ast>;
pub type StmtId<'ast> = &'ast Stmt<'ast>;

fn lossy<S: Serializer>(bytes: &&[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

#[derive(Debug, Serialize)]
pub struct Program<'ast> {
    pub statements: &'ast [StmtId<'ast>],
    pub errors: Vec<ParseError>,
    pub span: Span,
}

impl Program<'_> {
    pub fn has_fatal(&self) -> bool {
        self.errors.iter().any(|e| e.severity == Severity::Fatal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    /// The enclosing statement cannot be compiled, parsing still continues.
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub severity: Severity,
}

impl ParseError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn fatal(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Fatal,
        }
    }

    pub fn to_human_readable(&self, source: &[u8]) -> String {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        };
        let Some(info) = self.span.line_info(source) else {
            return format!("{label}: {}", self.message);
        };
        let line_str = String::from_utf8_lossy(info.line_text);
        let gutter_width = info.line.to_string().len();
        let padding = info.line_text.len().min(info.column.saturating_sub(1));
        let highlight_len = self
            .span
            .len()
            .min(info.line_text.len().saturating_sub(padding))
            .max(1);

        format!(
            "{label}: {}\n --> line {}, column {}\n{gutter}|\n{line_no:>width$} | {line_src}\n{gutter}| {pad}{marker}",
            self.message,
            info.line,
            info.column,
            gutter = " ".repeat(gutter_width + 1),
            line_no = info.line,
            width = gutter_width,
            line_src = line_str,
            pad = " ".repeat(padding),
            marker = "^".repeat(highlight_len),
        )
    }
}

/// A possibly qualified name such as `Foo`, `\A\B` or `namespace\C`.
/// `parts` keeps the separator tokens.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Name<'ast> {
    pub parts: &'ast [Token],
    pub span: Span,
}

#[derive(Debug, Serialize)]
pub enum Stmt<'ast> {
    Expression {
        expr: ExprId<'ast>,
        doc: Option<Span>,
        span: Span,
    },
    Echo {
        exprs: &'ast [ExprId<'ast>],
        span: Span,
    },
    Return {
        expr: Option<ExprId<'ast>>,
        span: Span,
    },
    Block {
        statements: &'ast [StmtId<'ast>],
        span: Span,
    },
    Function {
        name: &'ast Token,
        by_ref: bool,
        params: &'ast [Param<'ast>],
        return_type: Option<TypeHint<'ast>>,
        body: &'ast [StmtId<'ast>],
        doc: Option<Span>,
        span: Span,
    },
    Class {
        name: &'ast Token,
        modifiers: &'ast [Token],
        extends: Option<Name<'ast>>,
        implements: &'ast [Name<'ast>],
        members: &'ast [ClassMember<'ast>],
        doc: Option<Span>,
        span: Span,
    },
    InlineHtml {
        #[serde(serialize_with = "lossy")]
        value: &'ast [u8],
        span: Span,
    },
    Nop {
        span: Span,
    },
    Error {
        span: Span,
    },
}

impl<'ast> Stmt<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expression { span, .. }
            | Stmt::Echo { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Block { span, .. }
            | Stmt::Function { span, .. }
            | Stmt::Class { span, .. }
            | Stmt::InlineHtml { span, .. }
            | Stmt::Nop { span }
            | Stmt::Error { span } => *span,
        }
    }

    /// Kind tag; a plain expression statement carries the generic
    /// `"statement"` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::Expression { .. } => "statement",
            Stmt::Echo { .. } => "echo",
            Stmt::Return { .. } => "return",
            Stmt::Block { .. } => "block",
            Stmt::Function { .. } => "function",
            Stmt::Class { .. } => "class",
            Stmt::InlineHtml { .. } => "inline",
            Stmt::Nop { .. } => "nop",
            Stmt::Error { .. } => "error",
        }
    }

    pub fn doc(&self) -> Option<Span> {
        match self {
            Stmt::Expression { doc, .. } | Stmt::Function { doc, .. } | Stmt::Class { doc, .. } => {
                *doc
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub enum Expr<'ast> {
    /// `left op right` for arithmetic, bitwise and concatenation operators.
    Binary {
        op: BinaryOp,
        left: ExprId<'ast>,
        right: ExprId<'ast>,
        span: Span,
    },
    /// Logical, comparison and `instanceof` operators.
    Bool {
        op: BoolOp,
        left: ExprId<'ast>,
        right: ExprId<'ast>,
        span: Span,
    },
    Assign {
        var: ExprId<'ast>,
        expr: ExprId<'ast>,
        by_ref: bool,
        span: Span,
    },
    /// Desugared compound assignment or prefix increment:
    /// `$a += 1` is `Set { var: $a, value: Binary(+, $a, 1) }`. The binary's
    /// left operand is a separate node read from the same source as `var`.
    Set {
        var: ExprId<'ast>,
        value: ExprId<'ast>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        expr: ExprId<'ast>,
        span: Span,
    },
    Post {
        op: PostOp,
        var: ExprId<'ast>,
        span: Span,
    },
    /// Integer or float literal. A leading minus fused by the parser is
    /// part of `value`.
    Number {
        #[serde(serialize_with = "lossy")]
        value: &'ast [u8],
        span: Span,
    },
    /// Quoted string without interpolation, quotes included.
    String {
        #[serde(serialize_with = "lossy")]
        value: &'ast [u8],
        span: Span,
    },
    /// Interpolated `"..."` string.
    Encapsed {
        parts: &'ast [ExprId<'ast>],
        span: Span,
    },
    MagicConst {
        kind: MagicConstKind,
        span: Span,
    },
    Array {
        items: &'ast [ArrayItem<'ast>],
        short: bool,
        span: Span,
    },
    Ternary {
        condition: ExprId<'ast>,
        /// `None` for `a ?: b`, where the condition value is reused.
        if_true: Option<ExprId<'ast>>,
        if_false: ExprId<'ast>,
        span: Span,
    },
    Coalesce {
        left: ExprId<'ast>,
        right: ExprId<'ast>,
        span: Span,
    },
    Cast {
        kind: CastKind,
        expr: ExprId<'ast>,
        span: Span,
    },
    Call {
        func: ExprId<'ast>,
        args: &'ast [Arg<'ast>],
        span: Span,
    },
    New {
        class: NewTarget<'ast>,
        args: &'ast [Arg<'ast>],
        span: Span,
    },
    /// `list(...)` destructuring pattern; `None` entries are skipped slots.
    List {
        items: &'ast [Option<ListItem<'ast>>],
        span: Span,
    },
    Isset {
        vars: &'ast [ExprId<'ast>],
        span: Span,
    },
    Empty {
        expr: ExprId<'ast>,
        span: Span,
    },
    Include {
        once: bool,
        require: bool,
        expr: ExprId<'ast>,
        span: Span,
    },
    Eval {
        expr: ExprId<'ast>,
        span: Span,
    },
    Exit {
        expr: Option<ExprId<'ast>>,
        span: Span,
    },
    Print {
        expr: ExprId<'ast>,
        span: Span,
    },
    Yield {
        key: Option<ExprId<'ast>>,
        value: Option<ExprId<'ast>>,
        span: Span,
    },
    YieldFrom {
        expr: ExprId<'ast>,
        span: Span,
    },
    Clone {
        expr: ExprId<'ast>,
        span: Span,
    },
    /// `@expr`
    Silent {
        expr: ExprId<'ast>,
        span: Span,
    },
    ShellExec {
        parts: &'ast [ExprId<'ast>],
        span: Span,
    },
    Closure {
        by_ref: bool,
        is_static: bool,
        params: &'ast [Param<'ast>],
        uses: &'ast [ClosureUse<'ast>],
        return_type: Option<TypeHint<'ast>>,
        body: &'ast [StmtId<'ast>],
        doc: Option<Span>,
        span: Span,
    },
    Variable {
        name: Span,
        span: Span,
    },
    /// `$$a` or `${expr}`
    VariableVariable {
        name: ExprId<'ast>,
        span: Span,
    },
    /// A member name after `->` or `::`.
    Identifier {
        name: Span,
        span: Span,
    },
    /// Bare name used as a class reference.
    Name {
        name: Name<'ast>,
        span: Span,
    },
    ConstFetch {
        name: Name<'ast>,
        span: Span,
    },
    ArrayDimFetch {
        array: ExprId<'ast>,
        dim: Option<ExprId<'ast>>, // None for $a[]
        span: Span,
    },
    PropertyFetch {
        target: ExprId<'ast>,
        property: ExprId<'ast>,
        span: Span,
    },
    MethodCall {
        target: ExprId<'ast>,
        method: ExprId<'ast>,
        args: &'ast [Arg<'ast>],
        span: Span,
    },
    StaticPropertyFetch {
        class: ExprId<'ast>,
        property: ExprId<'ast>,
        span: Span,
    },
    StaticCall {
        class: ExprId<'ast>,
        method: ExprId<'ast>,
        args: &'ast [Arg<'ast>],
        span: Span,
    },
    ClassConstFetch {
        class: ExprId<'ast>,
        constant: ExprId<'ast>,
        span: Span,
    },
    Error {
        span: Span,
    },
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Binary { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Set { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Post { span, .. }
            | Expr::Number { span, .. }
            | Expr::String { span, .. }
            | Expr::Encapsed { span, .. }
            | Expr::MagicConst { span, .. }
            | Expr::Array { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Coalesce { span, .. }
            | Expr::Cast { span, .. }
            | Expr::Call { span, .. }
            | Expr::New { span, .. }
            | Expr::List { span, .. }
            | Expr::Isset { span, .. }
            | Expr::Empty { span, .. }
            | Expr::Include { span, .. }
            | Expr::Eval { span, .. }
            | Expr::Exit { span, .. }
            | Expr::Print { span, .. }
            | Expr::Yield { span, .. }
            | Expr::YieldFrom { span, .. }
            | Expr::Clone { span, .. }
            | Expr::Silent { span, .. }
            | Expr::ShellExec { span, .. }
            | Expr::Closure { span, .. }
            | Expr::Variable { span, .. }
            | Expr::VariableVariable { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::Name { span, .. }
            | Expr::ConstFetch { span, .. }
            | Expr::ArrayDimFetch { span, .. }
            | Expr::PropertyFetch { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::StaticPropertyFetch { span, .. }
            | Expr::StaticCall { span, .. }
            | Expr::ClassConstFetch { span, .. }
            | Expr::Error { span } => *span,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Binary { .. } => "bin",
            Expr::Bool { .. } => "bool",
            Expr::Assign { .. } => "assign",
            Expr::Set { .. } => "set",
            Expr::Unary { .. } => "unary",
            Expr::Post { .. } => "post",
            Expr::Number { .. } => "number",
            Expr::String { .. } => "string",
            Expr::Encapsed { .. } => "encapsed",
            Expr::MagicConst { .. } => "magic",
            Expr::Array { .. } => "array",
            Expr::Ternary { .. } => "ternary",
            Expr::Coalesce { .. } => "coalesce",
            Expr::Cast { .. } => "cast",
            Expr::Call { .. } => "call",
            Expr::New { .. } => "new",
            Expr::List { .. } => "list",
            Expr::Isset { .. } => "isset",
            Expr::Empty { .. } => "empty",
            Expr::Include { .. } => "include",
            Expr::Eval { .. } => "eval",
            Expr::Exit { .. } => "exit",
            Expr::Print { .. } => "print",
            Expr::Yield { .. } => "yield",
            Expr::YieldFrom { .. } => "yieldfrom",
            Expr::Clone { .. } => "clone",
            Expr::Silent { .. } => "silent",
            Expr::ShellExec { .. } => "shell",
            Expr::Closure { .. } => "closure",
            Expr::Variable { .. } => "variable",
            Expr::VariableVariable { .. } => "varvar",
            Expr::Identifier { .. } => "identifier",
            Expr::Name { .. } => "name",
            Expr::ConstFetch { .. } => "constant",
            Expr::ArrayDimFetch { .. } => "offset",
            Expr::PropertyFetch { .. } => "prop",
            Expr::MethodCall { .. } => "method",
            Expr::StaticPropertyFetch { .. } => "staticprop",
            Expr::StaticCall { .. } => "staticcall",
            Expr::ClassConstFetch { .. } => "classconst",
            Expr::Error { .. } => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Expr::Error { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    BitOr,
    BitAnd,
    BitXor,
    Concat,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Pow,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::Concat => ".",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
        }
    }
}

/// `||`/`or`, `&&`/`and` share a variant; the word forms are not kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoolOp {
    Or,
    And,
    Xor,
    Identical,
    NotIdentical,
    Equal,
    NotEqual,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Spaceship,
    InstanceOf,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::Or => "||",
            BoolOp::And => "&&",
            BoolOp::Xor => "xor",
            BoolOp::Identical => "===",
            BoolOp::NotIdentical => "!==",
            BoolOp::Equal => "==",
            BoolOp::NotEqual => "!=",
            BoolOp::Lt => "<",
            BoolOp::Gt => ">",
            BoolOp::LtEq => "<=",
            BoolOp::GtEq => ">=",
            BoolOp::Spaceship => "<=>",
            BoolOp::InstanceOf => "instanceof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PostOp {
    Increment,
    Decrement,
}

impl PostOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostOp::Increment => "++",
            PostOp::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CastKind {
    Int,
    Double,
    String,
    Array,
    Object,
    Bool,
    Unset,
}

impl CastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CastKind::Int => "int",
            CastKind::Double => "double",
            CastKind::String => "string",
            CastKind::Array => "array",
            CastKind::Object => "object",
            CastKind::Bool => "boolean",
            CastKind::Unset => "unset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MagicConstKind {
    Line,
    File,
    Dir,
    Class,
    Trait,
    Method,
    Function,
    Namespace,
}

impl MagicConstKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MagicConstKind::Line => "__LINE__",
            MagicConstKind::File => "__FILE__",
            MagicConstKind::Dir => "__DIR__",
            MagicConstKind::Class => "__CLASS__",
            MagicConstKind::Trait => "__TRAIT__",
            MagicConstKind::Method => "__METHOD__",
            MagicConstKind::Function => "__FUNCTION__",
            MagicConstKind::Namespace => "__NAMESPACE__",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum NewTarget<'ast> {
    /// `new Foo`, `new $cls`, `new static`, `new Foo::$prop`
    Class(ExprId<'ast>),
    /// `new class ... { }`, which has no class name.
    Anonymous {
        extends: Option<Name<'ast>>,
        implements: &'ast [Name<'ast>],
        members: &'ast [ClassMember<'ast>],
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Arg<'ast> {
    pub value: ExprId<'ast>,
    pub unpack: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArrayItem<'ast> {
    pub key: Option<ExprId<'ast>>,
    pub value: ExprId<'ast>,
    pub by_ref: bool,
    pub unpack: bool,
    pub span: Span,
}

/// One non-empty slot of a `list(...)` pattern.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ListItem<'ast> {
    pub key: Option<ExprId<'ast>>,
    pub value: ExprId<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TypeHint<'ast> {
    pub nullable: bool,
    pub name: Name<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Param<'ast> {
    pub name: &'ast Token,
    pub ty: Option<TypeHint<'ast>>,
    pub default: Option<ExprId<'ast>>,
    pub by_ref: bool,
    pub variadic: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClosureUse<'ast> {
    pub var: &'ast Token,
    pub by_ref: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassConst<'ast> {
    pub name: &'ast Token,
    pub value: ExprId<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PropertyEntry<'ast> {
    pub name: &'ast Token,
    pub default: Option<ExprId<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum ClassMember<'ast> {
    Property {
        modifiers: &'ast [Token],
        ty: Option<TypeHint<'ast>>,
        entries: &'ast [PropertyEntry<'ast>],
        doc: Option<Span>,
        span: Span,
    },
    Method {
        modifiers: &'ast [Token],
        name: &'ast Token,
        by_ref: bool,
        params: &'ast [Param<'ast>],
        return_type: Option<TypeHint<'ast>>,
        /// `None` for abstract and interface-style methods.
        body: Option<&'ast [StmtId<'ast>]>,
        doc: Option<Span>,
        span: Span,
    },
    Const {
        modifiers: &'ast [Token],
        consts: &'ast [ClassConst<'ast>],
        doc: Option<Span>,
        span: Span,
    },
    TraitUse {
        traits: &'ast [Name<'ast>],
        span: Span,
    },
}

impl ClassMember<'_> {
    pub fn span(&self) -> Span {
        match self {
            ClassMember::Property { span, .. }
            | ClassMember::Method { span, .. }
            | ClassMember::Const { span, .. }
            | ClassMember::TraitUse { span, .. } => *span,
        }
    }
}
