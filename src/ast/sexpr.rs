use crate::ast::visitor::Visitor;
use crate::ast::*;

/// Renders a tree as S-expressions, reading identifier and literal text
/// back out of `source`.
pub struct SExprFormatter<'src> {
    source: &'src [u8],
    output: String,
    indent: usize,
}

impl<'src> SExprFormatter<'src> {
    pub fn new(source: &'src [u8]) -> Self {
        Self {
            source,
            output: String::new(),
            indent: 0,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_span(&mut self, span: Span) {
        let text = span.as_str(self.source).unwrap_or_default();
        self.output.push_str(&String::from_utf8_lossy(text));
    }

    fn newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn write_body<'ast>(&mut self, statements: &'ast [StmtId<'ast>]) {
        self.indent += 1;
        for stmt in statements {
            self.newline();
            self.visit_stmt(stmt);
        }
        self.indent -= 1;
    }

    fn write_args<'ast>(&mut self, args: &'ast [Arg<'ast>]) {
        for arg in args {
            self.write(" ");
            if arg.unpack {
                self.write("(spread ");
                self.visit_expr(arg.value);
                self.write(")");
            } else {
                self.visit_expr(arg.value);
            }
        }
    }

    fn write_params<'ast>(&mut self, params: &'ast [Param<'ast>]) {
        self.write("(params");
        for param in params {
            self.write(" ");
            if param.by_ref {
                self.write("&");
            }
            if param.variadic {
                self.write("...");
            }
            self.write_span(param.name.span);
            if let Some(default) = param.default {
                self.write("=");
                self.visit_expr(default);
            }
        }
        self.write(")");
    }

    fn write_names<'ast>(&mut self, label: &str, names: &'ast [Name<'ast>]) {
        self.write("(");
        self.write(label);
        for name in names {
            self.write(" ");
            self.write_span(name.span);
        }
        self.write(")");
    }

    fn write_members<'ast>(&mut self, members: &'ast [ClassMember<'ast>]) {
        self.indent += 1;
        for member in members {
            self.newline();
            self.visit_class_member(member);
        }
        self.indent -= 1;
    }

    fn unary_form<'ast>(&mut self, tag: &str, expr: ExprId<'ast>) {
        self.write("(");
        self.write(tag);
        self.write(" ");
        self.visit_expr(expr);
        self.write(")");
    }

    fn pair_form<'ast>(&mut self, tag: &str, left: ExprId<'ast>, right: ExprId<'ast>) {
        self.write("(");
        self.write(tag);
        self.write(" ");
        self.visit_expr(left);
        self.write(" ");
        self.visit_expr(right);
        self.write(")");
    }
}

impl<'ast> Visitor<'ast> for SExprFormatter<'_> {
    fn visit_program(&mut self, program: &'ast Program<'ast>) {
        self.write("(program");
        self.write_body(program.statements);
        self.write(")");
    }

    fn visit_stmt(&mut self, stmt: StmtId<'ast>) {
        match stmt {
            Stmt::Expression { expr, .. } => self.unary_form("statement", expr),
            Stmt::Echo { exprs, .. } => {
                self.write("(echo");
                for expr in *exprs {
                    self.write(" ");
                    self.visit_expr(expr);
                }
                self.write(")");
            }
            Stmt::Return { expr, .. } => match expr {
                Some(expr) => self.unary_form("return", expr),
                None => self.write("(return)"),
            },
            Stmt::Block { statements, .. } => {
                self.write("(block");
                self.write_body(statements);
                self.write(")");
            }
            Stmt::Function {
                name,
                by_ref,
                params,
                body,
                ..
            } => {
                self.write(if *by_ref { "(function& " } else { "(function " });
                self.write_span(name.span);
                self.write(" ");
                self.write_params(params);
                self.write_body(body);
                self.write(")");
            }
            Stmt::Class {
                name,
                modifiers,
                extends,
                implements,
                members,
                ..
            } => {
                self.write("(class ");
                for modifier in *modifiers {
                    self.write_span(modifier.span);
                    self.write(" ");
                }
                self.write_span(name.span);
                if let Some(extends) = extends {
                    self.write(" (extends ");
                    self.write_span(extends.span);
                    self.write(")");
                }
                if !implements.is_empty() {
                    self.write(" ");
                    self.write_names("implements", implements);
                }
                self.write_members(members);
                self.write(")");
            }
            Stmt::InlineHtml { value, .. } => {
                self.write("(inline ");
                self.write(&format!("{:?}", String::from_utf8_lossy(value)));
                self.write(")");
            }
            Stmt::Nop { .. } => self.write("(nop)"),
            Stmt::Error { .. } => self.write("(error)"),
        }
    }

    fn visit_class_member(&mut self, member: &'ast ClassMember<'ast>) {
        match member {
            ClassMember::Property { entries, .. } => {
                self.write("(property");
                for entry in *entries {
                    self.write(" ");
                    self.write_span(entry.name.span);
                    if let Some(default) = entry.default {
                        self.write("=");
                        self.visit_expr(default);
                    }
                }
                self.write(")");
            }
            ClassMember::Method {
                name, params, body, ..
            } => {
                self.write("(method ");
                self.write_span(name.span);
                self.write(" ");
                self.write_params(params);
                match body {
                    Some(body) => self.write_body(body),
                    None => self.write(" abstract"),
                }
                self.write(")");
            }
            ClassMember::Const { consts, .. } => {
                self.write("(const");
                for c in *consts {
                    self.write(" ");
                    self.write_span(c.name.span);
                    self.write("=");
                    self.visit_expr(c.value);
                }
                self.write(")");
            }
            ClassMember::TraitUse { traits, .. } => self.write_names("use", traits),
        }
    }

    fn visit_expr(&mut self, expr: ExprId<'ast>) {
        match expr {
            Expr::Binary {
                op, left, right, ..
            } => self.pair_form(&format!("bin {}", op.as_str()), left, right),
            Expr::Bool {
                op, left, right, ..
            } => self.pair_form(&format!("bool {}", op.as_str()), left, right),
            Expr::Assign {
                var, expr, by_ref, ..
            } => self.pair_form(if *by_ref { "assign-ref" } else { "assign" }, var, expr),
            Expr::Set { var, value, .. } => self.pair_form("set", var, value),
            Expr::Unary { op, expr, .. } => {
                self.unary_form(&format!("unary {}", op.as_str()), expr)
            }
            Expr::Post { op, var, .. } => self.unary_form(&format!("post {}", op.as_str()), var),
            Expr::Number { value, .. } => {
                self.write("(number ");
                self.write(&String::from_utf8_lossy(value));
                self.write(")");
            }
            Expr::String { value, .. } => {
                self.write("(string ");
                self.write(&String::from_utf8_lossy(value));
                self.write(")");
            }
            Expr::Encapsed { parts, .. } | Expr::ShellExec { parts, .. } => {
                self.write("(");
                self.write(expr.kind());
                for part in *parts {
                    self.write(" ");
                    self.visit_expr(part);
                }
                self.write(")");
            }
            Expr::MagicConst { kind, .. } => {
                self.write("(magic ");
                self.write(kind.as_str());
                self.write(")");
            }
            Expr::Array { items, .. } => {
                self.write("(array");
                for item in *items {
                    self.write(" ");
                    let prefix = match (item.by_ref, item.unpack) {
                        (true, _) => "&",
                        (_, true) => "...",
                        _ => "",
                    };
                    if let Some(key) = item.key {
                        self.write("(key ");
                        self.visit_expr(key);
                        self.write(" ");
                        self.write(prefix);
                        self.visit_expr(item.value);
                        self.write(")");
                    } else {
                        self.write(prefix);
                        self.visit_expr(item.value);
                    }
                }
                self.write(")");
            }
            Expr::Ternary {
                condition,
                if_true,
                if_false,
                ..
            } => {
                self.write("(ternary ");
                self.visit_expr(condition);
                self.write(" ");
                match if_true {
                    Some(if_true) => self.visit_expr(if_true),
                    None => self.write("_"),
                }
                self.write(" ");
                self.visit_expr(if_false);
                self.write(")");
            }
            Expr::Coalesce { left, right, .. } => self.pair_form("coalesce", left, right),
            Expr::Cast { kind, expr, .. } => {
                self.unary_form(&format!("cast {}", kind.as_str()), expr)
            }
            Expr::Call { func, args, .. } => {
                self.write("(call ");
                self.visit_expr(func);
                self.write_args(args);
                self.write(")");
            }
            Expr::New { class, args, .. } => {
                self.write("(new ");
                match class {
                    NewTarget::Class(class) => self.visit_expr(class),
                    NewTarget::Anonymous {
                        extends,
                        implements,
                        members,
                        ..
                    } => {
                        self.write("(class");
                        if let Some(extends) = extends {
                            self.write(" (extends ");
                            self.write_span(extends.span);
                            self.write(")");
                        }
                        if !implements.is_empty() {
                            self.write(" ");
                            self.write_names("implements", implements);
                        }
                        self.write_members(members);
                        self.write(")");
                    }
                }
                self.write_args(args);
                self.write(")");
            }
            Expr::List { items, .. } => {
                self.write("(list");
                for item in *items {
                    self.write(" ");
                    match item {
                        Some(ListItem {
                            key: Some(key),
                            value,
                            ..
                        }) => self.pair_form("key", key, value),
                        Some(ListItem { value, .. }) => self.visit_expr(value),
                        None => self.write("_"),
                    }
                }
                self.write(")");
            }
            Expr::Isset { vars, .. } => {
                self.write("(isset");
                for var in *vars {
                    self.write(" ");
                    self.visit_expr(var);
                }
                self.write(")");
            }
            Expr::Include {
                once,
                require,
                expr,
                ..
            } => {
                let tag = match (*require, *once) {
                    (false, false) => "include",
                    (false, true) => "include_once",
                    (true, false) => "require",
                    (true, true) => "require_once",
                };
                self.unary_form(tag, expr);
            }
            Expr::Exit { expr, .. } => match expr {
                Some(expr) => self.unary_form("exit", expr),
                None => self.write("(exit)"),
            },
            Expr::Yield { key, value, .. } => {
                self.write("(yield");
                if let Some(key) = key {
                    self.write(" ");
                    self.visit_expr(key);
                    self.write(" =>");
                }
                if let Some(value) = value {
                    self.write(" ");
                    self.visit_expr(value);
                }
                self.write(")");
            }
            Expr::Empty { expr: inner, .. }
            | Expr::Eval { expr: inner, .. }
            | Expr::Print { expr: inner, .. }
            | Expr::YieldFrom { expr: inner, .. }
            | Expr::Clone { expr: inner, .. }
            | Expr::Silent { expr: inner, .. }
            | Expr::VariableVariable { name: inner, .. } => self.unary_form(expr.kind(), inner),
            Expr::Closure {
                by_ref,
                is_static,
                params,
                uses,
                body,
                ..
            } => {
                self.write("(closure");
                if *is_static {
                    self.write(" static");
                }
                if *by_ref {
                    self.write(" &");
                }
                self.write(" ");
                self.write_params(params);
                if !uses.is_empty() {
                    self.write(" (use");
                    for u in *uses {
                        self.write(if u.by_ref { " &" } else { " " });
                        self.write_span(u.var.span);
                    }
                    self.write(")");
                }
                self.write_body(body);
                self.write(")");
            }
            Expr::Variable { name, .. } => {
                self.write("(variable ");
                self.write_span(*name);
                self.write(")");
            }
            Expr::Identifier { name, .. } => self.write_span(*name),
            Expr::Name { name, .. } => {
                self.write("(name ");
                self.write_span(name.span);
                self.write(")");
            }
            Expr::ConstFetch { name, .. } => {
                self.write("(constant ");
                self.write_span(name.span);
                self.write(")");
            }
            Expr::ArrayDimFetch { array, dim, .. } => {
                self.write("(offset ");
                self.visit_expr(array);
                self.write(" ");
                match dim {
                    Some(dim) => self.visit_expr(dim),
                    None => self.write("_"),
                }
                self.write(")");
            }
            Expr::PropertyFetch {
                target, property, ..
            } => self.pair_form("prop", target, property),
            Expr::MethodCall {
                target,
                method,
                args,
                ..
            } => {
                self.write("(method ");
                self.visit_expr(target);
                self.write(" ");
                self.visit_expr(method);
                self.write_args(args);
                self.write(")");
            }
            Expr::StaticPropertyFetch {
                class, property, ..
            } => self.pair_form("staticprop", class, property),
            Expr::StaticCall {
                class,
                method,
                args,
                ..
            } => {
                self.write("(staticcall ");
                self.visit_expr(class);
                self.write(" ");
                self.visit_expr(method);
                self.write_args(args);
                self.write(")");
            }
            Expr::ClassConstFetch {
                class, constant, ..
            } => self.pair_form("classconst", class, constant),
            Expr::Error { .. } => self.write("(error)"),
        }
    }
}
