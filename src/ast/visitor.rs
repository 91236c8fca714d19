use crate::ast::*;

pub trait Visitor<'ast> {
    fn visit_program(&mut self, program: &'ast Program<'ast>) {
        walk_program(self, program);
    }

    fn visit_stmt(&mut self, stmt: StmtId<'ast>) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: ExprId<'ast>) {
        walk_expr(self, expr);
    }

    fn visit_class_member(&mut self, member: &'ast ClassMember<'ast>) {
        walk_class_member(self, member);
    }

    fn visit_param(&mut self, param: &'ast Param<'ast>) {
        if let Some(default) = param.default {
            self.visit_expr(default);
        }
    }
}

pub fn walk_program<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, program: &'ast Program<'ast>) {
    for stmt in program.statements {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: StmtId<'ast>) {
    match stmt {
        Stmt::Expression { expr, .. } => visitor.visit_expr(expr),
        Stmt::Echo { exprs, .. } => {
            for expr in *exprs {
                visitor.visit_expr(expr);
            }
        }
        Stmt::Return { expr, .. } => {
            if let Some(expr) = expr {
                visitor.visit_expr(expr);
            }
        }
        Stmt::Block { statements, .. } => {
            for stmt in *statements {
                visitor.visit_stmt(stmt);
            }
        }
        Stmt::Function { params, body, .. } => {
            for param in *params {
                visitor.visit_param(param);
            }
            for stmt in *body {
                visitor.visit_stmt(stmt);
            }
        }
        Stmt::Class { members, .. } => {
            for member in *members {
                visitor.visit_class_member(member);
            }
        }
        Stmt::InlineHtml { .. } | Stmt::Nop { .. } | Stmt::Error { .. } => {}
    }
}

pub fn walk_class_member<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    member: &'ast ClassMember<'ast>,
) {
    match member {
        ClassMember::Property { entries, .. } => {
            for entry in *entries {
                if let Some(default) = entry.default {
                    visitor.visit_expr(default);
                }
            }
        }
        ClassMember::Method { params, body, .. } => {
            for param in *params {
                visitor.visit_param(param);
            }
            if let Some(body) = body {
                for stmt in *body {
                    visitor.visit_stmt(stmt);
                }
            }
        }
        ClassMember::Const { consts, .. } => {
            for c in *consts {
                visitor.visit_expr(c.value);
            }
        }
        ClassMember::TraitUse { .. } => {}
    }
}

fn walk_args<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, args: &'ast [Arg<'ast>]) {
    for arg in args {
        visitor.visit_expr(arg.value);
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: ExprId<'ast>) {
    match expr {
        Expr::Binary { left, right, .. }
        | Expr::Bool { left, right, .. }
        | Expr::Coalesce { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        Expr::Assign { var, expr, .. } | Expr::Set { var, value: expr, .. } => {
            visitor.visit_expr(var);
            visitor.visit_expr(expr);
        }
        Expr::Unary { expr, .. }
        | Expr::Cast { expr, .. }
        | Expr::Empty { expr, .. }
        | Expr::Include { expr, .. }
        | Expr::Eval { expr, .. }
        | Expr::Print { expr, .. }
        | Expr::YieldFrom { expr, .. }
        | Expr::Clone { expr, .. }
        | Expr::Silent { expr, .. } => visitor.visit_expr(expr),
        Expr::Post { var, .. } => visitor.visit_expr(var),
        Expr::Encapsed { parts, .. } | Expr::ShellExec { parts, .. } => {
            for part in *parts {
                visitor.visit_expr(part);
            }
        }
        Expr::Array { items, .. } => {
            for item in *items {
                if let Some(key) = item.key {
                    visitor.visit_expr(key);
                }
                visitor.visit_expr(item.value);
            }
        }
        Expr::Ternary {
            condition,
            if_true,
            if_false,
            ..
        } => {
            visitor.visit_expr(condition);
            if let Some(if_true) = if_true {
                visitor.visit_expr(if_true);
            }
            visitor.visit_expr(if_false);
        }
        Expr::Call { func, args, .. } => {
            visitor.visit_expr(func);
            walk_args(visitor, args);
        }
        Expr::New { class, args, .. } => {
            match class {
                NewTarget::Class(class) => visitor.visit_expr(class),
                NewTarget::Anonymous { members, .. } => {
                    for member in *members {
                        visitor.visit_class_member(member);
                    }
                }
            }
            walk_args(visitor, args);
        }
        Expr::List { items, .. } => {
            for item in items.iter().flatten() {
                if let Some(key) = item.key {
                    visitor.visit_expr(key);
                }
                visitor.visit_expr(item.value);
            }
        }
        Expr::Isset { vars, .. } => {
            for var in *vars {
                visitor.visit_expr(var);
            }
        }
        Expr::Exit { expr, .. } => {
            if let Some(expr) = expr {
                visitor.visit_expr(expr);
            }
        }
        Expr::Yield { key, value, .. } => {
            if let Some(key) = key {
                visitor.visit_expr(key);
            }
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        Expr::Closure { params, body, .. } => {
            for param in *params {
                visitor.visit_param(param);
            }
            for stmt in *body {
                visitor.visit_stmt(stmt);
            }
        }
        Expr::VariableVariable { name, .. } => visitor.visit_expr(name),
        Expr::ArrayDimFetch { array, dim, .. } => {
            visitor.visit_expr(array);
            if let Some(dim) = dim {
                visitor.visit_expr(dim);
            }
        }
        Expr::PropertyFetch {
            target, property, ..
        } => {
            visitor.visit_expr(target);
            visitor.visit_expr(property);
        }
        Expr::MethodCall {
            target,
            method,
            args,
            ..
        } => {
            visitor.visit_expr(target);
            visitor.visit_expr(method);
            walk_args(visitor, args);
        }
        Expr::StaticPropertyFetch {
            class, property, ..
        } => {
            visitor.visit_expr(class);
            visitor.visit_expr(property);
        }
        Expr::StaticCall {
            class,
            method,
            args,
            ..
        } => {
            visitor.visit_expr(class);
            visitor.visit_expr(method);
            walk_args(visitor, args);
        }
        Expr::ClassConstFetch {
            class, constant, ..
        } => {
            visitor.visit_expr(class);
            visitor.visit_expr(constant);
        }
        Expr::Number { .. }
        | Expr::String { .. }
        | Expr::MagicConst { .. }
        | Expr::Variable { .. }
        | Expr::Identifier { .. }
        | Expr::Name { .. }
        | Expr::ConstFetch { .. }
        | Expr::Error { .. } => {}
    }
}
