//! Read-only traversal over expressions, statements and functions.
//!
//! Implementors override the `visit_*` methods for the nodes they care about
//! and call the matching `walk_*` function to keep descending. Unoverridden
//! methods walk every child in evaluation order: operands before the node that
//! consumes them, expressions of a statement before its nested statements.
//!
//! ```rust,ignore
//! struct CountCalls(usize);
//!
//! impl IrVisitor for CountCalls {
//!     fn visit_expr(&mut self, expr: &Arc<Expr>) {
//!         if matches!(expr.kind(), ExprKind::Call { .. }) {
//!             self.0 += 1;
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::expr::Expr;
use crate::func::Func;
use crate::stmt::Stmt;

pub trait IrVisitor {
    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        walk_expr(self, expr);
    }

    fn visit_stmt(&mut self, stmt: &Arc<Stmt>) {
        walk_stmt(self, stmt);
    }

    fn visit_func(&mut self, func: &Func) {
        walk_func(self, func);
    }
}

/// Visits every direct sub-expression of `expr`.
pub fn walk_expr<V: IrVisitor + ?Sized>(visitor: &mut V, expr: &Arc<Expr>) {
    for child in expr.children() {
        visitor.visit_expr(child);
    }
}

/// Visits the expressions of `stmt`, then its nested statements.
pub fn walk_stmt<V: IrVisitor + ?Sized>(visitor: &mut V, stmt: &Arc<Stmt>) {
    for expr in stmt.exprs() {
        visitor.visit_expr(expr);
    }
    for child in stmt.children() {
        visitor.visit_stmt(child);
    }
}

/// Visits the body of `func`, if it has one.
pub fn walk_func<V: IrVisitor + ?Sized>(visitor: &mut V, func: &Func) {
    if let Some(body) = func.body() {
        visitor.visit_stmt(body);
    }
}
