//! Tree-to-tree rewriting.
//!
//! An [`IrRewriter`] maps every node to a replacement of the same role. The
//! default methods rebuild a node from its rewritten children; implementors
//! override `rewrite_*` for the node kinds they transform and delegate the
//! rest to [`walk_expr`] / [`walk_stmt`].
//!
//! Rewriting is persistent. A node none of whose children changed is returned
//! as the same `Arc`, so callers can detect "nothing happened" with
//! [`Arc::ptr_eq`] and unchanged subtrees stay shared with the input. Rebuilt
//! nodes keep their original type.

pub mod splice;

use std::sync::Arc;

use smallvec::SmallVec;

use crate::expr::{Expr, ExprKind};
use crate::func::Func;
use crate::stmt::{ForDomain, Stmt};

pub use splice::Splicer;

pub trait IrRewriter {
    /// Error type of a failed rewrite; [`std::convert::Infallible`] for rewriters that cannot fail.
    type Error;

    fn rewrite_expr(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>, Self::Error> {
        walk_expr(self, expr)
    }

    fn rewrite_stmt(&mut self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>, Self::Error> {
        walk_stmt(self, stmt)
    }

    fn rewrite_func(&mut self, func: &Func) -> Result<Func, Self::Error> {
        walk_func(self, func)
    }
}

/// Tracks whether any child handed back a different node.
#[derive(Default)]
struct Changes {
    any: bool,
}

impl Changes {
    fn expr<R: IrRewriter + ?Sized>(&mut self, r: &mut R, expr: &Arc<Expr>) -> Result<Arc<Expr>, R::Error> {
        let new = r.rewrite_expr(expr)?;
        self.any |= !Arc::ptr_eq(&new, expr);
        Ok(new)
    }

    fn exprs<'a, R, C>(&mut self, r: &mut R, exprs: impl IntoIterator<Item = &'a Arc<Expr>>) -> Result<C, R::Error>
    where
        R: IrRewriter + ?Sized,
        C: FromIterator<Arc<Expr>>,
    {
        exprs.into_iter().map(|e| self.expr(r, e)).collect()
    }

    fn stmt<R: IrRewriter + ?Sized>(&mut self, r: &mut R, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>, R::Error> {
        let new = r.rewrite_stmt(stmt)?;
        self.any |= !Arc::ptr_eq(&new, stmt);
        Ok(new)
    }
}

/// Rebuilds `expr` over its rewritten children.
pub fn walk_expr<R: IrRewriter + ?Sized>(r: &mut R, expr: &Arc<Expr>) -> Result<Arc<Expr>, R::Error> {
    let mut c = Changes::default();
    let kind = match expr.kind() {
        ExprKind::Literal(_) | ExprKind::Var(_) | ExprKind::Length { .. } => return Ok(expr.clone()),
        ExprKind::FieldRead { target, field } => {
            ExprKind::FieldRead { target: c.expr(r, target)?, field: field.clone() }
        }
        ExprKind::TensorRead { tensor, indices } => {
            let tensor = c.expr(r, tensor)?;
            let indices: SmallVec<_> = c.exprs(r, indices)?;
            ExprKind::TensorRead { tensor, indices }
        }
        ExprKind::TupleRead { tuple, index } => {
            ExprKind::TupleRead { tuple: c.expr(r, tuple)?, index: c.expr(r, index)? }
        }
        ExprKind::IndexRead { edge_set, kind } => ExprKind::IndexRead { edge_set: c.expr(r, edge_set)?, kind: *kind },
        ExprKind::Load { buffer, index } => ExprKind::Load { buffer: c.expr(r, buffer)?, index: c.expr(r, index)? },
        ExprKind::IndexedTensor { tensor, index_vars } => {
            ExprKind::IndexedTensor { tensor: c.expr(r, tensor)?, index_vars: index_vars.clone() }
        }
        ExprKind::IndexExpr { result_vars, value } => {
            ExprKind::IndexExpr { result_vars: result_vars.clone(), value: c.expr(r, value)? }
        }
        ExprKind::Call { func, actuals } => ExprKind::Call { func: func.clone(), actuals: c.exprs(r, actuals)? },
        ExprKind::Neg(a) => ExprKind::Neg(c.expr(r, a)?),
        ExprKind::Binary(op, a, b) => {
            let a = c.expr(r, a)?;
            let b = c.expr(r, b)?;
            ExprKind::Binary(*op, a, b)
        }
    };
    Ok(if c.any { expr.with_kind(kind) } else { expr.clone() })
}

/// Rebuilds `stmt` over its rewritten expressions and nested statements.
pub fn walk_stmt<R: IrRewriter + ?Sized>(r: &mut R, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>, R::Error> {
    let mut c = Changes::default();
    let new = match stmt.as_ref() {
        Stmt::Pass | Stmt::VarDecl { .. } => return Ok(stmt.clone()),
        Stmt::Assign { var, value } => Stmt::Assign { var: var.clone(), value: c.expr(r, value)? },
        Stmt::Map { results, function, target, neighbors, partial_actuals, reduction } => {
            let partial_actuals = c.exprs(r, partial_actuals)?;
            let target = c.expr(r, target)?;
            let neighbors = neighbors.as_ref().map(|n| c.expr(r, n)).transpose()?;
            Stmt::Map {
                results: results.clone(),
                function: function.clone(),
                target,
                neighbors,
                partial_actuals,
                reduction: *reduction,
            }
        }
        Stmt::FieldWrite { target, field, value } => {
            Stmt::FieldWrite { target: c.expr(r, target)?, field: field.clone(), value: c.expr(r, value)? }
        }
        Stmt::TensorWrite { tensor, indices, value } => {
            let tensor = c.expr(r, tensor)?;
            let indices = c.exprs(r, indices)?;
            Stmt::TensorWrite { tensor, indices, value: c.expr(r, value)? }
        }
        Stmt::Store { buffer, index, value } => {
            let buffer = c.expr(r, buffer)?;
            let index = c.expr(r, index)?;
            Stmt::Store { buffer, index, value: c.expr(r, value)? }
        }
        Stmt::For { var, domain, body } => {
            let domain = match domain {
                ForDomain::IndexSet(is) => ForDomain::IndexSet(is.clone()),
                ForDomain::Range { start, end } => ForDomain::Range { start: c.expr(r, start)?, end: c.expr(r, end)? },
            };
            Stmt::For { var: var.clone(), domain, body: c.stmt(r, body)? }
        }
        Stmt::IfThenElse { condition, then_body, else_body } => {
            let condition = c.expr(r, condition)?;
            let then_body = c.stmt(r, then_body)?;
            let else_body = else_body.as_ref().map(|e| c.stmt(r, e)).transpose()?;
            Stmt::IfThenElse { condition, then_body, else_body }
        }
        Stmt::Block { stmts } => {
            let stmts = stmts.iter().map(|s| c.stmt(r, s)).collect::<Result<_, _>>()?;
            Stmt::Block { stmts }
        }
        Stmt::Call { results, callee, actuals } => {
            Stmt::Call { results: results.clone(), callee: callee.clone(), actuals: c.exprs(r, actuals)? }
        }
    };
    Ok(if c.any { Arc::new(new) } else { stmt.clone() })
}

/// Rewrites the body of `func`, keeping every other part of it.
pub fn walk_func<R: IrRewriter + ?Sized>(r: &mut R, func: &Func) -> Result<Func, R::Error> {
    let Some(body) = func.body() else {
        return Ok(func.clone());
    };
    let new = r.rewrite_stmt(body)?;
    Ok(if Arc::ptr_eq(&new, body) { func.clone() } else { func.with_body(new) })
}
