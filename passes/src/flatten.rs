//! Index expression flattening.
//!
//! Removes index expressions nested inside other index expressions and
//! makes sure tensor operands of arithmetic and calls are plain variables:
//!
//! ```text
//! A = (i,j: (i: a{i}){i} * a{j});          =>  A = (i,j: a{i} * a{j});
//! A = (i,j: (i: b{i} + c{i}){i} + a{j});   =>  tmp0 = (i: b{i} + c{i});
//!                                              A = (i,j: tmp0{i} + a{j});
//! ```
//!
//! Reading an index expression through an indexed tensor is inlined by
//! renaming its result variables to the reading variables. Operands of `+`
//! and `-` that are not direct indexed reads are *spilled*: bound to a fresh
//! temporary by an assignment emitted right before the current statement.

use std::collections::HashMap;
use std::sync::Arc;

use snafu::{ResultExt, ensure};
use tessel_ir::rewrite::{walk_expr, walk_stmt};
use tessel_ir::{
    BinaryOp, Expr, ExprKind, Func, IndexVar, IrBuilder, IrRewriter, Splicer, Stmt, TempNames, UnaryElwise, Var,
    contains_indexed_tensor, free_index_vars, substitute,
};
use tracing::trace;

use crate::error::*;

pub struct FlattenIndexExpressions {
    builder: IrBuilder,
    splicer: Splicer,
}

impl FlattenIndexExpressions {
    pub fn new(names: TempNames) -> Self {
        Self { builder: IrBuilder::new(names), splicer: Splicer::new() }
    }

    pub fn flatten(&mut self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
        self.rewrite_stmt(stmt)
    }

    /// Auxiliary statements emitted by [`spill`](Self::spill) and not yet
    /// spliced into a statement.
    pub fn pending(&self) -> &[Arc<Stmt>] {
        self.splicer.pending()
    }

    /// Binds `a` to a temporary unless it is scalar, returning the expression
    /// that reads the temporary back.
    pub fn spill(&mut self, a: Arc<Expr>) -> Result<Arc<Expr>> {
        // Tensors are materialized whole, with one result variable per
        // dimension, so the temporary keeps the type of `a`.
        let a = if a.ty().is_tensor() && !a.ty().is_scalar() && !a.is_index_expr() {
            let lifted = self.builder.unary_elwise(UnaryElwise::None, &a).context(BuilderSnafu)?;
            self.rewrite_expr(&lifted)?
        } else {
            a
        };

        if contains_indexed_tensor(&a) {
            let (value, vars) = match a.kind() {
                ExprKind::IndexExpr { result_vars, .. } => (a.clone(), result_vars.to_vec()),
                _ => {
                    let vars = free_index_vars(&a);
                    (Expr::index_expr(vars.clone(), a), vars)
                }
            };
            let tmp = self.builder.temporary(value.ty().clone());
            trace!(%tmp, value = %value.tree(), "spilling index expression");
            self.splicer.emit(Stmt::assign(&tmp, value));
            return Ok(Expr::indexed_tensor(Expr::var(&tmp), vars));
        }

        if !a.ty().is_scalar() {
            let tmp = self.builder.temporary(a.ty().clone());
            trace!(%tmp, value = %a, "spilling value");
            self.splicer.emit(Stmt::assign(&tmp, a));
            return Ok(Expr::var(&tmp));
        }

        Ok(a)
    }

    fn flatten_sum(&mut self, expr: &Arc<Expr>, op: BinaryOp, a: &Arc<Expr>, b: &Arc<Expr>) -> Result<Arc<Expr>> {
        for operand in [a, b] {
            ensure!(
                operand.ty().is_scalar(),
                NonScalarOperandSnafu { op, operand: operand.to_string(), ty: operand.ty().clone() }
            );
        }

        let mut operands = [a.clone(), b.clone()];
        for operand in &mut operands {
            let rewritten = self.rewrite_expr(operand)?;
            *operand = if rewritten.is_indexed_tensor() { rewritten } else { self.spill(rewritten)? };
        }
        let [new_a, new_b] = operands;

        if Arc::ptr_eq(&new_a, a) && Arc::ptr_eq(&new_b, b) {
            return Ok(expr.clone());
        }
        Ok(expr.with_kind(ExprKind::Binary(op, new_a, new_b)))
    }

    fn flatten_indexed_tensor(
        &mut self,
        expr: &Arc<Expr>,
        tensor: &Arc<Expr>,
        index_vars: &[IndexVar],
    ) -> Result<Arc<Expr>> {
        let new_tensor = self.rewrite_expr(tensor)?;
        if let ExprKind::IndexExpr { result_vars, value } = new_tensor.kind() {
            ensure!(
                result_vars.len() == index_vars.len(),
                IndexArityMismatchSnafu {
                    node: expr.to_string(),
                    expected: result_vars.len(),
                    found: index_vars.len(),
                }
            );
            let renaming: HashMap<_, _> = result_vars.iter().cloned().zip(index_vars.iter().cloned()).collect();
            let inlined = substitute(&renaming, value);
            trace!(from = %expr, to = %inlined, "inlining index expression");
            return Ok(inlined);
        }

        if let Some(distributed) = distribute_index(&new_tensor, index_vars) {
            trace!(from = %expr, to = %distributed, "indexing elementwise operands");
            return self.rewrite_expr(&distributed);
        }

        if Arc::ptr_eq(&new_tensor, tensor) {
            return Ok(expr.clone());
        }
        let index_vars = index_vars.iter().cloned().collect();
        Ok(expr.with_kind(ExprKind::IndexedTensor { tensor: new_tensor, index_vars }))
    }

    fn flatten_call(
        &mut self,
        stmt: &Arc<Stmt>,
        results: &[Var],
        callee: &Func,
        actuals: &[Arc<Expr>],
    ) -> Result<Arc<Stmt>> {
        let mut changed = false;
        let mut new_actuals = Vec::with_capacity(actuals.len());
        for actual in actuals {
            let mut new = self.rewrite_expr(actual)?;
            let ty = new.ty();
            if ty.is_tensor() && !ty.is_scalar() && !new.is_var() {
                new = whole_tensor(self.spill(new)?);
            }
            changed |= !Arc::ptr_eq(&new, actual);
            new_actuals.push(new);
        }
        if !changed {
            return Ok(stmt.clone());
        }
        Ok(Stmt::call(results.to_vec(), callee, new_actuals))
    }
}

/// `(-t){i..}` as `-(t{i..})` and `(t op u){i..}` as `t{i..} op u{i..}`.
///
/// Scalar operands are left as they are; `None` when an operand is a tensor
/// of another order or `tensor` is not elementwise.
fn distribute_index(tensor: &Arc<Expr>, index_vars: &[IndexVar]) -> Option<Arc<Expr>> {
    let index = |operand: &Arc<Expr>| -> Option<Arc<Expr>> {
        match operand.ty() {
            ty if ty.is_scalar() => Some(operand.clone()),
            ty if ty.is_tensor() && ty.order() == index_vars.len() => {
                Some(Expr::indexed_tensor(operand.clone(), index_vars.iter().cloned()))
            }
            _ => None,
        }
    };
    match tensor.kind() {
        ExprKind::Neg(a) => Some(Expr::neg(index(a)?)),
        ExprKind::Binary(op, a, b) => Some(Expr::binary(*op, index(a)?, index(b)?)),
        _ => None,
    }
}

/// A call consumes whole tensors: `tmp{i,j}` is passed as `tmp`.
fn whole_tensor(spilled: Arc<Expr>) -> Arc<Expr> {
    match spilled.kind() {
        ExprKind::IndexedTensor { tensor, .. } if tensor.is_var() => tensor.clone(),
        _ => spilled,
    }
}

impl IrRewriter for FlattenIndexExpressions {
    type Error = Error;

    fn rewrite_expr(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
        match expr.kind() {
            ExprKind::Binary(op @ (BinaryOp::Add | BinaryOp::Sub), a, b) => self.flatten_sum(expr, *op, a, b),
            ExprKind::IndexedTensor { tensor, index_vars } => self.flatten_indexed_tensor(expr, tensor, index_vars),
            _ => walk_expr(self, expr),
        }
    }

    fn rewrite_stmt(&mut self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
        // Auxiliary statements belong to the statement that needed them, not to
        // an enclosing one.
        let outer = self.splicer.save();
        let rewritten = match stmt.as_ref() {
            Stmt::Call { results, callee, actuals } => self.flatten_call(stmt, results, callee, actuals),
            _ => walk_stmt(self, stmt),
        };
        let out = rewritten.map(|s| self.splicer.splice(s));
        self.splicer.restore(outer);
        out
    }
}
