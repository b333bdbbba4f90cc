//! Structural queries: visitors that accumulate a single answer.

use std::sync::Arc;

use crate::expr::{Expr, ExprKind};
use crate::stmt::Stmt;
use crate::var::IndexVar;
use crate::visitor::{IrVisitor, walk_expr, walk_stmt};

/// A visitor that produces a value.
///
/// `query_*` resets the accumulated state, walks the tree and returns the
/// result, so one instance can answer several questions in a row.
pub trait IrQuery: IrVisitor {
    type Output;

    /// Restores the initial state.
    fn reset(&mut self);

    /// Result accumulated since the last reset.
    fn finish(&mut self) -> Self::Output;

    fn query_expr(&mut self, expr: &Arc<Expr>) -> Self::Output {
        self.reset();
        self.visit_expr(expr);
        self.finish()
    }

    fn query_stmt(&mut self, stmt: &Arc<Stmt>) -> Self::Output {
        self.reset();
        self.visit_stmt(stmt);
        self.finish()
    }
}

/// Boolean query: is there an expression matching `pred`?
///
/// Starts from `seed` and flips to `true` on the first match; descent stops
/// once the answer is known.
pub struct AnyExpr<F> {
    pred: F,
    seed: bool,
    result: bool,
}

impl<F: FnMut(&Expr) -> bool> AnyExpr<F> {
    pub fn new(pred: F) -> Self {
        Self::with_seed(pred, false)
    }

    pub fn with_seed(pred: F, seed: bool) -> Self {
        Self { pred, seed, result: seed }
    }
}

impl<F: FnMut(&Expr) -> bool> IrVisitor for AnyExpr<F> {
    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        if self.result {
            return;
        }
        if (self.pred)(expr) {
            self.result = true;
            return;
        }
        walk_expr(self, expr);
    }

    fn visit_stmt(&mut self, stmt: &Arc<Stmt>) {
        if !self.result {
            walk_stmt(self, stmt);
        }
    }
}

impl<F: FnMut(&Expr) -> bool> IrQuery for AnyExpr<F> {
    type Output = bool;

    fn reset(&mut self) {
        self.result = self.seed;
    }

    fn finish(&mut self) -> bool {
        self.result
    }
}

pub fn any_expr(expr: &Arc<Expr>, pred: impl FnMut(&Expr) -> bool) -> bool {
    AnyExpr::new(pred).query_expr(expr)
}

pub fn any_expr_in_stmt(stmt: &Arc<Stmt>, pred: impl FnMut(&Expr) -> bool) -> bool {
    AnyExpr::new(pred).query_stmt(stmt)
}

/// True if `expr` reads a tensor through index variables, either directly
/// (an indexed tensor) or by containing an index expression.
pub fn contains_indexed_tensor(expr: &Arc<Expr>) -> bool {
    any_expr(expr, |e| e.is_indexed_tensor() || e.is_index_expr())
}

/// Collects the free index variables of an expression.
///
/// Free variables are the free-kind (non-reduction) index variables used by
/// indexed tensors, minus those bound by an index expression inside the
/// queried tree. They are reported once each, in order of first use.
#[derive(Debug, Default)]
pub struct FreeIndexVars {
    bound: Vec<IndexVar>,
    vars: Vec<IndexVar>,
}

impl IrVisitor for FreeIndexVars {
    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        match expr.kind() {
            ExprKind::IndexedTensor { tensor, index_vars } => {
                self.visit_expr(tensor);
                for iv in index_vars {
                    if iv.is_free_var() && !self.bound.contains(iv) && !self.vars.contains(iv) {
                        self.vars.push(iv.clone());
                    }
                }
            }
            ExprKind::IndexExpr { result_vars, value } => {
                let mark = self.bound.len();
                self.bound.extend(result_vars.iter().cloned());
                self.visit_expr(value);
                self.bound.truncate(mark);
            }
            _ => walk_expr(self, expr),
        }
    }
}

impl IrQuery for FreeIndexVars {
    type Output = Vec<IndexVar>;

    fn reset(&mut self) {
        self.bound.clear();
        self.vars.clear();
    }

    fn finish(&mut self) -> Vec<IndexVar> {
        std::mem::take(&mut self.vars)
    }
}

pub fn free_index_vars(expr: &Arc<Expr>) -> Vec<IndexVar> {
    FreeIndexVars::default().query_expr(expr)
}
