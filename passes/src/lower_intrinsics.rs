//! Lowering of `norm` and `dot` calls to inner products.
//!
//! ```text
//! r = dot(x, y);    =>  r = (: x{k} * y{k});
//! r = norm(x);      =>  tmp0 = (: x{k} * x{k});
//!                       r = sqrt(tmp0);
//! ```
//!
//! Runs before flattening so the inner products it introduces are flattened
//! along with everything else.

use std::sync::Arc;

use snafu::{ResultExt, ensure};
use tessel_ir::rewrite::walk_stmt;
use tessel_ir::{Expr, IrBuilder, IrRewriter, Stmt, TempNames, Var, intrinsics};
use tracing::trace;

use crate::error::*;

pub struct LowerIntrinsics {
    builder: IrBuilder,
}

impl LowerIntrinsics {
    pub fn new(names: TempNames) -> Self {
        Self { builder: IrBuilder::new(names) }
    }

    pub fn lower(&mut self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
        self.rewrite_stmt(stmt)
    }

    fn lower_norm(&mut self, results: &[Var], actuals: &[Arc<Expr>]) -> Result<Arc<Stmt>> {
        let [result] = results else {
            return arity("norm", 1, results.len(), actuals.len());
        };
        let [x] = actuals else {
            return arity("norm", 1, results.len(), actuals.len());
        };
        ensure!(
            x.ty().is_tensor(),
            NonTensorIntrinsicArgumentSnafu { callee: "norm", position: 0usize, ty: x.ty().clone() }
        );

        let squared = self.builder.inner_product(x, x).context(BuilderSnafu)?;
        let tmp = self.builder.temporary(result.ty().clone());
        trace!(%tmp, %x, "lowering norm");
        Ok(Stmt::block([
            Stmt::assign(&tmp, squared),
            Stmt::call(vec![result.clone()], &intrinsics::sqrt(), vec![Expr::var(&tmp)]),
        ]))
    }

    fn lower_dot(&mut self, results: &[Var], actuals: &[Arc<Expr>]) -> Result<Arc<Stmt>> {
        let [result] = results else {
            return arity("dot", 2, results.len(), actuals.len());
        };
        let [x, y] = actuals else {
            return arity("dot", 2, results.len(), actuals.len());
        };
        for (position, arg) in [x, y].into_iter().enumerate() {
            ensure!(
                arg.ty().is_tensor(),
                NonTensorIntrinsicArgumentSnafu { callee: "dot", position, ty: arg.ty().clone() }
            );
        }
        ensure!(
            x.ty() == y.ty(),
            IntrinsicArgumentMismatchSnafu { callee: "dot", lhs: x.ty().clone(), rhs: y.ty().clone() }
        );

        trace!(%x, %y, "lowering dot");
        let product = self.builder.inner_product(x, y).context(BuilderSnafu)?;
        Ok(Stmt::assign(result, product))
    }
}

fn arity(callee: &str, expected_actuals: usize, results: usize, actuals: usize) -> Result<Arc<Stmt>> {
    IntrinsicAritySnafu { callee, expected_actuals, expected_results: 1usize, actuals, results }.fail()
}

impl IrRewriter for LowerIntrinsics {
    type Error = Error;

    // Only call statements are lowered; expressions stay as they are.
    fn rewrite_expr(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>> {
        Ok(expr.clone())
    }

    fn rewrite_stmt(&mut self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
        match stmt.as_ref() {
            Stmt::Call { results, callee, actuals } if callee.name() == "norm" => self.lower_norm(results, actuals),
            Stmt::Call { results, callee, actuals } if callee.name() == "dot" => self.lower_dot(results, actuals),
            _ => walk_stmt(self, stmt),
        }
    }
}
