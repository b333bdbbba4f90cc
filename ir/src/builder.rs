//! Helpers that build common index expressions and temporaries.

use std::sync::Arc;

use snafu::ensure;
use smallvec::SmallVec;
use tessel_dtype::Type;

use crate::error::*;
use crate::expr::Expr;
use crate::types::{ReductionOperator, UnaryElwise};
use crate::var::{IndexVar, IndexVarFactory, TempNames, Var};

/// Builds index expressions with fresh index variables and temporaries with
/// fresh names.
#[derive(Debug, Clone, Default)]
pub struct IrBuilder {
    names: TempNames,
    index_vars: IndexVarFactory,
}

impl IrBuilder {
    pub fn new(names: TempNames) -> Self {
        Self { names, index_vars: IndexVarFactory::new() }
    }

    pub fn names(&self) -> &TempNames {
        &self.names
    }

    /// A fresh variable of type `ty`.
    pub fn temporary(&self, ty: Type) -> Var {
        Var::new(self.names.fresh(), ty)
    }

    /// `(: a{r..} * b{r..})`, summing over one reduction variable per dimension.
    ///
    /// The result is an order-0 tensor.
    pub fn inner_product(&mut self, a: &Arc<Expr>, b: &Arc<Expr>) -> Result<Arc<Expr>> {
        ensure!(
            a.ty().is_tensor() && b.ty().is_tensor(),
            InnerProductNonTensorSnafu { lhs: a.ty().clone(), rhs: b.ty().clone() }
        );
        ensure!(a.ty() == b.ty(), InnerProductTypeMismatchSnafu { lhs: a.ty().clone(), rhs: b.ty().clone() });

        let rvars: SmallVec<[IndexVar; 4]> = a
            .ty()
            .dims()
            .iter()
            .map(|d| self.index_vars.create_reduction(d.clone(), ReductionOperator::Sum))
            .collect();
        let body = Expr::mul(Expr::indexed_tensor(a.clone(), rvars.clone()), Expr::indexed_tensor(b.clone(), rvars));
        Ok(Expr::index_expr([], body))
    }

    /// `(i..: op(a{i..}))` with one free variable per dimension of `a`.
    ///
    /// [`UnaryElwise::None`] yields a copy of `a` expressed as an index expression.
    pub fn unary_elwise(&mut self, op: UnaryElwise, a: &Arc<Expr>) -> Result<Arc<Expr>> {
        ensure!(a.ty().is_tensor(), ElwiseNonTensorSnafu { ty: a.ty().clone() });

        let vars: SmallVec<[IndexVar; 4]> = a.ty().dims().iter().map(|d| self.index_vars.create(d.clone())).collect();
        let read = Expr::indexed_tensor(a.clone(), vars.clone());
        let body = match op {
            UnaryElwise::None => read,
            UnaryElwise::Neg => Expr::neg(read),
        };
        Ok(Expr::index_expr(vars, body))
    }
}
