//! Checks that a body is in the flattened form backends expect.

use std::sync::Arc;

use tessel_ir::visitor::{walk_expr, walk_stmt};
use tessel_ir::{Expr, ExprKind, IrQuery, IrVisitor, Stmt};
use tracing::debug;

use crate::error::*;

/// Finds the first violation of the flattened form:
///
/// - an index expression nested in another one, or read through an indexed
///   tensor,
/// - an indexed tensor whose index count differs from the tensor order,
/// - a non-scalar tensor call actual that is not a variable.
#[derive(Debug, Default)]
pub struct FlatnessCheck {
    violation: Option<Error>,
    /// Number of index expressions enclosing the visited node.
    depth: usize,
}

impl FlatnessCheck {
    fn nested(&mut self, expr: &Arc<Expr>) {
        debug!(node = %expr.tree(), "index expression left nested");
        self.violation = Some(Error::NestedIndexExpr { node: expr.to_string() });
    }
}

impl IrVisitor for FlatnessCheck {
    fn visit_expr(&mut self, expr: &Arc<Expr>) {
        if self.violation.is_some() {
            return;
        }
        match expr.kind() {
            ExprKind::IndexExpr { .. } if self.depth > 0 => {
                self.nested(expr);
            }
            ExprKind::IndexExpr { .. } => {
                self.depth += 1;
                walk_expr(self, expr);
                self.depth -= 1;
            }
            ExprKind::IndexedTensor { tensor, .. } if tensor.is_index_expr() => {
                self.nested(expr);
            }
            ExprKind::IndexedTensor { tensor, index_vars } if index_vars.len() != tensor.ty().order() => {
                self.violation = Some(Error::IndexArityMismatch {
                    node: expr.to_string(),
                    expected: tensor.ty().order(),
                    found: index_vars.len(),
                });
            }
            _ => walk_expr(self, expr),
        }
    }

    fn visit_stmt(&mut self, stmt: &Arc<Stmt>) {
        if self.violation.is_some() {
            return;
        }
        if let Stmt::Call { callee, actuals, .. } = stmt.as_ref()
            && let Some(actual) = actuals.iter().find(|a| a.ty().is_tensor() && !a.ty().is_scalar() && !a.is_var())
        {
            self.violation = Some(Error::UnspilledOperand {
                context: callee.name().to_string(),
                operand: actual.to_string(),
            });
            return;
        }
        walk_stmt(self, stmt);
    }
}

impl IrQuery for FlatnessCheck {
    type Output = Option<Error>;

    fn reset(&mut self) {
        self.violation = None;
        self.depth = 0;
    }

    fn finish(&mut self) -> Option<Error> {
        self.violation.take()
    }
}

pub fn verify_flattened(stmt: &Arc<Stmt>) -> Result<()> {
    match FlatnessCheck::default().query_stmt(stmt) {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}
