//! Index variable substitution.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use crate::expr::{Expr, ExprKind};
use crate::rewrite::{IrRewriter, walk_expr};
use crate::var::IndexVar;

/// Replaces free occurrences of index variables.
///
/// Variables bound by an index expression inside the rewritten tree are left
/// alone within that index expression, even when they appear in the mapping.
pub struct Substitute {
    map: HashMap<IndexVar, IndexVar>,
}

impl Substitute {
    pub fn new(map: HashMap<IndexVar, IndexVar>) -> Self {
        Self { map }
    }

    pub fn apply(&mut self, expr: &Arc<Expr>) -> Arc<Expr> {
        let Ok(out) = self.rewrite_expr(expr);
        out
    }
}

impl IrRewriter for Substitute {
    type Error = Infallible;

    fn rewrite_expr(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>, Infallible> {
        match expr.kind() {
            ExprKind::IndexedTensor { tensor, index_vars } => {
                let new_tensor = self.rewrite_expr(tensor)?;
                if Arc::ptr_eq(&new_tensor, tensor) && !index_vars.iter().any(|iv| self.map.contains_key(iv)) {
                    return Ok(expr.clone());
                }
                let index_vars = index_vars.iter().map(|iv| self.map.get(iv).unwrap_or(iv).clone()).collect();
                Ok(expr.with_kind(ExprKind::IndexedTensor { tensor: new_tensor, index_vars }))
            }
            ExprKind::IndexExpr { result_vars, .. } => {
                // Result variables are bound inside; hide their mappings.
                let shadowed: Vec<_> =
                    result_vars.iter().filter_map(|iv| self.map.remove_entry(iv)).collect();
                let out = walk_expr(self, expr);
                self.map.extend(shadowed);
                out
            }
            _ => walk_expr(self, expr),
        }
    }
}

/// `expr` with every free occurrence of a key of `map` replaced by its value.
pub fn substitute(map: &HashMap<IndexVar, IndexVar>, expr: &Arc<Expr>) -> Arc<Expr> {
    if map.is_empty() {
        return expr.clone();
    }
    Substitute::new(map.clone()).apply(expr)
}
