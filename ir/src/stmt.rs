//! Statement nodes.

use std::sync::Arc;

use smallvec::SmallVec;
use tessel_dtype::IndexSet;

use crate::expr::Expr;
use crate::func::Func;
use crate::types::ReductionOperator;
use crate::var::Var;

/// Iteration domain of a [`Stmt::For`] loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ForDomain {
    /// Every index of a dimension.
    IndexSet(IndexSet),
    /// `start..end`.
    Range { start: Arc<Expr>, end: Arc<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        var: Var,
        value: Arc<Expr>,
    },
    /// Applies `function` to every element of `target`, optionally with the
    /// neighbour set, binding (and optionally reducing into) `results`.
    Map {
        results: Vec<Var>,
        function: Func,
        target: Arc<Expr>,
        neighbors: Option<Arc<Expr>>,
        partial_actuals: Vec<Arc<Expr>>,
        reduction: Option<ReductionOperator>,
    },
    FieldWrite {
        target: Arc<Expr>,
        field: String,
        value: Arc<Expr>,
    },
    TensorWrite {
        tensor: Arc<Expr>,
        indices: SmallVec<[Arc<Expr>; 4]>,
        value: Arc<Expr>,
    },
    Store {
        buffer: Arc<Expr>,
        index: Arc<Expr>,
        value: Arc<Expr>,
    },
    For {
        var: Var,
        domain: ForDomain,
        body: Arc<Stmt>,
    },
    IfThenElse {
        condition: Arc<Expr>,
        then_body: Arc<Stmt>,
        else_body: Option<Arc<Stmt>>,
    },
    Block {
        stmts: Vec<Arc<Stmt>>,
    },
    Pass,
    /// Call whose results are bound to `results`.
    Call {
        results: Vec<Var>,
        callee: Func,
        actuals: Vec<Arc<Expr>>,
    },
    VarDecl {
        var: Var,
    },
}

impl Stmt {
    pub fn assign(var: &Var, value: Arc<Expr>) -> Arc<Self> {
        Arc::new(Self::Assign { var: var.clone(), value })
    }

    pub fn map(
        results: Vec<Var>,
        function: &Func,
        target: Arc<Expr>,
        neighbors: Option<Arc<Expr>>,
        partial_actuals: Vec<Arc<Expr>>,
        reduction: Option<ReductionOperator>,
    ) -> Arc<Self> {
        Arc::new(Self::Map { results, function: function.clone(), target, neighbors, partial_actuals, reduction })
    }

    pub fn field_write(target: Arc<Expr>, field: impl Into<String>, value: Arc<Expr>) -> Arc<Self> {
        Arc::new(Self::FieldWrite { target, field: field.into(), value })
    }

    pub fn tensor_write(
        tensor: Arc<Expr>,
        indices: impl IntoIterator<Item = Arc<Expr>>,
        value: Arc<Expr>,
    ) -> Arc<Self> {
        Arc::new(Self::TensorWrite { tensor, indices: indices.into_iter().collect(), value })
    }

    pub fn store(buffer: Arc<Expr>, index: Arc<Expr>, value: Arc<Expr>) -> Arc<Self> {
        Arc::new(Self::Store { buffer, index, value })
    }

    pub fn for_loop(var: &Var, domain: ForDomain, body: Arc<Self>) -> Arc<Self> {
        Arc::new(Self::For { var: var.clone(), domain, body })
    }

    pub fn if_then_else(condition: Arc<Expr>, then_body: Arc<Self>, else_body: Option<Arc<Self>>) -> Arc<Self> {
        Arc::new(Self::IfThenElse { condition, then_body, else_body })
    }

    pub fn block(stmts: impl IntoIterator<Item = Arc<Self>>) -> Arc<Self> {
        Arc::new(Self::Block { stmts: stmts.into_iter().collect() })
    }

    pub fn pass() -> Arc<Self> {
        Arc::new(Self::Pass)
    }

    pub fn call(results: Vec<Var>, callee: &Func, actuals: Vec<Arc<Expr>>) -> Arc<Self> {
        Arc::new(Self::Call { results, callee: callee.clone(), actuals })
    }

    pub fn var_decl(var: &Var) -> Arc<Self> {
        Arc::new(Self::VarDecl { var: var.clone() })
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block { .. })
    }

    /// Expressions read directly by this statement, in evaluation order.
    ///
    /// Nested statements are not included; see [`Stmt::children`].
    pub fn exprs(&self) -> SmallVec<[&Arc<Expr>; 4]> {
        let mut out = SmallVec::new();
        match self {
            Self::Assign { value, .. } => out.push(value),
            Self::Map { target, neighbors, partial_actuals, .. } => {
                out.extend(partial_actuals.iter());
                out.push(target);
                out.extend(neighbors.iter());
            }
            Self::FieldWrite { target, value, .. } => out.extend([target, value]),
            Self::TensorWrite { tensor, indices, value } => {
                out.push(tensor);
                out.extend(indices.iter());
                out.push(value);
            }
            Self::Store { buffer, index, value } => out.extend([buffer, index, value]),
            Self::For { domain, .. } => {
                if let ForDomain::Range { start, end } = domain {
                    out.extend([start, end]);
                }
            }
            Self::IfThenElse { condition, .. } => out.push(condition),
            Self::Call { actuals, .. } => out.extend(actuals.iter()),
            Self::Block { .. } | Self::Pass | Self::VarDecl { .. } => {}
        }
        out
    }

    /// Directly nested statements.
    pub fn children(&self) -> SmallVec<[&Arc<Stmt>; 4]> {
        let mut out = SmallVec::new();
        match self {
            Self::For { body, .. } => out.push(body),
            Self::IfThenElse { then_body, else_body, .. } => {
                out.push(then_body);
                out.extend(else_body.iter());
            }
            Self::Block { stmts } => out.extend(stmts.iter()),
            _ => {}
        }
        out
    }
}
