//! Generators for property-based testing.
//!
//! Variables have identity semantics, so strategies generate *shapes* that
//! are built into IR against a caller-provided [`Env`].

use std::sync::Arc;

use proptest::prelude::*;
use strum::IntoEnumIterator;
use tessel_dtype::{IndexSet, Type};

use crate::expr::Expr;
use crate::func::{Func, FuncKind};
use crate::stmt::Stmt;
use crate::types::BinaryOp;
use crate::var::{IndexVar, Var};

/// Variables referenced by generated IR.
pub struct Env {
    pub scalars: Vec<Var>,
    pub vectors: Vec<Var>,
    pub dim: IndexSet,
    pub callee: Func,
}

impl Env {
    pub fn new(n: usize) -> Self {
        let dim = IndexSet::Range(n);
        let vector = Type::vector(n);
        Self {
            scalars: (0..4).map(|k| Var::new(format!("s{k}"), Type::float())).collect(),
            vectors: (0..4).map(|k| Var::new(format!("v{k}"), vector.clone())).collect(),
            dim,
            callee: Func::declaration(
                "f",
                FuncKind::External,
                vec![Var::new("x", vector.clone()), Var::new("y", vector.clone())],
                vec![Var::new("r", vector)],
            ),
        }
    }

    pub fn scalar(&self, k: usize) -> &Var {
        &self.scalars[k % self.scalars.len()]
    }

    pub fn vector(&self, k: usize) -> &Var {
        &self.vectors[k % self.vectors.len()]
    }
}

pub fn arb_binary_op() -> impl Strategy<Value = BinaryOp> {
    proptest::sample::select(BinaryOp::iter().collect::<Vec<_>>())
}

/// Shape of a scalar arithmetic expression over scalar variables and literals.
#[derive(Debug, Clone)]
pub enum ScalarTree {
    Lit(f64),
    Var(usize),
    Neg(Box<ScalarTree>),
    Bin(BinaryOp, Box<ScalarTree>, Box<ScalarTree>),
}

impl ScalarTree {
    pub fn generator() -> impl Strategy<Value = Self> {
        let leaf = prop_oneof![(-10.0..10.0f64).prop_map(Self::Lit), (0usize..4).prop_map(Self::Var)];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|a| Self::Neg(Box::new(a))),
                (arb_binary_op(), inner.clone(), inner).prop_map(|(op, a, b)| Self::Bin(op, Box::new(a), Box::new(b))),
            ]
        })
    }

    pub fn build(&self, env: &Env) -> Arc<Expr> {
        match self {
            Self::Lit(v) => Expr::literal(*v),
            Self::Var(k) => Expr::var(env.scalar(*k)),
            Self::Neg(a) => Expr::neg(a.build(env)),
            Self::Bin(op, a, b) => Expr::binary(*op, a.build(env), b.build(env)),
        }
    }
}

/// Shape of a statement that is already flat: index expressions read
/// variables directly and call actuals are variables.
#[derive(Debug, Clone)]
pub enum FlatStmt {
    /// `s = <scalar expression>`
    Scalar(usize, ScalarTree),
    /// `v = (i: x{i} op y{i})`
    Elementwise(usize, BinaryOp, usize, usize),
    /// `v = f(x, y)`
    Call(usize, usize, usize),
}

impl FlatStmt {
    pub fn generator() -> impl Strategy<Value = Self> {
        prop_oneof![
            (0usize..4, ScalarTree::generator()).prop_map(|(k, e)| Self::Scalar(k, e)),
            (0usize..4, arb_binary_op(), 0usize..4, 0usize..4).prop_map(|(k, op, x, y)| Self::Elementwise(k, op, x, y)),
            (0usize..4, 0usize..4, 0usize..4).prop_map(|(k, x, y)| Self::Call(k, x, y)),
        ]
    }

    pub fn build(&self, env: &Env) -> Arc<Stmt> {
        match self {
            Self::Scalar(k, e) => Stmt::assign(env.scalar(*k), e.build(env)),
            Self::Elementwise(k, op, x, y) => {
                let i = IndexVar::new("i", env.dim.clone());
                let body = Expr::binary(
                    *op,
                    Expr::indexed_tensor(Expr::var(env.vector(*x)), [i.clone()]),
                    Expr::indexed_tensor(Expr::var(env.vector(*y)), [i.clone()]),
                );
                Stmt::assign(env.vector(*k), Expr::index_expr([i], body))
            }
            Self::Call(k, x, y) => Stmt::call(
                vec![env.vector(*k).clone()],
                &env.callee,
                vec![Expr::var(env.vector(*x)), Expr::var(env.vector(*y))],
            ),
        }
    }
}

/// A block of flat statements.
pub fn arb_flat_block() -> impl Strategy<Value = Vec<FlatStmt>> {
    proptest::collection::vec(FlatStmt::generator(), 1..8)
}

/// `(i: ... (i: (i: v{i}){i} * v{i}){i} ... * v{i})` with `depth` levels of nesting.
pub fn nested_index_expr(env: &Env, depth: usize) -> Arc<Expr> {
    let v = Expr::var(env.vector(0));
    let i = IndexVar::new("i", env.dim.clone());
    let mut expr = Expr::index_expr([i.clone()], Expr::indexed_tensor(v.clone(), [i]));
    for _ in 0..depth {
        let i = IndexVar::new("i", env.dim.clone());
        let body = Expr::mul(Expr::indexed_tensor(expr, [i.clone()]), Expr::indexed_tensor(v.clone(), [i.clone()]));
        expr = Expr::index_expr([i], body);
    }
    expr
}
