//! Expression nodes.
//!
//! An expression is an immutable [`Expr`] behind an `Arc`. Children are shared,
//! never mutated: a rewrite builds new parents over the unchanged children.
//!
//! Typed constructors derive the node type from the operands. [`Expr::new`]
//! takes the type explicitly and performs no checks, which lets tests and
//! earlier compiler stages build nodes the typed constructors would not.

use std::sync::Arc;

use smallvec::SmallVec;
use tessel_dtype::ext::HasScalarType;
use tessel_dtype::{IndexSet, ScalarType, TensorType, Type};

use crate::func::Func;
use crate::types::{BinaryOp, IndexReadKind, Literal};
use crate::var::{IndexVar, Var};

/// Expression node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Var(Var),
    FieldRead {
        target: Arc<Expr>,
        field: String,
    },
    TensorRead {
        tensor: Arc<Expr>,
        indices: SmallVec<[Arc<Expr>; 4]>,
    },
    TupleRead {
        tuple: Arc<Expr>,
        index: Arc<Expr>,
    },
    IndexRead {
        edge_set: Arc<Expr>,
        kind: IndexReadKind,
    },
    Length {
        index_set: IndexSet,
    },
    Load {
        buffer: Arc<Expr>,
        index: Arc<Expr>,
    },
    /// A tensor selected by a tuple of index variables.
    IndexedTensor {
        tensor: Arc<Expr>,
        index_vars: SmallVec<[IndexVar; 4]>,
    },
    /// A tensor built by mapping/reducing a scalar body over index variables.
    IndexExpr {
        result_vars: SmallVec<[IndexVar; 4]>,
        value: Arc<Expr>,
    },
    Call {
        func: Func,
        actuals: Vec<Arc<Expr>>,
    },
    Neg(Arc<Expr>),
    Binary(BinaryOp, Arc<Expr>, Arc<Expr>),
}

/// Typed expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    kind: ExprKind,
    ty: Type,
}

impl Expr {
    /// Constructor with an explicit type; performs no checks.
    pub fn new(kind: ExprKind, ty: Type) -> Arc<Self> {
        Arc::new(Self { kind, ty })
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    // =========================================================================
    // Kind predicates
    // =========================================================================

    pub fn is_var(&self) -> bool {
        matches!(self.kind, ExprKind::Var(_))
    }

    pub fn is_indexed_tensor(&self) -> bool {
        matches!(self.kind, ExprKind::IndexedTensor { .. })
    }

    pub fn is_index_expr(&self) -> bool {
        matches!(self.kind, ExprKind::IndexExpr { .. })
    }

    pub fn as_var(&self) -> Option<&Var> {
        match &self.kind {
            ExprKind::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Direct sub-expressions in evaluation order.
    pub fn children(&self) -> SmallVec<[&Arc<Expr>; 4]> {
        let mut out = SmallVec::new();
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Var(_) | ExprKind::Length { .. } => {}
            ExprKind::FieldRead { target, .. } => out.push(target),
            ExprKind::TensorRead { tensor, indices } => {
                out.push(tensor);
                out.extend(indices.iter());
            }
            ExprKind::TupleRead { tuple, index } => out.extend([tuple, index]),
            ExprKind::IndexRead { edge_set, .. } => out.push(edge_set),
            ExprKind::Load { buffer, index } => out.extend([buffer, index]),
            ExprKind::IndexedTensor { tensor, .. } => out.push(tensor),
            ExprKind::IndexExpr { value, .. } => out.push(value),
            ExprKind::Call { actuals, .. } => out.extend(actuals.iter()),
            ExprKind::Neg(a) => out.push(a),
            ExprKind::Binary(_, a, b) => out.extend([a, b]),
        }
        out
    }

    // =========================================================================
    // Typed constructors
    // =========================================================================

    pub fn literal<T: HasScalarType + Into<Literal>>(value: T) -> Arc<Self> {
        Self::new(ExprKind::Literal(value.into()), Type::Scalar(T::SCALAR))
    }

    /// Dense tensor literal; `ty` must be a tensor type.
    pub fn dense(values: Vec<f64>, ty: Type) -> Arc<Self> {
        Self::new(ExprKind::Literal(Literal::Dense(values)), ty)
    }

    pub fn var(var: &Var) -> Arc<Self> {
        Self::new(ExprKind::Var(var.clone()), var.ty().clone())
    }

    /// Reads `field` of an element, or the field tensor of a set.
    pub fn field_read(target: Arc<Self>, field: impl Into<String>) -> Arc<Self> {
        let field = field.into();
        let ty = match target.ty() {
            Type::Element(e) => e.field(&field).cloned(),
            Type::Set(s) => s.element.field(&field).map(|ft| {
                // Reading a field of a set yields one value per element.
                let mut dims: SmallVec<[IndexSet; 4]> = SmallVec::new();
                dims.push(IndexSet::set(s.element.name.clone()));
                dims.extend(ft.dims().iter().cloned());
                let component = ft.component().unwrap_or(ScalarType::Float);
                Type::Tensor(TensorType { component, dims, column_vector: false })
            }),
            _ => None,
        }
        .unwrap_or_else(Type::float);
        Self::new(ExprKind::FieldRead { target, field }, ty)
    }

    pub fn tensor_read(tensor: Arc<Self>, indices: impl IntoIterator<Item = Arc<Self>>) -> Arc<Self> {
        let ty = component_of(tensor.ty());
        Self::new(ExprKind::TensorRead { tensor, indices: indices.into_iter().collect() }, ty)
    }

    pub fn tuple_read(tuple: Arc<Self>, index: Arc<Self>) -> Arc<Self> {
        let ty = match tuple.ty() {
            Type::Tuple(t) => Type::Element(t.element.clone()),
            other => other.clone(),
        };
        Self::new(ExprKind::TupleRead { tuple, index }, ty)
    }

    pub fn index_read(edge_set: Arc<Self>, kind: IndexReadKind) -> Arc<Self> {
        Self::new(ExprKind::IndexRead { edge_set, kind }, Type::tensor(ScalarType::Int, [IndexSet::Dynamic]))
    }

    pub fn length(index_set: IndexSet) -> Arc<Self> {
        Self::new(ExprKind::Length { index_set }, Type::int())
    }

    pub fn load(buffer: Arc<Self>, index: Arc<Self>) -> Arc<Self> {
        let ty = component_of(buffer.ty());
        Self::new(ExprKind::Load { buffer, index }, ty)
    }

    /// `tensor{index_vars}`: one scalar component of `tensor`.
    pub fn indexed_tensor(tensor: Arc<Self>, index_vars: impl IntoIterator<Item = IndexVar>) -> Arc<Self> {
        let ty = component_of(tensor.ty());
        Self::new(ExprKind::IndexedTensor { tensor, index_vars: index_vars.into_iter().collect() }, ty)
    }

    /// `(result_vars: value)`: a tensor with one dimension per result variable.
    pub fn index_expr(result_vars: impl IntoIterator<Item = IndexVar>, value: Arc<Self>) -> Arc<Self> {
        let result_vars: SmallVec<[IndexVar; 4]> = result_vars.into_iter().collect();
        let component = value.ty().component().unwrap_or(ScalarType::Float);
        let ty = Type::tensor(component, result_vars.iter().map(|iv| iv.domain().clone()));
        Self::new(ExprKind::IndexExpr { result_vars, value }, ty)
    }

    pub fn call(func: &Func, actuals: Vec<Arc<Self>>) -> Arc<Self> {
        let ty = func
            .result_type()
            .cloned()
            .or_else(|| actuals.first().map(|a| a.ty().clone()))
            .unwrap_or_else(Type::float);
        Self::new(ExprKind::Call { func: func.clone(), actuals }, ty)
    }

    pub fn neg(a: Arc<Self>) -> Arc<Self> {
        let ty = a.ty().clone();
        Self::new(ExprKind::Neg(a), ty)
    }

    pub fn binary(op: BinaryOp, a: Arc<Self>, b: Arc<Self>) -> Arc<Self> {
        let ty = a.ty().clone();
        Self::new(ExprKind::Binary(op, a, b), ty)
    }

    pub fn add(a: Arc<Self>, b: Arc<Self>) -> Arc<Self> {
        Self::binary(BinaryOp::Add, a, b)
    }

    pub fn sub(a: Arc<Self>, b: Arc<Self>) -> Arc<Self> {
        Self::binary(BinaryOp::Sub, a, b)
    }

    pub fn mul(a: Arc<Self>, b: Arc<Self>) -> Arc<Self> {
        Self::binary(BinaryOp::Mul, a, b)
    }

    pub fn div(a: Arc<Self>, b: Arc<Self>) -> Arc<Self> {
        Self::binary(BinaryOp::Div, a, b)
    }

    /// Same node kind and type, different children.
    pub fn with_kind(self: &Arc<Self>, kind: ExprKind) -> Arc<Self> {
        Self::new(kind, self.ty.clone())
    }
}

/// Type of a single component of `ty`.
fn component_of(ty: &Type) -> Type {
    match ty.component() {
        Some(s) => Type::Scalar(s),
        None => ty.clone(),
    }
}
