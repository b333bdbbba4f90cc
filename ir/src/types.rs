//! Small enums and value types shared by expression and statement nodes.

use std::fmt;

use tessel_dtype::ScalarType;

/// Literal payload of a [`crate::ExprKind::Literal`] node.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Dense tensor literal in row-major order.
    Dense(Vec<f64>),
}

impl Literal {
    /// Scalar kind of a scalar literal; `None` for dense literals.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Int(_) => Some(ScalarType::Int),
            Self::Float(_) => Some(ScalarType::Float),
            Self::Bool(_) => Some(ScalarType::Boolean),
            Self::Dense(_) => None,
        }
    }
}

macro_rules! literal_from {
    ($($ty:ty => $variant:ident as $storage:ty),* $(,)?) => {
        $(impl From<$ty> for Literal {
            fn from(v: $ty) -> Self {
                Self::$variant(v as $storage)
            }
        })*
    };
}

literal_from! {
    i32 => Int as i64, i64 => Int as i64,
    f32 => Float as f64, f64 => Float as f64,
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Dense(values) => {
                let values: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
                write!(f, "[{}]", values.join(", "))
            }
        }
    }
}

/// Binary arithmetic operators.
///
/// All four preserve the type of their left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, strum::EnumIter)]
pub enum BinaryOp {
    /// Addition: a + b
    #[display("+")]
    Add,
    /// Subtraction: a - b
    #[display("-")]
    Sub,
    /// Multiplication: a * b
    #[display("*")]
    Mul,
    /// Division: a / b
    #[display("/")]
    Div,
}

/// Reduction applied over a reduction index variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ReductionOperator {
    #[display("+")]
    Sum,
}

/// Which index array of an edge set an [`crate::ExprKind::IndexRead`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum IndexReadKind {
    Endpoints,
    NeighborsStart,
    Neighbors,
}

/// Elementwise operator applied by [`crate::IrBuilder::unary_elwise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryElwise {
    /// Identity: materializes the tensor unchanged.
    None,
    Neg,
}
