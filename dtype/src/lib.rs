//! Type model of the Tessel IR.
//!
//! Every expression in the IR carries a [`Type`]. The normalization passes only
//! ever ask a handful of questions about types (is it scalar, is it a tensor,
//! what is its order and component), so the model is deliberately small:
//!
//! - [`ScalarType`] - the component kinds (`int`, `float`, `bool`)
//! - [`IndexSet`] - one tensor dimension
//! - [`TensorType`] - a component type plus an ordered list of dimensions
//! - [`ElementType`], [`SetType`], [`TupleType`] - graph-structured data

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

pub mod ext;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest_gen;

#[cfg(test)]
pub mod test;

/// Scalar component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ScalarType {
    Int,
    Float,
    #[strum(serialize = "bool")]
    Boolean,
}

impl ScalarType {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Int => 4,
            Self::Float => 8,
            Self::Boolean => 1,
        }
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// One dimension of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum IndexSet {
    /// Statically sized range `0..n`.
    #[display("{_0}")]
    Range(usize),
    /// Ranges over the elements of the named set.
    #[display("{_0}")]
    Set(String),
    /// Extent only known at runtime.
    #[display("*")]
    Dynamic,
}

impl IndexSet {
    pub fn set(name: impl Into<String>) -> Self {
        Self::Set(name.into())
    }

    /// Static extent, if known.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Range(n) => Some(*n),
            Self::Set(_) | Self::Dynamic => None,
        }
    }
}

/// Tensor type: component scalar plus dimensions.
///
/// An order-0 tensor is scalar-like; see [`Type::is_scalar`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorType {
    pub component: ScalarType,
    pub dims: SmallVec<[IndexSet; 4]>,
    /// Distinguishes column vectors from row vectors for order-1 tensors.
    pub column_vector: bool,
}

impl TensorType {
    pub fn new(component: ScalarType, dims: impl IntoIterator<Item = IndexSet>) -> Self {
        Self { component, dims: dims.into_iter().collect(), column_vector: false }
    }

    pub fn column(mut self) -> Self {
        self.column_vector = true;
        self
    }

    pub fn order(&self) -> usize {
        self.dims.len()
    }
}

/// Record type of set elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementType {
    pub name: String,
    pub fields: Vec<(String, Type)>,
}

impl ElementType {
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }
}

/// A set of elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetType {
    pub element: Arc<ElementType>,
}

/// A fixed-size tuple of elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleType {
    pub element: Arc<ElementType>,
    pub size: usize,
}

/// Type of an IR value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Scalar(ScalarType),
    Tensor(TensorType),
    Element(Arc<ElementType>),
    Set(SetType),
    Tuple(TupleType),
}

impl Type {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub const fn int() -> Self {
        Self::Scalar(ScalarType::Int)
    }

    pub const fn float() -> Self {
        Self::Scalar(ScalarType::Float)
    }

    pub const fn boolean() -> Self {
        Self::Scalar(ScalarType::Boolean)
    }

    pub fn tensor(component: ScalarType, dims: impl IntoIterator<Item = IndexSet>) -> Self {
        Self::Tensor(TensorType::new(component, dims))
    }

    /// Float vector with a static extent.
    pub fn vector(n: usize) -> Self {
        Self::tensor(ScalarType::Float, [IndexSet::Range(n)])
    }

    /// Float matrix with static extents.
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self::tensor(ScalarType::Float, [IndexSet::Range(rows), IndexSet::Range(cols)])
    }

    pub fn set(element: Arc<ElementType>) -> Self {
        Self::Set(SetType { element })
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Scalars and order-0 tensors.
    pub fn is_scalar(&self) -> bool {
        match self {
            Self::Scalar(_) => true,
            Self::Tensor(t) => t.order() == 0,
            _ => false,
        }
    }

    /// Tensor types of any order, including order 0.
    pub fn is_tensor(&self) -> bool {
        matches!(self, Self::Tensor(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Self::Tuple(_))
    }

    pub fn as_tensor(&self) -> Option<&TensorType> {
        match self {
            Self::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Component scalar of scalar and tensor types.
    pub fn component(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(s) => Some(*s),
            Self::Tensor(t) => Some(t.component),
            _ => None,
        }
    }

    /// Tensor order; 0 for everything that is not a tensor.
    pub fn order(&self) -> usize {
        match self {
            Self::Tensor(t) => t.order(),
            _ => 0,
        }
    }

    /// Dimensions of a tensor type, empty otherwise.
    pub fn dims(&self) -> &[IndexSet] {
        match self {
            Self::Tensor(t) => &t.dims,
            _ => &[],
        }
    }
}

impl From<ScalarType> for Type {
    fn from(scalar: ScalarType) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<TensorType> for Type {
    fn from(tensor: TensorType) -> Self {
        Self::Tensor(tensor)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Tensor(t) => {
                if t.order() == 0 {
                    return write!(f, "tensor({})", t.component);
                }
                let dims: Vec<String> = t.dims.iter().map(ToString::to_string).collect();
                write!(f, "tensor[{}]({})", dims.join(","), t.component)?;
                if t.column_vector { write!(f, "'") } else { Ok(()) }
            }
            Self::Element(e) => write!(f, "{}", e.name),
            Self::Set(s) => write!(f, "set{{{}}}", s.element.name),
            Self::Tuple(t) => write!(f, "({}*{})", t.element.name, t.size),
        }
    }
}
