use super::*;

/// Maps Rust literal types onto IR scalar types.
pub trait HasScalarType {
    const SCALAR: ScalarType;
}

macro_rules! impl_scalar_ext {
    ($($ty:ty => $scalar:expr),* $(,)?) => {
        $(impl HasScalarType for $ty { const SCALAR: ScalarType = $scalar; })*
    };
}

impl_scalar_ext! {
    bool => ScalarType::Boolean,
    i32 => ScalarType::Int, i64 => ScalarType::Int,
    f32 => ScalarType::Float, f64 => ScalarType::Float,
}
