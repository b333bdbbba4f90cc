use snafu::Snafu;
use tessel_dtype::Type;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Inner product over something that is not a tensor.
    #[snafu(display("inner product requires tensor operands, got {lhs} and {rhs}"))]
    InnerProductNonTensor { lhs: Type, rhs: Type },

    /// Inner product operands of different shapes.
    #[snafu(display("inner product operand types differ: {lhs} vs {rhs}"))]
    InnerProductTypeMismatch { lhs: Type, rhs: Type },

    /// Elementwise lift of a non-tensor value.
    #[snafu(display("elementwise operation requires a tensor operand, got {ty}"))]
    ElwiseNonTensor { ty: Type },
}
