use snafu::Snafu;
use tessel_dtype::Type;
use tessel_ir::BinaryOp;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Normalization failures.
///
/// Internal errors (see [`Error::is_internal`]) mean an earlier compiler stage
/// produced malformed IR. The rest are reported to the user.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    // =========================================================================
    // Internal
    // =========================================================================
    #[snafu(display("operand of '{op}' must be scalar, got {operand} : {ty}"))]
    NonScalarOperand { op: BinaryOp, operand: String, ty: Type },

    #[snafu(display("{node}: expected {expected} index variables, found {found}"))]
    IndexArityMismatch { node: String, expected: usize, found: usize },

    #[snafu(display(
        "call to '{callee}' must have {expected_actuals} actuals and {expected_results} results, \
         got {actuals} and {results}"
    ))]
    IntrinsicArity { callee: String, expected_actuals: usize, expected_results: usize, actuals: usize, results: usize },

    #[snafu(display("index expression read through an indexed tensor: {node}"))]
    NestedIndexExpr { node: String },

    #[snafu(display("tensor operand of '{context}' is not a variable: {operand}"))]
    UnspilledOperand { context: String, operand: String },

    #[snafu(display("ir builder failed: {source}"))]
    Builder { source: tessel_ir::Error },

    // =========================================================================
    // User-facing
    // =========================================================================
    #[snafu(display("argument {position} of '{callee}' must be a tensor, got {ty}"))]
    NonTensorIntrinsicArgument { callee: String, position: usize, ty: Type },

    #[snafu(display("arguments of '{callee}' must have the same type, got {lhs} and {rhs}"))]
    IntrinsicArgumentMismatch { callee: String, lhs: Type, rhs: Type },

    #[snafu(display("backend failed to compile '{func}': {message}"))]
    Backend { func: String, message: String },
}

impl Error {
    /// True for violated IR invariants, false for errors in the user program
    /// or the backend.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::NonScalarOperand { .. }
                | Self::IndexArityMismatch { .. }
                | Self::IntrinsicArity { .. }
                | Self::NestedIndexExpr { .. }
                | Self::UnspilledOperand { .. }
                | Self::Builder { .. }
        )
    }
}
