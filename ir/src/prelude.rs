//! Common imports for building and transforming IR:
//!
//! ```rust,ignore
//! use tessel_ir::prelude::*;
//! ```

// Nodes
pub use crate::expr::{Expr, ExprKind};
pub use crate::func::{Func, FuncKind, intrinsics};
pub use crate::stmt::{ForDomain, Stmt};
pub use crate::var::{IndexVar, TempNames, Var};

// Small value types
pub use crate::types::{BinaryOp, Literal, ReductionOperator, UnaryElwise};

// Traversal
pub use crate::query::IrQuery;
pub use crate::rewrite::IrRewriter;
pub use crate::visitor::IrVisitor;

// Re-exports from dependencies
pub use tessel_dtype::{IndexSet, ScalarType, Type};
