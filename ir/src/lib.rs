//! Intermediate representation of the Tessel normalization layer.
//!
//! This crate defines the IR value model and the traversal machinery every
//! pass is built on.
//!
//! # Module Organization
//!
//! - [`expr`], [`stmt`], [`func`], [`var`] - Immutable, `Arc`-shared IR nodes
//! - [`types`] - Literals, operators and other small value types
//! - [`visitor`] - Read-only traversal
//! - [`query`] - Visitors that compute an answer (`contains_indexed_tensor`, `free_index_vars`)
//! - [`rewrite`] - Persistent tree-to-tree rewriting and statement splicing
//! - [`substitute`] - Index variable substitution
//! - [`builder`] - Inner products, elementwise lifts and temporaries
//! - [`tree`] - Textual and ASCII-tree rendering
//! - [`error`] - Error types and result handling

pub mod builder;
pub mod error;
pub mod expr;
pub mod func;
pub mod prelude;
pub mod query;
pub mod rewrite;
pub mod stmt;
pub mod substitute;
pub mod tree;
pub mod types;
pub mod var;
pub mod visitor;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest_gen;


pub use builder::IrBuilder;
pub use error::{Error, Result};
pub use expr::{Expr, ExprKind};
pub use func::{Func, FuncKind, intrinsics};
pub use query::{IrQuery, contains_indexed_tensor, free_index_vars};
pub use rewrite::{IrRewriter, Splicer};
pub use stmt::{ForDomain, Stmt};
pub use substitute::substitute;
pub use types::{BinaryOp, IndexReadKind, Literal, ReductionOperator, UnaryElwise};
pub use var::{IndexVar, IndexVarFactory, TempNames, Var};
pub use visitor::IrVisitor;

pub use tessel_dtype::{IndexSet, ScalarType, TensorType, Type};
