//! Mid-end normalization of Tessel IR.
//!
//! Turns function bodies into the flat form code generators consume: no
//! index expression is nested in another, tensor operands of sums and calls
//! are variables, and every local is declared.
//!
//! # Passes
//!
//! - [`lower_intrinsics`] - `norm`/`dot` calls to inner products
//! - [`flatten`] - Nested index expression inlining and operand spilling
//! - [`var_decls`] - Declarations for locals and temporaries
//! - [`verify`] - Check of the flattened form
//!
//! [`pipeline`] sequences them; [`config`] selects what runs.

pub mod backend;
pub mod config;
pub mod error;
pub mod flatten;
pub mod lower_intrinsics;
pub mod pipeline;
pub mod var_decls;
pub mod verify;


pub use backend::{Backend, Function, compile_with};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use flatten::FlattenIndexExpressions;
pub use lower_intrinsics::LowerIntrinsics;
pub use pipeline::{Pipeline, flatten_index_expressions, flatten_index_expressions_stmt};
pub use var_decls::insert_var_decls;
pub use verify::verify_flattened;
