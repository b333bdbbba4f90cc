//! Hand-off of normalized functions to a code generator.

use tessel_ir::{Func, Var};

use crate::error::*;
use crate::pipeline::Pipeline;

/// A compiled, callable function produced by a [`Backend`].
pub trait Function {
    fn name(&self) -> &str;
}

/// Compiles normalized functions.
pub trait Backend {
    type Error: std::fmt::Display;

    /// Compiles `func`, which closes over `globals` in order.
    fn compile(&mut self, func: Func, globals: Vec<Var>) -> Result<Box<dyn Function>, Self::Error>;
}

/// Normalizes `func` with `pipeline` and compiles the result with `backend`.
#[tracing::instrument(skip_all, fields(func = func.name(), globals = globals.len()))]
pub fn compile_with<B: Backend>(
    pipeline: &Pipeline,
    backend: &mut B,
    func: &Func,
    globals: Vec<Var>,
) -> Result<Box<dyn Function>> {
    let normalized = pipeline.run(func)?;
    backend
        .compile(normalized, globals)
        .map_err(|e| Error::Backend { func: func.name().to_string(), message: e.to_string() })
}
