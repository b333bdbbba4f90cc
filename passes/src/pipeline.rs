//! Normalization pipeline entry points.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tessel_ir::{Func, Stmt, TempNames};
use tracing::{debug, error};

use crate::config::PipelineConfig;
use crate::error::*;
use crate::flatten::FlattenIndexExpressions;
use crate::lower_intrinsics::LowerIntrinsics;
use crate::var_decls::insert_var_decls;
use crate::verify::verify_flattened;

/// Temporary names handed out by the free functions below, unique per process.
/// The prefix is read from the environment once.
static PROCESS_NAMES: Lazy<TempNames> = Lazy::new(|| TempNames::new(PipelineConfig::from_env().temp_prefix));

/// Runs intrinsic lowering, flattening, verification and declaration
/// insertion over function bodies.
///
/// Every run draws temporaries from the pipeline's [`TempNames`], so names
/// stay unique across all functions one pipeline normalizes. Each run uses
/// fresh pass instances; a pipeline can be shared between threads.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    names: TempNames,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let names = TempNames::new(&config.temp_prefix);
        Self { config, names }
    }

    /// Pipeline drawing temporaries from an existing generator; the
    /// configured prefix is ignored.
    pub fn with_names(config: PipelineConfig, names: TempNames) -> Self {
        Self { config, names }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn names(&self) -> &TempNames {
        &self.names
    }

    /// Normalizes the body of `func`. Everything else about `func` is kept.
    #[tracing::instrument(skip_all, fields(func = func.name()))]
    pub fn run(&self, func: &Func) -> Result<Func> {
        let Some(body) = func.body() else {
            debug!("no body, nothing to normalize");
            return Ok(func.clone());
        };
        debug!(body.initial = %body, "normalizing");

        let lowered = if self.config.lower_intrinsics {
            let lowered = LowerIntrinsics::new(self.names.clone()).lower(body).inspect_err(report)?;
            debug!(body.lowered = %lowered, "after intrinsic lowering");
            lowered
        } else {
            body.clone()
        };

        let flat = self.flatten(&lowered)?;
        let mut out = if Arc::ptr_eq(&flat, body) { func.clone() } else { func.with_body(flat) };

        if self.config.insert_decls {
            out = insert_var_decls(&out);
        }
        debug!(func.normalized = %out, "normalized");
        Ok(out)
    }

    /// Flattens a bare statement. Intrinsics are not lowered and no
    /// declarations are inserted.
    #[tracing::instrument(skip_all)]
    pub fn run_stmt(&self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
        self.flatten(stmt)
    }

    fn flatten(&self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
        let flat = FlattenIndexExpressions::new(self.names.clone()).flatten(stmt).inspect_err(report)?;
        debug!(body.flattened = %flat, "after flattening");
        if self.config.verify {
            verify_flattened(&flat).inspect_err(report)?;
        }
        Ok(flat)
    }
}

fn report(err: &Error) {
    if err.is_internal() {
        error!(%err, "malformed IR reached normalization");
    } else {
        debug!(%err, "normalization rejected the program");
    }
}

/// Lowers intrinsics in, flattens and declares the locals of `func`.
///
/// Uses the configuration from the environment and process-wide temporary
/// names.
pub fn flatten_index_expressions(func: &Func) -> Result<Func> {
    Pipeline::with_names(PipelineConfig::from_env(), PROCESS_NAMES.clone()).run(func)
}

/// Flattens `stmt` alone; see [`Pipeline::run_stmt`].
pub fn flatten_index_expressions_stmt(stmt: &Arc<Stmt>) -> Result<Arc<Stmt>> {
    Pipeline::with_names(PipelineConfig::from_env(), PROCESS_NAMES.clone()).run_stmt(stmt)
}
