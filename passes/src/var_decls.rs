//! Declaration insertion.
//!
//! Every variable defined in a function body (assigned, or bound as a call or
//! map result) that is not a parameter, a result or already declared gets a
//! `var` declaration in the enclosing block, right before the statement that
//! first defines it. Definitions inside loop and branch bodies are declared
//! before the loop or branch, so the variable stays visible after it. A loop
//! variable is declared by its loop.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use tessel_ir::visitor;
use tessel_ir::{Expr, Func, IrRewriter, IrVisitor, Stmt, Var};

/// Variables a statement defines, in order of first definition.
#[derive(Default)]
struct Definitions {
    defined: Vec<Var>,
    /// Declared by a `var` statement or bound by an enclosing loop.
    bound: Vec<Var>,
}

impl IrVisitor for Definitions {
    // Expressions define nothing.
    fn visit_expr(&mut self, _: &Arc<Expr>) {}

    fn visit_stmt(&mut self, stmt: &Arc<Stmt>) {
        let defined: &[Var] = match stmt.as_ref() {
            Stmt::Assign { var, .. } => std::slice::from_ref(var),
            Stmt::Call { results, .. } | Stmt::Map { results, .. } => results,
            Stmt::VarDecl { var } => {
                self.bound.push(var.clone());
                return;
            }
            Stmt::For { var, body, .. } => {
                self.bound.push(var.clone());
                self.visit_stmt(body);
                self.bound.pop();
                return;
            }
            _ => &[],
        };
        for var in defined {
            if !self.bound.contains(var) && !self.defined.contains(var) {
                self.defined.push(var.clone());
            }
        }
        visitor::walk_stmt(self, stmt);
    }
}

pub struct InsertVarDecls {
    declared: HashSet<Var>,
}

impl InsertVarDecls {
    /// Treats `declared` (usually parameters and results) as already declared.
    pub fn new(declared: impl IntoIterator<Item = Var>) -> Self {
        Self { declared: declared.into_iter().collect() }
    }

    /// Declarations for the variables `stmt` defines that are not declared yet.
    fn missing_decls(&mut self, stmt: &Arc<Stmt>) -> Vec<Arc<Stmt>> {
        let mut defs = Definitions::default();
        defs.visit_stmt(stmt);
        defs.defined
            .into_iter()
            .filter(|var| self.declared.insert(var.clone()))
            .map(|var| Stmt::var_decl(&var))
            .collect()
    }
}

impl IrRewriter for InsertVarDecls {
    type Error = Infallible;

    fn rewrite_expr(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>, Infallible> {
        Ok(expr.clone())
    }

    fn rewrite_stmt(&mut self, stmt: &Arc<Stmt>) -> Result<Arc<Stmt>, Infallible> {
        match stmt.as_ref() {
            Stmt::Block { stmts } => {
                let mut changed = false;
                let mut out = Vec::with_capacity(stmts.len());
                for s in stmts {
                    if s.is_block() || matches!(s.as_ref(), Stmt::VarDecl { .. }) {
                        let new = self.rewrite_stmt(s)?;
                        changed |= !Arc::ptr_eq(&new, s);
                        out.push(new);
                        continue;
                    }
                    let decls = self.missing_decls(s);
                    changed |= !decls.is_empty();
                    out.extend(decls);
                    out.push(s.clone());
                }
                Ok(if changed { Stmt::block(out) } else { stmt.clone() })
            }
            Stmt::VarDecl { var } => {
                self.declared.insert(var.clone());
                Ok(stmt.clone())
            }
            _ => {
                let decls = self.missing_decls(stmt);
                if decls.is_empty() {
                    return Ok(stmt.clone());
                }
                Ok(Stmt::block(decls.into_iter().chain([stmt.clone()])))
            }
        }
    }
}

/// `func` with declarations for every local variable.
pub fn insert_var_decls(func: &Func) -> Func {
    let declared = func.args().iter().chain(func.results()).cloned();
    let Ok(out) = InsertVarDecls::new(declared).rewrite_func(func);
    out
}
