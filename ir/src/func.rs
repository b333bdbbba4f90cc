//! Functions and the intrinsic functions the passes refer to.

use std::fmt;
use std::sync::Arc;

use tessel_dtype::Type;

use crate::stmt::Stmt;
use crate::var::Var;

/// Where a function's implementation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncKind {
    /// Defined in the program; has a body.
    Internal,
    /// Provided by the compiler; lowered or emitted directly by the backend.
    Intrinsic,
    /// Linked from outside the program.
    External,
}

#[derive(Debug)]
struct FuncContent {
    name: String,
    kind: FuncKind,
    args: Vec<Var>,
    results: Vec<Var>,
    body: Option<Arc<Stmt>>,
}

/// A named function: parameters, results and (for internal functions) a body.
///
/// Cheap to clone; clones share the same content.
#[derive(Clone)]
pub struct Func(Arc<FuncContent>);

impl Func {
    pub fn new(name: impl Into<String>, args: Vec<Var>, results: Vec<Var>, body: Arc<Stmt>) -> Self {
        Self(Arc::new(FuncContent { name: name.into(), kind: FuncKind::Internal, args, results, body: Some(body) }))
    }

    /// A function without a body (intrinsic or external).
    pub fn declaration(name: impl Into<String>, kind: FuncKind, args: Vec<Var>, results: Vec<Var>) -> Self {
        Self(Arc::new(FuncContent { name: name.into(), kind, args, results, body: None }))
    }

    /// Copy of this function with a new body; everything else is preserved.
    pub fn with_body(&self, body: Arc<Stmt>) -> Self {
        let c = &self.0;
        Self(Arc::new(FuncContent {
            name: c.name.clone(),
            kind: c.kind,
            args: c.args.clone(),
            results: c.results.clone(),
            body: Some(body),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> FuncKind {
        self.0.kind
    }

    pub fn args(&self) -> &[Var] {
        &self.0.args
    }

    pub fn results(&self) -> &[Var] {
        &self.0.results
    }

    pub fn body(&self) -> Option<&Arc<Stmt>> {
        self.0.body.as_ref()
    }

    /// Type of the first result, if any.
    pub fn result_type(&self) -> Option<&Type> {
        self.0.results.first().map(Var::ty)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Func {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let (a, b) = (&self.0, &other.0);
        a.name == b.name && a.kind == b.kind && a.args == b.args && a.results == b.results && a.body == b.body
    }
}

// Only the signature: bodies can be large and are printed via Display.
impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Func")
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .field("args", &self.0.args)
            .field("results", &self.0.results)
            .finish_non_exhaustive()
    }
}

/// Compiler-provided functions.
pub mod intrinsics {
    use once_cell::sync::Lazy;
    use tessel_dtype::Type;

    use super::{Func, FuncKind};
    use crate::var::Var;

    fn intrinsic(name: &str, args: &[&str], ty: Type) -> Func {
        let args = args.iter().map(|a| Var::new(*a, ty.clone())).collect();
        Func::declaration(name, FuncKind::Intrinsic, args, vec![Var::new("r", Type::float())])
    }

    static SQRT: Lazy<Func> = Lazy::new(|| intrinsic("sqrt", &["x"], Type::float()));
    static NORM: Lazy<Func> = Lazy::new(|| intrinsic("norm", &["x"], Type::vector(1)));
    static DOT: Lazy<Func> = Lazy::new(|| intrinsic("dot", &["x", "y"], Type::vector(1)));

    pub fn sqrt() -> Func {
        SQRT.clone()
    }

    pub fn norm() -> Func {
        NORM.clone()
    }

    pub fn dot() -> Func {
        DOT.clone()
    }

    /// Looks up an intrinsic by name.
    pub fn by_name(name: &str) -> Option<Func> {
        match name {
            "sqrt" => Some(sqrt()),
            "norm" => Some(norm()),
            "dot" => Some(dot()),
            _ => None,
        }
    }
}
