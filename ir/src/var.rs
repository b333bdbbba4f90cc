//! Variables, index variables and name generation.
//!
//! [`Var`] and [`IndexVar`] are shared handles with identity semantics: two
//! handles are equal only if they were produced by the same constructor call.
//! Names are purely cosmetic and may repeat.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tessel_dtype::{IndexSet, Type};

use crate::types::ReductionOperator;

// Process-wide source of identities for Var and IndexVar.
//
// Relaxed ordering is enough: only uniqueness is needed.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

macro_rules! identity_semantics {
    ($ty:ident) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.0.id == other.0.id
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.id.hash(state);
            }
        }

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> CmpOrdering {
                self.0.id.cmp(&other.0.id)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0.name)
            }
        }
    };
}

struct VarContent {
    id: u64,
    name: String,
    ty: Type,
}

/// A named, typed storage location.
#[derive(Clone)]
pub struct Var(Arc<VarContent>);

impl Var {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self(Arc::new(VarContent { id: next_id(), name: name.into(), ty }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ty(&self) -> &Type {
        &self.0.ty
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var({}#{} : {})", self.0.name, self.0.id, self.0.ty)
    }
}

identity_semantics!(Var);

struct IndexVarContent {
    id: u64,
    name: String,
    domain: IndexSet,
    reduction: Option<ReductionOperator>,
}

/// Symbolic index ranging over one tensor dimension.
///
/// Without a reduction operator the variable is *free-kind*: it names a
/// dimension of the enclosing index expression's result. With one it is a
/// reduction variable, summed over inside the index expression that contains it.
#[derive(Clone)]
pub struct IndexVar(Arc<IndexVarContent>);

impl IndexVar {
    pub fn new(name: impl Into<String>, domain: IndexSet) -> Self {
        Self(Arc::new(IndexVarContent { id: next_id(), name: name.into(), domain, reduction: None }))
    }

    pub fn reduction(name: impl Into<String>, domain: IndexSet, op: ReductionOperator) -> Self {
        Self(Arc::new(IndexVarContent { id: next_id(), name: name.into(), domain, reduction: Some(op) }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn domain(&self) -> &IndexSet {
        &self.0.domain
    }

    pub fn reduction_op(&self) -> Option<ReductionOperator> {
        self.0.reduction
    }

    pub fn is_free_var(&self) -> bool {
        self.0.reduction.is_none()
    }

    pub fn is_reduction_var(&self) -> bool {
        self.0.reduction.is_some()
    }
}

impl fmt::Debug for IndexVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.reduction {
            Some(op) => write!(f, "IndexVar({}{}#{} in {})", op, self.0.name, self.0.id, self.0.domain),
            None => write!(f, "IndexVar({}#{} in {})", self.0.name, self.0.id, self.0.domain),
        }
    }
}

identity_semantics!(IndexVar);

/// Generator of temporary variable names (`tmp0`, `tmp1`, ...).
///
/// Clones share one counter, so a generator handed to several passes (or
/// threads) never issues the same name twice. Independently constructed
/// generators count independently.
#[derive(Debug, Clone)]
pub struct TempNames {
    prefix: Arc<str>,
    counter: Arc<AtomicUsize>,
}

impl TempNames {
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self { prefix: Arc::from(prefix.as_ref()), counter: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Next unused name.
    pub fn fresh(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }

    /// Number of names issued so far across all clones.
    pub fn issued(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for TempNames {
    fn default() -> Self {
        Self::new("tmp")
    }
}

/// Creates index variables named `i, j, k, l, m, n, i1, j1, ...`.
#[derive(Debug, Clone, Default)]
pub struct IndexVarFactory {
    next: usize,
}

impl IndexVarFactory {
    const NAMES: [&'static str; 6] = ["i", "j", "k", "l", "m", "n"];

    pub fn new() -> Self {
        Self::default()
    }

    fn next_name(&mut self) -> String {
        let base = Self::NAMES[self.next % Self::NAMES.len()];
        let round = self.next / Self::NAMES.len();
        self.next += 1;
        if round == 0 { base.to_string() } else { format!("{base}{round}") }
    }

    pub fn create(&mut self, domain: IndexSet) -> IndexVar {
        IndexVar::new(self.next_name(), domain)
    }

    pub fn create_reduction(&mut self, domain: IndexSet, op: ReductionOperator) -> IndexVar {
        IndexVar::reduction(self.next_name(), domain, op)
    }
}
