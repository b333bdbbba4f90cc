//! Statement splicing for rewriters that hoist work out of expressions.

use std::sync::Arc;

use crate::stmt::Stmt;

/// Buffer of auxiliary statements that must run before the statement being
/// rewritten.
///
/// A rewriter [`emit`](Self::emit)s while rewriting the expressions of a
/// statement and then [`splice`](Self::splice)s the result. Nested statements
/// are rewritten between [`save`](Self::save) and [`restore`](Self::restore)
/// so their auxiliaries land inside their own block, not the parent's.
#[derive(Debug, Default)]
pub struct Splicer {
    pending: Vec<Arc<Stmt>>,
}

impl Splicer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, stmt: Arc<Stmt>) {
        self.pending.push(stmt);
    }

    pub fn pending(&self) -> &[Arc<Stmt>] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// `stmt` itself if nothing was emitted, otherwise `{ emitted...; stmt }`.
    /// Clears the buffer.
    pub fn splice(&mut self, stmt: Arc<Stmt>) -> Arc<Stmt> {
        if self.pending.is_empty() {
            return stmt;
        }
        let mut stmts = std::mem::take(&mut self.pending);
        stmts.push(stmt);
        Stmt::block(stmts)
    }

    /// Moves the pending statements out, leaving the buffer empty.
    pub fn save(&mut self) -> Vec<Arc<Stmt>> {
        std::mem::take(&mut self.pending)
    }

    /// Puts back statements taken by [`save`](Self::save).
    ///
    /// Anything emitted since the save and not yet spliced stays queued after
    /// the restored statements.
    pub fn restore(&mut self, mut saved: Vec<Arc<Stmt>>) {
        saved.append(&mut self.pending);
        self.pending = saved;
    }
}
