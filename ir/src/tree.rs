//! Textual rendering of expressions, statements and functions.
//!
//! `Display` produces compact source-like text:
//!
//! ```text
//! tmp0 = (i: b{i} + c{i});
//! A = (i,j: tmp0{i} + a{j});
//! r = sqrt(tmp0);
//! ```
//!
//! [`Expr::tree`] renders an expression as an ASCII tree, one node per line,
//! for debug logs.

use std::borrow::Cow;
use std::fmt::{self, Display};
use std::io;
use std::sync::Arc;

use ptree::{Style, TreeItem};

use crate::expr::{Expr, ExprKind};
use crate::func::{Func, FuncKind};
use crate::stmt::{ForDomain, Stmt};
use crate::types::BinaryOp;
use crate::var::Var;

fn join<T: Display>(items: impl IntoIterator<Item = T>, sep: &str) -> String {
    items.into_iter().map(|item| item.to_string()).collect::<Vec<_>>().join(sep)
}

// Binding strength of an expression when printed; higher binds tighter.
fn precedence(expr: &Expr) -> u8 {
    match expr.kind() {
        ExprKind::Binary(BinaryOp::Add | BinaryOp::Sub, ..) => 1,
        ExprKind::Binary(BinaryOp::Mul | BinaryOp::Div, ..) => 2,
        ExprKind::Neg(_) => 3,
        _ => 4,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if precedence(expr) < min { write!(f, "({expr})") } else { write!(f, "{expr}") }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::Var(var) => write!(f, "{var}"),
            ExprKind::FieldRead { target, field } => {
                write_operand(f, target, 4)?;
                write!(f, ".{field}")
            }
            ExprKind::TensorRead { tensor, indices } => {
                write_operand(f, tensor, 4)?;
                write!(f, "({})", join(indices, ","))
            }
            ExprKind::TupleRead { tuple, index } => {
                write_operand(f, tuple, 4)?;
                write!(f, "({index})")
            }
            ExprKind::IndexRead { edge_set, kind } => {
                write_operand(f, edge_set, 4)?;
                write!(f, ".{}", kind.as_ref())
            }
            ExprKind::Length { index_set } => write!(f, "length({index_set})"),
            ExprKind::Load { buffer, index } => {
                write_operand(f, buffer, 4)?;
                write!(f, "[{index}]")
            }
            ExprKind::IndexedTensor { tensor, index_vars } => {
                write_operand(f, tensor, 4)?;
                write!(f, "{{{}}}", join(index_vars, ","))
            }
            ExprKind::IndexExpr { result_vars, value } => write!(f, "({}: {value})", join(result_vars, ",")),
            ExprKind::Call { func, actuals } => write!(f, "{}({})", func.name(), join(actuals, ", ")),
            ExprKind::Neg(a) => {
                f.write_str("-")?;
                write_operand(f, a, 3)
            }
            ExprKind::Binary(op, a, b) => {
                let p = precedence(self);
                // Right operands of - and / need parentheses at equal precedence.
                let rhs_min = if matches!(op, BinaryOp::Sub | BinaryOp::Div) { p + 1 } else { p };
                write_operand(f, a, p)?;
                write!(f, " {op} ")?;
                write_operand(f, b, rhs_min)
            }
        }
    }
}

impl Display for ForDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexSet(is) => write!(f, "{is}"),
            Self::Range { start, end } => write!(f, "{start}:{end}"),
        }
    }
}

fn results_prefix(results: &[Var]) -> String {
    if results.is_empty() { String::new() } else { format!("{} = ", join(results, ", ")) }
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match stmt {
        Stmt::Assign { var, value } => writeln!(f, "{pad}{var} = {value};"),
        Stmt::Map { results, function, target, neighbors, partial_actuals, reduction } => {
            write!(f, "{pad}{}map {}", results_prefix(results), function.name())?;
            if !partial_actuals.is_empty() {
                write!(f, "({})", join(partial_actuals, ", "))?;
            }
            write!(f, " to {target}")?;
            if let Some(n) = neighbors {
                write!(f, " with {n}")?;
            }
            if let Some(op) = reduction {
                write!(f, " reduce {op}")?;
            }
            writeln!(f, ";")
        }
        Stmt::FieldWrite { target, field, value } => writeln!(f, "{pad}{target}.{field} = {value};"),
        Stmt::TensorWrite { tensor, indices, value } => writeln!(f, "{pad}{tensor}({}) = {value};", join(indices, ",")),
        Stmt::Store { buffer, index, value } => writeln!(f, "{pad}{buffer}[{index}] = {value};"),
        Stmt::For { var, domain, body } => {
            writeln!(f, "{pad}for {var} in {domain}:")?;
            write_stmt(f, body, depth + 1)?;
            writeln!(f, "{pad}end")
        }
        Stmt::IfThenElse { condition, then_body, else_body } => {
            writeln!(f, "{pad}if {condition}:")?;
            write_stmt(f, then_body, depth + 1)?;
            if let Some(else_body) = else_body {
                writeln!(f, "{pad}else:")?;
                write_stmt(f, else_body, depth + 1)?;
            }
            writeln!(f, "{pad}end")
        }
        Stmt::Block { stmts } => stmts.iter().try_for_each(|s| write_stmt(f, s, depth)),
        Stmt::Pass => writeln!(f, "{pad}pass;"),
        Stmt::Call { results, callee, actuals } => {
            writeln!(f, "{pad}{}{}({});", results_prefix(results), callee.name(), join(actuals, ", "))
        }
        Stmt::VarDecl { var } => writeln!(f, "{pad}var {var} : {};", var.ty()),
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn typed(vars: &[Var]) -> String {
    join(vars.iter().map(|v| format!("{v} : {}", v.ty())), ", ")
}

impl Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signature = format!("func {}({}) -> ({})", self.name(), typed(self.args()), typed(self.results()));
        match (self.kind(), self.body()) {
            (FuncKind::Internal, Some(body)) => {
                writeln!(f, "{signature}:")?;
                write_stmt(f, body, 1)?;
                writeln!(f, "end")
            }
            (FuncKind::Intrinsic, _) => writeln!(f, "intrinsic {signature};"),
            _ => writeln!(f, "extern {signature};"),
        }
    }
}

/// ASCII tree view of an expression.
#[derive(Clone)]
pub struct ExprTree {
    expr: Arc<Expr>,
}

impl ExprTree {
    pub fn new(expr: &Arc<Expr>) -> Self {
        Self { expr: expr.clone() }
    }
}

impl TreeItem for ExprTree {
    type Child = ExprTree;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        write!(f, "{} : {}", format_node(&self.expr), self.expr.ty())
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Owned(self.expr.children().into_iter().map(ExprTree::new).collect())
    }
}

fn format_node(expr: &Expr) -> String {
    match expr.kind() {
        ExprKind::Literal(lit) => format!("LITERAL({lit})"),
        ExprKind::Var(var) => format!("VAR({var})"),
        ExprKind::FieldRead { field, .. } => format!("FIELD_READ(.{field})"),
        ExprKind::TensorRead { .. } => "TENSOR_READ".to_string(),
        ExprKind::TupleRead { .. } => "TUPLE_READ".to_string(),
        ExprKind::IndexRead { kind, .. } => format!("INDEX_READ({})", kind.as_ref()),
        ExprKind::Length { index_set } => format!("LENGTH({index_set})"),
        ExprKind::Load { .. } => "LOAD".to_string(),
        ExprKind::IndexedTensor { index_vars, .. } => format!("INDEXED{{{}}}", join(index_vars, ",")),
        ExprKind::IndexExpr { result_vars, .. } => format!("INDEX_EXPR({})", join(result_vars, ",")),
        ExprKind::Call { func, .. } => format!("CALL({})", func.name()),
        ExprKind::Neg(_) => "Neg".to_string(),
        ExprKind::Binary(op, ..) => format!("{op:?}"),
    }
}

impl Expr {
    /// Renders this expression as an ASCII tree.
    pub fn tree(self: &Arc<Self>) -> String {
        let mut buf = Vec::new();
        if ptree::write_tree(&ExprTree::new(self), &mut buf).is_err() {
            return self.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
