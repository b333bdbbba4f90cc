use std::collections::HashMap;
use std::sync::Arc;

use crate::*;

fn iv(name: &str) -> IndexVar {
    IndexVar::new(name, IndexSet::Range(3))
}

#[test]
fn test_substitute_free_occurrences() {
    let a = Var::new("a", Type::vector(3));
    let (i, j, k) = (iv("i"), iv("j"), iv("k"));
    let read = |v: &IndexVar| Expr::indexed_tensor(Expr::var(&a), [v.clone()]);
    let e = Expr::mul(read(&i), read(&k));

    let out = substitute(&HashMap::from([(i, j.clone())]), &e);
    let expected = Expr::mul(Expr::indexed_tensor(Expr::var(&a), [j]), Expr::indexed_tensor(Expr::var(&a), [k]));
    assert_eq!(out, expected);
}

#[test]
fn test_substitute_leaves_bound_occurrences() {
    let a = Var::new("a", Type::vector(3));
    let (i, j) = (iv("i"), iv("j"));
    // (i: a{i}){i} + a{i}: only the two outer uses of i are free.
    let inner = Expr::index_expr([i.clone()], Expr::indexed_tensor(Expr::var(&a), [i.clone()]));
    let outer_read = Expr::indexed_tensor(Expr::var(&a), [i.clone()]);
    let e = Expr::add(Expr::indexed_tensor(inner.clone(), [i.clone()]), outer_read);

    let out = substitute(&HashMap::from([(i.clone(), j.clone())]), &e);
    let expected = Expr::add(Expr::indexed_tensor(inner, [j.clone()]), Expr::indexed_tensor(Expr::var(&a), [j]));
    assert_eq!(out, expected);
    assert_eq!(free_index_vars(&out).len(), 1);
}

#[test]
fn test_substitute_is_simultaneous() {
    let m = Var::new("M", Type::matrix(3, 3));
    let (i, j) = (iv("i"), iv("j"));
    let e = Expr::indexed_tensor(Expr::var(&m), [i.clone(), j.clone()]);

    let swap = HashMap::from([(i.clone(), j.clone()), (j.clone(), i.clone())]);
    assert_eq!(substitute(&swap, &e), Expr::indexed_tensor(Expr::var(&m), [j, i]));
}

#[test]
fn test_substitute_without_match_shares_input() {
    let a = Var::new("a", Type::vector(3));
    let (i, j, k) = (iv("i"), iv("j"), iv("k"));
    let e = Expr::neg(Expr::indexed_tensor(Expr::var(&a), [i]));

    assert!(Arc::ptr_eq(&substitute(&HashMap::from([(j, k)]), &e), &e));
    assert!(Arc::ptr_eq(&substitute(&HashMap::new(), &e), &e));
}
