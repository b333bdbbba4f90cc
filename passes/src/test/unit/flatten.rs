use std::sync::Arc;

use tessel_ir::{
    Expr, ExprKind, ForDomain, Func, FuncKind, IndexSet, IndexVar, Stmt, TempNames, Type, Var, contains_indexed_tensor,
};
use test_case::test_case;

use crate::error::Error;
use crate::flatten::FlattenIndexExpressions;
use crate::verify::verify_flattened;

fn iv(name: &str) -> IndexVar {
    IndexVar::new(name, IndexSet::Range(3))
}

fn read(var: &Var, index_vars: &[&IndexVar]) -> Arc<Expr> {
    Expr::indexed_tensor(Expr::var(var), index_vars.iter().map(|&v| v.clone()))
}

fn flatten(stmt: &Arc<Stmt>) -> (crate::Result<Arc<Stmt>>, TempNames) {
    let names = TempNames::default();
    let out = FlattenIndexExpressions::new(names.clone()).flatten(stmt);
    (out, names)
}

#[test]
fn test_read_of_index_expr_is_inlined() {
    let a = Var::new("a", Type::vector(3));
    let m = Var::new("A", Type::matrix(3, 3));
    let (i, j, inner_i) = (iv("i"), iv("j"), iv("i"));

    // A = (i,j: (i: a{i}){i} * a{j})
    let inner = Expr::index_expr([inner_i.clone()], read(&a, &[&inner_i]));
    let value = Expr::index_expr(
        [i.clone(), j.clone()],
        Expr::mul(Expr::indexed_tensor(inner, [i.clone()]), read(&a, &[&j])),
    );
    let stmt = Stmt::assign(&m, value);

    let (out, names) = flatten(&stmt);
    let out = out.unwrap();
    assert_eq!(out.to_string(), "A = (i,j: a{i} * a{j});\n");
    assert_eq!(names.issued(), 0);

    let expected = Expr::index_expr([i.clone(), j.clone()], Expr::mul(read(&a, &[&i]), read(&a, &[&j])));
    assert_eq!(out.as_ref(), Stmt::assign(&m, expected).as_ref());
    verify_flattened(&out).unwrap();
}

#[test]
fn test_compound_sum_operand_is_spilled() {
    let (a, b, c) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)), Var::new("c", Type::vector(3)));
    let m = Var::new("A", Type::matrix(3, 3));
    let (i, j, inner_i) = (iv("i"), iv("j"), iv("i"));

    // A = (i,j: (i: b{i} + c{i}){i} + a{j})
    let inner = Expr::index_expr([inner_i.clone()], Expr::add(read(&b, &[&inner_i]), read(&c, &[&inner_i])));
    let value = Expr::index_expr(
        [i.clone(), j.clone()],
        Expr::add(Expr::indexed_tensor(inner, [i.clone()]), read(&a, &[&j])),
    );
    let stmt = Stmt::assign(&m, value);

    let (out, names) = flatten(&stmt);
    let out = out.unwrap();
    assert_eq!(out.to_string(), "tmp0 = (i: b{i} + c{i});\nA = (i,j: tmp0{i} + a{j});\n");
    assert_eq!(names.issued(), 1);

    let Stmt::Block { stmts } = out.as_ref() else { panic!("expected block, got {out}") };
    let Stmt::Assign { var: tmp, value } = stmts[0].as_ref() else { panic!("expected assignment") };
    assert_eq!(tmp.ty(), &Type::vector(3));
    assert_eq!(value.ty(), &Type::vector(3));
    verify_flattened(&out).unwrap();
}

#[test]
fn test_direct_reads_are_not_spilled() {
    let (a, b) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)));
    let v = Var::new("v", Type::vector(3));
    let i = iv("i");
    let stmt = Stmt::assign(&v, Expr::index_expr([i.clone()], Expr::sub(read(&a, &[&i]), read(&b, &[&i]))));

    let (out, names) = flatten(&stmt);
    assert!(Arc::ptr_eq(&out.unwrap(), &stmt));
    assert_eq!(names.issued(), 0);
}

#[test]
fn test_spills_keep_evaluation_order() {
    let vars: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| Var::new(*n, Type::vector(3))).collect();
    let v = Var::new("v", Type::vector(3));
    let i = iv("i");
    let product = |x: &Var, y: &Var| Expr::mul(read(x, &[&i]), read(y, &[&i]));
    let stmt = Stmt::assign(
        &v,
        Expr::index_expr([i.clone()], Expr::add(product(&vars[0], &vars[1]), product(&vars[2], &vars[3]))),
    );

    let out = flatten(&stmt).0.unwrap();
    assert_eq!(
        out.to_string(),
        "tmp0 = (i: a{i} * b{i});\ntmp1 = (i: c{i} * d{i});\nv = (i: tmp0{i} + tmp1{i});\n"
    );
}

#[test]
fn test_nested_chain_collapses() {
    let a = Var::new("a", Type::vector(3));
    let v = Var::new("v", Type::vector(3));

    // (i2: (i1: (i0: a{i0}){i1} * a{i1}){i2} * a{i2})
    let mut expr = {
        let i = iv("i");
        Expr::index_expr([i.clone()], read(&a, &[&i]))
    };
    for _ in 0..2 {
        let i = iv("i");
        expr = Expr::index_expr([i.clone()], Expr::mul(Expr::indexed_tensor(expr, [i.clone()]), read(&a, &[&i])));
    }
    let stmt = Stmt::assign(&v, expr);

    let (out, names) = flatten(&stmt);
    let out = out.unwrap();
    assert_eq!(out.to_string(), "v = (i: a{i} * a{i} * a{i});\n");
    assert_eq!(names.issued(), 0);
    verify_flattened(&out).unwrap();
}

#[test]
fn test_call_spills_only_compound_tensor_actuals() {
    let (a, b, c) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)), Var::new("c", Type::vector(3)));
    let r = Var::new("r", Type::vector(3));
    let f = Func::declaration(
        "f",
        FuncKind::External,
        vec![Var::new("x", Type::vector(3)), Var::new("y", Type::vector(3))],
        vec![Var::new("z", Type::vector(3))],
    );
    let i = iv("i");
    let a_actual = Expr::var(&a);
    let product = Expr::index_expr([i.clone()], Expr::mul(read(&b, &[&i]), read(&c, &[&i])));
    let stmt = Stmt::call(vec![r.clone()], &f, vec![a_actual.clone(), product]);

    let (out, names) = flatten(&stmt);
    let out = out.unwrap();
    assert_eq!(out.to_string(), "tmp0 = (i: b{i} * c{i});\nr = f(a, tmp0);\n");
    assert_eq!(names.issued(), 1);

    let Stmt::Block { stmts } = out.as_ref() else { panic!("expected block, got {out}") };
    let Stmt::Call { actuals, .. } = stmts[1].as_ref() else { panic!("expected call") };
    assert!(Arc::ptr_eq(&actuals[0], &a_actual));
    assert!(actuals[1].is_var());
    verify_flattened(&out).unwrap();
}

#[test]
fn test_call_actual_without_index_reads_is_copied() {
    let b = Var::new("b", Type::vector(3));
    let r = Var::new("r", Type::float());
    let f = Func::declaration("f", FuncKind::External, vec![Var::new("x", Type::vector(3))], vec![r.clone()]);
    let stmt = Stmt::call(vec![r.clone()], &f, vec![Expr::neg(Expr::var(&b))]);

    let out = flatten(&stmt).0.unwrap();
    let Stmt::Block { stmts } = out.as_ref() else { panic!("expected block, got {out}") };
    let [spill, call] = stmts.as_slice() else { panic!("expected two statements") };

    let Stmt::Assign { var: tmp, value } = spill.as_ref() else { panic!("expected assignment") };
    let ExprKind::IndexExpr { result_vars, .. } = value.kind() else { panic!("expected index expression") };
    assert_eq!(result_vars.len(), 1);
    assert_eq!(tmp.ty(), &Type::vector(3));

    let Stmt::Call { actuals, .. } = call.as_ref() else { panic!("expected call") };
    assert_eq!(actuals[0].as_var(), Some(tmp));
    assert_eq!(out.to_string(), "tmp0 = (i: -b{i});\nr = f(tmp0);\n");
}

#[test]
fn test_call_actual_with_bound_reads_keeps_its_type() {
    let (a, b) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)));
    let r = Var::new("r", Type::float());
    let f = Func::declaration("f", FuncKind::External, vec![Var::new("x", Type::vector(3))], vec![r.clone()]);
    let j = iv("i");
    // r = f(-(i: a{i} + b{i})): every read is bound inside the actual.
    let negated = Expr::neg(Expr::index_expr([j.clone()], Expr::add(read(&a, &[&j]), read(&b, &[&j]))));
    assert_eq!(negated.ty(), &Type::vector(3));
    let stmt = Stmt::call(vec![r], &f, vec![negated]);

    let out = flatten(&stmt).0.unwrap();
    assert_eq!(out.to_string(), "tmp0 = (i: -(a{i} + b{i}));\nr = f(tmp0);\n");
    verify_flattened(&out).unwrap();

    let Stmt::Block { stmts } = out.as_ref() else { panic!("expected block, got {out}") };
    let Stmt::Assign { var: tmp, value } = stmts[0].as_ref() else { panic!("expected assignment") };
    assert_eq!(tmp.ty(), &Type::vector(3));
    assert_eq!(value.ty(), &Type::vector(3));
}

#[test]
fn test_call_with_variable_actuals_untouched() {
    let (a, b) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)));
    let s = Var::new("s", Type::float());
    let r = Var::new("r", Type::float());
    let f = Func::declaration(
        "f",
        FuncKind::External,
        vec![Var::new("x", Type::vector(3)), Var::new("y", Type::vector(3)), Var::new("z", Type::float())],
        vec![r.clone()],
    );
    let shifted = Expr::add(Expr::var(&s), Expr::literal(1.0));
    let stmt = Stmt::call(vec![r], &f, vec![Expr::var(&a), Expr::var(&b), shifted]);

    let (out, names) = flatten(&stmt);
    assert!(Arc::ptr_eq(&out.unwrap(), &stmt));
    assert_eq!(names.issued(), 0);
}

#[test]
fn test_spills_stay_inside_loop_body() {
    let (a, b, c) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)), Var::new("c", Type::vector(3)));
    let v = Var::new("v", Type::vector(3));
    let k = Var::new("k", Type::int());
    let (i, inner_i) = (iv("i"), iv("i"));
    let inner = Expr::index_expr([inner_i.clone()], Expr::mul(read(&b, &[&inner_i]), read(&c, &[&inner_i])));
    let sum = Expr::add(Expr::mul(read(&a, &[&i]), read(&a, &[&i])), Expr::indexed_tensor(inner, [i.clone()]));
    let assign = Stmt::assign(&v, Expr::index_expr([i.clone()], sum));
    let domain = ForDomain::Range { start: Expr::literal(0i32), end: Expr::literal(3i32) };
    let stmt = Stmt::block([
        Stmt::for_loop(&k, domain, assign),
        Stmt::pass(),
    ]);

    let out = flatten(&stmt).0.unwrap();
    let Stmt::Block { stmts } = out.as_ref() else { panic!("expected block, got {out}") };
    assert_eq!(stmts.len(), 2);
    let Stmt::For { body, .. } = stmts[0].as_ref() else { panic!("expected loop first, got {}", stmts[0]) };
    assert_eq!(
        body.to_string(),
        "tmp0 = (i: a{i} * a{i});\ntmp1 = (i: b{i} * c{i});\nv = (i: tmp0{i} + tmp1{i});\n"
    );
}

#[test]
fn test_flattening_is_idempotent() {
    let (a, b, c) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)), Var::new("c", Type::vector(3)));
    let m = Var::new("A", Type::matrix(3, 3));
    let (i, j, inner_i) = (iv("i"), iv("j"), iv("i"));
    let inner = Expr::index_expr([inner_i.clone()], Expr::add(read(&b, &[&inner_i]), read(&c, &[&inner_i])));
    let stmt = Stmt::assign(
        &m,
        Expr::index_expr([i.clone(), j.clone()], Expr::add(Expr::indexed_tensor(inner, [i.clone()]), read(&a, &[&j]))),
    );

    let names = TempNames::default();
    let once = FlattenIndexExpressions::new(names.clone()).flatten(&stmt).unwrap();
    let twice = FlattenIndexExpressions::new(names.clone()).flatten(&once).unwrap();
    assert!(Arc::ptr_eq(&once, &twice));
    assert_eq!(names.issued(), 1);
}

#[test_case(tessel_ir::BinaryOp::Add ; "add")]
#[test_case(tessel_ir::BinaryOp::Sub ; "sub")]
fn test_non_scalar_sum_operand_is_internal(op: tessel_ir::BinaryOp) {
    let (a, b) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)));
    let v = Var::new("v", Type::vector(3));
    let sum = Expr::new(ExprKind::Binary(op, Expr::var(&a), Expr::var(&b)), Type::vector(3));
    let stmt = Stmt::assign(&v, sum);

    let err = flatten(&stmt).0.unwrap_err();
    assert!(err.is_internal());
    assert!(matches!(&err, Error::NonScalarOperand { op: o, .. } if *o == op), "{err}");
}

#[test]
fn test_index_count_mismatch_is_internal() {
    let m = Var::new("M", Type::matrix(3, 3));
    let s = Var::new("s", Type::float());
    let (i, j, k) = (iv("i"), iv("j"), iv("k"));
    let matrix = Expr::index_expr([i.clone(), j.clone()], read(&m, &[&j, &i]));
    let stmt = Stmt::assign(&s, Expr::index_expr([], Expr::indexed_tensor(matrix, [k])));

    let err = flatten(&stmt).0.unwrap_err();
    assert!(err.is_internal());
    assert!(matches!(err, Error::IndexArityMismatch { expected: 2, found: 1, .. }), "{err}");
}

#[test]
fn test_spill_leaves_scalars_alone() {
    let s = Var::new("s", Type::float());
    let a = Var::new("a", Type::vector(3));
    let i = iv("i");
    let mut pass = FlattenIndexExpressions::new(TempNames::default());

    let scalar = Expr::mul(Expr::var(&s), Expr::neg(Expr::literal(2.0)));
    assert!(Arc::ptr_eq(&pass.spill(scalar.clone()).unwrap(), &scalar));
    assert!(pass.pending().is_empty());

    let indexed = Expr::mul(read(&a, &[&i]), Expr::var(&s));
    assert!(contains_indexed_tensor(&indexed));
    let spilled = pass.spill(indexed).unwrap();
    assert_eq!(spilled.to_string(), "tmp0{i}");
    assert_eq!(pass.pending().len(), 1);
    assert_eq!(pass.pending()[0].to_string(), "tmp0 = (i: a{i} * s);\n");
}
