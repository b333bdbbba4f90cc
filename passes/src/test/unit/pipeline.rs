use std::sync::Arc;

use tessel_ir::{Expr, ExprKind, Func, FuncKind, IndexSet, IndexVar, Stmt, TempNames, Type, Var, intrinsics};

use crate::config::PipelineConfig;
use crate::pipeline::{Pipeline, flatten_index_expressions_stmt};

fn norm_func(name: &str) -> Func {
    let x = Var::new("x", Type::vector(3));
    let r = Var::new("r", Type::float());
    let body = Stmt::block([Stmt::call(vec![r.clone()], &intrinsics::norm(), vec![Expr::var(&x)])]);
    Func::new(name, vec![x], vec![r], body)
}

fn body_of(func: &Func) -> String {
    func.body().map(|b| b.to_string()).unwrap_or_default()
}

#[test]
fn test_norm_is_lowered_flattened_and_declared() {
    let pipeline = Pipeline::new(PipelineConfig::builder().verify(true).build());
    let f = norm_func("f");

    let out = pipeline.run(&f).unwrap();
    assert_eq!(body_of(&out), "var tmp0 : float;\ntmp0 = (: x{i} * x{i});\nr = sqrt(tmp0);\n");
    assert_eq!(out.name(), "f");
    assert_eq!(out.args(), f.args());
    assert_eq!(out.results(), f.results());
}

#[test]
fn test_names_are_unique_across_runs() {
    let pipeline = Pipeline::default();
    let first = pipeline.run(&norm_func("f")).unwrap();
    let second = pipeline.run(&norm_func("g")).unwrap();

    assert!(body_of(&first).contains("tmp0 = "));
    assert!(body_of(&second).contains("tmp1 = "));
    assert_eq!(pipeline.names().issued(), 2);
}

#[test]
fn test_shared_names_between_pipelines() {
    let names = TempNames::new("t");
    let a = Pipeline::with_names(PipelineConfig::default(), names.clone());
    let b = Pipeline::with_names(PipelineConfig::default(), names.clone());

    a.run(&norm_func("f")).unwrap();
    let out = b.run(&norm_func("g")).unwrap();
    assert!(body_of(&out).contains("t1 = "), "{}", body_of(&out));
}

#[test]
fn test_custom_prefix() {
    let pipeline = Pipeline::new(PipelineConfig::builder().temp_prefix("acc").build());
    let out = pipeline.run(&norm_func("f")).unwrap();
    assert!(body_of(&out).contains("acc0 = "));
}

#[test]
fn test_disabled_stages() {
    let config = PipelineConfig::builder().lower_intrinsics(false).insert_decls(false).build();
    let pipeline = Pipeline::new(config);
    let f = norm_func("f");

    let out = pipeline.run(&f).unwrap();
    assert!(out.ptr_eq(&f));
    assert_eq!(pipeline.names().issued(), 0);
}

#[test]
fn test_function_without_body() {
    let x = Var::new("x", Type::float());
    let f = Func::declaration("ext", FuncKind::External, vec![x.clone()], vec![x]);
    assert!(Pipeline::default().run(&f).unwrap().ptr_eq(&f));
}

#[test]
fn test_internal_error_propagates() {
    let (a, b) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)));
    let v = Var::new("v", Type::vector(3));
    let sum = Expr::new(ExprKind::Binary(tessel_ir::BinaryOp::Add, Expr::var(&a), Expr::var(&b)), Type::vector(3));
    let f = Func::new("bad", vec![a, b], vec![v.clone()], Stmt::assign(&v, sum));

    let err = Pipeline::default().run(&f).unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn test_user_error_propagates() {
    let s = Var::new("s", Type::float());
    let r = Var::new("r", Type::float());
    let body = Stmt::call(vec![r.clone()], &intrinsics::norm(), vec![Expr::var(&s)]);
    let f = Func::new("f", vec![s], vec![r], body);

    let err = Pipeline::default().run(&f).unwrap_err();
    assert!(!err.is_internal());
}

#[test]
fn test_run_stmt_only_flattens() {
    let (a, b) = (Var::new("a", Type::vector(3)), Var::new("b", Type::vector(3)));
    let v = Var::new("v", Type::vector(3));
    let (i, j) = (IndexVar::new("i", IndexSet::Range(3)), IndexVar::new("j", IndexSet::Range(3)));
    let inner = Expr::index_expr(
        [j.clone()],
        Expr::mul(Expr::indexed_tensor(Expr::var(&a), [j.clone()]), Expr::indexed_tensor(Expr::var(&b), [j])),
    );
    let sum = Expr::add(Expr::indexed_tensor(inner, [i.clone()]), Expr::indexed_tensor(Expr::var(&a), [i.clone()]));
    let stmt = Stmt::assign(&v, Expr::index_expr([i], sum));

    let pipeline = Pipeline::new(PipelineConfig::builder().verify(true).build());
    let out = pipeline.run_stmt(&stmt).unwrap();
    assert_eq!(out.to_string(), "tmp0 = (i: a{i} * b{i});\nv = (i: tmp0{i} + a{i});\n");
}

#[test]
fn test_free_function_leaves_flat_statement_alone() {
    let s = Var::new("s", Type::float());
    let stmt: Arc<Stmt> = Stmt::assign(&s, Expr::add(Expr::var(&s), Expr::literal(1.0)));
    let out = flatten_index_expressions_stmt(&stmt).unwrap();
    assert!(Arc::ptr_eq(&out, &stmt));
}
