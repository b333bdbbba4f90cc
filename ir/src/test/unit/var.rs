use std::collections::HashSet;

use crate::*;

#[test]
fn test_var_identity() {
    let a = Var::new("a", Type::float());
    let b = Var::new("a", Type::float());
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert!(a < b, "ids increase with construction order");

    let set: HashSet<_> = [a.clone(), b, a].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_index_var_kinds() {
    let i = IndexVar::new("i", IndexSet::Range(3));
    let r = IndexVar::reduction("r", IndexSet::Range(3), ReductionOperator::Sum);
    assert!(i.is_free_var());
    assert!(!i.is_reduction_var());
    assert!(r.is_reduction_var());
    assert_eq!(r.reduction_op(), Some(ReductionOperator::Sum));
    assert_eq!(i.to_string(), "i");
}

#[test]
fn test_temp_names_count_up() {
    let names = TempNames::default();
    assert_eq!(names.fresh(), "tmp0");
    assert_eq!(names.fresh(), "tmp1");
    assert_eq!(names.issued(), 2);
}

#[test]
fn test_temp_names_clones_share_counter() {
    let names = TempNames::new("t");
    let other = names.clone();
    assert_eq!(names.fresh(), "t0");
    assert_eq!(other.fresh(), "t1");

    let independent = TempNames::new("t");
    assert_eq!(independent.fresh(), "t0");
}

#[test]
fn test_temp_names_across_threads_are_unique() {
    let names = TempNames::default();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let names = names.clone();
            std::thread::spawn(move || (0..100).map(|_| names.fresh()).collect::<Vec<_>>())
        })
        .collect();
    let all: HashSet<String> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    assert_eq!(all.len(), 400);
}

#[test]
fn test_index_var_factory_names() {
    let mut factory = IndexVarFactory::new();
    let names: Vec<String> = (0..8).map(|_| factory.create(IndexSet::Dynamic).name().to_string()).collect();
    assert_eq!(names, ["i", "j", "k", "l", "m", "n", "i1", "j1"]);

    let r = factory.create_reduction(IndexSet::Range(2), ReductionOperator::Sum);
    assert_eq!(r.name(), "k1");
    assert!(r.is_reduction_var());
}
