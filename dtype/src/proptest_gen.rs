use crate::*;
use proptest::prelude::*;

#[rustfmt::skip]
impl ScalarType {
    pub fn generator() -> impl Strategy<Value = Self> {
        prop_oneof![Just(Self::Int), Just(Self::Float), Just(Self::Boolean)]
    }
}

impl IndexSet {
    pub fn generator() -> impl Strategy<Value = Self> {
        prop_oneof![
            (1usize..8).prop_map(Self::Range),
            prop_oneof![Just("V"), Just("E")].prop_map(Self::set),
            Just(Self::Dynamic),
        ]
    }
}

impl Type {
    /// Float tensors of order `0..=max_order`.
    pub fn tensor_generator(max_order: usize) -> impl Strategy<Value = Self> {
        proptest::collection::vec(IndexSet::generator(), 0..=max_order)
            .prop_map(|dims| Self::tensor(ScalarType::Float, dims))
    }

    pub fn scalar_generator() -> impl Strategy<Value = Self> {
        ScalarType::generator().prop_map(Self::Scalar)
    }
}
