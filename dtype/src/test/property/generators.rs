use proptest::prelude::*;

use crate::Type;

proptest! {
    #[test]
    fn scalar_types_are_never_tensors(ty in Type::scalar_generator()) {
        prop_assert!(ty.is_scalar());
        prop_assert!(!ty.is_tensor());
        prop_assert_eq!(ty.order(), 0);
    }

    #[test]
    fn tensor_is_scalar_iff_order_zero(ty in Type::tensor_generator(4)) {
        prop_assert!(ty.is_tensor());
        prop_assert_eq!(ty.is_scalar(), ty.order() == 0);
        prop_assert_eq!(ty.dims().len(), ty.order());
    }
}
