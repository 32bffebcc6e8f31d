//! Strategies for generating amounts.

use proptest::prelude::*;

use super::{Amount, COIN};

/// The total ELA supply, in sela, bounds generated amounts.
const MAX_GENERATED_SELA: i64 = 33_000_000 * COIN;

impl Arbitrary for Amount {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        (-MAX_GENERATED_SELA..=MAX_GENERATED_SELA)
            .prop_map(Amount)
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

/// Returns a strategy for non-negative amounts.
pub fn non_negative() -> impl Strategy<Value = Amount> {
    (0..=MAX_GENERATED_SELA).prop_map(Amount)
}
