use super::*;
use crate::test_utils::{arb_amount, arb_margin};
use proptest::prelude::*;

proptest! {
    /// A zero margin leaves any amount untouched
    #[test]
    fn prop_zero_margin_is_identity(amount in any::<f64>().prop_filter("finite", |a| a.is_finite())) {
        prop_assert_eq!(price_with_margin(amount, 0.0), amount);
    }

    /// Larger margins never give a lower price on a positive amount
    #[test]
    fn prop_monotonic_in_margin(amount in arb_amount(), m1 in arb_margin(), m2 in arb_margin()) {
        let (low, high) = if m1 <= m2 { (m1, m2) } else { (m2, m1) };
        prop_assert!(price_with_margin(amount, low) <= price_with_margin(amount, high));
    }

    /// The marked-up price is the amount plus the markup
    #[test]
    fn prop_price_is_amount_plus_markup(amount in arb_amount(), margin in arb_margin()) {
        let total = price_with_margin(amount, margin);
        let expected = amount + margin_amount(amount, margin);
        prop_assert!((total - expected).abs() <= 1e-6 * expected.abs().max(1.0));
    }

    /// Valid margins keep positive prices positive
    #[test]
    fn prop_valid_margin_keeps_price_positive(amount in arb_amount(), margin in arb_margin()) {
        prop_assert!(validate_margin(margin).is_ok());
        prop_assert!(price_with_margin(amount, margin) > 0.0);
    }

    /// After apply_global_to_all every line resolves to the global margin
    #[test]
    fn prop_apply_global_to_all(
        global in arb_margin(),
        margins in prop::collection::hash_map("[a-z]{1,8}", arb_margin(), 0..10),
    ) {
        let keys: Vec<String> = margins.keys().cloned().collect();
        let mut policy = MarginPolicy {
            global_margin: global,
            individual_margins: Some(margins),
        };
        policy.apply_global_to_all();

        for key in keys {
            prop_assert_eq!(policy.margin_for(&key), global);
        }
    }
}
