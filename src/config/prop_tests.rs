use super::*;
use crate::test_utils::arb_messy_string;
use proptest::prelude::*;

/// Generates an arbitrary ConfigUpdate touching a handful of fields
fn arb_config_update() -> impl Strategy<Value = ConfigUpdate> {
    (
        prop::option::of(arb_messy_string()),
        prop::option::of(any::<u16>()),
        prop::option::of(1.0f64..1000.0),
        prop::option::of(arb_messy_string()),
        prop::option::of(0u64..1_000_000),
    )
        .prop_map(
            |(database_url, port, fallback_exchange_rate, broker_supplier_name, ai_timeout_seconds)| {
                ConfigUpdate {
                    database_url,
                    port,
                    fallback_exchange_rate,
                    broker_supplier_name,
                    ai_timeout_seconds,
                    ..Default::default()
                }
            },
        )
}

proptest! {
    /// Applying an empty update changes nothing
    #[test]
    fn prop_empty_update_is_identity(update in arb_config_update()) {
        let config = base_config(None).apply_update(update);
        let again = config.clone().apply_update(ConfigUpdate::default());
        prop_assert_eq!(again, config);
    }

    /// The later update wins on every field it sets
    #[test]
    fn prop_last_write_wins(a in arb_config_update(), b in arb_config_update()) {
        let base = base_config(None);
        let after_a = base.clone().apply_update(a.clone());
        let after_ab = after_a.clone().apply_update(b.clone());

        prop_assert_eq!(after_ab.database_url, b.database_url.unwrap_or(after_a.database_url));
        prop_assert_eq!(after_ab.port, b.port.unwrap_or(after_a.port));
        prop_assert_eq!(
            after_ab.fallback_exchange_rate,
            b.fallback_exchange_rate.unwrap_or(after_a.fallback_exchange_rate)
        );
        prop_assert_eq!(
            after_ab.broker_supplier_name,
            b.broker_supplier_name.unwrap_or(after_a.broker_supplier_name)
        );
        prop_assert_eq!(
            after_ab.ai_timeout_seconds,
            b.ai_timeout_seconds.unwrap_or(after_a.ai_timeout_seconds)
        );
    }

    /// Config files round-trip through TOML
    #[test]
    fn prop_update_survives_toml(update in arb_config_update()) {
        let text = toml::to_string(&update).unwrap();
        let parsed: ConfigUpdate = toml::from_str(&text).unwrap();
        prop_assert_eq!(parsed, update);
    }
}
