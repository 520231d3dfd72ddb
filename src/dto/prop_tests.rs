use super::*;
use crate::test_utils::{arb_margin, arb_messy_string};
use proptest::prelude::*;

proptest! {
    /// Page arithmetic stays in range for any input
    #[test]
    fn prop_page_query_in_range(page in prop::option::of(any::<i32>()), limit in prop::option::of(any::<i32>())) {
        let query = PageQuery {
            page: page.map(i64::from),
            limit: limit.map(i64::from),
        };

        prop_assert!(query.page() >= 1);
        prop_assert!((1..=MAX_PAGE_SIZE).contains(&query.limit()));
        prop_assert!(query.offset() >= 0);
        prop_assert_eq!(query.offset() % query.limit(), 0);
    }

    /// Enough pages are reported to hold every row
    #[test]
    fn prop_total_pages_cover_total(total in 0i64..100_000, limit in 1i64..=100) {
        let query = PageQuery { page: None, limit: Some(limit) };
        let page: Paginated<()> = Paginated::new(vec![], total, &query);

        prop_assert!(page.total_pages * limit >= total);
        prop_assert!(page.total_pages == 0 || (page.total_pages - 1) * limit < total);
    }

    /// With the overwrite flag, every line ends up at the global margin
    #[test]
    fn prop_apply_global_to_all_overrides_lines(
        global in arb_margin(),
        margins in prop::collection::hash_map("[a-z0-9-]{1,12}", arb_margin(), 1..8),
    ) {
        let ids: Vec<String> = margins.keys().cloned().collect();
        let dto = SendQuoteDto {
            policy: MarginPolicy {
                global_margin: global,
                individual_margins: Some(margins),
            },
            apply_global_to_all: true,
        };

        let policy = dto.into_policy();
        for id in ids {
            prop_assert_eq!(policy.margin_for(&id), global);
        }
    }

    /// Unset request options always fall back to the documented defaults
    #[test]
    fn prop_request_options_defaults(owner_id in arb_messy_string(), notes in prop::option::of(arb_messy_string())) {
        let dto = CreateSupplierRequestDto {
            owner_id,
            num_suppliers: None,
            country: None,
            shipping_type: None,
            notes: notes.clone(),
            expires_in_days: None,
        };
        let options = dto.options();

        prop_assert_eq!(options.num_suppliers, 3);
        prop_assert_eq!(options.country, "China");
        prop_assert_eq!(options.shipping_type, "sea");
        prop_assert_eq!(options.notes, notes);
    }

    /// The Display impl never panics
    #[test]
    fn prop_quotation_query_display(material in prop::option::of(arb_messy_string()), limit in prop::option::of(any::<i64>())) {
        let query = QuotationListQuery { material, limit, ..Default::default() };
        let _display = format!("{}", query);
    }
}
