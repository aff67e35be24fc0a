//! Property tests for pagination, sort toggling and query-string round trips.

use proptest::prelude::*;
use tabula_core::{NormalizedQueryParams, SortDirection};
use tabula_database::{QueryString, compute_window, number_placeholders, toggle};

fn arb_direction() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
}

fn arb_params() -> impl Strategy<Value = NormalizedQueryParams> {
    (
        proptest::option::of("[a-z_][a-z0-9_]{0,11}"),
        proptest::option::of("[a-zA-Z0-9 %&=+?#,.가-힣]{1,16}"),
        proptest::option::of("[a-z_][a-z0-9_]{0,11}"),
        proptest::option::of(arb_direction()),
        1u64..500,
        1u64..10_000,
    )
        .prop_map(|(sfl, stx, sst, sod, rows, page)| {
            NormalizedQueryParams::new(sfl, stx, sst, sod, rows, page)
        })
}

proptest! {
    /// The window stays in range, is as wide as possible, and holds the current page.
    #[test]
    fn window_invariants(current in 1u64..10_000, total in 1u64..10_000, window in 1u64..50) {
        let w = compute_window(current, total, window);
        prop_assert!(*w.start() >= 1);
        prop_assert!(w.start() <= w.end());
        prop_assert!(*w.end() <= total);
        prop_assert_eq!(w.end() - w.start() + 1, window.min(total));
        if current <= total {
            prop_assert!(w.pages().contains(&current));
        }
    }

    /// With no pages the window is always empty.
    #[test]
    fn empty_window_without_pages(current in 1u64..10_000, window in 1u64..50) {
        let w = compute_window(current, 0, window);
        prop_assert!(w.is_empty());
        prop_assert_eq!(*w.start(), 1);
    }

    /// Toggling the current column and direction flips it; anything else passes through.
    #[test]
    fn toggle_rules(
        column in "[a-z]{1,6}",
        target in "[a-z]{1,6}",
        current in arb_direction(),
        requested in arb_direction(),
    ) {
        let result = toggle(Some(column.as_str()), Some(current), &target, requested);
        if column == target && current == requested {
            prop_assert_eq!(result, requested.opposite());
        } else {
            prop_assert_eq!(result, requested);
        }
    }

    /// Serialized navigation state parses back to the same values.
    #[test]
    fn query_string_round_trip(params in arb_params(), rows_default in 1u64..100) {
        let parsed = QueryString::parse(&QueryString::serialize(&params), rows_default);
        prop_assert_eq!(parsed, params);
    }

    /// Every placeholder outside quotes is numbered exactly once.
    #[test]
    fn placeholders_are_numbered(count in 0usize..20) {
        let sql = format!("SELECT 1 WHERE x IN ({})", vec!["?"; count].join(", "));
        let numbered = number_placeholders(&sql);
        prop_assert!(!numbered.contains('?'));
        if count > 0 {
            let last = format!("${}", count);
            prop_assert!(numbered.contains(&last));
        }
    }
}
