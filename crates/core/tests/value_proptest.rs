//! Property-based tests for the comparison model and LIKE matching.

use cellsql_core::pattern_match::like;
use cellsql_core::{compare_cells, compare_text, parse_number, Decimal};
use core::cmp::Ordering;
use proptest::prelude::*;

proptest! {
    #[test]
    fn integers_compare_numerically(a in -100_000i64..100_000, b in -100_000i64..100_000) {
        prop_assert_eq!(compare_text(&a.to_string(), &b.to_string()), a.cmp(&b));
    }

    #[test]
    fn decimal_text_round_trips(n in -1_000_000i64..1_000_000, scale in 0u32..6) {
        let d = Decimal::new(n, scale);
        prop_assert_eq!(parse_number(&d.to_string()), Some(d));
    }

    #[test]
    fn comparison_is_antisymmetric(a in "[a-z0-9.]{0,6}", b in "[a-z0-9.]{0,6}") {
        prop_assert_eq!(compare_text(&a, &b), compare_text(&b, &a).reverse());
    }

    #[test]
    fn null_sorts_first(s in ".*") {
        prop_assert_eq!(compare_cells(None, Some(&s)), Ordering::Less);
    }

    #[test]
    fn percent_matches_everything(s in ".*") {
        prop_assert!(like(&s, "%"));
    }

    #[test]
    fn literal_pattern_matches_itself(s in "[a-zA-Z0-9 .()]*") {
        prop_assert!(like(&s, &s));
        let prefix: String = s.chars().take(2).collect();
        let prefix_pattern = format!("{}%", prefix);
        prop_assert!(like(&s, &prefix_pattern));
    }

    #[test]
    fn underscores_match_length(s in "[a-z]{0,10}", n in 0usize..12) {
        let pattern = "_".repeat(n);
        prop_assert_eq!(like(&s, &pattern), s.chars().count() == n);
    }
}
