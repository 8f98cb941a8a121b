//! Property-based tests for joins, aggregation and pagination.

use cellsql_core::schema::{Table, TableId};
use cellsql_core::{round_to_scale, Cell, ColumnType, Decimal};
use cellsql_query::ast::{ColumnRef, JoinType};
use cellsql_query::executor::{HashJoin, Relation};
use cellsql_query::planner::{JoinSpec, TableRef};
use cellsql_query::{InMemoryDataProvider, QueryEngine};
use proptest::prelude::*;
use std::str::FromStr;

/// Join keys from a small domain so matches are common; `None` is Null.
fn keys_strategy(max_rows: usize) -> impl Strategy<Value = Vec<Option<u8>>> {
    prop::collection::vec(prop::option::weighted(0.8, 0u8..8), 0..max_rows)
}

fn key_table(name: &str, keys: &[Option<u8>]) -> Table {
    let key_col: Vec<Cell> = keys.iter().map(|k| k.map(|k| k.to_string())).collect();
    let tag_col: Vec<Cell> = (0..keys.len()).map(|i| Some(format!("{}{}", name, i))).collect();
    Table::new(
        TableId::new("SA", name),
        vec!["k".into(), "tag".into()],
        vec![ColumnType::Numeric, ColumnType::Text],
        vec![key_col, tag_col],
        keys.len(),
    )
    .unwrap()
}

fn join(join_type: JoinType, left: &[Option<u8>], right: &[Option<u8>]) -> Relation {
    let spec = JoinSpec {
        join_type,
        table: TableRef::new(TableId::new("SA", "R"), None),
        left: ColumnRef::qualified("L", "k"),
        right: ColumnRef::qualified("R", "k"),
    };
    HashJoin::new(&spec)
        .execute(Relation::from_table(&key_table("L", left)), &key_table("R", right))
        .unwrap()
}

fn number_provider(values: &[Option<i32>]) -> InMemoryDataProvider {
    let mut provider = InMemoryDataProvider::new();
    provider.add_table(
        TableId::new("SA", "N"),
        &[("id", ColumnType::Numeric), ("v", ColumnType::Numeric)],
        values
            .iter()
            .enumerate()
            .map(|(i, v)| vec![Some(i.to_string()), v.map(|v| v.to_string())])
            .collect(),
    );
    provider
}

fn values_strategy() -> impl Strategy<Value = Vec<Option<i32>>> {
    prop::collection::vec(prop::option::weighted(0.8, -1000i32..1000), 0..40)
}

proptest! {
    #[test]
    fn join_sizes_are_ordered(left in keys_strategy(30), right in keys_strategy(30)) {
        let inner = join(JoinType::Inner, &left, &right).len();
        let left_outer = join(JoinType::LeftOuter, &left, &right).len();
        let right_outer = join(JoinType::RightOuter, &left, &right).len();
        let full = join(JoinType::FullOuter, &left, &right).len();

        prop_assert!(inner <= left_outer);
        prop_assert!(left_outer <= full);
        prop_assert!(right_outer <= full);
        prop_assert!(left_outer >= left.len());
        prop_assert!(right_outer >= right.len());
    }

    #[test]
    fn inner_join_matches_nested_loop(left in keys_strategy(30), right in keys_strategy(30)) {
        let expected: usize = left
            .iter()
            .map(|l| right.iter().filter(|r| l.is_some() && *r == l).count())
            .sum();
        let result = join(JoinType::Inner, &left, &right);
        prop_assert_eq!(result.len(), expected);
        for row in result.rows() {
            prop_assert!(row.get(0).is_some());
            prop_assert_eq!(row.get(0), row.get(2));
        }
    }

    #[test]
    fn null_keys_never_match(left in keys_strategy(30), right in keys_strategy(30)) {
        let full = join(JoinType::FullOuter, &left, &right);
        for row in full.rows() {
            // a Null key on either side means the other side is padding
            if row.get(0).is_none() && row.get(1).is_some() {
                prop_assert!(row.get(3).is_none());
            }
            if row.get(2).is_none() && row.get(3).is_some() {
                prop_assert!(row.get(1).is_none());
            }
        }
    }

    #[test]
    fn count_star_equals_row_count(values in values_strategy()) {
        let provider = number_provider(&values);
        let engine = QueryEngine::new(&provider);
        let result = engine.execute_query("SELECT COUNT(*), COUNT(v) FROM N").unwrap();
        let total = values.len().to_string();
        let non_null = values.iter().filter(|v| v.is_some()).count().to_string();
        prop_assert_eq!(result.value(0, 0), Some(total.as_str()));
        prop_assert_eq!(result.value(0, 1), Some(non_null.as_str()));
    }

    #[test]
    fn avg_is_sum_over_count(values in values_strategy()) {
        let provider = number_provider(&values);
        let engine = QueryEngine::new(&provider);
        let result = engine.execute_query("SELECT SUM(v), COUNT(v), AVG(v) FROM N").unwrap();
        let count: u64 = result.value(0, 1).unwrap().parse().unwrap();
        if count == 0 {
            prop_assert_eq!(result.value(0, 2), None);
        } else {
            let sum = Decimal::from_str(result.value(0, 0).unwrap()).unwrap();
            let avg = Decimal::from_str(result.value(0, 2).unwrap()).unwrap();
            prop_assert_eq!(avg, round_to_scale(sum / Decimal::from(count), 10));
        }
    }

    #[test]
    fn tautological_filter_keeps_every_row(values in values_strategy()) {
        let provider = number_provider(&values);
        let engine = QueryEngine::new(&provider);
        let result = engine.execute_query("SELECT * FROM N WHERE 1 = 1").unwrap();
        prop_assert_eq!(result.row_count(), values.len());
    }

    #[test]
    fn limit_offset_slices_sorted_rows(values in values_strategy(), limit in 0usize..50, offset in 0usize..50) {
        let provider = number_provider(&values);
        let engine = QueryEngine::new(&provider);
        let sorted = engine.execute_query("SELECT v FROM N ORDER BY v, id").unwrap();
        let paged = engine
            .execute_query(&format!("SELECT v FROM N ORDER BY v, id LIMIT {} OFFSET {}", limit, offset))
            .unwrap();

        let all: Vec<Option<&str>> = (0..sorted.row_count()).map(|r| sorted.value(r, 0)).collect();
        let page: Vec<Option<&str>> = (0..paged.row_count()).map(|r| paged.value(r, 0)).collect();
        let expected: Vec<Option<&str>> = all.iter().copied().skip(offset).take(limit).collect();
        prop_assert_eq!(page, expected);
    }

    #[test]
    fn sorted_output_is_non_decreasing(values in values_strategy()) {
        let provider = number_provider(&values);
        let engine = QueryEngine::new(&provider);
        let sorted = engine.execute_query("SELECT v FROM N ORDER BY v").unwrap();
        let parsed: Vec<Option<i32>> = (0..sorted.row_count())
            .map(|r| sorted.value(r, 0).map(|v| v.parse().unwrap()))
            .collect();
        let mut expected = values.clone();
        // Option orders None first, matching Null-first sorting
        expected.sort();
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn select_star_round_trips(values in values_strategy()) {
        let provider = number_provider(&values);
        let engine = QueryEngine::new(&provider);
        let result = engine.execute_query("SELECT * FROM N").unwrap();
        prop_assert_eq!(result.row_count(), values.len());
        for (r, v) in values.iter().enumerate() {
            let expected = r.to_string();
            prop_assert_eq!(result.value(r, 0), Some(expected.as_str()));
            let expected = v.map(|v| v.to_string());
            prop_assert_eq!(result.value(r, 1), expected.as_deref());
        }
    }
}
