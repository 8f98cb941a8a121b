//! End-to-end tests driving `QueryEngine::execute_query` against an
//! in-memory provider.

use cellsql_core::schema::TableId;
use cellsql_core::{Cell, ColumnType, EngineConfig, Error, QueryResult};
use cellsql_query::{DataProvider, InMemoryDataProvider, QueryEngine};

fn cells(values: &[Option<&str>]) -> Vec<Cell> {
    values.iter().map(|v| v.map(str::to_string)).collect()
}

fn row(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

/// People, customers with orders, and an employee table with repeated names.
fn provider() -> InMemoryDataProvider {
    let mut provider = InMemoryDataProvider::new();
    provider.add_table(
        TableId::new("SA", "PEOPLE"),
        &[
            ("id", ColumnType::Numeric),
            ("name", ColumnType::Text),
            ("age", ColumnType::Numeric),
        ],
        vec![
            row(&["1", "Alice", "25"]),
            row(&["2", "Bob", "30"]),
            row(&["3", "Charlie", "35"]),
        ],
    );
    provider.add_table(
        TableId::new("SA", "CUSTOMERS"),
        &[("customer_id", ColumnType::Numeric), ("name", ColumnType::Text)],
        vec![
            row(&["1", "Ann"]),
            row(&["2", "Ben"]),
            row(&["3", "Cal"]),
            row(&["999", "Zed"]),
        ],
    );
    provider.add_table(
        TableId::new("SA", "ORDERS"),
        &[
            ("order_id", ColumnType::Numeric),
            ("customer_id", ColumnType::Numeric),
            ("amount", ColumnType::Numeric),
        ],
        vec![
            row(&["10", "1", "100"]),
            row(&["11", "2", "50.5"]),
            row(&["12", "3", "20"]),
        ],
    );
    provider.add_table(
        TableId::new("SA", "EMP"),
        &[
            ("name", ColumnType::Text),
            ("dept", ColumnType::Text),
            ("salary", ColumnType::Numeric),
        ],
        vec![
            row(&["Ann", "ops", "100"]),
            row(&["Ben", "dev", "200"]),
            row(&["Ann", "dev", "300"]),
            cells(&[Some("Cy"), None, Some("400")]),
            row(&["Ben", "ops", "n/a"]),
            row(&["Ann", "ops", "100"]),
        ],
    );
    provider
}

fn query(sql: &str) -> QueryResult {
    let provider = provider();
    QueryEngine::new(&provider)
        .execute_query(sql)
        .unwrap_or_else(|e| panic!("{}: {}", sql, e))
}

fn query_err(sql: &str) -> Error {
    let provider = provider();
    match QueryEngine::new(&provider).execute_query(sql) {
        Ok(_) => panic!("{} should fail", sql),
        Err(e) => e,
    }
}

fn table(result: &QueryResult) -> Vec<Vec<Option<&str>>> {
    (0..result.row_count())
        .map(|r| (0..result.column_count()).map(|c| result.value(r, c)).collect())
        .collect()
}

#[test]
fn test_where_order_by_desc() {
    let result = query("SELECT * FROM PEOPLE WHERE age > 28 ORDER BY age DESC");
    assert_eq!(result.column_names(), &["id", "name", "age"]);
    assert_eq!(
        table(&result),
        vec![
            vec![Some("3"), Some("Charlie"), Some("35")],
            vec![Some("2"), Some("Bob"), Some("30")],
        ]
    );
}

#[test]
fn test_group_by_having() {
    let result =
        query("SELECT name, COUNT(*) cnt FROM EMP GROUP BY name HAVING COUNT(*) > 1");
    assert_eq!(result.column_names(), &["name", "cnt"]);
    assert_eq!(
        result.column_types(),
        &[ColumnType::Text, ColumnType::Numeric]
    );
    // first-occurrence order, Cy dropped by HAVING
    assert_eq!(
        table(&result),
        vec![vec![Some("Ann"), Some("3")], vec![Some("Ben"), Some("2")]]
    );
}

#[test]
fn test_left_join_unmatched_key() {
    let result = query(
        "SELECT * FROM CUSTOMERS LEFT JOIN ORDERS ON CUSTOMERS.customer_id = ORDERS.customer_id",
    );
    assert_eq!(result.row_count(), 4);
    assert_eq!(result.column_count(), 5);
    let zed = table(&result)[3].clone();
    assert_eq!(zed, vec![Some("999"), Some("Zed"), None, None, None]);
}

#[test]
fn test_join_keys_written_right_first() {
    let result = query(
        "SELECT c.name, o.amount FROM CUSTOMERS c JOIN ORDERS o ON o.customer_id = c.customer_id \
         ORDER BY o.amount",
    );
    assert_eq!(
        table(&result),
        vec![
            vec![Some("Cal"), Some("20")],
            vec![Some("Ben"), Some("50.5")],
            vec![Some("Ann"), Some("100")],
        ]
    );
}

#[test]
fn test_right_and_full_joins() {
    let right = query(
        "SELECT o.order_id, c.name FROM ORDERS o RIGHT JOIN CUSTOMERS c \
         ON o.customer_id = c.customer_id",
    );
    assert_eq!(right.row_count(), 4);
    assert_eq!(right.value(3, 0), None);
    assert_eq!(right.value(3, 1), Some("Zed"));

    let full = query(
        "SELECT * FROM ORDERS o FULL OUTER JOIN CUSTOMERS c ON o.customer_id = c.customer_id",
    );
    assert_eq!(full.row_count(), 4);
}

#[test]
fn test_join_chain() {
    let result = query(
        "SELECT e.name, c.customer_id, o.amount FROM EMP e \
         JOIN CUSTOMERS c ON e.name = c.name \
         JOIN ORDERS o ON c.customer_id = o.customer_id \
         WHERE e.dept = 'dev' ORDER BY o.amount DESC",
    );
    assert_eq!(
        table(&result),
        vec![
            vec![Some("Ann"), Some("1"), Some("100")],
            vec![Some("Ben"), Some("2"), Some("50.5")],
        ]
    );
}

#[test]
fn test_round_trip_projection() {
    let provider = provider();
    let engine = QueryEngine::new(&provider);
    let result = engine.execute_query("SELECT * FROM EMP").unwrap();
    let id = TableId::new("SA", "EMP");
    assert_eq!(result.columns(), provider.row_matrix(&id).unwrap().as_slice());
    assert_eq!(result.column_names(), provider.column_names(&id).unwrap().as_slice());
    assert_eq!(result.column_types(), provider.column_types(&id).unwrap().as_slice());
    assert_eq!(result.row_count(), 6);
}

#[test]
fn test_aggregates_without_group_by() {
    let result = query(
        "SELECT COUNT(*), COUNT(dept), COUNT(DISTINCT name), SUM(salary), AVG(salary), \
         MAX(salary), MIN(name) FROM EMP",
    );
    assert_eq!(
        result.column_names(),
        &[
            "COUNT(*)",
            "COUNT(dept)",
            "COUNT(DISTINCT name)",
            "SUM(salary)",
            "AVG(salary)",
            "MAX(salary)",
            "MIN(name)",
        ]
    );
    // "n/a" is counted by AVG but contributes nothing to SUM
    assert_eq!(
        table(&result),
        vec![vec![
            Some("6"),
            Some("5"),
            Some("3"),
            Some("1100"),
            Some("183.3333333333"),
            Some("n/a"),
            Some("Ann"),
        ]]
    );
}

#[test]
fn test_aggregates_over_empty_input() {
    let result = query("SELECT COUNT(*), SUM(age), AVG(age) FROM PEOPLE WHERE age > 100");
    assert_eq!(table(&result), vec![vec![Some("0"), Some("0"), None]]);

    let grouped = query("SELECT name, COUNT(*) FROM PEOPLE WHERE age > 100 GROUP BY name");
    assert_eq!(grouped.row_count(), 0);
    assert_eq!(grouped.column_count(), 2);
}

#[test]
fn test_group_by_with_null_key_and_order_by_aggregate() {
    let result = query(
        "SELECT dept, SUM(salary) AS total FROM EMP GROUP BY dept ORDER BY MAX(salary) DESC",
    );
    assert_eq!(result.column_names(), &["dept", "total"]);
    assert_eq!(
        table(&result),
        vec![
            // MAX over ops is "n/a", which sorts after numbers lexically
            vec![Some("ops"), Some("200")],
            vec![None, Some("400")],
            vec![Some("dev"), Some("500")],
        ]
    );
}

#[test]
fn test_limit_and_offset() {
    let sql = "SELECT id FROM PEOPLE ORDER BY id";
    assert_eq!(query(&format!("{} LIMIT 2", sql)).row_count(), 2);
    assert_eq!(query(&format!("{} LIMIT 0", sql)).row_count(), 0);
    let paged = query(&format!("{} LIMIT 1 OFFSET 1", sql));
    assert_eq!(table(&paged), vec![vec![Some("2")]]);
    assert_eq!(query(&format!("{} LIMIT 5 OFFSET 3", sql)).row_count(), 0);
    assert_eq!(query(&format!("{} OFFSET 10", sql)).row_count(), 0);
}

#[test]
fn test_where_predicates() {
    let names = |sql: &str| -> Vec<String> {
        let result = query(sql);
        (0..result.row_count())
            .filter_map(|r| result.value(r, 0).map(str::to_string))
            .collect()
    };
    assert_eq!(names("SELECT name FROM PEOPLE WHERE name LIKE '%li%'"), vec!["Alice", "Charlie"]);
    assert_eq!(names("SELECT name FROM PEOPLE WHERE name NOT LIKE 'A%'"), vec!["Bob", "Charlie"]);
    assert_eq!(names("SELECT name FROM PEOPLE WHERE id IN (1, 3)"), vec!["Alice", "Charlie"]);
    assert_eq!(names("SELECT name FROM PEOPLE WHERE age BETWEEN 25 AND 30"), vec!["Alice", "Bob"]);
    assert_eq!(
        names("SELECT name FROM PEOPLE WHERE age < 30 OR name = 'Charlie'"),
        vec!["Alice", "Charlie"]
    );
    assert_eq!(
        names("SELECT name FROM PEOPLE WHERE NOT (age > 26 AND id <> 3)"),
        vec!["Alice", "Charlie"]
    );
    assert_eq!(names("SELECT name FROM EMP WHERE dept IS NULL"), vec!["Cy"]);
    // Null dept is unknown on both sides of the comparison
    assert_eq!(names("SELECT name FROM EMP WHERE dept = 'ops' OR dept <> 'ops'").len(), 5);
}

#[test]
fn test_computed_columns() {
    let result = query(
        "SELECT UPPER(name) AS shout, age * 2, LENGTH(name), name || '!' FROM PEOPLE WHERE id = 1",
    );
    assert_eq!(result.column_names()[0], "shout");
    assert_eq!(
        result.column_types(),
        &[ColumnType::Text, ColumnType::Numeric, ColumnType::Numeric, ColumnType::Text]
    );
    assert_eq!(
        table(&result),
        vec![vec![Some("ALICE"), Some("50"), Some("5"), Some("Alice!")]]
    );
}

#[test]
fn test_unknown_function_returns_first_argument() {
    let result = query("SELECT FROBNICATE(name, 1) FROM PEOPLE WHERE id = 2");
    assert_eq!(result.value(0, 0), Some("Bob"));
}

#[test]
fn test_qualified_wildcard() {
    let result = query(
        "SELECT o.* FROM CUSTOMERS c JOIN ORDERS o ON c.customer_id = o.customer_id",
    );
    assert_eq!(result.column_names(), &["order_id", "customer_id", "amount"]);
    assert_eq!(result.row_count(), 3);
}

#[test]
fn test_schema_qualified_and_case_insensitive_names() {
    assert_eq!(query("select NAME from sa.people where ID = 1").value(0, 0), Some("Alice"));
    assert_eq!(query("SELECT p.name FROM \"SA.PEOPLE\" p WHERE p.id = 3").value(0, 0), Some("Charlie"));
}

#[test]
fn test_decimal_scale_config() {
    let provider = provider();
    let config = EngineConfig::from_json(r#"{"decimal_scale": 3}"#).unwrap();
    let engine = QueryEngine::with_config(&provider, config);
    let result = engine.execute_query("SELECT 10 / 3 FROM PEOPLE LIMIT 1").unwrap();
    assert_eq!(result.value(0, 0), Some("3.333"));

    let result = engine.execute_query("SELECT AVG(salary) FROM EMP").unwrap();
    assert_eq!(result.value(0, 0), Some("183.333"));
}

#[test]
fn test_error_kinds() {
    assert!(matches!(query_err("SELEC * FROM PEOPLE"), Error::Syntax { .. }));
    assert!(matches!(query_err("SELECT * FROM NOPE"), Error::TableNotFound { .. }));
    assert!(matches!(
        query_err("SELECT * FROM PEOPLE WHERE id IN (SELECT id FROM PEOPLE)"),
        Error::UnsupportedSyntax { .. }
    ));
    assert!(matches!(
        query_err("SELECT * FROM PEOPLE UNION SELECT * FROM PEOPLE"),
        Error::UnsupportedSyntax { .. }
    ));
    assert!(matches!(
        query_err("SELECT * FROM CUSTOMERS c JOIN ORDERS o ON c.customer_id > o.customer_id"),
        Error::UnsupportedJoinCondition { .. }
    ));
    assert!(matches!(
        query_err("SELECT * FROM CUSTOMERS c JOIN ORDERS o USING (customer_id)"),
        Error::UnsupportedJoinCondition { .. }
    ));
    assert!(matches!(
        query_err("SELECT * FROM CUSTOMERS c JOIN ORDERS o ON c.nope = o.customer_id"),
        Error::JoinColumnNotFound { side: "left", .. }
    ));
    assert!(matches!(
        query_err("SELECT * FROM CUSTOMERS c JOIN ORDERS o ON c.customer_id = o.nope"),
        Error::JoinColumnNotFound { side: "right", .. }
    ));
    assert!(matches!(
        query_err("SELECT name, COUNT(*) FROM PEOPLE"),
        Error::ColumnResolution { .. }
    ));
    assert!(matches!(
        query_err("SELECT dept, COUNT(*) FROM PEOPLE GROUP BY dept"),
        Error::ColumnResolution { .. }
    ));
    assert!(matches!(query_err("SELECT SUM(*) FROM PEOPLE"), Error::AggregateOnWildcard { .. }));
}

#[test]
fn test_unknown_qualifier_on_plan_columns() {
    assert!(matches!(
        query_err("SELECT * FROM CUSTOMERS c JOIN ORDERS o ON zz.customer_id = o.customer_id"),
        Error::JoinColumnNotFound { side: "left", .. }
    ));
    assert!(matches!(
        query_err("SELECT COUNT(*) FROM CUSTOMERS c GROUP BY zz.name"),
        Error::ColumnResolution { .. }
    ));
    assert!(matches!(
        query_err("SELECT SUM(zz.amount) FROM ORDERS o"),
        Error::ColumnResolution { .. }
    ));

    let result = query("SELECT c.name, COUNT(*) FROM CUSTOMERS c GROUP BY CUSTOMERS.name");
    assert_eq!(result.row_count(), query("SELECT name FROM CUSTOMERS").row_count());
}

#[test]
fn test_concurrent_queries() {
    let provider = provider();
    let engine = QueryEngine::new(&provider);
    let sqls = [
        "SELECT * FROM PEOPLE",
        "SELECT name, COUNT(*) FROM EMP GROUP BY name",
        "SELECT * FROM CUSTOMERS LEFT JOIN ORDERS ON CUSTOMERS.customer_id = ORDERS.customer_id",
    ];
    let expected: Vec<usize> = vec![3, 3, 4];

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = &engine;
                let sql = sqls[i % sqls.len()];
                s.spawn(move || (i, engine.execute_query(sql).map(|r| r.row_count())))
            })
            .collect();
        for handle in handles {
            let (i, rows) = handle.join().unwrap();
            assert_eq!(rows.unwrap(), expected[i % sqls.len()]);
        }
    });
}
