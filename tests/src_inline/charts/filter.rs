use serde_json::json;

use super::*;

fn global() -> Dataset {
    Dataset::from_columns(
        "test",
        vec![
            (
                "GeneA".into(),
                Column::Numeric(vec![0.0, 1.0, 2.0, 3.0, 4.0, f64::NAN]),
            ),
            (
                "condition".into(),
                Column::Categorical(
                    ["healthy", "mild", "severe", "mild", "healthy", "mild"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            ),
            (
                "time".into(),
                Column::Categorical(
                    ["day1", "day1", "day3", "day7", "day7", "day3"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            ),
        ],
    )
    .unwrap()
}

#[test]
fn test_numeric_range_is_inclusive() {
    let table = global();
    let sel = Selection::new().with_range("GeneA", 1.0, 3.0);
    let mask = Predicate::build(&sel, &table).unwrap().mask(&table).unwrap();
    assert_eq!(mask, vec![false, true, true, true, false, false]);
}

#[test]
fn test_reversed_bounds_normalised() {
    let table = global();
    let sel = Selection::new().with_range("GeneA", 3.0, 1.0);
    let pred = Predicate::build(&sel, &table).unwrap();
    assert_eq!(
        pred.clauses(),
        &[Clause::Range {
            column: "GeneA".into(),
            lo: 1.0,
            hi: 3.0
        }]
    );
}

#[test]
fn test_members_and_range_combine() {
    let table = global();
    let sel = Selection::new()
        .with_range("GeneA", 0.0, 10.0)
        .with_members("condition", ["mild", "severe"]);
    let filtered = Predicate::build(&sel, &table).unwrap().apply(&table).unwrap();
    assert_eq!(filtered.n_rows(), 3);
    for c in filtered.categorical("condition").unwrap() {
        assert!(c == "mild" || c == "severe");
    }
    for &v in filtered.numeric("GeneA").unwrap() {
        assert!((0.0..=10.0).contains(&v));
    }
}

#[test]
fn test_dispatch_follows_column_type() {
    // Numbers in a categorical column are matched as members, not a range.
    let table = Dataset::from_columns(
        "t",
        vec![(
            "batch".into(),
            Column::Categorical(vec!["1".into(), "2".into(), "x".into()]),
        )],
    )
    .unwrap();
    let mut sel = Selection::new();
    sel.insert("batch", vec![json!(1), json!(2)]);
    let pred = Predicate::build(&sel, &table).unwrap();
    assert!(matches!(pred.clauses()[0], Clause::Members { .. }));
    assert_eq!(pred.mask(&table).unwrap(), vec![true, true, false]);
}

#[test]
fn test_integral_float_members_match_text_cells() {
    let table = Dataset::from_columns(
        "t",
        vec![(
            "batch".into(),
            Column::Categorical(vec!["1".into(), "2".into(), "2.5".into()]),
        )],
    )
    .unwrap();
    let mut sel = Selection::new();
    sel.insert("batch", vec![json!(1.0), json!(2.5)]);
    let mask = Predicate::build(&sel, &table).unwrap().mask(&table).unwrap();
    assert_eq!(mask, vec![true, false, true]);
}

#[test]
fn test_unknown_column_is_error() {
    let table = global();
    let sel = Selection::new().with_range("GeneZ", 0.0, 1.0);
    assert!(matches!(
        Predicate::build(&sel, &table),
        Err(ChartError::UnknownColumn { .. })
    ));
}

#[test]
fn test_range_on_numeric_needs_two_numbers() {
    let table = global();
    let sel = Selection::new().with_members("GeneA", ["low", "high"]);
    assert!(matches!(
        Predicate::build(&sel, &table),
        Err(ChartError::InvalidConstraint { .. })
    ));
    let mut sel = Selection::new();
    sel.insert("GeneA", vec![json!(1.0)]);
    assert!(matches!(
        Predicate::build(&sel, &table),
        Err(ChartError::InvalidConstraint { .. })
    ));
}
