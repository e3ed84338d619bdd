use keyed_frame::{
    JoinKind, JoinOptions, KeyedFrame, KeyedFrameError, KeyedJoin, RowSelector, Selection,
    StrictEq,
};
use polars::prelude::*;
use std::collections::HashSet;

fn trades() -> DataFrame {
    df![
        "desk" => ["fx", "rates", "fx", "rates", "fx"],
        "book" => [2, 1, 1, 1, 2],
        "qty" => [100, 200, 300, 400, 500]
    ]
    .unwrap()
}

fn qty(kf: &KeyedFrame) -> Vec<i32> {
    kf.column("qty")
        .unwrap()
        .i32()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_construction_validates_and_dedups() {
    let kf = KeyedFrame::new(trades(), ["desk", "book", "desk"]).unwrap();
    assert_eq!(kf.key(), names(&["desk", "book"]).as_slice());

    let single = KeyedFrame::new(trades(), "book").unwrap();
    assert_eq!(single.key(), names(&["book"]).as_slice());

    match KeyedFrame::new(trades(), ["desk", "trader"]) {
        Err(KeyedFrameError::Validation(missing)) => assert_eq!(missing, "trader"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_rekey_is_validated() {
    let kf = KeyedFrame::new(trades(), "desk").unwrap();
    assert!(kf.rekey("nope").unwrap_err().is_validation());
    let rekeyed = kf.rekey(["book", "desk"]).unwrap();
    assert_eq!(rekeyed.key(), names(&["book", "desk"]).as_slice());
    assert_eq!(kf.key(), names(&["desk"]).as_slice());
}

#[test]
fn test_equality_ignores_key_order_but_strict_does_not() {
    let a = KeyedFrame::new(trades(), ["desk", "book"]).unwrap();
    let b = KeyedFrame::new(trades(), ["book", "desk"]).unwrap();
    let c = KeyedFrame::new(trades(), ["desk"]).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(!a.strict_eq(&b));
    assert!(a.strict_eq(&a.deep_copy()));
    assert!(!a.strict_eq(a.table()));

    let copy = a.clone();
    let mut set = HashSet::new();
    set.insert(a.strict());
    set.insert(b.strict());
    set.insert(copy.strict());
    assert_eq!(set.len(), 2);
}

#[test]
fn test_copy_is_independent() {
    let original = KeyedFrame::new(trades(), "desk").unwrap();
    let mut copy = original.deep_copy();
    copy.delete_rows(&[0]).unwrap();
    assert_eq!(original.height(), 5);
    assert_eq!(copy.height(), 4);
}

#[test]
fn test_default_sort_matches_explicit_plain_sort() {
    let kf = KeyedFrame::new(trades(), ["desk", "book"]).unwrap();
    let sorted = kf.sort(SortMultipleOptions::default()).unwrap();

    let plain = trades()
        .lazy()
        .sort_by_exprs(
            vec![col("desk"), col("book")],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()
        .unwrap();
    assert!(sorted.table().equals_missing(&plain));
    assert_eq!(qty(&sorted), vec![300, 100, 500, 200, 400]);
}

#[test]
fn test_unique_judges_only_key_columns() {
    let kf = KeyedFrame::new(trades(), ["desk", "book"]).unwrap();
    let unique = kf.unique().unwrap();
    assert_eq!(qty(&unique), vec![100, 200, 300]);
    assert_eq!(unique.key(), kf.key());
}

#[test]
fn test_join_two_keyed_frames() {
    let left = KeyedFrame::new(
        df![
            "a" => [1, 2],
            "b" => [10, 20],
            "x" => ["l1", "l2"]
        ]
        .unwrap(),
        ["a", "b"],
    )
    .unwrap();
    let right = KeyedFrame::new(
        df![
            "b" => [10, 20],
            "c" => [5, 6],
            "y" => ["r1", "r2"]
        ]
        .unwrap(),
        ["b", "c"],
    )
    .unwrap();

    let joined = left.join_by_key(&right, JoinKind::Inner).unwrap();
    assert_eq!(joined.height(), 2);
    assert_eq!(joined.key(), names(&["a", "b", "c"]).as_slice());

    let outer = left.join_by_key(&right, JoinKind::Outer).unwrap();
    for name in outer.key() {
        assert!(outer.column_names().contains(name));
    }
}

#[test]
fn test_join_result_type_follows_left_operand() {
    let keyed = KeyedFrame::new(trades(), "desk").unwrap();
    let limits = df![
        "desk" => ["fx", "rates"],
        "limit" => [1000, 2000]
    ]
    .unwrap();

    let keyed_result: KeyedFrame = keyed.join_by_key(&limits, JoinKind::Left).unwrap();
    assert_eq!(keyed_result.key(), names(&["desk"]).as_slice());
    assert_eq!(keyed_result.height(), 5);

    let plain_result: DataFrame = limits.join_by_key(&keyed, JoinKind::Semi).unwrap();
    assert_eq!(plain_result.height(), 2);
    assert_eq!(plain_result.width(), 2);
}

#[test]
fn test_selection_shapes() {
    let kf = KeyedFrame::new(trades(), ["desk", "book"]).unwrap();

    let column = kf.get(Selection::Column("qty".into())).unwrap();
    assert!(column.into_column().is_some());

    let no_key = kf.select_columns(&["qty"]).unwrap();
    assert!(no_key.key().is_empty());

    let rows = kf
        .get(Selection::Rows(RowSelector::Indices(vec![4, 0])))
        .unwrap()
        .into_frame()
        .unwrap();
    assert_eq!(qty(&rows), vec![500, 100]);
    assert_eq!(rows.key(), kf.key());

    let cell = kf.get(Selection::Cell(1, "qty".into())).unwrap();
    assert_eq!(cell.into_value().unwrap(), AnyValue::Int32(200));
}

#[test]
fn test_row_and_column_mutations_keep_key() {
    let mut kf = KeyedFrame::new(trades(), ["book", "desk"]).unwrap();
    let key_before = kf.key().to_vec();

    assert_eq!(kf.head(2).key(), key_before.as_slice());
    assert_eq!(kf.tail(2).key(), key_before.as_slice());
    assert_eq!(qty(&kf.tail(2)), vec![400, 500]);

    let extra = df![
        "desk" => ["credit"],
        "book" => [9],
        "qty" => [900]
    ]
    .unwrap();
    kf.append(&extra).unwrap();
    assert_eq!(kf.height(), 6);

    kf.push_row(&[AnyValue::String("eq"), AnyValue::Int32(3), AnyValue::Int32(1000)])
        .unwrap()
        .insert_row(0, &[AnyValue::String("cmdty"), AnyValue::Int32(4), AnyValue::Int32(1)])
        .unwrap();
    assert_eq!(kf.height(), 8);
    assert_eq!(qty(&kf)[0], 1);
    assert_eq!(qty(&kf)[7], 1000);

    kf.delete_rows(&[0, 7]).unwrap();
    assert_eq!(kf.height(), 6);

    kf.permute_columns(&[2, 1, 0]).unwrap();
    assert_eq!(kf.column_names(), names(&["qty", "book", "desk"]));
    assert_eq!(kf.key(), key_before.as_slice());
}

#[test]
fn test_mutation_errors() {
    let mut kf = KeyedFrame::new(trades(), "desk").unwrap();
    assert!(matches!(
        kf.delete_rows(&[5]),
        Err(KeyedFrameError::RowOutOfBounds { index: 5, height: 5 })
    ));
    assert!(matches!(
        kf.permute_columns(&[0, 0, 1]),
        Err(KeyedFrameError::InvalidPermutation(_))
    ));
    assert!(kf.push_row(&[AnyValue::Int32(1)]).unwrap_err().is_delegated());

    let wrong = df!["other" => [1]].unwrap();
    assert!(kf.append(&wrong).unwrap_err().is_delegated());
    assert_eq!(kf.height(), 5);
}

#[test]
fn test_separately_built_strict_equal_frames_share_a_set_slot() {
    let a = KeyedFrame::new(
        df![
            "desk" => ["fx", "rates"],
            "px" => [0.0f64, 1.25]
        ]
        .unwrap(),
        ["desk", "px"],
    )
    .unwrap();
    let b = KeyedFrame::new(
        df![
            "desk" => ["fx", "rates"],
            "px" => [-0.0f64, 1.25]
        ]
        .unwrap(),
        ["desk", "px"],
    )
    .unwrap();
    assert!(a.strict_eq(&b));

    let mut set = HashSet::new();
    set.insert(a.strict());
    set.insert(b.strict());
    assert_eq!(set.len(), 1);
}

#[test]
fn test_right_join_with_clashing_columns_keeps_left_names() {
    let positions = KeyedFrame::new(
        df![
            "desk" => ["fx", "rates"],
            "qty" => [10, 20]
        ]
        .unwrap(),
        ["desk", "qty"],
    )
    .unwrap();
    let limits = df![
        "desk" => ["rates", "fx", "credit"],
        "qty" => [99, 98, 97]
    ]
    .unwrap();

    let joined = positions
        .join_with(&limits, JoinOptions::new(JoinKind::Right).on(["desk"]))
        .unwrap();
    assert_eq!(joined.column_names(), names(&["desk", "qty", "qty_right"]));
    assert_eq!(joined.height(), 3);
    let qty: Vec<Option<i32>> = joined.column("qty").unwrap().i32().unwrap().into_iter().collect();
    assert_eq!(qty, vec![Some(20), Some(10), None]);
    assert_eq!(joined.key(), names(&["desk", "qty"]).as_slice());
}

#[test]
fn test_duplicated_mirrors_unique_on_edge_values() {
    let df = df![
        "px" => [Some(0.0f64), None, Some(-0.0), None, Some(3.5)],
        "qty" => [1, 2, 3, 4, 5]
    ]
    .unwrap();
    let kf = KeyedFrame::new(df, "px").unwrap();
    let flags = kf.duplicated().unwrap();
    assert_eq!(flags, vec![false, false, true, true, false]);
    assert_eq!(
        flags.iter().filter(|d| !**d).count(),
        kf.unique().unwrap().height()
    );
}
