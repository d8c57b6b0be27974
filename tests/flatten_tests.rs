//! Flatten operator tests: pairing, join modes, echoes, and the
//! end-of-stream flush.


use arbor_core::prelude::{Row, Value};
use arbor_exec::execute;
use arbor_operators::{Flatten, FlattenFlags, Scan};
use arbor_store::Map;
use fixtures::{flatten_types, group_fixture, i64_field, is_null, str_field, type_names};

#[test]
fn test_inner_join_pairs_every_order() {
    let mut fx = group_fixture();
    let (co, _coi) = flatten_types(&mut fx);

    let scan = Scan::new(&fx.store);
    let mut flatten = Flatten::new(
        Box::new(scan),
        &fx.customer,
        &fx.order,
        &co,
        FlattenFlags::INNER_JOIN,
    );
    let out = execute(&mut flatten).unwrap().rows;

    let co_rows: Vec<&Row> = out.iter().filter(|r| r.rowtype().id() == co.id()).collect();
    assert_eq!(co_rows.len(), 3); // one per order, childless customer absent
    for row in &co_rows {
        assert!(!is_null(row, "oid"));
        assert!(!is_null(row, "name"));
    }
    // items pass through unchanged
    assert_eq!(out.iter().filter(|r| r.rowtype().name() == "item").count(), 3);
}

#[test]
fn test_left_join_emits_childless_customer() {
    let mut fx = group_fixture();
    let (co, _coi) = flatten_types(&mut fx);

    let scan = Scan::new(&fx.store);
    // default flags = LEFT
    let mut flatten = Flatten::new(
        Box::new(scan),
        &fx.customer,
        &fx.order,
        &co,
        FlattenFlags::default(),
    );
    let out = execute(&mut flatten).unwrap().rows;

    let left_rows: Vec<&Row> = out
        .iter()
        .filter(|r| r.rowtype().id() == co.id() && is_null(r, "oid"))
        .collect();
    assert_eq!(left_rows.len(), 1);
    assert_eq!(str_field(left_rows[0], "name").as_deref(), Some("birch"));
}

#[test]
fn test_final_parent_flushes_at_end_of_stream() {
    let mut fx = group_fixture();
    let (co, _coi) = flatten_types(&mut fx);

    // childless customer is the LAST row of the stream
    let c1 = Row::new(&fx.customer, vec![Value::I64(1), "acacia".into()]).unwrap();
    let o1 = Row::new(
        &fx.order,
        vec![Value::I64(11), Value::I64(1), "2024-01-05".into()],
    )
    .unwrap();
    let c2 = Row::new(&fx.customer, vec![Value::I64(2), "birch".into()]).unwrap();
    let mut mini = Map::new();
    for r in [&c1, &o1, &c2] {
        mini.insert(r.clone());
    }
    mini.close();

    let scan = Scan::new(&mini);
    let mut flatten = Flatten::new(
        Box::new(scan),
        &fx.customer,
        &fx.order,
        &co,
        FlattenFlags::default(),
    );
    let out = execute(&mut flatten).unwrap().rows;

    assert_eq!(out.len(), 2);
    assert_eq!(i64_field(&out[0], "oid"), Some(11));
    assert!(is_null(&out[1], "oid"));
    assert_eq!(str_field(&out[1], "name").as_deref(), Some("birch"));
}

#[test]
fn test_right_join_emits_orphan_child() {
    let mut fx = group_fixture();
    let (co, _coi) = flatten_types(&mut fx);

    // an order whose customer row is absent from the stream
    let c1 = Row::new(&fx.customer, vec![Value::I64(1), "acacia".into()]).unwrap();
    let o1 = Row::new(
        &fx.order,
        vec![Value::I64(11), Value::I64(1), "2024-01-05".into()],
    )
    .unwrap();
    let orphan = Row::new(
        &fx.order,
        vec![Value::I64(99), Value::I64(9), "2024-04-01".into()],
    )
    .unwrap();
    let mut mini = Map::new();
    for r in [&c1, &o1, &orphan] {
        mini.insert(r.clone());
    }
    mini.close();

    let scan = Scan::new(&mini);
    let mut flatten = Flatten::new(
        Box::new(scan),
        &fx.customer,
        &fx.order,
        &co,
        FlattenFlags::FULL_JOIN,
    );
    let out = execute(&mut flatten).unwrap().rows;

    assert_eq!(out.len(), 2);
    assert_eq!(i64_field(&out[0], "oid"), Some(11));
    // the orphan keeps its own fields but has a null customer side
    assert_eq!(i64_field(&out[1], "oid"), Some(99));
    assert!(is_null(&out[1], "name"));
}

#[test]
fn test_orphan_child_is_dropped_without_right_join() {
    let mut fx = group_fixture();
    let (co, _coi) = flatten_types(&mut fx);

    let orphan = Row::new(
        &fx.order,
        vec![Value::I64(99), Value::I64(9), "2024-04-01".into()],
    )
    .unwrap();
    let mut mini = Map::new();
    mini.insert(orphan);
    mini.close();

    let scan = Scan::new(&mini);
    let mut flatten = Flatten::new(
        Box::new(scan),
        &fx.customer,
        &fx.order,
        &co,
        FlattenFlags::default(),
    );
    let out = execute(&mut flatten).unwrap().rows;
    assert!(out.is_empty());
}

#[test]
fn test_keep_flags_echo_originals_before_joined_row() {
    let mut fx = group_fixture();
    let (co, _coi) = flatten_types(&mut fx);

    let c1 = Row::new(&fx.customer, vec![Value::I64(1), "acacia".into()]).unwrap();
    let o1 = Row::new(
        &fx.order,
        vec![Value::I64(11), Value::I64(1), "2024-01-05".into()],
    )
    .unwrap();
    let mut mini = Map::new();
    for r in [&c1, &o1] {
        mini.insert(r.clone());
    }
    mini.close();

    let scan = Scan::new(&mini);
    let flags = FlattenFlags::KEEP_PARENT | FlattenFlags::KEEP_CHILD;
    let mut flatten = Flatten::new(Box::new(scan), &fx.customer, &fx.order, &co, flags);
    let out = execute(&mut flatten).unwrap().rows;

    assert_eq!(type_names(&out), vec!["customer", "order", "co"]);
}

#[test]
fn test_flattened_row_count_is_bounded_by_input() {
    let mut fx = group_fixture();
    let (co, _coi) = flatten_types(&mut fx);

    let input_len = fx.store.len();
    let scan = Scan::new(&fx.store);
    let mut flatten = Flatten::new(
        Box::new(scan),
        &fx.customer,
        &fx.order,
        &co,
        FlattenFlags::FULL_JOIN,
    );
    let out = execute(&mut flatten).unwrap().rows;

    let flattened: Vec<&Row> = out.iter().filter(|r| r.rowtype().id() == co.id()).collect();
    assert!(flattened.len() <= input_len);
    for row in &flattened {
        assert_eq!(row.values().len(), co.value_fields().len());
    }
}

#[test]
fn test_nested_flatten_childless_order_end_to_end() {
    let mut fx = group_fixture();
    let (co, coi) = flatten_types(&mut fx);

    let scan = Scan::new(&fx.store);
    let first = Flatten::new(
        Box::new(scan),
        &fx.customer,
        &fx.order,
        &co,
        FlattenFlags::default(),
    );
    let mut second = Flatten::new(Box::new(first), &co, &fx.item, &coi, FlattenFlags::default());
    let out = execute(&mut second).unwrap().rows;

    // the stream collapses entirely into coi rows
    assert!(out.iter().all(|r| r.rowtype().id() == coi.id()));
    assert_eq!(out.len(), 5);

    // one inner row per (order, item) pair
    let pairs: Vec<(Option<i64>, Option<i64>)> = out
        .iter()
        .filter(|r| !is_null(r, "iid"))
        .map(|r| (i64_field(r, "oid"), i64_field(r, "iid")))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Some(11), Some(111)),
            (Some(11), Some(112)),
            (Some(32), Some(321)),
        ]
    );

    // exactly one left row for the childless order: order fields set, item null
    let childless_order: Vec<&Row> = out
        .iter()
        .filter(|r| i64_field(r, "oid") == Some(31))
        .collect();
    assert_eq!(childless_order.len(), 1);
    assert!(is_null(childless_order[0], "iid"));
    assert!(is_null(childless_order[0], "sku"));
    assert_eq!(
        str_field(childless_order[0], "placed").as_deref(),
        Some("2024-02-11")
    );

    // the childless customer cascades to a fully-null right side
    let childless_customer: Vec<&Row> = out
        .iter()
        .filter(|r| str_field(r, "name").as_deref() == Some("birch"))
        .collect();
    assert_eq!(childless_customer.len(), 1);
    assert!(is_null(childless_customer[0], "oid"));
    assert!(is_null(childless_customer[0], "iid"));
}

#[test]
fn test_stats_pass_through_flatten() {
    let mut fx = group_fixture();
    let (co, _coi) = flatten_types(&mut fx);

    let scan = Scan::new(&fx.store);
    let mut flatten = Flatten::new(
        Box::new(scan),
        &fx.customer,
        &fx.order,
        &co,
        FlattenFlags::default(),
    );
    let exec = execute(&mut flatten).unwrap();
    // flatten does no store access of its own
    assert_eq!(exec.stats.random_access, 1);
    assert_eq!(exec.stats.sequential_access, fx.store.len() as u64);
}
