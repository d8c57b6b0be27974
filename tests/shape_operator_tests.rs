//! Select / Cut / Extract / Project tests.


use arbor_core::prelude::{Row, RowTypeDef, Value};
use arbor_exec::execute;
use arbor_operators::{Cut, Extract, Project, Scan, Select};
use arbor_store::Map;
use fixtures::{group_fixture, i64_field, type_names};

#[test]
fn test_select_accepts_whole_subtree_of_matching_customer() {
    let fx = group_fixture();
    let scan = Scan::new(&fx.store);
    let mut select = Select::new(Box::new(scan), &fx.customer, |r| {
        r.get("cid") == Some(&Value::I64(1))
    });
    let out = execute(&mut select).unwrap().rows;
    assert_eq!(type_names(&out), vec!["customer", "order", "item", "item"]);
    assert!(out.iter().all(|r| {
        let cid = r.hkey().segments()[0].key()[0].clone();
        cid == Value::I64(1)
    }));
}

#[test]
fn test_select_on_order_passes_customers_through() {
    let fx = group_fixture();
    let scan = Scan::new(&fx.store);
    let mut select = Select::new(Box::new(scan), &fx.order, |r| {
        r.get("oid") == Some(&Value::I64(32))
    });
    let out = execute(&mut select).unwrap().rows;
    // ancestors of the selected type always pass; only o32's subtree survives
    assert_eq!(
        type_names(&out),
        vec!["customer", "customer", "customer", "order", "item"]
    );
    assert_eq!(i64_field(&out[3], "oid"), Some(32));
    assert_eq!(i64_field(&out[4], "iid"), Some(321));
}

#[test]
fn test_select_drops_orphan_descendants() {
    let fx = group_fixture();

    // an item whose order row is absent: its remembered ancestor can't match
    let c1 = Row::new(&fx.customer, vec![Value::I64(1), "acacia".into()]).unwrap();
    let o11 = Row::new(
        &fx.order,
        vec![Value::I64(11), Value::I64(1), "2024-01-05".into()],
    )
    .unwrap();
    let i111 = Row::child_of(&o11, &fx.item, vec![Value::I64(111), Value::I64(11), "oak".into()])
        .unwrap();
    let ghost_order = Row::new(
        &fx.order,
        vec![Value::I64(13), Value::I64(1), "2024-05-05".into()],
    )
    .unwrap();
    let orphan = Row::child_of(
        &ghost_order,
        &fx.item,
        vec![Value::I64(131), Value::I64(13), "elm".into()],
    )
    .unwrap();

    let mut mini = Map::new();
    for r in [&c1, &o11, &i111, &orphan] {
        mini.insert(r.clone());
    }
    mini.close();

    let scan = Scan::new(&mini);
    let mut select = Select::new(Box::new(scan), &fx.order, |r| {
        r.get("oid") == Some(&Value::I64(11))
    });
    let out = execute(&mut select).unwrap().rows;
    assert_eq!(type_names(&out), vec!["customer", "order", "item"]);
    assert_eq!(i64_field(&out[2], "iid"), Some(111));
}

#[test]
fn test_cut_and_extract_partition_the_stream() {
    let fx = group_fixture();
    for rowtype in [&fx.customer, &fx.order, &fx.item] {
        let mut cut = Cut::new(Box::new(Scan::new(&fx.store)), rowtype);
        let mut extract = Extract::new(Box::new(Scan::new(&fx.store)), rowtype);
        let kept = execute(&mut cut).unwrap().rows;
        let taken = execute(&mut extract).unwrap().rows;

        assert_eq!(kept.len() + taken.len(), fx.store.len());
        // order-preserving partition: merging back by hkey restores the input
        let mut merged: Vec<String> = kept
            .iter()
            .chain(taken.iter())
            .map(|r| format!("{}", r.hkey()))
            .collect();
        merged.sort();
        let mut input: Vec<String> = fx
            .store
            .rows()
            .iter()
            .map(|r| format!("{}", r.hkey()))
            .collect();
        input.sort();
        assert_eq!(merged, input);
        // no row appears on both sides
        assert!(taken
            .iter()
            .all(|r| rowtype.ancestor_of(r.rowtype())));
        assert!(kept
            .iter()
            .all(|r| !rowtype.ancestor_of(r.rowtype())));
    }
}

#[test]
fn test_cut_order_drops_items_too() {
    let fx = group_fixture();
    let mut cut = Cut::new(Box::new(Scan::new(&fx.store)), &fx.order);
    let out = execute(&mut cut).unwrap().rows;
    assert_eq!(type_names(&out), vec!["customer", "customer", "customer"]);
}

#[test]
fn test_project_reshapes_only_matching_rows() {
    let mut fx = group_fixture();
    let names_only = fx
        .registry
        .define(RowTypeDef::new("customer_name").value_fields(&["name"]))
        .unwrap();

    let scan = Scan::new(&fx.store);
    let mut project = Project::new(Box::new(scan), &fx.customer, &names_only).unwrap();
    let out = execute(&mut project).unwrap().rows;

    assert_eq!(out.len(), fx.store.len());
    let reshaped: Vec<&Row> = out
        .iter()
        .filter(|r| r.rowtype().id() == names_only.id())
        .collect();
    assert_eq!(reshaped.len(), 3);
    for row in &reshaped {
        assert_eq!(row.values().len(), 1);
    }
    // non-customer rows pass through untouched
    assert!(out.iter().any(|r| r.rowtype().name() == "item"));
}

#[test]
fn test_project_rejects_unknown_field_at_construction() {
    let mut fx = group_fixture();
    let bad = fx
        .registry
        .define(RowTypeDef::new("bad_projection").value_fields(&["name", "placed"]))
        .unwrap();
    let scan = Scan::new(&fx.store);
    assert!(Project::new(Box::new(scan), &fx.customer, &bad).is_err());
}
