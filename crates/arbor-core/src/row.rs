//! Rows: an immutable binding of a row type to field values plus the hkey
//! used for ordering and ancestry tests.
//!
//! Rows are cheap-clone handles; operators pass them by value without
//! copying field data.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::hkey::{HKey, HKeySegment};
use crate::schema::RowType;
use crate::value::Value;

#[derive(Clone)]
pub struct Row {
    inner: Arc<RowInner>,
}

#[derive(Debug)]
struct RowInner {
    rowtype: Arc<RowType>,
    values: Vec<Value>,
    hkey: HKey,
}

impl Row {
    /// Build a row whose hkey is fully derivable from its own fields: every
    /// ancestor type's key fields must be present among this row's fields
    /// (e.g. an order row carrying its customer's `cid`).
    pub fn new(rowtype: &Arc<RowType>, values: Vec<Value>) -> Result<Row> {
        check_arity(rowtype, &values)?;
        let mut hkey = HKey::default();
        for ancestor in rowtype.ancestors() {
            hkey = hkey.extended(key_segment(ancestor, rowtype, &values)?);
        }
        let hkey = hkey.extended(key_segment(rowtype, rowtype, &values)?);
        Ok(Row {
            inner: Arc::new(RowInner {
                rowtype: Arc::clone(rowtype),
                values,
                hkey,
            }),
        })
    }

    /// Build a row beneath `parent`: the hkey is the parent's extended by
    /// this row's own key segment. The parent must be of this type's direct
    /// parent type.
    pub fn child_of(parent: &Row, rowtype: &Arc<RowType>, values: Vec<Value>) -> Result<Row> {
        check_arity(rowtype, &values)?;
        match rowtype.ancestors().last() {
            Some(direct) if direct.id() == parent.rowtype().id() => {}
            _ => {
                return Err(Error::Schema(format!(
                    "'{}' is not a child type of '{}'",
                    rowtype.name(),
                    parent.rowtype().name()
                )))
            }
        }
        let segment = key_segment(rowtype, rowtype, &values)?;
        Ok(Row {
            inner: Arc::new(RowInner {
                rowtype: Arc::clone(rowtype),
                values,
                hkey: parent.hkey().extended(segment),
            }),
        })
    }

    /// Build a derived row (index entry, projection, flattened row) with an
    /// explicit hkey. Arity mismatches here are internal defects.
    pub fn with_hkey(rowtype: &Arc<RowType>, values: Vec<Value>, hkey: HKey) -> Row {
        assert_eq!(
            values.len(),
            rowtype.value_fields().len(),
            "row arity does not match type '{}'",
            rowtype.name()
        );
        Row {
            inner: Arc::new(RowInner {
                rowtype: Arc::clone(rowtype),
                values,
                hkey,
            }),
        }
    }

    pub fn rowtype(&self) -> &Arc<RowType> {
        &self.inner.rowtype
    }

    pub fn hkey(&self) -> &HKey {
        &self.inner.hkey
    }

    pub fn values(&self) -> &[Value] {
        &self.inner.values
    }

    /// Field value by name, positional in the type's declared field list.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.inner
            .rowtype
            .field_index(field)
            .map(|i| &self.inner.values[i])
    }

    /// Projection onto the type's key fields.
    pub fn key(&self) -> Vec<Value> {
        self.inner
            .rowtype
            .key_fields()
            .iter()
            .filter_map(|f| self.get(f).cloned())
            .collect()
    }

    /// Row-level ancestry is STRICT: true iff this row's hkey is a proper
    /// prefix of `other`'s. A row is not its own ancestor.
    pub fn ancestor_of(&self, other: &Row) -> bool {
        self.inner.hkey.is_strict_prefix_of(&other.inner.hkey)
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Row({} {:?} @{})",
            self.inner.rowtype.name(),
            self.inner.values,
            self.inner.hkey
        )
    }
}

fn check_arity(rowtype: &RowType, values: &[Value]) -> Result<()> {
    if values.len() != rowtype.value_fields().len() {
        return Err(Error::Field(format!(
            "type '{}' declares {} fields, got {} values",
            rowtype.name(),
            rowtype.value_fields().len(),
            values.len()
        )));
    }
    Ok(())
}

/// Key segment for `level`, projecting its key fields out of a row of
/// `rowtype` with the given values.
fn key_segment(level: &RowType, rowtype: &RowType, values: &[Value]) -> Result<HKeySegment> {
    let mut key = Vec::with_capacity(level.key_fields().len());
    for field in level.key_fields() {
        let idx = rowtype.field_index(field).ok_or_else(|| {
            Error::Key(format!(
                "type '{}' does not carry key field '{}' of ancestor '{}'",
                rowtype.name(),
                field,
                level.name()
            ))
        })?;
        key.push(values[idx].clone());
    }
    Ok(HKeySegment::new(level.id(), key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RowTypeDef, SchemaRegistry};

    fn schema() -> (SchemaRegistry, Arc<RowType>, Arc<RowType>, Arc<RowType>) {
        let mut reg = SchemaRegistry::new();
        let c = reg
            .define(
                RowTypeDef::new("customer")
                    .value_fields(&["cid", "name"])
                    .key_fields(&["cid"]),
            )
            .unwrap();
        let o = reg
            .define(
                RowTypeDef::new("order")
                    .value_fields(&["oid", "cid"])
                    .key_fields(&["oid"])
                    .parent("customer"),
            )
            .unwrap();
        let i = reg
            .define(
                RowTypeDef::new("item")
                    .value_fields(&["iid", "sku"])
                    .key_fields(&["iid"])
                    .parent("order"),
            )
            .unwrap();
        (reg, c, o, i)
    }

    #[test]
    fn test_hkey_derived_from_own_fields() {
        let (_reg, c, o, _i) = schema();
        let cust = Row::new(&c, vec![Value::I64(1), Value::Str("ada".into())]).unwrap();
        let ord = Row::new(&o, vec![Value::I64(10), Value::I64(1)]).unwrap();
        assert_eq!(cust.hkey().len(), 1);
        assert_eq!(ord.hkey().len(), 2);
        assert!(cust.ancestor_of(&ord));
    }

    #[test]
    fn test_child_of_extends_parent_hkey() {
        let (_reg, c, o, i) = schema();
        let cust = Row::new(&c, vec![Value::I64(1), Value::Str("ada".into())]).unwrap();
        let ord = Row::child_of(&cust, &o, vec![Value::I64(10), Value::I64(1)]).unwrap();
        let item = Row::child_of(&ord, &i, vec![Value::I64(100), Value::Str("sku-a".into())])
            .unwrap();
        assert!(cust.ancestor_of(&item));
        assert!(ord.ancestor_of(&item));
        assert!(!item.ancestor_of(&item));
    }

    #[test]
    fn test_child_of_rejects_wrong_parent_type() {
        let (_reg, c, _o, i) = schema();
        let cust = Row::new(&c, vec![Value::I64(1), Value::Str("ada".into())]).unwrap();
        assert!(Row::child_of(&cust, &i, vec![Value::I64(1), Value::Null]).is_err());
    }

    #[test]
    fn test_arity_checked_at_construction() {
        let (_reg, c, _o, _i) = schema();
        assert!(Row::new(&c, vec![Value::I64(1)]).is_err());
    }

    #[test]
    fn test_ancestry_is_a_strict_partial_order() {
        let (_reg, c, o, i) = schema();
        let a = Row::new(&c, vec![Value::I64(1), Value::Str("ada".into())]).unwrap();
        let b = Row::child_of(&a, &o, vec![Value::I64(10), Value::I64(1)]).unwrap();
        let d = Row::child_of(&b, &i, vec![Value::I64(100), Value::Str("s".into())]).unwrap();
        // irreflexive
        assert!(!a.ancestor_of(&a));
        // transitive
        assert!(a.ancestor_of(&b) && b.ancestor_of(&d) && a.ancestor_of(&d));
        // asymmetric
        assert!(!b.ancestor_of(&a));
    }
}
