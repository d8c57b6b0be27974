//! Secondary indexes derived from a closed group store.
//!
//! An index entry's hkey leads with an (index type, indexed values) segment
//! and carries the source row's full hkey behind it, so the index map orders
//! by indexed values first and the source position is recoverable by
//! stripping the leading segment.

use std::sync::Arc;

use arbor_core::prelude::{HKey, HKeySegment, Result, Row, RowType, SchemaRegistry, Value};

use crate::map::Map;

#[derive(Debug)]
pub struct Index {
    rowtype: Arc<RowType>,
    source_type: Arc<RowType>,
    map: Map,
}

impl Index {
    /// Project `fields` out of every `source`-type row of `base` and sort.
    /// Registers the index row type under `name`.
    pub fn build(
        registry: &mut SchemaRegistry,
        name: &str,
        base: &Map,
        source: &Arc<RowType>,
        fields: &[&str],
    ) -> Result<Index> {
        let rowtype = registry.define_index(name, source, fields)?;
        let mut map = Map::new();
        for row in base.rows() {
            if row.rowtype().id() != source.id() {
                continue;
            }
            let values: Vec<Value> = rowtype
                .value_fields()
                .iter()
                .filter_map(|f| row.get(f).cloned())
                .collect();
            let mut hkey = HKey::new(vec![HKeySegment::new(rowtype.id(), values.clone())]);
            for segment in row.hkey().segments() {
                hkey = hkey.extended(segment.clone());
            }
            map.insert(Row::with_hkey(&rowtype, values, hkey));
        }
        map.close();
        Ok(Index {
            rowtype,
            source_type: Arc::clone(source),
            map,
        })
    }

    pub fn rowtype(&self) -> &Arc<RowType> {
        &self.rowtype
    }

    pub fn source_type(&self) -> &Arc<RowType> {
        &self.source_type
    }

    /// The index entries, queryable as any other map.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Bound key for cursoring the index by indexed values; `values` may be
    /// a leading subset of the indexed fields.
    pub fn value_prefix(&self, values: &[Value]) -> HKey {
        HKey::new(vec![HKeySegment::new(self.rowtype.id(), values.to_vec())])
    }

    /// Recover the source row's hkey from an index entry.
    pub fn source_hkey(entry: &Row) -> HKey {
        entry.hkey().strip_first()
    }
}
