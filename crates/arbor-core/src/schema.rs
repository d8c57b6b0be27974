//! Row type declarations and the schema registry.
//!
//! A `RowType` names a row shape (ordered value fields, key fields) and its
//! position in the group hierarchy via an ancestor path. Types are created
//! only through a `SchemaRegistry`, which assigns the `TypeId` used as the
//! hkey type marker and validates declarations at setup time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::id::TypeId;

/// Declarative input to `SchemaRegistry::define`.
///
/// Exactly one of `parent` (direct-parent shorthand) or `path` (explicit
/// ancestor names, root first, self excluded) may be supplied; a root type
/// supplies neither.
#[derive(Debug, Clone, Default)]
pub struct RowTypeDef {
    pub name: String,
    pub value_fields: Vec<String>,
    pub key_fields: Vec<String>,
    pub parent: Option<String>,
    pub path: Option<Vec<String>>,
}

impl RowTypeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn value_fields(mut self, fields: &[&str]) -> Self {
        self.value_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn key_fields(mut self, fields: &[&str]) -> Self {
        self.key_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn parent(mut self, name: &str) -> Self {
        self.parent = Some(name.to_string());
        self
    }

    pub fn path(mut self, names: &[&str]) -> Self {
        self.path = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }
}

/// A registered row type. Identity is the registry-assigned `TypeId`.
#[derive(Debug)]
pub struct RowType {
    id: TypeId,
    name: String,
    value_fields: Vec<String>,
    key_fields: Vec<String>,
    /// Proper ancestors, root first. Empty for root and derived types.
    ancestors: Vec<Arc<RowType>>,
    /// Ancestor path ids, root first, self included.
    path: Vec<TypeId>,
}

impl RowType {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_fields(&self) -> &[String] {
        &self.value_fields
    }

    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    pub fn ancestors(&self) -> &[Arc<RowType>] {
        &self.ancestors
    }

    pub fn path(&self) -> &[TypeId] {
        &self.path
    }

    /// Nesting depth: number of path entries, self included.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Positional index of a named value field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.value_fields.iter().position(|f| f == name)
    }

    /// Type-level ancestry: true iff `self.path` is a prefix of
    /// `other.path`. Inclusive: every type is an ancestor of itself.
    pub fn ancestor_of(&self, other: &RowType) -> bool {
        other.path.starts_with(&self.path)
    }

    /// Proper (strict) type-level ancestry.
    pub fn proper_ancestor_of(&self, other: &RowType) -> bool {
        self.id != other.id && self.ancestor_of(other)
    }
}

impl PartialEq for RowType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RowType {}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Owns every `RowType` of one schema and assigns type ids in registration
/// order (which is therefore the sibling-subtree order inside a group).
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    types: Vec<Arc<RowType>>,
    by_name: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group row type from its declaration.
    pub fn define(&mut self, def: RowTypeDef) -> Result<Arc<RowType>> {
        if def.parent.is_some() && def.path.is_some() {
            return Err(Error::Schema(format!(
                "type '{}' declares both parent and path",
                def.name
            )));
        }
        for key in &def.key_fields {
            if !def.value_fields.contains(key) {
                return Err(Error::Schema(format!(
                    "type '{}': key field '{}' is not a value field",
                    def.name, key
                )));
            }
        }

        let parent = self.resolve_parent(&def)?;
        let ancestors = match parent {
            Some(p) => {
                let mut chain = p.ancestors.clone();
                chain.push(Arc::clone(p));
                chain
            }
            None => Vec::new(),
        };
        self.register(def.name, def.value_fields, def.key_fields, ancestors)
    }

    /// Register the derived output type of a Flatten: the child's fields
    /// followed by parent fields absent from the child. Derived types sit
    /// outside the group hierarchy (single-entry path, no key fields).
    pub fn define_flattened(
        &mut self,
        name: impl Into<String>,
        parent: &Arc<RowType>,
        child: &Arc<RowType>,
    ) -> Result<Arc<RowType>> {
        let mut fields = child.value_fields.clone();
        for f in &parent.value_fields {
            if !fields.contains(f) {
                fields.push(f.clone());
            }
        }
        self.register(name.into(), fields, Vec::new(), Vec::new())
    }

    /// Register the row type of a secondary index on `source`: the indexed
    /// fields are both the value fields and the key fields.
    pub fn define_index(
        &mut self,
        name: impl Into<String>,
        source: &Arc<RowType>,
        fields: &[&str],
    ) -> Result<Arc<RowType>> {
        let name = name.into();
        let mut value_fields = Vec::with_capacity(fields.len());
        for f in fields {
            if source.field_index(f).is_none() {
                return Err(Error::Schema(format!(
                    "index '{}': field '{}' not in type '{}'",
                    name, f, source.name
                )));
            }
            value_fields.push(f.to_string());
        }
        let key_fields = value_fields.clone();
        self.register(name, value_fields, key_fields, Vec::new())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RowType>> {
        self.by_name.get(name).map(|&i| &self.types[i])
    }

    pub fn types(&self) -> &[Arc<RowType>] {
        &self.types
    }

    fn register(
        &mut self,
        name: String,
        value_fields: Vec<String>,
        key_fields: Vec<String>,
        ancestors: Vec<Arc<RowType>>,
    ) -> Result<Arc<RowType>> {
        if self.by_name.contains_key(&name) {
            return Err(Error::Schema(format!("duplicate type name '{}'", name)));
        }
        let id = TypeId::new(self.types.len() as u64);
        let mut path: Vec<TypeId> = ancestors.iter().map(|a| a.id).collect();
        path.push(id);
        let rowtype = Arc::new(RowType {
            id,
            name: name.clone(),
            value_fields,
            key_fields,
            ancestors,
            path,
        });
        self.by_name.insert(name, self.types.len());
        self.types.push(Arc::clone(&rowtype));
        Ok(rowtype)
    }

    fn resolve_parent(&self, def: &RowTypeDef) -> Result<Option<&Arc<RowType>>> {
        if let Some(parent_name) = &def.parent {
            let parent = self.get(parent_name).ok_or_else(|| {
                Error::Schema(format!(
                    "type '{}': unknown parent '{}'",
                    def.name, parent_name
                ))
            })?;
            return Ok(Some(parent));
        }
        if let Some(path) = &def.path {
            let parent_name = path.last().ok_or_else(|| {
                Error::Schema(format!("type '{}': empty ancestor path", def.name))
            })?;
            let parent = self.get(parent_name).ok_or_else(|| {
                Error::Schema(format!(
                    "type '{}': unknown path entry '{}'",
                    def.name, parent_name
                ))
            })?;
            // The declared path must spell out the parent's actual chain.
            let chain: Vec<&str> = parent
                .ancestors
                .iter()
                .map(|a| a.name.as_str())
                .chain(std::iter::once(parent.name.as_str()))
                .collect();
            if chain.len() != path.len() || chain.iter().zip(path).any(|(a, b)| *a != b.as_str()) {
                return Err(Error::Schema(format!(
                    "type '{}': path {:?} does not match registered ancestry {:?}",
                    def.name, path, chain
                )));
            }
            return Ok(Some(parent));
        }
        Ok(None)
    }
}
