//! Hierarchical keys.
//!
//! An hkey is a sequence of (type marker, key tuple) segments, one per
//! ancestor level; prefix containment encodes ancestry. The total order is
//! lexicographic over segments with a strict prefix sorting first, so a
//! group's rows sort parent-before-descendants and subtrees are contiguous.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::id::TypeId;
use crate::value::{value_cmp, value_tuple_cmp, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HKeySegment {
    type_id: TypeId,
    key: Vec<Value>,
}

impl HKeySegment {
    pub fn new(type_id: TypeId, key: Vec<Value>) -> Self {
        Self { type_id, key }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn key(&self) -> &[Value] {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HKey {
    segments: Vec<HKeySegment>,
}

impl HKey {
    pub fn new(segments: Vec<HKeySegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[HKeySegment] {
        &self.segments
    }

    /// Number of segments, i.e. the nesting depth this key addresses.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first `depth` segments as a new key.
    pub fn prefix(&self, depth: usize) -> HKey {
        HKey {
            segments: self.segments[..depth].to_vec(),
        }
    }

    /// This key with its leading segment removed.
    pub fn strip_first(&self) -> HKey {
        HKey {
            segments: self.segments[1..].to_vec(),
        }
    }

    /// This key extended by one segment.
    pub fn extended(&self, segment: HKeySegment) -> HKey {
        let mut segments = self.segments.clone();
        segments.push(segment);
        HKey { segments }
    }

    /// True iff `self` is a (reflexive) prefix of `other`: a key is a
    /// prefix of itself. The final segment of `self` may be partial (fewer
    /// key values than `other`'s segment).
    pub fn is_prefix_of(&self, other: &HKey) -> bool {
        prefix_cmp(self, other) == Ordering::Equal
    }

    /// Strict prefix: `self` addresses a proper ancestor position of `other`.
    pub fn is_strict_prefix_of(&self, other: &HKey) -> bool {
        self.len() < other.len() && self.is_prefix_of(other)
    }
}

impl fmt::Display for HKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.segments {
            write!(f, "({}", seg.type_id.get())?;
            for v in &seg.key {
                write!(f, ",{:?}", v)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Total order over hkeys: segmentwise (type marker, then key tuple), with a
/// strict prefix sorting before its extensions.
pub fn hkey_cmp(a: &HKey, b: &HKey) -> Ordering {
    for (x, y) in a.segments.iter().zip(b.segments.iter()) {
        match x.type_id.cmp(&y.type_id) {
            Ordering::Equal => {}
            other => return other,
        }
        match value_tuple_cmp(&x.key, &y.key) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.segments.len().cmp(&b.segments.len())
}

/// Position of `key` relative to the contiguous region of keys carrying
/// `prefix`: `Less` sorts before the region, `Equal` is inside it (i.e. has
/// the prefix), `Greater` sorts after. The final prefix segment may be
/// partial, matching on its leading key values only.
pub fn prefix_cmp(prefix: &HKey, key: &HKey) -> Ordering {
    for (i, pseg) in prefix.segments.iter().enumerate() {
        let Some(kseg) = key.segments.get(i) else {
            // key is a strict prefix of `prefix`, so it sorts before the region
            return Ordering::Less;
        };
        match kseg.type_id.cmp(&pseg.type_id) {
            Ordering::Equal => {}
            other => return other,
        }
        if i + 1 == prefix.segments.len() {
            for (pv, kv) in pseg.key.iter().zip(kseg.key.iter()) {
                match value_cmp(kv, pv) {
                    Ordering::Equal => {}
                    other => return other,
                }
            }
            if kseg.key.len() < pseg.key.len() {
                return Ordering::Less;
            }
        } else {
            match value_tuple_cmp(&kseg.key, &pseg.key) {
                Ordering::Equal => {}
                other => return other,
            }
        }
    }
    Ordering::Equal
}
