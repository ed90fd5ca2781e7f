//! VLAN segmentation ids

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A VLAN segmentation id.
///
/// `0` is the "unset" sentinel: it is what gets stored when no id was given
/// and it renders as an empty string externally. On input both JSON numbers
/// and numeric strings are accepted (`111` and `"111"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentationId(u32);

impl SegmentationId {
    /// The "unset" sentinel
    pub const UNSET: SegmentationId = SegmentationId(0);

    /// Highest id accepted on a gateway interface
    pub const MAX: u32 = 4095;

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// True unless this is the sentinel
    pub const fn is_set(self) -> bool {
        self.0 != 0
    }

    /// True when the id fits the VLAN range
    pub const fn in_vlan_range(self) -> bool {
        self.0 <= Self::MAX
    }
}

impl From<u32> for SegmentationId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SegmentationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "{}", self.0)
        } else {
            Ok(())
        }
    }
}

impl Serialize for SegmentationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_set() {
            serializer.serialize_u32(self.0)
        } else {
            serializer.serialize_str("")
        }
    }
}

struct SegmentationIdVisitor;

impl<'de> Visitor<'de> for SegmentationIdVisitor {
    type Value = SegmentationId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a segmentation id as a non-negative integer or numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        u32::try_from(v)
            .map(SegmentationId)
            .map_err(|_| E::custom(format!("segmentation id {} out of range", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u32::try_from(v)
            .map(SegmentationId)
            .map_err(|_| E::custom(format!("segmentation id {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let v = v.trim();
        if v.is_empty() {
            return Ok(SegmentationId::UNSET);
        }
        v.parse::<u32>()
            .map(SegmentationId)
            .map_err(|_| E::custom(format!("invalid segmentation id '{}'", v)))
    }
}

impl<'de> Deserialize<'de> for SegmentationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SegmentationIdVisitor)
    }
}

/// Segmentation ids attached to one interface spec: a single id or a list.
///
/// A list expands into one interface row per id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegmentationIds {
    One(SegmentationId),
    Many(Vec<SegmentationId>),
}

impl SegmentationIds {
    pub fn as_slice(&self) -> &[SegmentationId] {
        match self {
            SegmentationIds::One(id) => std::slice::from_ref(id),
            SegmentationIds::Many(ids) => ids,
        }
    }
}

impl From<Vec<u32>> for SegmentationIds {
    fn from(ids: Vec<u32>) -> Self {
        SegmentationIds::Many(ids.into_iter().map(SegmentationId::new).collect())
    }
}
