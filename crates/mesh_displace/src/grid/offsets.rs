//! Per-node pixel offsets.
//!
//! [`OffsetMap`] is the only state the compiler needs from the editor. Keys are node
//! indices; absent keys mean "not displaced". Values are stored unclamped and must be
//! bounded with [`OffsetMap::clamp_to_scale`] before baking.
use std::collections::BTreeMap;

use glam::Vec2;
use mint::Vector2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Pixel-space displacement of a single node from its rest position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeOffset {
    pub x: f32,
    pub y: f32,
}

impl NodeOffset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl From<Vec2> for NodeOffset {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector2<f32>> for NodeOffset {
    fn from(v: Vector2<f32>) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<NodeOffset> for Vector2<f32> {
    fn from(o: NodeOffset) -> Self {
        Vector2 { x: o.x, y: o.y }
    }
}

/// Sparse mapping from node index to [`NodeOffset`].
///
/// Ordered by index so iteration, serialisation and [`OffsetMap::to_compact`] are stable.
/// With the `serde` feature the map serialises transparently; JSON carries the indices as
/// string keys.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OffsetMap {
    entries: BTreeMap<usize, NodeOffset>,
}

impl OffsetMap {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// A map with an explicit zero entry for each of `node_count` nodes.
    pub fn blank(node_count: usize) -> Self {
        Self {
            entries: (0..node_count).map(|i| (i, NodeOffset::ZERO)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    /// Offset stored for `index`, if any.
    pub fn get(&self, index: usize) -> Option<NodeOffset> {
        self.entries.get(&index).copied()
    }

    /// Offset for `index`, treating absent nodes as undisplaced.
    #[inline]
    pub fn get_or_zero(&self, index: usize) -> NodeOffset {
        self.get(index).unwrap_or(NodeOffset::ZERO)
    }

    pub fn insert(&mut self, index: usize, offset: impl Into<NodeOffset>) -> Option<NodeOffset> {
        self.entries.insert(index, offset.into())
    }

    /// Inserts using a textual node key, as stored by the editor.
    pub fn insert_keyed(
        &mut self,
        key: &str,
        offset: impl Into<NodeOffset>,
    ) -> Result<Option<NodeOffset>> {
        let index = parse_index(key)?;
        Ok(self.insert(index, offset))
    }

    pub fn remove(&mut self, index: usize) -> Option<NodeOffset> {
        self.entries.remove(&index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, NodeOffset)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    /// Builder-style insert.
    pub fn with(mut self, index: usize, offset: impl Into<NodeOffset>) -> Self {
        self.insert(index, offset);
        self
    }

    /// Drops entries whose index lies outside a grid of `node_count` nodes and returns how
    /// many were removed.
    pub fn retain_within(&mut self, node_count: usize) -> usize {
        let before = self.entries.len();
        self.entries.retain(|index, _| *index < node_count);
        let removed = before - self.entries.len();
        if removed > 0 {
            warn!(
                "Dropped {} offset(s) outside a grid of {} nodes.",
                removed, node_count
            );
        }
        removed
    }

    /// Clamps each axis into `[-scale * dim / 2, scale * dim / 2]`.
    ///
    /// NaN components are reset to zero; infinities clamp to the nearest bound.
    pub fn clamp_to_scale(&mut self, width: u32, height: u32, scale: Vec2) {
        let max_x = scale.x * width as f32 / 2.0;
        let max_y = scale.y * height as f32 / 2.0;
        for (index, offset) in self.entries.iter_mut() {
            if offset.x.is_nan() || offset.y.is_nan() {
                warn!("Offset for node {} is NaN; treating it as zero.", index);
            }
            offset.x = clamp_axis(offset.x, max_x);
            offset.y = clamp_axis(offset.y, max_y);
        }
    }

    /// Flat `index,x,y,index,x,y,...` text form used for saved mesh configurations.
    pub fn to_compact(&self) -> String {
        let mut parts = Vec::with_capacity(self.entries.len() * 3);
        for (index, offset) in &self.entries {
            parts.push(index.to_string());
            parts.push(offset.x.to_string());
            parts.push(offset.y.to_string());
        }
        parts.join(",")
    }

    /// Parses the text form produced by [`OffsetMap::to_compact`].
    pub fn from_compact(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let mut map = Self::new();
        if trimmed.is_empty() {
            return Ok(map);
        }

        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if fields.len() % 3 != 0 {
            return Err(Error::InvalidConfig(format!(
                "compact offsets need triples of index,x,y; got {} fields",
                fields.len()
            )));
        }

        for triple in fields.chunks_exact(3) {
            let index = parse_index(triple[0])?;
            let x = parse_component(triple[1])?;
            let y = parse_component(triple[2])?;
            map.insert(index, NodeOffset::new(x, y));
        }
        Ok(map)
    }
}

impl FromIterator<(usize, NodeOffset)> for OffsetMap {
    fn from_iter<T: IntoIterator<Item = (usize, NodeOffset)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn clamp_axis(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-max, max)
    }
}

fn parse_index(key: &str) -> Result<usize> {
    key.trim().parse::<usize>().map_err(|_| Error::InvalidNodeKey {
        key: key.to_string(),
    })
}

fn parse_component(text: &str) -> Result<f32> {
    text.parse::<f32>()
        .map_err(|_| Error::InvalidConfig(format!("invalid offset component '{text}'")))
}
