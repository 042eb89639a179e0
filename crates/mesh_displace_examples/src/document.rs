use std::path::Path;

use anyhow::Context;
use mesh_displace::config::DisplacementConfig;
use mesh_displace::grid::OffsetMap;
use serde::{Deserialize, Serialize};

/// A saved mesh edit: the compiler configuration plus node offsets.
///
/// Offsets may be given as a map, as the compact `index,x,y,...` string, or both; compact
/// entries win on conflicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetDocument {
    pub config: DisplacementConfig,
    #[serde(default)]
    pub offsets: OffsetMap,
    #[serde(default)]
    pub compact: Option<String>,
}

impl OffsetDocument {
    /// All offsets of the document merged into one map.
    pub fn offsets(&self) -> anyhow::Result<OffsetMap> {
        let mut merged = self.offsets.clone();
        if let Some(compact) = &self.compact {
            for (index, offset) in OffsetMap::from_compact(compact)?.iter() {
                merged.insert(index, offset);
            }
        }
        Ok(merged)
    }
}

/// Loads an [`OffsetDocument`] from a RON file.
pub fn load_offset_document(path: impl AsRef<Path>) -> anyhow::Result<OffsetDocument> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let doc: OffsetDocument = ron::de::from_bytes(&bytes).map_err(|e| anyhow::anyhow!(e))?;
    Ok(doc)
}
