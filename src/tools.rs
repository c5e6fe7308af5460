//! Read-only pack inspection: dump the index, unpack resources to files

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ResourceResult;
use crate::pack::{PackIndex, ResourcePack};

/// One row of a pack dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    /// Resource name when known, otherwise `resource_<id>`
    pub name: String,
    /// 1-based resource id
    pub resource_id: u32,
    /// Offset into the blob
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
    /// Stored CRC
    pub crc: u32,
}

impl std::fmt::Display for DumpEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>3} {:<32} offset={:<8} size={:<8} crc={:#010x}",
            self.resource_id, self.name, self.offset, self.size, self.crc
        )
    }
}

/// Read the header and index of a pack
///
/// `names` maps ids to names in order (index 0 is resource 1); ids beyond it
/// are shown as `resource_<id>`. Only the index is inspected, so this works
/// on packs whose blob is damaged.
pub fn dump(bytes: &[u8], names: &[String]) -> ResourceResult<Vec<DumpEntry>> {
    let index = PackIndex::parse(bytes)?;
    Ok(index
        .entries
        .iter()
        .map(|entry| DumpEntry {
            name: (entry.resource_id as usize)
                .checked_sub(1)
                .and_then(|i| names.get(i))
                .cloned()
                .unwrap_or_else(|| format!("resource_{}", entry.resource_id)),
            resource_id: entry.resource_id,
            offset: entry.offset,
            size: entry.size,
            crc: entry.crc,
        })
        .collect())
}

/// Dump a pack file
pub fn dump_file(path: &Path, names: &[String]) -> ResourceResult<Vec<DumpEntry>> {
    let bytes = fs::read(path)?;
    let entries = dump(&bytes, names)?;
    for entry in &entries {
        tracing::info!("{}", entry);
    }
    Ok(entries)
}

/// Write each resource of a pack to `out_dir/resource_NNN.bin`
///
/// Every resource is CRC-checked before anything is written.
pub fn unpack(path: &Path, out_dir: &Path) -> ResourceResult<Vec<PathBuf>> {
    let bytes = fs::read(path)?;
    let pack = ResourcePack::parse(&bytes)?;
    pack.verify()?;

    fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(pack.len());
    for (i, data) in pack.contents().into_iter().enumerate() {
        let target = out_dir.join(format!("resource_{:03}.bin", i + 1));
        fs::write(&target, data)?;
        written.push(target);
    }

    tracing::info!(
        "Unpacked {} resources from {} to {}",
        written.len(),
        path.display(),
        out_dir.display()
    );
    Ok(written)
}
