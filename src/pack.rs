//! pbpack archive format
//!
//! ## Format
//!
//! ```text
//! [Header]
//!   - Resource count: u32 LE (4 bytes)
//!   - Version tag: opaque (16 bytes)
//! [Index] (count * 16 bytes)
//!   - Resource id: u32 LE, 1-based and sequential
//!   - Offset: u32 LE, relative to the start of the blob
//!   - Size: u32 LE
//!   - CRC: u32 LE, STM32 CRC over exactly this resource's bytes
//! [Blob]
//!   - Resource bytes concatenated in id order
//! ```
//!
//! Only objects stored as [`StorageClass::ArchivePacked`] are written, in
//! resource ball order. Readers reserve a fixed index table of
//! [`MAX_RESOURCES`] entries, so larger packs are refused at build time.

use std::fs;
use std::path::Path;

use crate::ball::ResourceBall;
use crate::crc::crc32;
use crate::definition::StorageClass;
use crate::error::{ResourceError, ResourceResult};

/// Header size in bytes (count: 4 + version: 16)
pub const PACK_HEADER_SIZE: usize = 20;

/// Index entry size in bytes (id, offset, size, crc)
pub const PACK_ENTRY_SIZE: usize = 16;

/// Index entries reserved by the firmware's reader
pub const MAX_RESOURCES: usize = 256;

/// Version tag size in bytes
pub const VERSION_TAG_SIZE: usize = 16;

/// One index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackEntry {
    /// 1-based resource id
    pub resource_id: u32,
    /// Offset into the blob
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
    /// CRC of the resource bytes
    pub crc: u32,
}

impl PackEntry {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.resource_id.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.crc.to_le_bytes());
    }

    fn read_from(bytes: &[u8]) -> Self {
        let word = |i: usize| {
            u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
        };
        Self {
            resource_id: word(0),
            offset: word(4),
            size: word(8),
            crc: word(12),
        }
    }

    fn range(&self) -> std::ops::Range<usize> {
        self.offset as usize..self.offset as usize + self.size as usize
    }
}

/// Header and index of a pack, without the blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackIndex {
    /// Version tag
    pub version: [u8; VERSION_TAG_SIZE],
    /// Index entries in id order
    pub entries: Vec<PackEntry>,
}

impl PackIndex {
    /// Byte offset where the blob starts
    pub fn blob_start(&self) -> usize {
        PACK_HEADER_SIZE + self.entries.len() * PACK_ENTRY_SIZE
    }

    /// Parse the header and index table
    ///
    /// Fails if the declared resource count implies an index larger than the
    /// input or larger than the reader's reserved table.
    pub fn parse(bytes: &[u8]) -> ResourceResult<Self> {
        if bytes.len() < PACK_HEADER_SIZE {
            return Err(ResourceError::InvalidPack(format!(
                "File too short for header: {} bytes",
                bytes.len()
            )));
        }

        let count = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        if count > MAX_RESOURCES {
            return Err(ResourceError::CapacityExceeded {
                count,
                max: MAX_RESOURCES,
            });
        }

        let index_end = PACK_HEADER_SIZE + count * PACK_ENTRY_SIZE;
        if index_end > bytes.len() {
            return Err(ResourceError::InvalidPack(format!(
                "Index for {} resources needs {} bytes, file has {}",
                count,
                index_end,
                bytes.len()
            )));
        }

        let mut version = [0u8; VERSION_TAG_SIZE];
        version.copy_from_slice(&bytes[4..PACK_HEADER_SIZE]);

        let entries = bytes[PACK_HEADER_SIZE..index_end]
            .chunks_exact(PACK_ENTRY_SIZE)
            .map(PackEntry::read_from)
            .collect();

        Ok(Self { version, entries })
    }
}

/// In-memory pack: index plus blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePack {
    index: PackIndex,
    blob: Vec<u8>,
}

impl ResourcePack {
    /// Build a pack from resource contents in id order
    ///
    /// When `version` is `None` the tag is derived from the index and blob,
    /// so identical contents always produce identical files.
    pub fn from_contents<'a, I>(
        contents: I,
        version: Option<[u8; VERSION_TAG_SIZE]>,
    ) -> ResourceResult<Self>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let contents: Vec<&[u8]> = contents.into_iter().collect();
        if contents.len() > MAX_RESOURCES {
            return Err(ResourceError::CapacityExceeded {
                count: contents.len(),
                max: MAX_RESOURCES,
            });
        }

        let mut entries = Vec::with_capacity(contents.len());
        let mut blob = Vec::new();
        for (i, data) in contents.iter().enumerate() {
            let offset = u32::try_from(blob.len())
                .map_err(|_| ResourceError::InvalidPack("Blob exceeds 4 GiB".to_string()))?;
            let size = u32::try_from(data.len())
                .map_err(|_| ResourceError::InvalidPack("Resource exceeds 4 GiB".to_string()))?;
            entries.push(PackEntry {
                resource_id: i as u32 + 1,
                offset,
                size,
                crc: crc32(data),
            });
            blob.extend_from_slice(data);
        }

        let version = version.unwrap_or_else(|| content_version(&entries, &blob));
        Ok(Self {
            index: PackIndex { version, entries },
            blob,
        })
    }

    /// Build a pack from the archive-stored objects of a ball
    pub fn from_ball(
        ball: &ResourceBall,
        version: Option<[u8; VERSION_TAG_SIZE]>,
    ) -> ResourceResult<Self> {
        let pack = Self::from_contents(
            ball.objects_with_storage(StorageClass::ArchivePacked)
                .map(|o| o.data()),
            version,
        )?;
        tracing::info!(
            "Pack built: {} resources, {} bytes",
            pack.len(),
            pack.blob.len()
        );
        Ok(pack)
    }

    /// Parse a pack, checking layout but not CRCs
    pub fn parse(bytes: &[u8]) -> ResourceResult<Self> {
        let index = PackIndex::parse(bytes)?;
        let blob = &bytes[index.blob_start()..];

        let mut expected_offset = 0usize;
        for (i, entry) in index.entries.iter().enumerate() {
            if entry.resource_id as usize != i + 1 {
                return Err(ResourceError::InvalidPack(format!(
                    "Entry {} has resource id {}, expected {}",
                    i,
                    entry.resource_id,
                    i + 1
                )));
            }
            if entry.offset as usize != expected_offset {
                return Err(ResourceError::InvalidPack(format!(
                    "Resource {} starts at {}, expected {}",
                    entry.resource_id, entry.offset, expected_offset
                )));
            }
            expected_offset += entry.size as usize;
        }

        if expected_offset != blob.len() {
            return Err(ResourceError::InvalidPack(format!(
                "Index covers {} blob bytes, file has {}",
                expected_offset,
                blob.len()
            )));
        }

        Ok(Self {
            index,
            blob: blob.to_vec(),
        })
    }

    /// Check every entry's CRC against its bytes
    pub fn verify(&self) -> ResourceResult<()> {
        for entry in &self.index.entries {
            let actual = crc32(&self.blob[entry.range()]);
            if actual != entry.crc {
                return Err(ResourceError::Integrity {
                    resource_id: entry.resource_id,
                    expected: entry.crc,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Size of the encoded pack in bytes
    pub fn encoded_len(&self) -> usize {
        self.index.blob_start() + self.blob.len()
    }

    /// Encode to the on-disk layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&(self.index.entries.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.index.version);
        for entry in &self.index.entries {
            entry.write_to(&mut out);
        }
        out.extend_from_slice(&self.blob);
        out
    }

    /// Header and index
    pub fn index(&self) -> &PackIndex {
        &self.index
    }

    /// Version tag
    pub fn version(&self) -> &[u8; VERSION_TAG_SIZE] {
        &self.index.version
    }

    /// Number of resources
    pub fn len(&self) -> usize {
        self.index.entries.len()
    }

    /// Check if the pack is empty
    pub fn is_empty(&self) -> bool {
        self.index.entries.is_empty()
    }

    /// Bytes of a resource by 1-based id
    pub fn resource(&self, resource_id: u32) -> Option<&[u8]> {
        let entry = self
            .index
            .entries
            .get((resource_id as usize).checked_sub(1)?)?;
        Some(&self.blob[entry.range()])
    }

    /// Bytes of every resource in id order
    pub fn contents(&self) -> Vec<&[u8]> {
        self.index
            .entries
            .iter()
            .map(|e| &self.blob[e.range()])
            .collect()
    }

    /// Write the pack to a file
    pub fn write(&self, path: &Path) -> ResourceResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes())?;
        tracing::info!("Pack written to {}", path.display());
        Ok(())
    }

    /// Read and verify a pack file
    pub fn read(path: &Path) -> ResourceResult<Self> {
        let bytes = fs::read(path)?;
        let pack = Self::parse(&bytes)?;
        pack.verify()?;
        Ok(pack)
    }
}

/// First 16 bytes of the BLAKE3 hash over index and blob
fn content_version(entries: &[PackEntry], blob: &[u8]) -> [u8; VERSION_TAG_SIZE] {
    let mut hasher = blake3::Hasher::new();
    let mut index = Vec::with_capacity(entries.len() * PACK_ENTRY_SIZE);
    for entry in entries {
        entry.write_to(&mut index);
    }
    hasher.update(&index);
    hasher.update(blob);
    let mut version = [0u8; VERSION_TAG_SIZE];
    version.copy_from_slice(&hasher.finalize().as_bytes()[..VERSION_TAG_SIZE]);
    version
}

/// Encode the archive-stored objects of a ball
pub fn serialize(ball: &ResourceBall) -> ResourceResult<Vec<u8>> {
    Ok(ResourcePack::from_ball(ball, None)?.to_bytes())
}

/// Decode a pack into per-resource buffers in id order, verifying CRCs
pub fn deserialize(bytes: &[u8]) -> ResourceResult<Vec<Vec<u8>>> {
    let pack = ResourcePack::parse(bytes)?;
    pack.verify()?;
    Ok(pack.contents().into_iter().map(<[u8]>::to_vec).collect())
}
