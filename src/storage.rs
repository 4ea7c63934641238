use std::path::{Path, PathBuf};

use fingerset_engine::Bir;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::{Registry, SlotId};

const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    slot: SlotId,
    #[serde(with = "serde_bytes")]
    bir: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u8,
    entries: Vec<SnapshotEntry>,
}

/// Read a whole template file. Nothing is returned unless the file was read
/// completely and carries a consistent header.
pub fn read_template(path: &Path) -> Result<Bir> {
    let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    debug!("read {} bytes from {}", data.len(), path.display());
    Bir::from_bytes(data).map_err(|source| Error::InvalidTemplate {
        path: path.to_path_buf(),
        source,
    })
}

/// Write exactly `header.length` bytes of `bir` to `path`.
pub fn write_template(bir: &Bir, path: &Path) -> Result<usize> {
    let bytes = bir.record_bytes();
    std::fs::write(path, bytes).map_err(|e| Error::io(path, e))?;
    Ok(bytes.len())
}

/// Files directly inside `dir` with the given extension, sorted by name.
pub fn template_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pack every enrolled template, keyed by slot, into one postcard file.
pub fn save_snapshot(registry: &Registry, path: &Path) -> Result<usize> {
    let compacted = registry.compact();
    let entries = compacted
        .slots()
        .iter()
        .zip(compacted.records())
        .map(|(slot, bir)| SnapshotEntry {
            slot: *slot,
            bir: bir.record_bytes().to_vec(),
        })
        .collect::<Vec<_>>();
    let count = entries.len();
    let data = postcard::to_allocvec(&Snapshot {
        version: SNAPSHOT_VERSION,
        entries,
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, data).map_err(|e| Error::io(path, e))?;
    Ok(count)
}

/// Decode a snapshot into `(slot, template)` pairs, validating every
/// template before returning any.
pub fn load_snapshot(path: &Path) -> Result<Vec<(SlotId, Bir)>> {
    let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let snapshot: Snapshot = postcard::from_bytes(&data)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(Error::SnapshotVersion {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    snapshot
        .entries
        .into_iter()
        .map(|entry| {
            let bir = Bir::from_bytes(entry.bir).map_err(|source| Error::InvalidTemplate {
                path: path.to_path_buf(),
                source,
            })?;
            Ok((entry.slot, bir))
        })
        .collect()
}
