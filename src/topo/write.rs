use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::common::write_atomically;
use crate::error::{Error, Result};
use crate::topo::{read_topology, Topology};

/// Where and what was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Published {
    pub path: PathBuf,
    pub bytes: u64,
    /// Hex SHA-256 of the file contents.
    pub sha256: String,
    /// Geometry count per object, as read back from disk.
    pub counts: BTreeMap<String, usize>,
}

/// Serialize `topology` to `path` via a sibling temp file and rename.
///
/// Before the rename, the temp file is read back, parsed and validated,
/// and its per-object counts compared with `topology`. On any failure the
/// previous file at `path` is left untouched.
pub fn write_topology(path: &Path, topology: &Topology) -> Result<Published> {
    let body = serde_json::to_vec(topology)?;
    let mut counts = BTreeMap::new();

    write_atomically(path, |out| {
        out.write_all(&body).map_err(|e| Error::io(out.temp_path(), e))?;
        out.flush().map_err(|e| Error::io(out.temp_path(), e))?;
        let written = read_topology(out.temp_path())?;
        for (name, object) in &topology.objects {
            let found = written.object_len(name).unwrap_or(0);
            if found != object.geometries.len() {
                return Err(Error::InvalidTopology {
                    reason: format!("{name}: wrote {} geometries, read back {found}", object.geometries.len()),
                });
            }
            counts.insert(name.clone(), found);
        }
        Ok(())
    })?;

    let published = Published {
        path: path.to_path_buf(),
        bytes: body.len() as u64,
        sha256: hex::encode(Sha256::digest(&body)),
        counts,
    };
    tracing::info!(path = %path.display(), bytes = published.bytes, sha256 = %published.sha256, "published topology");
    Ok(published)
}
