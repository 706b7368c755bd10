//! Index artifact serialization.
//!
//! Layout, all little-endian:
//!
//! ```text
//! [magic "NSWG"][version u32][count u32][dimension u32][max_degree u32]
//! [ef_construction u32][kernel u32][entry_point u32][nodes_crc32 u32]
//! ```
//!
//! followed by one fixed-size record per node in ascending id order:
//! `[neighbor_count u32][max_degree x u32 neighbor ids]`, zero-padded.
//! A node's record starts at `HEADER_SIZE + id * (4 + max_degree * 4)`,
//! so random access needs no scan and the file can be mapped read-only.
//!
//! Writes publish atomically: the artifact is written to a temporary path,
//! fsynced, and renamed into place. A crash mid-build never leaves a
//! loadable partial artifact.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::distance::DistanceKernel;
use crate::error::{Result, SearchError};
use crate::graph::{BuildParams, NavGraph};

const MAGIC: [u8; 4] = *b"NSWG";
const FORMAT_VERSION: u32 = 1;
const HEADER_SIZE: usize = 36;

fn incompatible(reason: impl Into<String>) -> SearchError {
    SearchError::IncompatibleArtifact {
        reason: reason.into(),
    }
}

/// Serialize a graph to `path`, atomically.
pub fn write_artifact(path: impl AsRef<Path>, graph: &NavGraph) -> Result<()> {
    let path = path.as_ref();
    let params = graph.params();
    let record_size = 4 + params.max_degree * 4;

    let mut nodes = Vec::with_capacity(graph.len() * record_size);
    for id in 0..graph.len() as u32 {
        let neighbors = graph.neighbors(id);
        nodes.extend_from_slice(&(neighbors.len() as u32).to_le_bytes());
        for &nid in neighbors {
            nodes.extend_from_slice(&nid.to_le_bytes());
        }
        for _ in neighbors.len()..params.max_degree {
            nodes.extend_from_slice(&0u32.to_le_bytes());
        }
    }

    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(&MAGIC);
    header.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    header.extend_from_slice(&(graph.len() as u32).to_le_bytes());
    header.extend_from_slice(&(params.dimension as u32).to_le_bytes());
    header.extend_from_slice(&(params.max_degree as u32).to_le_bytes());
    header.extend_from_slice(&(params.ef_construction as u32).to_le_bytes());
    header.extend_from_slice(&params.kernel.id().to_le_bytes());
    header.extend_from_slice(&graph.entry_point().to_le_bytes());
    header.extend_from_slice(&crc32fast::hash(&nodes).to_le_bytes());

    // Appended, not substituted: "index.nswg" stages as "index.nswg.tmp",
    // so artifacts sharing a stem never stage over each other.
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);
    {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&header)?;
        file.write_all(&nodes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Load a graph artifact, verifying magic, version, length, checksum, and
/// per-node bounds. Any disagreement is `IncompatibleArtifact` — never a
/// best-effort parse.
pub fn read_artifact(path: impl AsRef<Path>) -> Result<NavGraph> {
    let file = File::open(path.as_ref())?;
    if (file.metadata()?.len() as usize) < HEADER_SIZE {
        return Err(incompatible("file too small for header"));
    }
    // Read-only mapping of an immutable artifact; nothing mutates the file
    // while a server process holds it.
    let mmap = unsafe { Mmap::map(&file)? };
    let bytes: &[u8] = &mmap;
    if bytes[0..4] != MAGIC {
        return Err(incompatible("bad magic value"));
    }

    let read_u32 = |offset: usize| -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    };

    let version = read_u32(4);
    if version != FORMAT_VERSION {
        return Err(incompatible(format!(
            "unsupported format version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    let count = read_u32(8) as usize;
    let dimension = read_u32(12) as usize;
    let max_degree = read_u32(16) as usize;
    let ef_construction = read_u32(20) as usize;
    let kernel_id = read_u32(24);
    let entry_point = read_u32(28);
    let expected_crc = read_u32(32);

    let kernel = DistanceKernel::from_id(kernel_id)
        .ok_or_else(|| incompatible(format!("unknown kernel identifier {}", kernel_id)))?;

    let record_size = 4 + max_degree * 4;
    let expected_len = HEADER_SIZE + count * record_size;
    if bytes.len() != expected_len {
        return Err(incompatible(format!(
            "expected {} bytes for {} nodes, got {}",
            expected_len,
            count,
            bytes.len()
        )));
    }
    if count == 0 {
        return Err(incompatible("artifact holds no nodes"));
    }
    if entry_point as usize >= count {
        return Err(incompatible("entry point out of range"));
    }

    let nodes_bytes = &bytes[HEADER_SIZE..];
    if crc32fast::hash(nodes_bytes) != expected_crc {
        return Err(incompatible("node section checksum mismatch"));
    }

    let mut nodes = Vec::with_capacity(count);
    for id in 0..count {
        let record = &nodes_bytes[id * record_size..(id + 1) * record_size];
        let degree = u32::from_le_bytes(record[0..4].try_into().unwrap()) as usize;
        if degree > max_degree {
            return Err(incompatible(format!(
                "node {} declares degree {} > max {}",
                id, degree, max_degree
            )));
        }

        let mut neighbors = Vec::with_capacity(degree);
        for slot in 0..degree {
            let offset = 4 + slot * 4;
            let nid = u32::from_le_bytes(record[offset..offset + 4].try_into().unwrap());
            if nid as usize >= count || nid as usize == id {
                return Err(incompatible(format!("node {} has invalid neighbor {}", id, nid)));
            }
            if neighbors.contains(&nid) {
                return Err(incompatible(format!("node {} repeats neighbor {}", id, nid)));
            }
            neighbors.push(nid);
        }
        nodes.push(neighbors);
    }

    let params = BuildParams {
        dimension,
        max_degree,
        ef_construction,
        kernel,
    };
    Ok(NavGraph::from_parts(nodes, entry_point, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::store::VectorStore;
    use tempfile::TempDir;

    fn small_graph() -> (VectorStore, NavGraph) {
        let data: Vec<f32> = (0..30).flat_map(|i| [i as f32, (i % 5) as f32]).collect();
        let store = VectorStore::from_flat(data, 30, 2).unwrap();
        let params = BuildParams {
            dimension: 2,
            max_degree: 4,
            ef_construction: 16,
            kernel: DistanceKernel::SquaredEuclidean,
        };
        let graph = GraphBuilder::new(params).build(&store).unwrap();
        (store, graph)
    }

    #[test]
    fn test_write_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.nswg");
        let (_, graph) = small_graph();

        write_artifact(&path, &graph).unwrap();
        let loaded = read_artifact(&path).unwrap();

        assert_eq!(loaded.len(), graph.len());
        assert_eq!(loaded.entry_point(), graph.entry_point());
        assert_eq!(loaded.params(), graph.params());
        for id in 0..graph.len() as u32 {
            assert_eq!(loaded.neighbors(id), graph.neighbors(id));
        }
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.nswg");
        let (_, graph) = small_graph();

        write_artifact(&path, &graph).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("index.nswg.tmp").exists());
    }

    #[test]
    fn test_staging_does_not_clobber_sibling_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.nswg");
        // A same-stem sibling must survive the staged write untouched.
        let sibling = dir.path().join("index.tmp");
        fs::write(&sibling, b"unrelated").unwrap();

        let (_, graph) = small_graph();
        write_artifact(&path, &graph).unwrap();

        assert_eq!(fs::read(&sibling).unwrap(), b"unrelated");
        read_artifact(&path).unwrap();
    }

    #[test]
    fn test_bad_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.nswg");
        let (_, graph) = small_graph();
        write_artifact(&path, &graph).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[0] = b'X';
        fs::write(&path, &bytes).unwrap();

        let result = read_artifact(&path);
        assert!(matches!(
            result,
            Err(SearchError::IncompatibleArtifact { .. })
        ));
    }

    #[test]
    fn test_bad_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.nswg");
        let (_, graph) = small_graph();
        write_artifact(&path, &graph).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[4] = 0xFF;
        fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            read_artifact(&path),
            Err(SearchError::IncompatibleArtifact { .. })
        ));
    }

    #[test]
    fn test_corrupt_node_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.nswg");
        let (_, graph) = small_graph();
        write_artifact(&path, &graph).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            read_artifact(&path),
            Err(SearchError::IncompatibleArtifact { reason }) if reason.contains("checksum")
        ));
    }

    #[test]
    fn test_duplicate_neighbor_in_record_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.nswg");
        let (_, graph) = small_graph();
        write_artifact(&path, &graph).unwrap();

        // Repeat a node's first neighbor in its second slot and re-seal the
        // checksum, so only the duplicate check can catch it.
        let record_size = 4 + graph.params().max_degree * 4;
        let node = (0..graph.len())
            .find(|&id| graph.neighbors(id as u32).len() >= 2)
            .unwrap();
        let record = HEADER_SIZE + node * record_size;

        let mut bytes = fs::read(&path).unwrap();
        bytes.copy_within(record + 4..record + 8, record + 8);
        let crc = crc32fast::hash(&bytes[HEADER_SIZE..]).to_le_bytes();
        bytes[32..36].copy_from_slice(&crc);
        fs::write(&path, &bytes).unwrap();

        assert!(matches!(
            read_artifact(&path),
            Err(SearchError::IncompatibleArtifact { reason }) if reason.contains("repeats")
        ));
    }

    #[test]
    fn test_truncated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.nswg");
        let (_, graph) = small_graph();
        write_artifact(&path, &graph).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(matches!(
            read_artifact(&path),
            Err(SearchError::IncompatibleArtifact { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_artifact(dir.path().join("absent.nswg"));
        assert!(matches!(result, Err(SearchError::IoError(_))));
    }

    #[test]
    fn test_byte_identical_rebuild() {
        let dir = TempDir::new().unwrap();
        let (store, _) = small_graph();
        let params = BuildParams {
            dimension: 2,
            max_degree: 4,
            ef_construction: 16,
            kernel: DistanceKernel::SquaredEuclidean,
        };

        let path_a = dir.path().join("a.nswg");
        let path_b = dir.path().join("b.nswg");
        let graph_a = GraphBuilder::new(params.clone()).build(&store).unwrap();
        let graph_b = GraphBuilder::new(params).build(&store).unwrap();
        write_artifact(&path_a, &graph_a).unwrap();
        write_artifact(&path_b, &graph_b).unwrap();

        assert_eq!(fs::read(&path_a).unwrap(), fs::read(&path_b).unwrap());
    }
}
