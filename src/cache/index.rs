//! Cache metadata index
//!
//! A single flat text file maps each source banner path to its cache
//! record: one `[source path]` block of `Key=Value` lines. The file is read
//! once at startup and rewritten in full after every cache update. Parsing
//! is permissive on purpose: a missing or garbled value reads as zero or
//! false, which marks the record unusable and forces a rebuild.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::hashing;

/// Subdirectory of the cache directory holding reduced banner files.
const CACHE_SUBDIR: &str = "banners";

const KEY_PATH: &str = "Path";
const KEY_WIDTH: &str = "Width";
const KEY_HEIGHT: &str = "Height";
const KEY_FULL_HASH: &str = "FullHash";
const KEY_ROTATED: &str = "Rotated";

/// Metadata for one cached banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheRecord {
    /// Where the reduced cache file lives.
    pub cache_path: String,
    /// Original source width, before downscale (after de-rotation for
    /// diagonal banners).
    pub source_width: u32,
    /// Original source height, before downscale.
    pub source_height: u32,
    /// Full-content hash of the source file; staleness short-circuit only.
    pub full_hash: u64,
    /// The source was a diagonal banner and has been un-rotated.
    pub rotated: bool,
}

impl CacheRecord {
    /// A record with a zero dimension is a failed or legacy entry and must
    /// be rebuilt before use.
    pub fn is_usable(&self) -> bool {
        self.source_width != 0 && self.source_height != 0
    }
}

/// Deterministic cache file path for a source banner path. Depends only on
/// the path string, so index loading never touches the source files.
pub fn cache_file_path(cache_dir: &Path, source_path: &str) -> PathBuf {
    cache_dir
        .join(CACHE_SUBDIR)
        .join(hashing::hash_path_name(source_path))
}

/// The path-keyed record store.
#[derive(Debug)]
pub struct CacheIndex {
    index_path: PathBuf,
    records: BTreeMap<String, CacheRecord>,
}

impl CacheIndex {
    /// Read the index file; a missing or unreadable file yields an empty
    /// index (every banner will simply be rebuilt).
    pub fn load(index_path: PathBuf) -> Self {
        let records = match fs::read_to_string(&index_path) {
            Ok(contents) => parse_records(&contents),
            Err(e) => {
                debug!(
                    "Banner cache index {} not read ({}); starting empty",
                    index_path.display(),
                    e
                );
                BTreeMap::new()
            }
        };
        Self {
            index_path,
            records,
        }
    }

    pub fn get(&self, source_path: &str) -> Option<&CacheRecord> {
        self.records.get(source_path)
    }

    /// Insert or overwrite the record for a source path.
    pub fn set(&mut self, source_path: &str, record: CacheRecord) {
        self.records.insert(source_path.to_string(), record);
    }

    /// All known source paths, in stable order.
    pub fn source_paths(&self) -> impl Iterator<Item = &String> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rewrite the whole index file and flush it to disk.
    pub fn write(&self) -> io::Result<()> {
        if let Some(parent) = self.index_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&self.index_path)?;
        for (source_path, record) in &self.records {
            writeln!(file, "[{source_path}]")?;
            writeln!(file, "{KEY_PATH}={}", record.cache_path)?;
            writeln!(file, "{KEY_WIDTH}={}", record.source_width)?;
            writeln!(file, "{KEY_HEIGHT}={}", record.source_height)?;
            writeln!(file, "{KEY_FULL_HASH}={}", record.full_hash)?;
            writeln!(file, "{KEY_ROTATED}={}", if record.rotated { 1 } else { 0 })?;
            writeln!(file)?;
        }
        file.sync_all()
    }
}

fn parse_records(contents: &str) -> BTreeMap<String, CacheRecord> {
    let mut records = BTreeMap::new();
    let mut current: Option<(String, CacheRecord)> = None;

    for line in contents.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some((path, record)) = current.take() {
                records.insert(path, record);
            }
            if !name.is_empty() {
                current = Some((name.to_string(), CacheRecord::default()));
            }
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let Some((_, record)) = current.as_mut() else {
            continue;
        };
        match key {
            KEY_PATH => record.cache_path = value.to_string(),
            KEY_WIDTH => record.source_width = value.parse().unwrap_or(0),
            KEY_HEIGHT => record.source_height = value.parse().unwrap_or(0),
            KEY_FULL_HASH => record.full_hash = value.parse().unwrap_or(0),
            KEY_ROTATED => record.rotated = value.trim() == "1",
            _ => {}
        }
    }
    if let Some((path, record)) = current.take() {
        records.insert(path, record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> CacheRecord {
        CacheRecord {
            cache_path: "Cache/banners/abcd".to_string(),
            source_width: 640,
            source_height: 80,
            full_hash: 0xDEADBEEF,
            rotated: false,
        }
    }

    #[test]
    fn test_write_and_reload() {
        let temp = TempDir::new().unwrap();
        let index_path = temp.path().join("banners.index");

        let mut index = CacheIndex::load(index_path.clone());
        assert!(index.is_empty());

        index.set("songs/Foo/banner.png", sample_record());
        index.set(
            "songs/Bar/banner.png",
            CacheRecord {
                rotated: true,
                ..sample_record()
            },
        );
        index.write().unwrap();

        let reloaded = CacheIndex::load(index_path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.get("songs/Foo/banner.png"),
            Some(&sample_record())
        );
        assert!(reloaded.get("songs/Bar/banner.png").unwrap().rotated);
    }

    #[test]
    fn test_permissive_parse_defaults_to_unusable() {
        let parsed = parse_records("[songs/Baz/banner.png]\nPath=x\nWidth=not-a-number\n");
        let record = parsed.get("songs/Baz/banner.png").unwrap();
        assert_eq!(record.source_width, 0);
        assert_eq!(record.source_height, 0);
        assert!(!record.is_usable());
    }

    #[test]
    fn test_unknown_keys_and_stray_lines_ignored() {
        let parsed = parse_records(
            "stray line\n[songs/Foo/banner.png]\nWidth=12\nHeight=8\nColor=blue\n",
        );
        let record = parsed.get("songs/Foo/banner.png").unwrap();
        assert_eq!((record.source_width, record.source_height), (12, 8));
        assert!(record.is_usable());
    }

    #[test]
    fn test_set_overwrites() {
        let temp = TempDir::new().unwrap();
        let mut index = CacheIndex::load(temp.path().join("banners.index"));
        index.set("p", sample_record());
        index.set(
            "p",
            CacheRecord {
                source_width: 1,
                ..sample_record()
            },
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("p").unwrap().source_width, 1);
    }

    #[test]
    fn test_cache_file_path_is_stable() {
        let dir = Path::new("Cache");
        let a = cache_file_path(dir, "songs/Foo/banner.png");
        let b = cache_file_path(dir, "songs/Foo/banner.png");
        assert_eq!(a, b);
        assert!(a.starts_with("Cache/banners"));
    }
}
